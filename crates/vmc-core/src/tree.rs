//! Structure-preserving parameter and observable trees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, VmcError};

/// Arbitrarily nested mapping/sequence structure with typed leaves.
///
/// Parameter containers, gradient proposals, and observable collections all
/// share this shape. Mapping operations preserve the structure exactly, so
/// a gradient always mirrors the parameters it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tree<T> {
    /// A single leaf value.
    Leaf(T),
    /// An ordered sequence of subtrees.
    Seq(Vec<Tree<T>>),
    /// A named mapping of subtrees.
    Map(BTreeMap<String, Tree<T>>),
}

/// Nested numeric parameter container owned by a machine.
pub type Parameters = Tree<Vec<f64>>;

impl<T> Tree<T> {
    /// Builds a map tree from named subtrees.
    pub fn map_of(entries: impl IntoIterator<Item = (String, Tree<T>)>) -> Self {
        Tree::Map(entries.into_iter().collect())
    }

    /// Returns the number of leaves in the tree.
    pub fn n_leaves(&self) -> usize {
        match self {
            Tree::Leaf(_) => 1,
            Tree::Seq(items) => items.iter().map(Tree::n_leaves).sum(),
            Tree::Map(entries) => entries.values().map(Tree::n_leaves).sum(),
        }
    }

    /// Applies `f` to every leaf, consuming the tree.
    pub fn map<U, F: FnMut(T) -> U>(self, f: &mut F) -> Tree<U> {
        match self {
            Tree::Leaf(value) => Tree::Leaf(f(value)),
            Tree::Seq(items) => Tree::Seq(items.into_iter().map(|t| t.map(f)).collect()),
            Tree::Map(entries) => {
                Tree::Map(entries.into_iter().map(|(k, t)| (k, t.map(f))).collect())
            }
        }
    }

    /// Applies `f` to every leaf by reference.
    pub fn map_ref<U, F: FnMut(&T) -> U>(&self, f: &mut F) -> Tree<U> {
        match self {
            Tree::Leaf(value) => Tree::Leaf(f(value)),
            Tree::Seq(items) => Tree::Seq(items.iter().map(|t| t.map_ref(f)).collect()),
            Tree::Map(entries) => {
                Tree::Map(entries.iter().map(|(k, t)| (k.clone(), t.map_ref(f))).collect())
            }
        }
    }

    /// Applies a fallible `f` to every leaf by reference, preserving structure.
    pub fn try_map_ref<U, E, F: FnMut(&T) -> Result<U, E>>(
        &self,
        f: &mut F,
    ) -> Result<Tree<U>, E> {
        match self {
            Tree::Leaf(value) => f(value).map(Tree::Leaf),
            Tree::Seq(items) => items
                .iter()
                .map(|t| t.try_map_ref(f))
                .collect::<Result<Vec<_>, E>>()
                .map(Tree::Seq),
            Tree::Map(entries) => entries
                .iter()
                .map(|(k, t)| Ok((k.clone(), t.try_map_ref(f)?)))
                .collect::<Result<BTreeMap<_, _>, E>>()
                .map(Tree::Map),
        }
    }

    /// Combines two trees leaf by leaf with a fallible closure.
    ///
    /// Fails with a shape error if the two trees differ in structure.
    pub fn try_zip_with<U, V, F: FnMut(&T, &U) -> Result<V, VmcError>>(
        &self,
        other: &Tree<U>,
        f: &mut F,
    ) -> Result<Tree<V>, VmcError> {
        match (self, other) {
            (Tree::Leaf(a), Tree::Leaf(b)) => f(a, b).map(Tree::Leaf),
            (Tree::Seq(xs), Tree::Seq(ys)) => {
                if xs.len() != ys.len() {
                    return Err(VmcError::Shape(
                        ErrorInfo::new("tree-shape-mismatch", "sequence lengths differ")
                            .with_context("left", xs.len().to_string())
                            .with_context("right", ys.len().to_string()),
                    ));
                }
                xs.iter()
                    .zip(ys.iter())
                    .map(|(x, y)| x.try_zip_with(y, f))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Tree::Seq)
            }
            (Tree::Map(xs), Tree::Map(ys)) => {
                if xs.len() != ys.len() || xs.keys().ne(ys.keys()) {
                    return Err(shape_mismatch("map keys differ"));
                }
                xs.iter()
                    .map(|(k, x)| Ok((k.clone(), x.try_zip_with(&ys[k], f)?)))
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .map(Tree::Map)
            }
            _ => Err(shape_mismatch("tree node kinds differ")),
        }
    }

    /// Combines two trees leaf by leaf with an infallible closure.
    pub fn zip_with<U, V, F: FnMut(&T, &U) -> V>(
        &self,
        other: &Tree<U>,
        f: &mut F,
    ) -> Result<Tree<V>, VmcError> {
        self.try_zip_with(other, &mut |a, b| Ok(f(a, b)))
    }
}

impl Tree<Vec<f64>> {
    /// Returns the total number of scalar entries across all leaves.
    pub fn total_len(&self) -> usize {
        match self {
            Tree::Leaf(values) => values.len(),
            Tree::Seq(items) => items.iter().map(Tree::total_len).sum(),
            Tree::Map(entries) => entries.values().map(Tree::total_len).sum(),
        }
    }

    /// Returns a tree of identical structure with every entry set to zero.
    pub fn zeros_like(&self) -> Self {
        self.map_ref(&mut |values| vec![0.0; values.len()])
    }
}

fn shape_mismatch(message: &str) -> VmcError {
    VmcError::Shape(ErrorInfo::new("tree-shape-mismatch", message))
}
