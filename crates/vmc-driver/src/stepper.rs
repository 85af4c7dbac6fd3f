//! Explicit iterator object behind `iter`/`advance`/`run`.

use vmc_core::{Parameters, VmcError};

use crate::driver::{DriverExt, VariationalDriver};

/// Resumable step sequence over a mutably borrowed driver.
///
/// Each `next` call first completes the advances owed by the previously
/// yielded batch, then computes the next batch's first update proposal and
/// yields the step counter value as it stands before any of that batch's
/// advances. Computing the proposal before yielding means hook errors
/// (including a missing forward/backward strategy) surface on the first
/// `next`, and that dropping the iterator between yields cancels a batch
/// whose proposal was already computed — cooperative cancellation with no
/// further cleanup.
///
/// When `step` does not divide `n_steps`, a final short batch keeps the
/// total number of advances at exactly `n_steps`.
pub struct StepIter<'d, D: VariationalDriver + ?Sized> {
    driver: &'d mut D,
    full_batches: u64,
    remainder: u64,
    batch: u64,
    pending: u64,
    pending_dp: Option<Parameters>,
    finished: bool,
}

impl<'d, D: VariationalDriver + ?Sized> StepIter<'d, D> {
    /// Creates an iterator performing `n_steps` advances in batches of
    /// `step` (clamped to at least 1).
    pub fn new(driver: &'d mut D, n_steps: u64, step: u64) -> Self {
        let step = step.max(1);
        Self {
            driver,
            full_batches: n_steps / step,
            remainder: n_steps % step,
            batch: step,
            pending: 0,
            pending_dp: None,
            finished: false,
        }
    }

    /// Access to the borrowed driver between yields.
    ///
    /// The run controller uses this to estimate observables and deliver log
    /// records while the iteration is suspended at a yield point.
    pub fn driver_mut(&mut self) -> &mut D {
        self.driver
    }
}

impl<'d, D: VariationalDriver + ?Sized> Iterator for StepIter<'d, D> {
    type Item = Result<u64, VmcError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        // Complete the advances of the previously yielded batch.
        if let Some(dp) = self.pending_dp.take() {
            if let Err(err) = self.driver.update_parameters(dp) {
                self.finished = true;
                return Some(Err(err));
            }
            for _ in 1..self.pending {
                let dp = match self.driver.forward_and_backward() {
                    Ok(dp) => dp,
                    Err(err) => {
                        self.finished = true;
                        return Some(Err(err));
                    }
                };
                if let Err(err) = self.driver.update_parameters(dp) {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }

        let size = if self.full_batches > 0 {
            self.full_batches -= 1;
            self.batch
        } else if self.remainder > 0 {
            let size = self.remainder;
            self.remainder = 0;
            size
        } else {
            self.finished = true;
            return None;
        };

        match self.driver.forward_and_backward() {
            Ok(dp) => {
                self.pending = size;
                self.pending_dp = Some(dp);
                Some(Ok(self.driver.step_count()))
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}
