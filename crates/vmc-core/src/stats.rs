//! Monte Carlo statistics for stochastically sampled quantities.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Point estimate plus uncertainty measures for a sampled quantity.
///
/// Produced by estimators from a batch of correlated Monte Carlo samples.
/// The error of the mean comes from a blocking analysis, so it stays honest
/// in the presence of autocorrelation along the chain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Sample mean.
    pub mean: f64,
    /// Standard error of the mean from the blocking analysis.
    pub error_of_mean: f64,
    /// Population variance of the raw samples.
    pub variance: f64,
    /// Integrated autocorrelation time estimate.
    pub tau_corr: f64,
    /// Number of samples the estimate was built from.
    pub n_samples: usize,
}

/// Maximum number of blocks used by the blocking analysis.
const MAX_BLOCKS: usize = 32;

impl Stats {
    /// Computes statistics from a batch of scalar samples.
    ///
    /// An empty batch produces an all-zero descriptor with `n_samples == 0`;
    /// callers that require data should check the count.
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self {
                mean: 0.0,
                error_of_mean: 0.0,
                variance: 0.0,
                tau_corr: 0.0,
                n_samples: 0,
            };
        }

        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples
            .iter()
            .map(|&x| {
                let d = x - mean;
                d * d
            })
            .sum::<f64>()
            / n as f64;

        let n_blocks = n.min(MAX_BLOCKS);
        let block_size = n / n_blocks;
        let used = n_blocks * block_size;
        let block_means: Vec<f64> = samples[..used]
            .chunks(block_size)
            .map(|block| block.iter().sum::<f64>() / block.len() as f64)
            .collect();
        let grand_mean = block_means.iter().sum::<f64>() / n_blocks as f64;
        let block_variance = block_means
            .iter()
            .map(|&b| {
                let d = b - grand_mean;
                d * d
            })
            .sum::<f64>()
            / n_blocks as f64;
        let error_of_mean = (block_variance / n_blocks as f64).sqrt();

        let tau_corr = if variance > 0.0 {
            (0.5 * (error_of_mean * error_of_mean * used as f64 / variance - 1.0)).max(0.0)
        } else {
            0.0
        };

        Self {
            mean,
            error_of_mean,
            variance,
            tau_corr,
            n_samples: n,
        }
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.6} ± {:.6} [var={:.6}, tau={:.2}]",
            self.mean, self.error_of_mean, self.variance, self.tau_corr
        )
    }
}
