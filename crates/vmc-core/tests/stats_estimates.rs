use rand::Rng;
use vmc_core::{SampleRng, Stats};

#[test]
fn constant_samples_have_zero_spread() {
    let samples = vec![1.5; 128];
    let stats = Stats::from_samples(&samples);
    assert_eq!(stats.mean, 1.5);
    assert_eq!(stats.variance, 0.0);
    assert_eq!(stats.error_of_mean, 0.0);
    assert_eq!(stats.tau_corr, 0.0);
    assert_eq!(stats.n_samples, 128);
}

#[test]
fn small_batch_mean_and_variance_match_by_hand() {
    let samples = [1.0, 2.0, 3.0, 4.0];
    let stats = Stats::from_samples(&samples);
    assert!((stats.mean - 2.5).abs() < 1e-12);
    assert!((stats.variance - 1.25).abs() < 1e-12);
    assert_eq!(stats.n_samples, 4);
}

#[test]
fn empty_batch_is_flagged_by_sample_count() {
    let stats = Stats::from_samples(&[]);
    assert_eq!(stats.n_samples, 0);
    assert_eq!(stats.mean, 0.0);
}

#[test]
fn seeded_noise_yields_finite_uncertainty() {
    let mut rng = SampleRng::from_seed(7);
    let samples: Vec<f64> = (0..512).map(|_| rng.inner_mut().gen::<f64>()).collect();
    let stats = Stats::from_samples(&samples);
    assert!(stats.mean > 0.3 && stats.mean < 0.7);
    assert!(stats.variance > 0.0);
    assert!(stats.error_of_mean.is_finite() && stats.error_of_mean >= 0.0);
    assert!(stats.tau_corr.is_finite() && stats.tau_corr >= 0.0);
}

#[test]
fn display_reports_mean_and_error() {
    let stats = Stats::from_samples(&[2.0, 2.0, 2.0]);
    let text = stats.to_string();
    assert!(text.contains("2.000000"));
    assert!(text.contains('±'));
    assert!(text.contains("var="));
}
