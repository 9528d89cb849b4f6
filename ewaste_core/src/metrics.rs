//! Regression metrics for the held-out evaluation.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TargetMetrics {
    pub mae: f64,
    pub rmse: f64,
    pub r2: f64,
}

impl TargetMetrics {
    #[must_use]
    pub fn compute(truth: &[f64], pred: &[f64]) -> Self {
        Self {
            mae: mae(truth, pred),
            rmse: rmse(truth, pred),
            r2: r2(truth, pred),
        }
    }
}

#[must_use]
pub fn mae(truth: &[f64], pred: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    truth.iter().zip(pred).map(|(t, p)| (t - p).abs()).sum::<f64>() / truth.len() as f64
}

#[must_use]
pub fn rmse(truth: &[f64], pred: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let mse = truth
        .iter()
        .zip(pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / truth.len() as f64;
    mse.sqrt()
}

/// Coefficient of determination. A constant truth vector scores 1.0 when
/// predicted exactly and 0.0 otherwise.
#[must_use]
pub fn r2(truth: &[f64], pred: &[f64]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_res: f64 = truth.iter().zip(pred).map(|(t, p)| (t - p).powi(2)).sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - ss_res / ss_tot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction() {
        let y = [1.0, 2.0, 3.0];
        let m = TargetMetrics::compute(&y, &y);
        assert_eq!(m, TargetMetrics { mae: 0.0, rmse: 0.0, r2: 1.0 });
    }

    #[test]
    fn known_values() {
        let truth = [1.0, 2.0, 3.0, 4.0];
        let pred = [2.0, 2.0, 3.0, 2.0];
        assert_eq!(mae(&truth, &pred), 0.75);
        assert!((rmse(&truth, &pred) - 1.25_f64.sqrt()).abs() < 1e-12);
        // ss_res = 5, ss_tot = 5
        assert!(r2(&truth, &pred).abs() < 1e-12);
    }

    #[test]
    fn mean_prediction_scores_zero_r2() {
        let truth = [0.0, 10.0];
        assert_eq!(r2(&truth, &[5.0, 5.0]), 0.0);
    }
}
