//! Per-arm sufficient statistics shared by the linear bandits.

use faer::linalg::solvers::DenseSolveCore;
use faer::{Mat, Side};
use rand::RngCore;
use rand_distr::{Distribution, StandardNormal};

use crate::error::{BanditError, Result};

/// Design matrix and reward accumulator for one arm.
///
/// `A = I + Σ x xᵀ` and `b = Σ r x` over the contexts in which this arm was
/// chosen. Starting from the identity keeps `A` symmetric positive definite.
#[derive(Debug, Clone)]
pub struct ArmStatistics {
    /// A = I + X^T X
    design: Mat<f64>,
    /// b = X^T r
    rewards: Vec<f64>,
    num_features: usize,
    observations: usize,
}

impl ArmStatistics {
    /// Fresh statistics: identity design matrix, zero accumulator.
    pub fn new(num_features: usize) -> Self {
        let design = Mat::from_fn(num_features, num_features, |i, j| {
            if i == j { 1.0 } else { 0.0 }
        });
        Self {
            design,
            rewards: vec![0.0; num_features],
            num_features,
            observations: 0,
        }
    }

    pub fn num_features(&self) -> usize {
        self.num_features
    }

    /// Number of updates applied so far.
    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn design(&self) -> &Mat<f64> {
        &self.design
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    /// Fold one observation in: `A += x xᵀ`, `b += r x`.
    pub fn observe(&mut self, x: &[f64], reward: f64) -> Result<()> {
        self.check_dimensions(x)?;

        for i in 0..self.num_features {
            for j in 0..self.num_features {
                self.design[(i, j)] += x[i] * x[j];
            }
            self.rewards[i] += reward * x[i];
        }
        self.observations += 1;
        Ok(())
    }

    /// Factor the design matrix, invert it and compute `theta = A⁻¹ b`.
    ///
    /// Fails if `A` has lost positive definiteness or the inverse is not
    /// finite.
    pub fn posterior(&self) -> Result<Posterior> {
        let llt = self
            .design
            .as_ref()
            .llt(Side::Lower)
            .map_err(|e| BanditError::NumericalError {
                message: format!("design matrix is not positive definite: {e:?}"),
            })?;
        let factor = llt.L().to_owned();
        let covariance = llt.inverse();

        let n = self.num_features;
        let mut mean = vec![0.0; n];
        for (i, m) in mean.iter_mut().enumerate() {
            for j in 0..n {
                *m += covariance[(i, j)] * self.rewards[j];
            }
        }

        let finite = mean.iter().all(|v| v.is_finite())
            && (0..n).all(|i| (0..n).all(|j| covariance[(i, j)].is_finite()));
        if !finite {
            return Err(BanditError::NumericalError {
                message: "inverse of design matrix is not finite".to_string(),
            });
        }

        Ok(Posterior {
            covariance,
            factor,
            mean,
        })
    }

    fn check_dimensions(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.num_features {
            return Err(BanditError::DimensionMismatch {
                expected: self.num_features,
                got: x.len(),
            });
        }
        Ok(())
    }
}

impl PartialEq for ArmStatistics {
    fn eq(&self, other: &Self) -> bool {
        let n = self.num_features;
        n == other.num_features
            && self.observations == other.observations
            && self.rewards == other.rewards
            && (0..n).all(|i| (0..n).all(|j| self.design[(i, j)] == other.design[(i, j)]))
    }
}

/// Ridge estimate for one arm: `A⁻¹` and `theta = A⁻¹ b`.
#[derive(Debug, Clone)]
pub struct Posterior {
    covariance: Mat<f64>,
    /// Lower Cholesky factor `L` of the design matrix, `A = L Lᵀ`
    factor: Mat<f64>,
    mean: Vec<f64>,
}

impl Posterior {
    /// `theta = A⁻¹ b`.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// `A⁻¹`.
    pub fn covariance(&self) -> &Mat<f64> {
        &self.covariance
    }

    /// Point estimate `theta · x`.
    pub fn predict(&self, x: &[f64]) -> f64 {
        dot(&self.mean, x)
    }

    /// Bilinear form `x · A⁻¹ · x`.
    pub fn width(&self, x: &[f64]) -> f64 {
        quadratic_form(&self.covariance, x)
    }

    /// Draw `theta~ ~ N(theta, scale · A⁻¹)`.
    ///
    /// Uses `theta + sqrt(scale) · L⁻ᵀ z` with `z ~ N(0, I)`; the covariance
    /// of `L⁻ᵀ z` is `(L Lᵀ)⁻¹ = A⁻¹`, so no second factorisation is needed.
    pub fn sample(&self, scale: f64, rng: &mut dyn RngCore) -> Result<Vec<f64>> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(BanditError::InvalidParameter {
                message: format!("sampling scale must be finite and positive, got {scale}"),
            });
        }
        let n = self.mean.len();

        let mut z = Vec::with_capacity(n);
        for _ in 0..n {
            let draw: f64 = StandardNormal.sample(rng);
            z.push(draw);
        }

        // back substitution: Lᵀ y = z, Lᵀ upper triangular
        let mut y = vec![0.0; n];
        for i in (0..n).rev() {
            let mut acc = z[i];
            for j in i + 1..n {
                acc -= self.factor[(j, i)] * y[j];
            }
            y[i] = acc / self.factor[(i, i)];
        }

        let std_dev = scale.sqrt();
        let sample: Vec<f64> = self
            .mean
            .iter()
            .zip(&y)
            .map(|(m, yi)| m + std_dev * yi)
            .collect();
        if sample.iter().any(|v| !v.is_finite()) {
            return Err(BanditError::NumericalError {
                message: "posterior sample is not finite".to_string(),
            });
        }
        Ok(sample)
    }
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// `xᵀ M x` for a square matrix `M`.
pub fn quadratic_form(m: &Mat<f64>, x: &[f64]) -> f64 {
    let mut result = 0.0;
    for (i, &xi) in x.iter().enumerate() {
        let mut row = 0.0;
        for (j, &xj) in x.iter().enumerate() {
            row += m[(i, j)] * xj;
        }
        result += xi * row;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_new_statistics_are_identity_prior() {
        let stats = ArmStatistics::new(3);
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_eq!(stats.design()[(i, j)], expected);
            }
        }
        assert_eq!(stats.rewards(), &[0.0, 0.0, 0.0]);
        assert_eq!(stats.observations(), 0);
    }

    #[test]
    fn test_observe_adds_outer_product() {
        let mut stats = ArmStatistics::new(2);
        stats.observe(&[1.0, 2.0], -1.0).unwrap();

        assert_eq!(stats.design()[(0, 0)], 2.0);
        assert_eq!(stats.design()[(0, 1)], 2.0);
        assert_eq!(stats.design()[(1, 0)], 2.0);
        assert_eq!(stats.design()[(1, 1)], 5.0);
        assert_eq!(stats.rewards(), &[-1.0, -2.0]);
        assert_eq!(stats.observations(), 1);
    }

    #[test]
    fn test_observe_rejects_wrong_dimension() {
        let mut stats = ArmStatistics::new(3);
        let err = stats.observe(&[1.0, 2.0], 0.0).unwrap_err();
        assert!(matches!(
            err,
            BanditError::DimensionMismatch {
                expected: 3,
                got: 2
            }
        ));
        assert_eq!(stats, ArmStatistics::new(3));
    }

    #[test]
    fn test_posterior_of_fresh_arm() {
        let stats = ArmStatistics::new(2);
        let posterior = stats.posterior().unwrap();
        assert_eq!(posterior.mean(), &[0.0, 0.0]);
        assert_abs_diff_eq!(posterior.width(&[3.0, 4.0]), 25.0, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.predict(&[3.0, 4.0]), 0.0);
    }

    #[test]
    fn test_posterior_matches_closed_form() {
        // A = I + [1 0; 0 0] = diag(2, 1), b = [3, 0]
        let mut stats = ArmStatistics::new(2);
        stats.observe(&[1.0, 0.0], 3.0).unwrap();
        let posterior = stats.posterior().unwrap();

        assert_abs_diff_eq!(posterior.mean()[0], 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.mean()[1], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.covariance()[(0, 0)], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(posterior.covariance()[(1, 1)], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_non_finite_context_is_numerical_error() {
        let mut stats = ArmStatistics::new(2);
        stats.observe(&[f64::NAN, 1.0], 1.0).unwrap();
        assert!(matches!(
            stats.posterior(),
            Err(BanditError::NumericalError { .. })
        ));
    }

    #[test]
    fn test_sample_is_reproducible_and_centered() {
        let mut stats = ArmStatistics::new(2);
        for _ in 0..50 {
            stats.observe(&[1.0, 0.5], 2.0).unwrap();
        }
        let posterior = stats.posterior().unwrap();

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let a = posterior.sample(0.01, &mut rng1).unwrap();
        let b = posterior.sample(0.01, &mut rng2).unwrap();
        assert_eq!(a, b);

        let mut rng = StdRng::seed_from_u64(11);
        let draws = 2000;
        let mut avg = [0.0; 2];
        for _ in 0..draws {
            let s = posterior.sample(0.01, &mut rng).unwrap();
            avg[0] += s[0] / draws as f64;
            avg[1] += s[1] / draws as f64;
        }
        assert_abs_diff_eq!(avg[0], posterior.mean()[0], epsilon = 0.01);
        assert_abs_diff_eq!(avg[1], posterior.mean()[1], epsilon = 0.01);
    }

    #[test]
    fn test_sample_covariance_matches_scaled_inverse() {
        // A = I + [1 1]ᵀ[1 1] = [2 1; 1 2], A⁻¹ = [2 -1; -1 2] / 3
        let mut stats = ArmStatistics::new(2);
        stats.observe(&[1.0, 1.0], 0.0).unwrap();
        let posterior = stats.posterior().unwrap();

        let scale = 4.0;
        let draws = 20_000;
        let mut rng = StdRng::seed_from_u64(3);
        let mut cov = [[0.0; 2]; 2];
        for _ in 0..draws {
            let s = posterior.sample(scale, &mut rng).unwrap();
            for i in 0..2 {
                for j in 0..2 {
                    cov[i][j] += s[i] * s[j] / draws as f64;
                }
            }
        }

        for i in 0..2 {
            for j in 0..2 {
                let expected = scale * posterior.covariance()[(i, j)];
                assert_abs_diff_eq!(cov[i][j], expected, epsilon = 0.15);
            }
        }
        assert_abs_diff_eq!(posterior.covariance()[(0, 1)], -1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sample_rejects_bad_scale() {
        let posterior = ArmStatistics::new(2).posterior().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for scale in [0.0, -1.0, f64::NAN] {
            assert!(matches!(
                posterior.sample(scale, &mut rng),
                Err(BanditError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_quadratic_form() {
        let m = Mat::from_fn(2, 2, |i, j| if i == j { 2.0 } else { 1.0 });
        // [1 2] [2 1; 1 2] [1 2]^T = 1*4 + 2*5 = 14
        assert_abs_diff_eq!(quadratic_form(&m, &[1.0, 2.0]), 14.0);
        assert_abs_diff_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }
}
