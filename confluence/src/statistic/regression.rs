use crate::statistic::algorithm::welford_online;
use serde::{Deserialize, Serialize};

/// Ordinary least-squares fit of `y = intercept + slope * x`.
///
/// Computed in one pass over the paired samples using Welford Online means and co-moments,
/// which stays numerically stable for small period returns.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default, Deserialize, Serialize)]
pub struct Regression {
    pub count: usize,
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Pearson correlation coefficient of `x` and `y`.
    pub correlation: f64,
}

impl Regression {
    /// Fits `y` on `x`, pairing samples by position. Extra samples of the longer input are
    /// ignored.
    ///
    /// Degenerate inputs follow these conventions:
    /// - constant `x`: slope `0.0`, intercept at the mean of `y`.
    /// - constant `x` and `y`: `r_squared` and `correlation` of `1.0` (perfect fit).
    /// - otherwise constant `x` or `y`: `r_squared` and `correlation` of `0.0`.
    pub fn ols(x: &[f64], y: &[f64]) -> Self {
        let mut count = 0.0;
        let (mut mean_x, mut mean_y) = (0.0, 0.0);
        let (mut m_x, mut m_y, mut c_xy) = (0.0, 0.0, 0.0);

        for (next_x, next_y) in x.iter().copied().zip(y.iter().copied()) {
            count += 1.0;

            let prev_mean_x = mean_x;
            let prev_mean_y = mean_y;
            mean_x = welford_online::calculate_mean(mean_x, next_x, count);
            mean_y = welford_online::calculate_mean(mean_y, next_y, count);

            m_x = welford_online::calculate_recurrence_relation_m(m_x, prev_mean_x, next_x, mean_x);
            m_y = welford_online::calculate_recurrence_relation_m(m_y, prev_mean_y, next_y, mean_y);
            c_xy = welford_online::calculate_co_moment(c_xy, prev_mean_x, next_x, mean_y, next_y);
        }

        let slope = if m_x == 0.0 { 0.0 } else { c_xy / m_x };

        let (r_squared, correlation) = match (m_x == 0.0, m_y == 0.0) {
            (true, true) => (1.0, 1.0),
            (true, false) | (false, true) => (0.0, 0.0),
            (false, false) => {
                let r_squared = (c_xy * c_xy / (m_x * m_y)).min(1.0);
                (r_squared, r_squared.sqrt().copysign(c_xy))
            }
        };

        Self {
            count: count as usize,
            slope,
            intercept: mean_y - slope * mean_x,
            r_squared,
            correlation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ols() {
        struct TestCase {
            x: Vec<f64>,
            y: Vec<f64>,
            expected: Regression,
        }

        let cases = vec![
            // TC0: perfect positive fit y = 1 + 2x
            TestCase {
                x: vec![0.0, 1.0, 2.0, 3.0],
                y: vec![1.0, 3.0, 5.0, 7.0],
                expected: Regression {
                    count: 4,
                    slope: 2.0,
                    intercept: 1.0,
                    r_squared: 1.0,
                    correlation: 1.0,
                },
            },
            // TC1: perfect negative fit y = -x
            TestCase {
                x: vec![1.0, 2.0, 3.0],
                y: vec![-1.0, -2.0, -3.0],
                expected: Regression {
                    count: 3,
                    slope: -1.0,
                    intercept: 0.0,
                    r_squared: 1.0,
                    correlation: -1.0,
                },
            },
            // TC2: x = [1,2,3], y = [2,4,9]
            // Sxx = 2, Syy = 26, Sxy = 7 => slope 3.5, intercept -2, r^2 = 49 / 52
            TestCase {
                x: vec![1.0, 2.0, 3.0],
                y: vec![2.0, 4.0, 9.0],
                expected: Regression {
                    count: 3,
                    slope: 3.5,
                    intercept: -2.0,
                    r_squared: 49.0 / 52.0,
                    correlation: 7.0 / 52.0_f64.sqrt(),
                },
            },
            // TC3: constant x
            TestCase {
                x: vec![1.0, 1.0, 1.0],
                y: vec![1.0, 2.0, 3.0],
                expected: Regression {
                    count: 3,
                    slope: 0.0,
                    intercept: 2.0,
                    r_squared: 0.0,
                    correlation: 0.0,
                },
            },
            // TC4: constant x and y
            TestCase {
                x: vec![0.0, 0.0],
                y: vec![0.0, 0.0],
                expected: Regression {
                    count: 2,
                    slope: 0.0,
                    intercept: 0.0,
                    r_squared: 1.0,
                    correlation: 1.0,
                },
            },
        ];

        for (index, test) in cases.into_iter().enumerate() {
            let actual = Regression::ols(&test.x, &test.y);
            assert_eq!(actual.count, test.expected.count, "TC{index} failed");
            assert_relative_eq!(actual.slope, test.expected.slope, epsilon = 1e-9);
            assert_relative_eq!(actual.intercept, test.expected.intercept, epsilon = 1e-9);
            assert_relative_eq!(actual.r_squared, test.expected.r_squared, epsilon = 1e-9);
            assert_relative_eq!(actual.correlation, test.expected.correlation, epsilon = 1e-9);
        }
    }
}
