/// Grouping of [Welford Online](https://en.wikipedia.org/wiki/Algorithms_for_calculating_variance#Welford's_online_algorithm)
/// algorithms for calculating running values such as mean and variance in one pass through.
pub mod welford_online {
    /// Calculates the next mean.
    pub fn calculate_mean<T>(mut prev_mean: T, next_value: T, count: T) -> T
    where
        T: Copy + std::ops::Sub<Output = T> + std::ops::Div<Output = T> + std::ops::AddAssign,
    {
        prev_mean += (next_value - prev_mean) / count;
        prev_mean
    }

    /// Calculates the next Welford Online recurrence relation M.
    pub fn calculate_recurrence_relation_m(
        prev_m: f64,
        prev_mean: f64,
        new_value: f64,
        new_mean: f64,
    ) -> f64 {
        prev_m + ((new_value - prev_mean) * (new_value - new_mean))
    }

    /// Calculates the next Welford Online co-moment C of two paired datasets.
    ///
    /// Uses the previous mean of `x` and the updated mean of `y`, after which
    /// `co_moment / count` is the population covariance.
    pub fn calculate_co_moment(
        prev_co_moment: f64,
        prev_mean_x: f64,
        new_value_x: f64,
        new_mean_y: f64,
        new_value_y: f64,
    ) -> f64 {
        prev_co_moment + ((new_value_x - prev_mean_x) * (new_value_y - new_mean_y))
    }
}
