pub struct StatsHelper;

impl StatsHelper {
    /// Mean over finite samples; `None` when there are none.
    pub fn mean(samples: impl IntoIterator<Item = f64>) -> Option<f64> {
        let (sum, count) = samples
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }

    /// Fraction of samples at or above `threshold`, in `[0, 1]`.
    pub fn fraction_at_least(samples: impl IntoIterator<Item = f64>, threshold: f64) -> f64 {
        let (hits, total) = samples
            .into_iter()
            .fold((0usize, 0usize), |(hits, total), v| {
                (hits + usize::from(v >= threshold), total + 1)
            });
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
