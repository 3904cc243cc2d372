//! Survival functions and the consensus curve.
//!
//! A [`SurvivalCurve`] is a knot representation of one model's predicted
//! survival function. Between knots it is linearly interpolated; outside the
//! knot range it is clamped to the first or last value. Every curve is
//! resampled onto the monthly grid `0..=36` and the resampled curves are
//! averaged point-wise into a [`ConsensusCurve`].

use thiserror::Error;

/// Prediction horizon in months (3 years).
pub const HORIZON_MONTHS: u32 = 36;

/// Number of points on the evaluation grid (months 0 through 36).
pub const GRID_POINTS: usize = HORIZON_MONTHS as usize + 1;

/// Month values of the evaluation grid.
#[must_use]
pub fn time_grid() -> [f64; GRID_POINTS] {
    std::array::from_fn(|month| month as f64)
}

/// Errors constructing a survival curve.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("survival curve has no knots")]
    Empty,

    #[error("survival curve has {times} time points but {values} survival values")]
    LengthMismatch { times: usize, values: usize },

    #[error("survival curve has a non-finite value at knot {0}")]
    NonFinite(usize),

    #[error("survival curve times must be strictly increasing (knot {0})")]
    Unordered(usize),
}

/// Survival function given as paired (time, probability) knots.
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalCurve {
    times: Vec<f64>,
    survival: Vec<f64>,
}

impl SurvivalCurve {
    /// Build a curve from knot arrays.
    ///
    /// Monotonicity of the survival values is not checked; it is a property of
    /// the model that produced them.
    ///
    /// # Errors
    /// Returns `CurveError` if the arrays are empty, of different lengths,
    /// contain non-finite values, or the times are not strictly increasing.
    pub fn new(times: Vec<f64>, survival: Vec<f64>) -> Result<Self, CurveError> {
        if times.is_empty() {
            return Err(CurveError::Empty);
        }
        if times.len() != survival.len() {
            return Err(CurveError::LengthMismatch {
                times: times.len(),
                values: survival.len(),
            });
        }
        if let Some(i) = times
            .iter()
            .zip(&survival)
            .position(|(t, s)| !t.is_finite() || !s.is_finite())
        {
            return Err(CurveError::NonFinite(i));
        }
        if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
            return Err(CurveError::Unordered(i + 1));
        }

        Ok(Self { times, survival })
    }

    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    #[must_use]
    pub fn survival(&self) -> &[f64] {
        &self.survival
    }

    /// Survival probability at `t` months.
    #[must_use]
    pub fn eval_at(&self, t: f64) -> f64 {
        let last = self.times.len() - 1;
        if t <= self.times[0] {
            return self.survival[0];
        }
        if t >= self.times[last] {
            return self.survival[last];
        }

        // First knot strictly after t; 1 <= hi <= last here.
        let hi = self.times.partition_point(|&x| x <= t);
        let lo = hi - 1;
        let (x0, x1) = (self.times[lo], self.times[hi]);
        let (y0, y1) = (self.survival[lo], self.survival[hi]);
        y0 + (y1 - y0) * (t - x0) / (x1 - x0)
    }

    /// Values of this curve on the monthly evaluation grid.
    #[must_use]
    pub fn resample(&self) -> [f64; GRID_POINTS] {
        std::array::from_fn(|month| self.eval_at(month as f64))
    }
}

/// Point-wise mean of resampled survival curves on months `0..=36`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusCurve {
    survival: [f64; GRID_POINTS],
    curve_count: usize,
}

impl ConsensusCurve {
    /// Average curves in iteration order.
    ///
    /// Returns `None` when there are no curves to average.
    pub fn mean_of<'a, I>(curves: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a SurvivalCurve>,
    {
        let mut sum = [0.0; GRID_POINTS];
        let mut curve_count = 0usize;

        for curve in curves {
            for (acc, value) in sum.iter_mut().zip(curve.resample()) {
                *acc += value;
            }
            curve_count += 1;
        }

        if curve_count == 0 {
            return None;
        }

        let n = curve_count as f64;
        Some(Self {
            survival: sum.map(|s| s / n),
            curve_count,
        })
    }

    /// Survival probabilities, index = month.
    #[must_use]
    pub fn survival(&self) -> &[f64; GRID_POINTS] {
        &self.survival
    }

    /// Number of survival functions that were averaged.
    #[must_use]
    pub fn curve_count(&self) -> usize {
        self.curve_count
    }

    #[must_use]
    pub fn at_month(&self, month: u32) -> Option<f64> {
        self.survival.get(month as usize).copied()
    }

    /// Survival probability at 36 months.
    #[must_use]
    pub fn three_year_rfs(&self) -> f64 {
        self.survival[HORIZON_MONTHS as usize]
    }

    /// Survival probability at 36 months, as a percentage.
    #[must_use]
    pub fn three_year_rfs_percent(&self) -> f64 {
        self.three_year_rfs() * 100.0
    }

    /// True if every grid value is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.survival.iter().all(|s| s.is_finite())
    }

    /// (month, probability) pairs for plotting.
    #[must_use]
    pub fn points(&self) -> Vec<(f64, f64)> {
        time_grid().into_iter().zip(self.survival).collect()
    }
}
