use std::ops::RangeInclusive;

/// Predictions handed out by the model are clamped into this range.
pub const PREDICTION_RANGE: RangeInclusive<f32> = 0.0..=5.0;

/// Squashes a raw score into the bounded rating range `[low, low + span]`.
///
/// The sigmoid is centered on the range's midpoint, so a raw score equal to the midpoint
/// maps to the midpoint rating.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingScale {
    low: f32,
    span: f32,
}

impl RatingScale {
    pub const fn new(low: f32, span: f32) -> Self {
        Self { low, span }
    }

    #[inline]
    pub fn low(&self) -> f32 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f32 {
        self.low + self.span
    }

    #[inline]
    pub fn midpoint(&self) -> f32 {
        self.low + self.span / 2.
    }

    /// `low + span * sigmoid(raw - midpoint)`
    pub fn apply(&self, raw: f32) -> f32 {
        self.low + self.span * sigmoid(raw - self.midpoint())
    }

    /// The derivative of `apply` with respect to `raw`.
    pub fn derivative(&self, raw: f32) -> f32 {
        let s = sigmoid(raw - self.midpoint());
        self.span * s * (1. - s)
    }

    /// Clamps a scaled rating into `PREDICTION_RANGE`, `None` if it's NaN.
    pub fn clamp(rating: f32) -> Option<f32> {
        if rating.is_nan() {
            return None;
        }

        Some(rating.clamp(*PREDICTION_RANGE.start(), *PREDICTION_RANGE.end()))
    }
}

impl Default for RatingScale {
    /// The one to five stars scale.
    fn default() -> Self {
        Self::new(1., 4.)
    }
}

fn sigmoid(z: f32) -> f32 {
    1. / (1. + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midpoint_maps_to_itself() {
        let scale = RatingScale::default();

        assert_eq!(scale.midpoint(), 3.);
        assert!((scale.apply(3.) - 3.).abs() < 1e-6);
        assert!((scale.derivative(3.) - 1.).abs() < 1e-6);
    }

    #[test]
    fn output_is_bounded() {
        let scale = RatingScale::default();

        for raw in [-1e30, -100., -3., 0., 2.5, 7., 100., 1e30] {
            let rating = scale.apply(raw);
            assert!((scale.low()..=scale.high()).contains(&rating), "{raw} -> {rating}");
        }

        assert_eq!(scale.apply(f32::INFINITY), 5.);
        assert_eq!(scale.apply(f32::NEG_INFINITY), 1.);
    }

    #[test]
    fn derivative_matches_finite_differences() {
        let scale = RatingScale::default();
        let h = 1e-2;

        for raw in [-1., 2., 3.5, 5.] {
            let numeric = (scale.apply(raw + h) - scale.apply(raw - h)) / (2. * h);
            assert!((numeric - scale.derivative(raw)).abs() < 1e-3);
        }
    }

    #[test]
    fn clamp_to_prediction_range() {
        assert_eq!(RatingScale::clamp(6.), Some(5.));
        assert_eq!(RatingScale::clamp(-1.), Some(0.));
        assert_eq!(RatingScale::clamp(3.25), Some(3.25));
        assert_eq!(RatingScale::clamp(f32::INFINITY), Some(5.));
        assert_eq!(RatingScale::clamp(f32::NAN), None);
    }
}
