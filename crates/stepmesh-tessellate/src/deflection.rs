//! Deflection tolerances and the chord rule derived from them.

use std::f64::consts::FRAC_PI_2;

use crate::error::TessellationError;

/// Upper bound on segments for a single arc.
pub const MAX_ARC_SEGMENTS: usize = 4096;

/// How far a facet may deviate from the true surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deflection {
    /// Maximum chord-to-curve distance, in model units.
    pub linear: f64,
    /// Maximum angle between adjacent facets, in radians.
    pub angular: f64,
}

impl Default for Deflection {
    fn default() -> Self {
        Self {
            linear: 0.1,
            angular: 0.5,
        }
    }
}

impl Deflection {
    /// Create validated tolerances.
    pub fn new(linear: f64, angular: f64) -> Result<Self, TessellationError> {
        let d = Self { linear, angular };
        d.validate()?;
        Ok(d)
    }

    /// Both values must be positive and finite.
    pub fn validate(&self) -> Result<(), TessellationError> {
        let ok = |v: f64| v > 0.0 && v.is_finite();
        if ok(self.linear) && ok(self.angular) {
            Ok(())
        } else {
            Err(TessellationError::InvalidDeflection {
                linear: self.linear,
                angular: self.angular,
            })
        }
    }

    /// Largest angular step on a circle of `radius` that honours both tolerances.
    pub fn angular_step(&self, radius: f64) -> f64 {
        let mut step = self.angular.min(FRAC_PI_2);
        if radius > self.linear {
            // Sagitta of a chord spanning `step` is r(1 - cos(step / 2)).
            step = step.min(2.0 * (1.0 - self.linear / radius).acos());
        }
        step
    }
}

/// Number of segments for an arc of `span` radians on a circle of `radius`.
///
/// Always at least one; capped at [`MAX_ARC_SEGMENTS`].
pub fn arc_segments(radius: f64, span: f64, deflection: &Deflection) -> usize {
    let span = span.abs();
    if !(span > 0.0 && radius > 0.0) {
        return 1;
    }
    let n = (span / deflection.angular_step(radius)).ceil();
    if n.is_finite() {
        (n as usize).clamp(1, MAX_ARC_SEGMENTS)
    } else {
        MAX_ARC_SEGMENTS
    }
}
