// src/curve.rs
//! Response and decay curves over the unit domain.
//!
//! ```toml
//! [arm_swing.curve]
//! type = "keyframes"
//! points = [[0.0, 0.0], [0.5, 0.3], [1.0, 1.0]]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum CurveError {
    #[error("curve needs at least two keyframes, got {0}")]
    TooFewKeyframes(usize),
    #[error("keyframe ({0}, {1}) lies outside the unit square")]
    OutOfUnitRange(f32, f32),
    #[error("keyframe x values must be strictly increasing")]
    UnorderedKeyframes,
    #[error("curve must be non-decreasing")]
    Decreasing,
    #[error("power exponent must be positive, got {0}")]
    BadExponent(f32),
    #[error("decay curve must not increase: start {start} < end {end}")]
    IncreasingDecay { start: f32, end: f32 },
}

/// Maps normalized controller speed to normalized movement speed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseCurve {
    #[default]
    Linear,
    Power { exponent: f32 },
    Keyframes { points: Vec<[f32; 2]> },
}

impl ResponseCurve {
    pub fn power(exponent: f32) -> Result<Self, CurveError> {
        let curve = ResponseCurve::Power { exponent };
        curve.validate()?;
        Ok(curve)
    }

    pub fn keyframes(points: Vec<[f32; 2]>) -> Result<Self, CurveError> {
        let curve = ResponseCurve::Keyframes { points };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        match self {
            ResponseCurve::Linear => Ok(()),
            ResponseCurve::Power { exponent } => {
                if *exponent > 0.0 && exponent.is_finite() {
                    Ok(())
                } else {
                    Err(CurveError::BadExponent(*exponent))
                }
            }
            ResponseCurve::Keyframes { points } => {
                if points.len() < 2 {
                    return Err(CurveError::TooFewKeyframes(points.len()));
                }
                for &[x, y] in points {
                    if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
                        return Err(CurveError::OutOfUnitRange(x, y));
                    }
                }
                for pair in points.windows(2) {
                    if pair[1][0] <= pair[0][0] {
                        return Err(CurveError::UnorderedKeyframes);
                    }
                    if pair[1][1] < pair[0][1] {
                        return Err(CurveError::Decreasing);
                    }
                }
                Ok(())
            }
        }
    }

    /// Evaluate at `x`, clamped to [0, 1].
    pub fn evaluate(&self, x: f32) -> f32 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        match self {
            ResponseCurve::Linear => x,
            ResponseCurve::Power { exponent } => x.powf(*exponent),
            ResponseCurve::Keyframes { points } => {
                let (first, last) = match (points.first(), points.last()) {
                    (Some(first), Some(last)) => (first, last),
                    _ => return x,
                };
                if x <= first[0] {
                    return first[1];
                }
                if x >= last[0] {
                    return last[1];
                }
                for pair in points.windows(2) {
                    let [x0, y0] = pair[0];
                    let [x1, y1] = pair[1];
                    if x <= x1 {
                        let t = (x - x0) / (x1 - x0);
                        return y0 + (y1 - y0) * t;
                    }
                }
                last[1]
            }
        }
    }
}

/// Two-point linear curve over [0, 1]. Inertia decay only supports this shape.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LinearCurve {
    start: f32,
    end: f32,
}

impl LinearCurve {
    /// Full decay from 1 to 0.
    pub const DECAY: LinearCurve = LinearCurve { start: 1.0, end: 0.0 };

    pub fn new(start: f32, end: f32) -> Result<Self, CurveError> {
        if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) {
            return Err(CurveError::OutOfUnitRange(start, end));
        }
        if end > start {
            return Err(CurveError::IncreasingDecay { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> f32 {
        self.start
    }

    pub fn end(&self) -> f32 {
        self.end
    }

    pub fn evaluate(&self, x: f32) -> f32 {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        self.start + (self.end - self.start) * x
    }
}

impl Default for LinearCurve {
    fn default() -> Self {
        Self::DECAY
    }
}
