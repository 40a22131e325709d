//! Logicle (biexponential) scale after Parks, Roederer and Moore (2006).
//!
//! The scale maps raw data onto `[0, 1]` such that `0` lands at `x1`, the
//! region around zero is nearly linear and both tails become logarithmic.
//! The forward direction has no closed form and is solved with Halley's
//! method; near zero a Taylor series replaces the exponential form to avoid
//! catastrophic cancellation.

use log::debug;
use serde::{Deserialize, Serialize};

use super::TransformError;

const TAYLOR_LENGTH: usize = 16;
const SOLVE_ITERATIONS: usize = 20;
const SCALE_ITERATIONS: usize = 10;

/// Parameters of a Logicle scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicleParams {
    /// Top of scale data value
    pub t: f64,
    /// Width of the linearisation region, in decades
    pub w: f64,
    /// Total display width, in decades
    pub m: f64,
    /// Additional negative decades
    pub a: f64,
}

impl Default for LogicleParams {
    fn default() -> Self {
        Self {
            t: 262_144.0,
            w: 0.5,
            m: 4.5,
            a: 0.0,
        }
    }
}

/// A solved Logicle scale
#[derive(Debug, Clone, PartialEq)]
pub struct Logicle {
    params: LogicleParams,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    f: f64,
    x1: f64,
    x_taylor: f64,
    taylor: [f64; TAYLOR_LENGTH],
}

impl Logicle {
    /// Validate the parameters and solve the scale constants
    pub fn new(params: LogicleParams) -> Result<Self, TransformError> {
        let LogicleParams { t, w, m, a } = params;
        if !(t.is_finite() && t > 0.0) {
            return Err(TransformError::InvalidParameter(format!("T must be > 0, got {t}")));
        }
        if !(m.is_finite() && m > 0.0) {
            return Err(TransformError::InvalidParameter(format!("M must be > 0, got {m}")));
        }
        if !(w.is_finite() && w >= 0.0) {
            return Err(TransformError::InvalidParameter(format!("W must be >= 0, got {w}")));
        }
        if 2.0 * w > m {
            return Err(TransformError::InvalidParameter(format!(
                "W is too large: 2W ({}) exceeds M ({m})",
                2.0 * w
            )));
        }
        if !a.is_finite() || -a > w || a + w > m - w {
            return Err(TransformError::InvalidParameter(format!("A is out of range: {a}")));
        }

        let width = w / (m + a);
        let x2 = a / (m + a);
        let x1 = x2 + width;
        let x0 = x2 + 2.0 * width;
        let b = (m + a) * std::f64::consts::LN_10;
        let d = solve(b, width)?;

        let c_a = (x0 * (b + d)).exp();
        let mf_a = (b * x1).exp() - c_a / (d * x1).exp();
        let scale_a = t / ((b.exp() - mf_a) - c_a / d.exp());
        let c = c_a * scale_a;
        let f = -mf_a * scale_a;

        let x_taylor = x1 + width / 4.0;
        let mut pos_coef = scale_a * (b * x1).exp();
        let mut neg_coef = -c / (d * x1).exp();
        let mut taylor = [0.0; TAYLOR_LENGTH];
        for (i, term) in taylor.iter_mut().enumerate() {
            pos_coef *= b / (i as f64 + 1.0);
            neg_coef *= -d / (i as f64 + 1.0);
            *term = pos_coef + neg_coef;
        }
        // exact by construction of the Logicle condition
        taylor[1] = 0.0;

        Ok(Self {
            params,
            a: scale_a,
            b,
            c,
            d,
            f,
            x1,
            x_taylor,
            taylor,
        })
    }

    /// Parameters this scale was built from
    pub fn params(&self) -> LogicleParams {
        self.params
    }

    /// Scale position of raw zero
    pub fn zero_point(&self) -> f64 {
        self.x1
    }

    /// Map a raw value onto the `[0, 1]` scale (values beyond `T` exceed 1)
    pub fn scale(&self, value: f64) -> f64 {
        if value.is_nan() {
            return f64::NAN;
        }
        if value == 0.0 {
            return self.x1;
        }
        let negative = value < 0.0;
        let value = value.abs();

        let (x, converged) = self.halley(value);
        if !converged {
            debug!(
                "Logicle scale of {} did not converge after {} iterations ({:?})",
                if negative { -value } else { value },
                SCALE_ITERATIONS,
                self.params()
            );
        }

        if negative {
            2.0 * self.x1 - x
        } else {
            x
        }
    }

    /// Scale position of a non-negative value, and whether Halley's method met
    /// its tolerance within `SCALE_ITERATIONS`
    fn halley(&self, value: f64) -> (f64, bool) {
        let mut x = if value < self.f {
            self.x1 + value / self.taylor[0]
        } else {
            (value / self.a).ln() / self.b
        };

        let tolerance = 3.0 * f64::EPSILON;
        for _ in 0..SCALE_ITERATIONS {
            let ae2bx = self.a * (self.b * x).exp();
            let ce2mdx = self.c / (self.d * x).exp();
            let y = if x < self.x_taylor {
                self.series_biexponential(x) - value
            } else {
                (ae2bx + self.f) - (ce2mdx + value)
            };
            let abe2bx = self.b * ae2bx;
            let cde2mdx = self.d * ce2mdx;
            let dy = abe2bx + cde2mdx;
            let ddy = self.b * abe2bx - self.d * cde2mdx;

            let delta = y / (dy * (1.0 - y * ddy / (2.0 * dy * dy)));
            x -= delta;
            if delta.abs() < tolerance {
                return (x, true);
            }
        }
        (x, false)
    }

    /// Map a scale position back to the raw value
    pub fn inverse(&self, scale: f64) -> f64 {
        let negative = scale < self.x1;
        let scale = if negative { 2.0 * self.x1 - scale } else { scale };

        let inverse = if scale < self.x_taylor {
            self.series_biexponential(scale)
        } else {
            (self.a * (self.b * scale).exp() + self.f) - self.c / (self.d * scale).exp()
        };

        if negative {
            -inverse
        } else {
            inverse
        }
    }

    fn series_biexponential(&self, scale: f64) -> f64 {
        let x = scale - self.x1;
        let mut sum = self.taylor[TAYLOR_LENGTH - 1] * x;
        for i in (2..TAYLOR_LENGTH - 1).rev() {
            sum = (sum + self.taylor[i]) * x;
        }
        (sum * x + self.taylor[0]) * x
    }
}

/// Solve `2 ln(d) + w d = 2 ln(b) - w b` for `d` with a safeguarded Newton search.
fn solve(b: f64, w: f64) -> Result<f64, TransformError> {
    if w == 0.0 {
        return Ok(b);
    }

    let tolerance = 2.0 * b * f64::EPSILON;
    let mut d_lo = 0.0;
    let mut d_hi = b;

    let mut d = (d_lo + d_hi) / 2.0;
    let mut last_delta = d_hi - d_lo;
    let f_b = -2.0 * b.ln() + w * b;
    let mut f = 2.0 * d.ln() + w * d + f_b;
    let mut last_f = f64::NAN;

    for _ in 0..SOLVE_ITERATIONS {
        let df = 2.0 / d + w;
        let delta;
        if ((d - d_hi) * df - f) * ((d - d_lo) * df - f) >= 0.0
            || (1.9 * f).abs() > (last_delta * df).abs()
        {
            // bisect when Newton would leave the bracket or converge too slowly
            delta = (d_hi - d_lo) / 2.0;
            d = d_lo + delta;
            if d == d_lo {
                return Ok(d);
            }
        } else {
            delta = f / df;
            let previous = d;
            d -= delta;
            if d == previous {
                return Ok(d);
            }
        }

        if delta.abs() < tolerance {
            return Ok(d);
        }
        last_delta = delta;

        f = 2.0 * d.ln() + w * d + f_b;
        if f == 0.0 || f == last_f {
            return Ok(d);
        }
        last_f = f;

        if f < 0.0 {
            d_lo = d;
        } else {
            d_hi = d;
        }
    }

    Err(TransformError::DidNotConverge { width: w })
}
