// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time evaluator.  A point `c` on the complex plane is
//! iterated as `z = z * z + c`, starting from `z = c`, until either
//! `|z|² >= 4` (the point has escaped, and will fly off to infinity)
//! or we run out of patience at `max_iterations`, in which case we
//! presume the point is inside the Mandelbrot set.

use num::Complex;

/// The square of the escape radius.
pub const ESCAPE_NORM_SQR: f64 = 4.0;

/// Anything that can turn a point on the complex plane into an
/// iteration count.  Workers share one evaluator across threads, so
/// implementations must be pure with respect to shared state.
pub trait PointEvaluator: Send + Sync {
    /// Returns the number of iterations `point` survived, capped at
    /// `max_iterations`.
    fn evaluate(&self, point: Complex<f64>, max_iterations: u32) -> u32;
}

/// The classic Mandelbrot escape-time iteration.
#[derive(Copy, Clone, Debug, Default)]
pub struct Mandelbrot;

impl PointEvaluator for Mandelbrot {
    #[inline]
    fn evaluate(&self, point: Complex<f64>, max_iterations: u32) -> u32 {
        escape_time(point, max_iterations)
    }
}

/// Iterate `point` until it escapes or hits `max_iterations`.  The
/// escape test happens before each step, so a point that starts
/// outside the radius reports zero.
#[inline]
pub fn escape_time(point: Complex<f64>, max_iterations: u32) -> u32 {
    let mut z = point;
    let mut count = 0;
    while count < max_iterations && z.norm_sqr() < ESCAPE_NORM_SQR {
        count += 1;
        z = z * z + point;
    }
    count
}

/// Convenience wrapper taking the real and imaginary parts separately.
pub fn evaluate(x: f64, y: f64, max_iterations: u32) -> u32 {
    escape_time(Complex::new(x, y), max_iterations)
}
