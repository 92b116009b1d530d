// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render parameters.  A [`RenderConfig`] is checked once, when it is
//! built, and is immutable for the lifetime of the render that uses it.

use crate::error::RenderError;

/// Default output width in pixels.
pub const DEFAULT_WIDTH: u32 = 800;
/// Default output height in pixels.
pub const DEFAULT_HEIGHT: u32 = 600;
/// Default iteration cap.
pub const DEFAULT_ITERATIONS: u32 = 10_000;
/// Default number of workers.
pub const DEFAULT_WORKERS: usize = 2;
/// Upper bound on the number of workers a single render may use.
pub const MAX_WORKERS: usize = 64;

/// The rectangle of the complex plane that is mapped onto the
/// framebuffer.  `x` runs along the real axis, `y` along the imaginary.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Left edge.
    pub xmin: f64,
    /// Right edge.
    pub xmax: f64,
    /// Bottom edge.
    pub ymin: f64,
    /// Top edge.
    pub ymax: f64,
}

impl Viewport {
    /// Constructor.  Both ranges must be finite and non-empty.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Viewport, RenderError> {
        if ![xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite()) {
            return Err(RenderError::invalid("viewport bounds must be finite"));
        }
        if xmax <= xmin {
            return Err(RenderError::invalid(format!(
                "xmax ({}) must be greater than xmin ({})",
                xmax, xmin
            )));
        }
        if ymax <= ymin {
            return Err(RenderError::invalid(format!(
                "ymax ({}) must be greater than ymin ({})",
                ymax, ymin
            )));
        }
        Ok(Viewport {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// A window deep in the seahorse valley near `-1.6744 + 0.00004716i`,
    /// about 3e-13 across.  Takes a good while at ten thousand
    /// iterations, which makes it a nice workload for watching bands
    /// fill in.
    pub fn deep_zoom() -> Viewport {
        Viewport {
            xmin: -1.674_409_674_093_473,
            xmax: -1.674_409_674_093_185_8,
            ymin: 4.716_540_768_697_223e-5,
            ymax: 4.716_540_790_246_652e-5,
        }
    }

    /// Width on the real axis.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height on the imaginary axis.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// The whole Mandelbrot set with a little margin.
impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            xmin: -2.5,
            xmax: 1.0,
            ymin: -1.25,
            ymax: 1.25,
        }
    }
}

/// Everything a render needs to know.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// The region of the plane being rendered.
    pub viewport: Viewport,
    /// Iteration cap; points that reach it are treated as in the set.
    pub max_iterations: u32,
    /// Number of bands, and therefore worker threads.
    pub workers: usize,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
}

impl RenderConfig {
    /// Constructor; fails if the dimensions, iteration cap, or worker
    /// count are out of range.
    pub fn new(
        viewport: Viewport,
        max_iterations: u32,
        workers: usize,
        width: u32,
        height: u32,
    ) -> Result<RenderConfig, RenderError> {
        let config = RenderConfig {
            viewport,
            max_iterations,
            workers,
            width,
            height,
        };
        config.validate()?;
        Ok(config)
    }

    /// Re-check the invariants.  The fields are public, so the job
    /// validates again before it starts.
    pub fn validate(&self) -> Result<(), RenderError> {
        let v = &self.viewport;
        Viewport::new(v.xmin, v.xmax, v.ymin, v.ymax)?;
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::invalid(format!(
                "image must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_iterations == 0 {
            return Err(RenderError::invalid("iteration cap must be at least 1"));
        }
        let limit = MAX_WORKERS.min(self.height as usize);
        if self.workers == 0 || self.workers > limit {
            return Err(RenderError::invalid(format!(
                "worker count must be between 1 and {}, got {}",
                limit, self.workers
            )));
        }
        Ok(())
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            viewport: Viewport::deep_zoom(),
            max_iterations: DEFAULT_ITERATIONS,
            workers: DEFAULT_WORKERS,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}
