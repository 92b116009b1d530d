#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Banded Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane for
//! which iterating `z = z * z + c` never flies off to infinity.  Paint
//! each point by how many iterations it takes to escape and you get the
//! familiar picture; the points that never escape are the black heart.
//!
//! Every pixel is independent of every other, which makes the image
//! embarrassingly parallel.  This crate cuts the image into horizontal
//! bands, one per thread, and has each thread publish its rows into a
//! shared [`Framebuffer`] as soon as they're done, so a display can
//! redraw incrementally while the render is still going.  A render can
//! be stopped at any time; workers notice at the next row boundary.
//!
//! ```no_run
//! use std::sync::Arc;
//! use bandbrot::{ChannelObserver, RenderConfig, RenderEvent, RenderJob};
//!
//! let (observer, events) = ChannelObserver::new();
//! let mut job = RenderJob::new(Arc::new(observer));
//! job.start(RenderConfig::default()).unwrap();
//! for event in events.iter() {
//!     match event {
//!         RenderEvent::RowsPublished { first, last } => { /* redraw rows */ }
//!         RenderEvent::WorkerFault(fault) => eprintln!("{}", fault),
//!         RenderEvent::Finished => break,
//!     }
//! }
//! let image = job.framebuffer().read_all();
//! ```

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate log;
extern crate num;

pub mod band;
pub mod config;
pub mod error;
pub mod escape;
pub mod framebuffer;
pub mod job;
pub mod observer;
pub mod palette;
pub mod planes;
pub mod progress;
pub mod worker;

pub use band::Band;
pub use config::{RenderConfig, Viewport};
pub use error::{RenderError, WorkerFault};
pub use escape::{evaluate, Mandelbrot, PointEvaluator};
pub use framebuffer::Framebuffer;
pub use job::{RenderJob, Status};
pub use observer::{ChannelObserver, NullObserver, RenderEvent, RenderObserver};
pub use palette::{Color, Palette};
pub use progress::RenderProgress;
