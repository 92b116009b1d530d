// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can go wrong when driving a render.  Commands that
//! are rejected by the job's state machine leave the job untouched;
//! nothing here is ever raised from inside a worker thread.  Worker
//! failures are reported as [`WorkerFault`] diagnostics instead.

use failure::Fail;
use std::fmt;

/// The errors returned by the render job, its configuration, and the
/// framebuffer.
#[derive(Debug, Clone, PartialEq, Fail)]
pub enum RenderError {
    /// `start` was called while a render was Running or Cancelling.
    #[fail(display = "A render is already running")]
    AlreadyRunning,

    /// `request_stop` was called while the job was Idle or Done.
    #[fail(display = "No render is running")]
    NotRunning,

    /// The configuration violates one of the viewport or dimension
    /// constraints.
    #[fail(display = "Invalid render configuration: {}", reason)]
    InvalidConfig {
        /// What was wrong with it.
        reason: String,
    },

    /// A row index outside the framebuffer.
    #[fail(display = "Row {} is outside a framebuffer of height {}", row, height)]
    RowOutOfBounds {
        /// The offending row (or first row past the end of a region).
        row: u32,
        /// The framebuffer height.
        height: u32,
    },

    /// A row write whose pixel count does not match the framebuffer width.
    #[fail(display = "Row has {} pixels, framebuffer width is {}", actual, expected)]
    RowLength {
        /// The framebuffer width.
        expected: usize,
        /// The number of pixels supplied.
        actual: usize,
    },
}

impl RenderError {
    pub(crate) fn invalid<S: Into<String>>(reason: S) -> Self {
        RenderError::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// A worker that hit an unexpected fault mid-band.  The worker stops,
/// rows it already published remain valid, and it still reports
/// completion to the job.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerFault {
    /// Index of the faulting worker (and of its band).
    pub worker: usize,
    /// The row being computed or published when the fault hit.
    pub row: u32,
    /// Panic payload or error text.
    pub message: String,
}

impl fmt::Display for WorkerFault {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "worker {} faulted on row {}: {}",
            self.worker, self.row, self.message
        )
    }
}
