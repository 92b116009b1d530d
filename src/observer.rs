// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! How a render talks back to whoever is displaying it.  Methods are
//! normally called from worker threads.  The exception is a band whose
//! thread could not be spawned: `RenderJob::start` reports that band's
//! fault, and its completion (possibly the final `render_finished`), on
//! the calling thread before it returns.  Implementations must be cheap
//! and must not block on, or call back into, the render job.

use crossbeam::channel::{self, Receiver, Sender};

use crate::error::WorkerFault;

/// Receives notifications as a render progresses.
pub trait RenderObserver: Send + Sync {
    /// Rows `first..=last` have been published to the framebuffer and
    /// can be redrawn.
    fn rows_published(&self, _first: u32, _last: u32) {}

    /// A worker faulted and gave up on the rest of its band.
    fn worker_fault(&self, _fault: &WorkerFault) {}

    /// Every worker has reported in and the job is Done.  Fired exactly
    /// once per render.
    fn render_finished(&self) {}
}

/// Ignores everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NullObserver;

impl RenderObserver for NullObserver {}

/// A notification, as delivered by [`ChannelObserver`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    /// Rows `first..=last` are ready.
    RowsPublished {
        /// First dirty row.
        first: u32,
        /// Last dirty row, inclusive.
        last: u32,
    },
    /// A worker faulted.
    WorkerFault(WorkerFault),
    /// The render is Done.
    Finished,
}

/// Forwards every notification down a channel, for a UI loop that
/// would rather poll than be called back.
#[derive(Clone, Debug)]
pub struct ChannelObserver {
    sender: Sender<RenderEvent>,
}

impl ChannelObserver {
    /// An observer and the receiving end of its channel.
    pub fn new() -> (ChannelObserver, Receiver<RenderEvent>) {
        let (sender, receiver) = channel::unbounded();
        (ChannelObserver { sender }, receiver)
    }

    // A dropped receiver just means nobody is watching any more.
    fn send(&self, event: RenderEvent) {
        let _ = self.sender.send(event);
    }
}

impl RenderObserver for ChannelObserver {
    fn rows_published(&self, first: u32, last: u32) {
        self.send(RenderEvent::RowsPublished { first, last });
    }

    fn worker_fault(&self, fault: &WorkerFault) {
        self.send(RenderEvent::WorkerFault(fault.clone()));
    }

    fn render_finished(&self) {
        self.send(RenderEvent::Finished);
    }
}
