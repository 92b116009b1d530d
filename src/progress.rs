// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Progress reporting for a render in flight.

/// A point-in-time view of how far a render has got.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RenderProgress {
    /// Rows published to the framebuffer so far.
    pub rows_published: u32,
    /// Rows in the image.
    pub total_rows: u32,
    /// Workers that have reported completion.
    pub workers_finished: usize,
    /// Workers launched for this render.
    pub total_workers: usize,
}

impl RenderProgress {
    /// Completion percentage by rows, 0.0 to 100.0.
    pub fn percentage(&self) -> f32 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_published as f32 / self.total_rows as f32) * 100.0
        }
    }

    /// Every worker has reported.  A cancelled render is complete
    /// without having published every row.
    pub fn is_complete(&self) -> bool {
        self.total_workers > 0 && self.workers_finished == self.total_workers
    }
}
