// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A worker renders one band, top row first.  Each row is computed
//! into a private buffer, then, unless a stop has been requested in
//! the meantime, copied into the framebuffer in one locked write.  A
//! cancelled worker therefore abandons at most the row it was working
//! on, and never leaves a half-written row behind.
//!
//! However the band loop ends (finished, cancelled, an error, or a
//! panic), the worker reports to the job exactly once on its way out.

use log::{debug, trace};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::band::Band;
use crate::error::WorkerFault;
use crate::escape::PointEvaluator;
use crate::framebuffer::Framebuffer;
use crate::job::JobState;
use crate::palette::{Color, Palette};

/// Compute the colors of row `row` of `band` into `pixels`, replacing
/// whatever was there.  Touches nothing shared.
pub fn render_row(
    band: &Band,
    row: u32,
    evaluator: &dyn PointEvaluator,
    palette: &Palette,
    pixels: &mut Vec<Color>,
) {
    pixels.clear();
    pixels.extend((0..band.width()).map(|column| {
        let count = evaluator.evaluate(band.point(column, row), band.max_iterations);
        palette.color_for(count, band.max_iterations)
    }));
}

#[derive(Debug, PartialEq)]
enum Outcome {
    Completed,
    Cancelled(u32),
}

// Reports completion when dropped, which covers unwinding too.
struct Finisher<'a> {
    state: &'a JobState,
    worker: usize,
}

impl<'a> Drop for Finisher<'a> {
    fn drop(&mut self) {
        self.state.worker_finished(self.worker);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

pub(crate) struct Worker {
    band: Band,
    state: Arc<JobState>,
    framebuffer: Arc<Framebuffer>,
    evaluator: Arc<dyn PointEvaluator>,
    palette: Arc<Palette>,
}

impl Worker {
    pub(crate) fn new(
        band: Band,
        state: Arc<JobState>,
        framebuffer: Arc<Framebuffer>,
        evaluator: Arc<dyn PointEvaluator>,
        palette: Arc<Palette>,
    ) -> Worker {
        Worker {
            band,
            state,
            framebuffer,
            evaluator,
            palette,
        }
    }

    pub(crate) fn run(self) {
        let _finisher = Finisher {
            state: &self.state,
            worker: self.band.index,
        };
        debug!(
            "worker {} rendering rows {}..={}",
            self.band.index, self.band.start_row, self.band.end_row
        );

        let mut current = self.band.start_row;
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.render_band(&mut current)));
        match outcome {
            Ok(Ok(Outcome::Completed)) => {
                debug!("worker {} completed its band", self.band.index);
            }
            Ok(Ok(Outcome::Cancelled(row))) => {
                debug!("worker {} cancelled before row {}", self.band.index, row);
            }
            Ok(Err(fault)) => self.state.record_fault(fault),
            Err(payload) => self.state.record_fault(WorkerFault {
                worker: self.band.index,
                row: current,
                message: panic_message(&*payload),
            }),
        }
    }

    fn render_band(&self, current: &mut u32) -> Result<Outcome, WorkerFault> {
        let mut pixels = Vec::with_capacity(self.band.width() as usize);
        for row in self.band.rows() {
            *current = row;
            render_row(&self.band, row, &*self.evaluator, &self.palette, &mut pixels);
            if self.state.is_cancelled() {
                return Ok(Outcome::Cancelled(row));
            }
            self.framebuffer
                .write_row(row, &pixels)
                .map_err(|e| WorkerFault {
                    worker: self.band.index,
                    row,
                    message: e.to_string(),
                })?;
            trace!("worker {} published row {}", self.band.index, row);
            self.state.row_published(row);
        }
        Ok(Outcome::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::partition;
    use crate::config::{RenderConfig, Viewport};
    use crate::escape::{evaluate, Mandelbrot};
    use crate::job::Status;
    use crate::observer::{ChannelObserver, RenderEvent};
    use crate::palette::IN_SET;

    #[test]
    fn rows_match_direct_evaluation() {
        let config = RenderConfig::new(Viewport::default(), 200, 1, 40, 30).unwrap();
        let band = partition(&config)[0];
        let palette = Palette::new();
        let mut pixels = Vec::new();
        for &row in [0, 7, 15, 29].iter() {
            render_row(&band, row, &Mandelbrot, &palette, &mut pixels);
            assert_eq!(pixels.len(), 40);
            for (column, color) in pixels.iter().enumerate() {
                let c = band.point(column as u32, row);
                let expected = palette.color_for(evaluate(c.re, c.im, 200), 200);
                assert_eq!(*color, expected);
            }
        }
    }

    #[test]
    fn the_origin_is_painted_black() {
        let viewport = Viewport::new(-2.0, 2.0, -1.0, 1.0).unwrap();
        let config = RenderConfig::new(viewport, 100, 1, 3, 3).unwrap();
        let band = partition(&config)[0];
        let mut pixels = Vec::new();
        render_row(&band, 1, &Mandelbrot, &Palette::new(), &mut pixels);
        assert_eq!(pixels[1], IN_SET);
        assert_ne!(pixels[2], IN_SET);
    }

    #[test]
    fn panic_messages_are_recovered() {
        let payload = panic::catch_unwind(|| panic!("static message")).unwrap_err();
        assert_eq!(panic_message(&*payload), "static message");
        let payload = panic::catch_unwind(|| panic!("row {}", 12)).unwrap_err();
        assert_eq!(panic_message(&*payload), "row 12");
    }

    #[test]
    fn a_rejected_write_faults_the_worker() {
        let (observer, events) = ChannelObserver::new();
        let state = Arc::new(JobState::new(Arc::new(observer)));
        let config = RenderConfig::new(Viewport::default(), 20, 1, 4, 6).unwrap();
        let band = partition(&config)[0];
        state.reset(1, config.height);
        // Two rows short of the band.
        let framebuffer = Arc::new(Framebuffer::new(4, 2));

        Worker::new(
            band,
            Arc::clone(&state),
            Arc::clone(&framebuffer),
            Arc::new(Mandelbrot),
            Arc::new(Palette::new()),
        )
        .run();

        assert_eq!(state.status(), Status::Done);
        let faults = state.faults();
        assert_eq!(faults.len(), 1);
        assert_eq!(faults[0].worker, 0);
        assert_eq!(faults[0].row, 2);
        assert!(faults[0].message.contains("Row 2 is outside"), "{}", faults[0]);
        assert_eq!(state.progress().rows_published, 2);
        assert_eq!(state.progress().workers_finished, 1);

        let events: Vec<RenderEvent> = events.try_iter().collect();
        assert_eq!(
            events,
            vec![
                RenderEvent::RowsPublished { first: 0, last: 0 },
                RenderEvent::RowsPublished { first: 1, last: 1 },
                RenderEvent::WorkerFault(faults[0].clone()),
                RenderEvent::Finished,
            ]
        );
    }
}
