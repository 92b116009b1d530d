// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render job: owns the framebuffer and the band list, launches one
//! worker per band, and keeps score as they report back.
//!
//! ```text
//! Idle --start--> Running --request_stop--> Cancelling --all report--> Done
//!                    \------------------all report------------------> Done
//! Done --start--> Running ...
//! ```
//!
//! The status lives in an atomic so workers can poll it for
//! cancellation without taking a lock, and completion is counted with
//! a single `fetch_add`: whichever worker's increment lands on the
//! total is the one that flips the job to Done and fires the
//! notification, so it happens exactly once.

use log::{debug, info, warn};
use std::io;
use std::sync::atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::band::{self, Band};
use crate::config::RenderConfig;
use crate::error::{RenderError, WorkerFault};
use crate::escape::{Mandelbrot, PointEvaluator};
use crate::framebuffer::Framebuffer;
use crate::observer::{NullObserver, RenderObserver};
use crate::palette::Palette;
use crate::progress::RenderProgress;
use crate::worker::Worker;

/// Where a render job is in its lifecycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// Nothing has been rendered yet.
    Idle,
    /// Workers are computing.
    Running,
    /// A stop was requested; waiting for workers to notice.
    Cancelling,
    /// Every worker has reported.  The framebuffer holds a complete or
    /// partial image.
    Done,
}

impl Status {
    fn to_u8(self) -> u8 {
        match self {
            Status::Idle => 0,
            Status::Running => 1,
            Status::Cancelling => 2,
            Status::Done => 3,
        }
    }

    fn from_u8(raw: u8) -> Status {
        match raw {
            1 => Status::Running,
            2 => Status::Cancelling,
            3 => Status::Done,
            _ => Status::Idle,
        }
    }

    /// True for Running and Cancelling.
    pub fn is_running(self) -> bool {
        self == Status::Running || self == Status::Cancelling
    }
}

/// The part of the job that workers see.
pub(crate) struct JobState {
    status: AtomicU8,
    workers_finished: AtomicUsize,
    total_workers: AtomicUsize,
    rows_published: AtomicU32,
    total_rows: AtomicU32,
    faults: Mutex<Vec<WorkerFault>>,
    observer: Arc<dyn RenderObserver>,
}

impl JobState {
    pub(crate) fn new(observer: Arc<dyn RenderObserver>) -> JobState {
        JobState {
            status: AtomicU8::new(Status::Idle.to_u8()),
            workers_finished: AtomicUsize::new(0),
            total_workers: AtomicUsize::new(0),
            rows_published: AtomicU32::new(0),
            total_rows: AtomicU32::new(0),
            faults: Mutex::new(Vec::new()),
            observer,
        }
    }

    pub(crate) fn status(&self) -> Status {
        Status::from_u8(self.status.load(Ordering::Acquire))
    }

    // Only called from `start`, once every previous worker has reported.
    pub(crate) fn reset(&self, workers: usize, rows: u32) {
        self.workers_finished.store(0, Ordering::Relaxed);
        self.total_workers.store(workers, Ordering::Relaxed);
        self.rows_published.store(0, Ordering::Relaxed);
        self.total_rows.store(rows, Ordering::Relaxed);
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.status.store(Status::Running.to_u8(), Ordering::Release);
    }

    /// Advisory: a stale read only means one more row gets computed.
    pub(crate) fn is_cancelled(&self) -> bool {
        self.status.load(Ordering::Relaxed) == Status::Cancelling.to_u8()
    }

    fn request_stop(&self) -> Result<(), RenderError> {
        match self.status.compare_exchange(
            Status::Running.to_u8(),
            Status::Cancelling.to_u8(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => Ok(()),
            Err(current) if current == Status::Cancelling.to_u8() => Ok(()),
            Err(_) => Err(RenderError::NotRunning),
        }
    }

    pub(crate) fn row_published(&self, row: u32) {
        self.rows_published.fetch_add(1, Ordering::Relaxed);
        self.observer.rows_published(row, row);
    }

    pub(crate) fn record_fault(&self, fault: WorkerFault) {
        warn!("{}", fault);
        self.observer.worker_fault(&fault);
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fault);
    }

    /// Called exactly once per worker, however it stopped.
    pub(crate) fn worker_finished(&self, worker: usize) {
        let finished = self.workers_finished.fetch_add(1, Ordering::AcqRel) + 1;
        let total = self.total_workers.load(Ordering::Acquire);
        debug!("worker {} finished ({}/{})", worker, finished, total);
        if finished == total {
            let cancelled = self.is_cancelled();
            self.status.store(Status::Done.to_u8(), Ordering::Release);
            info!(
                "render {}: {} of {} rows published",
                if cancelled { "cancelled" } else { "complete" },
                self.rows_published.load(Ordering::Relaxed),
                self.total_rows.load(Ordering::Relaxed)
            );
            self.observer.render_finished();
        }
    }

    /// A band whose thread could not be spawned never runs, so the
    /// fault and its completion are reported here, on the caller's
    /// thread.
    pub(crate) fn launch_failed(&self, band: &Band, error: &io::Error) {
        self.record_fault(WorkerFault {
            worker: band.index,
            row: band.start_row,
            message: format!("could not spawn worker thread: {}", error),
        });
        self.worker_finished(band.index);
    }

    pub(crate) fn faults(&self) -> Vec<WorkerFault> {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn progress(&self) -> RenderProgress {
        RenderProgress {
            rows_published: self.rows_published.load(Ordering::Relaxed),
            total_rows: self.total_rows.load(Ordering::Relaxed),
            workers_finished: self.workers_finished.load(Ordering::Acquire),
            total_workers: self.total_workers.load(Ordering::Relaxed),
        }
    }
}

/// Renders a [`RenderConfig`] into a shared [`Framebuffer`] with one
/// thread per band.  `start` returns as soon as the workers are
/// launched; progress arrives through the [`RenderObserver`].
pub struct RenderJob {
    state: Arc<JobState>,
    framebuffer: Arc<Framebuffer>,
    evaluator: Arc<dyn PointEvaluator>,
    palette: Arc<Palette>,
    config: Option<RenderConfig>,
    bands: Vec<Band>,
    workers: Vec<JoinHandle<()>>,
}

impl RenderJob {
    /// An idle job that reports to `observer` and renders the
    /// Mandelbrot set.
    pub fn new(observer: Arc<dyn RenderObserver>) -> RenderJob {
        RenderJob::with_evaluator(observer, Arc::new(Mandelbrot))
    }

    /// An idle job with a custom point evaluator.
    pub fn with_evaluator(
        observer: Arc<dyn RenderObserver>,
        evaluator: Arc<dyn PointEvaluator>,
    ) -> RenderJob {
        RenderJob {
            state: Arc::new(JobState::new(observer)),
            framebuffer: Arc::new(Framebuffer::new(0, 0)),
            evaluator,
            palette: Arc::new(Palette::new()),
            config: None,
            bands: Vec::new(),
            workers: Vec::new(),
        }
    }

    /// Begin rendering `config`.  Clears the framebuffer, cuts the image
    /// into bands, and launches one worker per band.  Rejected with
    /// `AlreadyRunning`, leaving everything untouched, if a render is in
    /// progress.
    pub fn start(&mut self, config: RenderConfig) -> Result<(), RenderError> {
        if self.status().is_running() {
            warn!("start rejected: a render is already running");
            return Err(RenderError::AlreadyRunning);
        }
        config.validate()?;
        self.reap();

        self.framebuffer.resize(config.width, config.height);
        let bands = band::partition(&config);
        debug_assert!(band::covers(&bands, config.height));
        info!(
            "rendering {}x{} at {} iterations with {} workers",
            config.width, config.height, config.max_iterations, config.workers
        );
        for b in &bands {
            debug!("band {}: rows {}..={}", b.index, b.start_row, b.end_row);
        }

        self.state.reset(bands.len(), config.height);
        self.config = Some(config);
        self.bands = bands;

        for b in &self.bands {
            let worker = Worker::new(
                *b,
                Arc::clone(&self.state),
                Arc::clone(&self.framebuffer),
                Arc::clone(&self.evaluator),
                Arc::clone(&self.palette),
            );
            let spawned = thread::Builder::new()
                .name(format!("band-{}", b.index))
                .spawn(move || worker.run());
            match spawned {
                Ok(handle) => self.workers.push(handle),
                Err(e) => self.state.launch_failed(b, &e),
            }
        }
        Ok(())
    }

    /// Ask the workers to stop at their next row boundary.  Returns
    /// immediately; the job stays Cancelling until every worker has
    /// reported.  Rejected with `NotRunning` when Idle or Done.
    pub fn request_stop(&self) -> Result<(), RenderError> {
        match self.state.request_stop() {
            Ok(()) => {
                info!("stop requested");
                Ok(())
            }
            Err(e) => {
                warn!("stop rejected: no render is running");
                Err(e)
            }
        }
    }

    /// Block until every worker thread of the current render has
    /// exited, and return the final status.
    pub fn wait(&mut self) -> Status {
        self.reap();
        self.status()
    }

    // Join finished or finishing worker threads.  Workers catch their
    // own panics, so a join error should never happen.
    fn reap(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("a worker thread panicked outside its band loop");
            }
        }
    }

    /// The current status.
    pub fn status(&self) -> Status {
        self.state.status()
    }

    /// True while Running or Cancelling.
    pub fn is_running(&self) -> bool {
        self.status().is_running()
    }

    /// How far the current (or last) render got.
    pub fn progress(&self) -> RenderProgress {
        self.state.progress()
    }

    /// Faults reported by workers of the current (or last) render.
    pub fn faults(&self) -> Vec<WorkerFault> {
        self.state.faults()
    }

    /// The shared framebuffer, readable at any time.
    pub fn framebuffer(&self) -> Arc<Framebuffer> {
        Arc::clone(&self.framebuffer)
    }

    /// The bands of the current (or last) render.
    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// The configuration of the current (or last) render.
    pub fn config(&self) -> Option<&RenderConfig> {
        self.config.as_ref()
    }
}

impl Default for RenderJob {
    fn default() -> Self {
        RenderJob::new(Arc::new(NullObserver))
    }
}

/// A job dropped mid-render cancels itself and waits for its workers.
impl Drop for RenderJob {
    fn drop(&mut self) {
        let _ = self.state.request_stop();
        self.reap();
    }
}
