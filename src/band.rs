// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Bands: contiguous runs of rows, one per worker.
//!
//! The image is cut into `workers` bands of `height / workers` rows
//! each.  Whatever is left over when the height doesn't divide evenly
//! goes to the last band, so 601 rows over two workers gives bands of
//! 300 and 301 rows.

use itertools::Itertools;
use std::ops::RangeInclusive;

use crate::config::{RenderConfig, Viewport};
use crate::planes::{Pixel, PlaneMapper};
use num::Complex;

/// One worker's share of the image.  Immutable once built.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Band {
    /// Position of this band (and its worker) in the partition.
    pub index: usize,
    /// First row, inclusive.
    pub start_row: u32,
    /// Last row, inclusive.
    pub end_row: u32,
    /// Iteration cap for every pixel in the band.
    pub max_iterations: u32,
    plane: PlaneMapper,
}

impl Band {
    /// The rows this band owns, in the order they are published.
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.start_row..=self.end_row
    }

    /// Number of rows in the band, always at least one.
    pub fn row_count(&self) -> u32 {
        self.end_row - self.start_row + 1
    }

    /// Pixels per row.
    pub fn width(&self) -> u32 {
        self.plane.width
    }

    /// The region of the complex plane this band covers, from the
    /// centre of its top row to the centre of its bottom row.  A
    /// one-row band is a horizontal line with `ymin == ymax`, which
    /// `Viewport::new` would refuse, so don't feed it back in as a
    /// render config.
    pub fn viewport(&self) -> Viewport {
        self.plane.rows_slice(self.start_row, self.end_row)
    }

    /// The point sampled by `column` on image row `row`.
    #[inline]
    pub fn point(&self, column: u32, row: u32) -> Complex<f64> {
        self.plane.pixel_to_point(Pixel(column, row))
    }
}

/// Cut the image described by `config` into `config.workers` bands.
/// Expects a validated config (`1 <= workers <= height`).
pub fn partition(config: &RenderConfig) -> Vec<Band> {
    let plane = PlaneMapper::new(config.width, config.height, config.viewport);
    let workers = config.workers as u32;
    let rows_per_band = config.height / workers;
    (0..workers)
        .map(|i| {
            let start_row = i * rows_per_band;
            let end_row = if i == workers - 1 {
                config.height - 1
            } else {
                (i + 1) * rows_per_band - 1
            };
            Band {
                index: i as usize,
                start_row,
                end_row,
                max_iterations: config.max_iterations,
                plane,
            }
        })
        .collect()
}

/// True when `bands` cover `0..height` exactly once, in order.
pub fn covers(bands: &[Band], height: u32) -> bool {
    match (bands.first(), bands.last()) {
        (Some(first), Some(last)) => {
            first.start_row == 0
                && last.end_row + 1 == height
                && bands.iter().all(|b| b.start_row <= b.end_row)
                && bands
                    .iter()
                    .tuple_windows()
                    .all(|(a, b)| a.end_row + 1 == b.start_row)
        }
        _ => height == 0,
    }
}
