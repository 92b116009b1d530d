// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The shared pixel grid.  Workers publish whole rows into it and the
//! display reads it back at any time, including mid-render.
//!
//! A single lock guards the whole image.  Computing a row costs
//! thousands of iterations per pixel, copying it in costs a few
//! microseconds, so contention on the lock is negligible, and holding
//! it for the full row write is what guarantees a reader never sees a
//! row half old and half new.
//!
//! Only the render job resizes the buffer or writes rows into it.  The
//! handle a display gets from [`RenderJob::framebuffer`] can only read:
//!
//! ```compile_fail
//! let job = bandbrot::RenderJob::default();
//! job.framebuffer().resize(3, 1);
//! ```
//!
//! ```compile_fail
//! let job = bandbrot::RenderJob::default();
//! let row = vec![bandbrot::framebuffer::BACKGROUND; 0];
//! let _ = job.framebuffer().write_row(0, &row);
//! ```
//!
//! [`RenderJob::framebuffer`]: ../job/struct.RenderJob.html#method.framebuffer

use image::{imageops, ImageBuffer, RgbaImage};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::RenderError;
use crate::palette::Color;

/// The color the buffer is cleared to before a render.
pub const BACKGROUND: Color = image::Rgba([192, 192, 192, 255]);

/// A lock-guarded RGBA image.
#[derive(Debug)]
pub struct Framebuffer {
    image: Mutex<RgbaImage>,
}

impl Framebuffer {
    /// A buffer of the given size, filled with the background color.
    pub(crate) fn new(width: u32, height: u32) -> Framebuffer {
        Framebuffer {
            image: Mutex::new(ImageBuffer::from_pixel(width, height, BACKGROUND)),
        }
    }

    // Rows are only ever replaced whole while the lock is held, so a
    // panic elsewhere cannot leave a torn row behind; recover the guard.
    fn lock(&self) -> MutexGuard<RgbaImage> {
        self.image.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        self.lock().dimensions()
    }

    /// Reallocate to `width x height` and clear to the background.
    /// Previous contents are discarded.
    pub(crate) fn resize(&self, width: u32, height: u32) {
        *self.lock() = ImageBuffer::from_pixel(width, height, BACKGROUND);
    }

    /// Replace row `row` with `pixels`, atomically with respect to
    /// every reader.
    pub(crate) fn write_row(&self, row: u32, pixels: &[Color]) -> Result<(), RenderError> {
        let mut image = self.lock();
        let (width, height) = image.dimensions();
        if row >= height {
            return Err(RenderError::RowOutOfBounds { row, height });
        }
        if pixels.len() != width as usize {
            return Err(RenderError::RowLength {
                expected: width as usize,
                actual: pixels.len(),
            });
        }
        for (x, color) in pixels.iter().enumerate() {
            image.put_pixel(x as u32, row, *color);
        }
        Ok(())
    }

    /// A snapshot of the whole image.
    pub fn read_all(&self) -> RgbaImage {
        self.lock().clone()
    }

    /// A snapshot of `row_count` rows starting at `row_start`.
    pub fn read_region(&self, row_start: u32, row_count: u32) -> Result<RgbaImage, RenderError> {
        let image = self.lock();
        let (width, height) = image.dimensions();
        let end = row_start.checked_add(row_count).unwrap_or(u32::max_value());
        if end > height {
            return Err(RenderError::RowOutOfBounds { row: end - 1, height });
        }
        Ok(imageops::crop_imm(&*image, 0, row_start, width, row_count).to_image())
    }

    /// A copy of a single row.
    pub fn read_row(&self, row: u32) -> Result<Vec<Color>, RenderError> {
        let image = self.lock();
        let (width, height) = image.dimensions();
        if row >= height {
            return Err(RenderError::RowOutOfBounds { row, height });
        }
        Ok((0..width).map(|x| *image.get_pixel(x, row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use std::sync::Arc;
    use std::thread;

    const RED: Color = Rgba([255, 0, 0, 255]);

    #[test]
    fn new_buffers_are_background() {
        let fb = Framebuffer::new(4, 3);
        assert_eq!(fb.dimensions(), (4, 3));
        assert!(fb.read_all().pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn write_row_replaces_exactly_one_row() {
        let fb = Framebuffer::new(3, 3);
        fb.write_row(1, &[RED; 3]).unwrap();
        assert_eq!(fb.read_row(0).unwrap(), vec![BACKGROUND; 3]);
        assert_eq!(fb.read_row(1).unwrap(), vec![RED; 3]);
        assert_eq!(fb.read_row(2).unwrap(), vec![BACKGROUND; 3]);
    }

    #[test]
    fn write_row_rejects_bad_rows() {
        let fb = Framebuffer::new(3, 2);
        assert_eq!(
            fb.write_row(2, &[RED; 3]),
            Err(RenderError::RowOutOfBounds { row: 2, height: 2 })
        );
        assert_eq!(
            fb.write_row(0, &[RED; 2]),
            Err(RenderError::RowLength {
                expected: 3,
                actual: 2
            })
        );
        assert!(fb.read_all().pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn resize_clears_previous_contents() {
        let fb = Framebuffer::new(2, 2);
        fb.write_row(0, &[RED; 2]).unwrap();
        fb.resize(5, 4);
        assert_eq!(fb.dimensions(), (5, 4));
        assert!(fb.read_all().pixels().all(|p| *p == BACKGROUND));
    }

    #[test]
    fn read_region_returns_requested_rows() {
        let fb = Framebuffer::new(2, 4);
        fb.write_row(2, &[RED; 2]).unwrap();
        let region = fb.read_region(1, 2).unwrap();
        assert_eq!(region.dimensions(), (2, 2));
        assert_eq!(*region.get_pixel(0, 0), BACKGROUND);
        assert_eq!(*region.get_pixel(1, 1), RED);
        assert!(fb.read_region(3, 2).is_err());
        assert!(fb.read_region(0, 4).is_ok());
    }

    #[test]
    fn readers_never_see_torn_rows() {
        let width = 64;
        let fb = Arc::new(Framebuffer::new(width, 4));
        let writer = {
            let fb = Arc::clone(&fb);
            thread::spawn(move || {
                for i in 0..2000u32 {
                    let shade = (i % 250) as u8;
                    let row = vec![Rgba([shade, shade, shade, 255]); width as usize];
                    fb.write_row(i % 4, &row).unwrap();
                }
            })
        };
        for _ in 0..500 {
            let snapshot = fb.read_all();
            for row in snapshot.rows() {
                let pixels: Vec<_> = row.collect();
                assert!(pixels.iter().all(|p| *p == pixels[0]));
            }
        }
        writer.join().unwrap();
    }
}
