// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a rectangle on the integral plane with an origin at 0,0 in
//! the top left, and a rectangle on the complex plane described by a
//! [`Viewport`].  Row 0 is the top edge of the viewport (its maximum
//! imaginary value); the last row is the bottom edge.
use num::Complex;

use crate::config::Viewport;

/// Describes the column, row of a pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub u32, pub u32);

/// Maps pixels of a `width x height` image onto a viewport.  The
/// corner pixels land exactly on the viewport's corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PlaneMapper {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// The complex rectangle.
    pub viewport: Viewport,
    // Distance on the complex plane between adjacent columns and rows.
    step: (f64, f64),
}

// A one-pixel axis has nothing to interpolate across.
fn step(extent: f64, pixels: u32) -> f64 {
    if pixels > 1 {
        extent / f64::from(pixels - 1)
    } else {
        0.0
    }
}

impl PlaneMapper {
    /// Constructor.
    pub fn new(width: u32, height: u32, viewport: Viewport) -> PlaneMapper {
        PlaneMapper {
            width,
            height,
            viewport,
            step: (step(viewport.width(), width), step(viewport.height(), height)),
        }
    }

    /// The real coordinate of a column.
    #[inline]
    pub fn column_to_re(&self, column: u32) -> f64 {
        self.viewport.xmin + self.step.0 * f64::from(column)
    }

    /// The imaginary coordinate of a row.
    #[inline]
    pub fn row_to_im(&self, row: u32) -> f64 {
        self.viewport.ymax - self.step.1 * f64::from(row)
    }

    /// Given a pixel, the point on the complex plane it samples.
    #[inline]
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        Complex::new(self.column_to_re(pixel.0), self.row_to_im(pixel.1))
    }

    /// The part of the viewport covered by rows `first..=last`, measured
    /// between row centres.  When `first == last` the slice has no
    /// height (`ymin == ymax`) and is not a valid `Viewport::new` input.
    pub fn rows_slice(&self, first: u32, last: u32) -> Viewport {
        Viewport {
            xmin: self.viewport.xmin,
            xmax: self.viewport.xmax,
            ymin: self.row_to_im(last),
            ymax: self.row_to_im(first),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Viewport {
        Viewport::new(-2.0, 2.0, -2.0, 2.0).unwrap()
    }

    #[test]
    fn corners_map_to_corners() {
        let pm = PlaneMapper::new(5, 5, square());
        assert_eq!(pm.pixel_to_point(Pixel(0, 0)), Complex::new(-2.0, 2.0));
        assert_eq!(pm.pixel_to_point(Pixel(4, 0)), Complex::new(2.0, 2.0));
        assert_eq!(pm.pixel_to_point(Pixel(0, 4)), Complex::new(-2.0, -2.0));
        assert_eq!(pm.pixel_to_point(Pixel(4, 4)), Complex::new(2.0, -2.0));
    }

    #[test]
    fn center_maps_to_origin() {
        let pm = PlaneMapper::new(5, 5, square());
        assert_eq!(pm.pixel_to_point(Pixel(2, 2)), Complex::new(0.0, 0.0));
    }

    #[test]
    fn rows_run_top_down() {
        let pm = PlaneMapper::new(3, 9, square());
        assert!(pm.row_to_im(0) > pm.row_to_im(1));
        assert_eq!(pm.row_to_im(8), -2.0);
    }

    #[test]
    fn single_pixel_axes_sit_on_the_edge() {
        let pm = PlaneMapper::new(1, 1, square());
        assert_eq!(pm.pixel_to_point(Pixel(0, 0)), Complex::new(-2.0, 2.0));
    }

    #[test]
    fn rows_slice_covers_the_band() {
        let pm = PlaneMapper::new(5, 5, square());
        let slice = pm.rows_slice(0, 2);
        assert_eq!(slice.ymax, 2.0);
        assert_eq!(slice.ymin, 0.0);
        assert_eq!(slice.xmin, -2.0);
        assert_eq!(slice.xmax, 2.0);
    }

    #[test]
    fn single_row_slices_are_flat() {
        let pm = PlaneMapper::new(5, 5, square());
        let slice = pm.rows_slice(3, 3);
        assert_eq!(slice.ymin, -1.0);
        assert_eq!(slice.ymax, -1.0);
        assert!(Viewport::new(slice.xmin, slice.xmax, slice.ymin, slice.ymax).is_err());
    }
}
