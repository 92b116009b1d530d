// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Maps iteration counts to colors.  The table is a full-saturation,
//! full-brightness walk around the hue wheel; counts wrap around it, so
//! deep renders with thousands of iterations cycle through the wheel
//! many times.  Points that never escaped are painted black.

use image::Rgba;

/// A single framebuffer pixel.
pub type Color = Rgba<u8>;

/// Number of entries in the hue table.
pub const PALETTE_SIZE: usize = 256;

/// The color of points inside the set.
pub const IN_SET: Color = Rgba([0, 0, 0, 255]);

/// An immutable, precomputed hue table.  Once built it is only ever
/// read, so one palette can be shared by every worker.
#[derive(Clone, Debug)]
pub struct Palette {
    table: Vec<Color>,
}

impl Palette {
    /// Build the standard 256-entry hue wheel.
    pub fn new() -> Palette {
        let last = (PALETTE_SIZE - 1) as f32;
        Palette {
            table: (0..PALETTE_SIZE)
                .map(|i| hsb_to_rgb(i as f32 / last, 1.0, 1.0))
                .collect(),
        }
    }

    /// The color for a point that survived `iterations` out of
    /// `max_iterations`.
    #[inline]
    pub fn color_for(&self, iterations: u32, max_iterations: u32) -> Color {
        if iterations == max_iterations {
            IN_SET
        } else {
            self.table[iterations as usize % self.table.len()]
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new()
    }
}

/// HSB (a.k.a. HSV) to opaque RGB.  Hue is a fraction of a full turn;
/// only its fractional part matters.
pub fn hsb_to_rgb(hue: f32, saturation: f32, brightness: f32) -> Color {
    let channel = |v: f32| (v * 255.0 + 0.5) as u8;
    if saturation == 0.0 {
        let v = channel(brightness);
        return Rgba([v, v, v, 255]);
    }
    let h = (hue - hue.floor()) * 6.0;
    let f = h - h.floor();
    let p = brightness * (1.0 - saturation);
    let q = brightness * (1.0 - saturation * f);
    let t = brightness * (1.0 - saturation * (1.0 - f));
    let (r, g, b) = match h as u32 {
        0 => (brightness, t, p),
        1 => (q, brightness, p),
        2 => (p, brightness, t),
        3 => (p, q, brightness),
        4 => (t, p, brightness),
        _ => (brightness, p, q),
    };
    Rgba([channel(r), channel(g), channel(b), 255])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_set_points_are_black() {
        let palette = Palette::new();
        assert_eq!(palette.color_for(1000, 1000), IN_SET);
        assert_eq!(palette.color_for(0, 0), IN_SET);
    }

    #[test]
    fn counts_wrap_around_the_table() {
        let palette = Palette::new();
        assert_eq!(palette.table.len(), PALETTE_SIZE);
        assert_eq!(palette.color_for(3, 10_000), palette.color_for(259, 10_000));
        assert_eq!(palette.color_for(0, 10_000), palette.color_for(512, 10_000));
    }

    #[test]
    fn the_wheel_starts_and_ends_red() {
        let palette = Palette::new();
        assert_eq!(palette.color_for(0, 10), Rgba([255, 0, 0, 255]));
        assert_eq!(palette.color_for(255, 10_000), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn primary_hues() {
        assert_eq!(hsb_to_rgb(1.0 / 3.0, 1.0, 1.0), Rgba([0, 255, 0, 255]));
        assert_eq!(hsb_to_rgb(2.0 / 3.0, 1.0, 1.0), Rgba([0, 0, 255, 255]));
        assert_eq!(hsb_to_rgb(0.5, 0.0, 0.5), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn table_entries_are_opaque_and_saturated() {
        let palette = Palette::new();
        for i in 0..PALETTE_SIZE as u32 {
            let Rgba([r, g, b, a]) = palette.color_for(i, u32::max_value());
            assert_eq!(a, 255);
            assert_eq!(r.max(g).max(b), 255);
            assert_eq!(r.min(g).min(b), 0);
        }
    }
}
