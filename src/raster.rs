// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The raster sink: a fixed-size grid of packed 0xRRGGBB colors, the
//! row bands it can be carved into, and the one call that writes it
//! to disk.

use image::{Rgb, RgbImage};
use std::ops::Range;
use std::path::Path;

use errors::{Error, Result};

/// A `width` by `height` grid of packed colors.  The grid is never
/// resized; it is owned by whoever rendered it until it is stored.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

/// A contiguous run of rows borrowed out of a Raster.  Bands carved
/// from the same raster never overlap, so each may be written from
/// its own thread.
#[derive(Debug)]
pub struct Band<'a> {
    rows: Range<usize>,
    width: usize,
    height: usize,
    cells: &'a mut [u32],
}

impl Raster {
    /// Allocates a black raster.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Config(format!("image size {}x{} is empty", width, height)));
        }
        if width > u32::max_value() as usize || height > u32::max_value() as usize {
            return Err(Error::Config(format!("image size {}x{} is too large", width, height)));
        }
        Ok(Raster {
            width,
            height,
            pixels: vec![0; width * height],
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The cells, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Paints every cell.
    pub fn fill(&mut self, color: u32) {
        for p in self.pixels.iter_mut() {
            *p = color;
        }
    }

    /// Sets one cell.  Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    /// Reads one cell.
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// The whole raster as a single band.
    pub fn as_band(&mut self) -> Band {
        Band {
            rows: 0..self.height,
            width: self.width,
            height: self.height,
            cells: &mut self.pixels,
        }
    }

    /// Carves the raster into bands, one per range.  The ranges must
    /// tile `0..height` in order; anything else is a programming error.
    pub fn split_rows(&mut self, ranges: &[Range<usize>]) -> Vec<Band> {
        let (width, height) = (self.width, self.height);
        let mut rest: &mut [u32] = &mut self.pixels;
        let mut next = 0;
        let mut bands = Vec::with_capacity(ranges.len());
        for range in ranges {
            assert!(
                range.start == next && range.end >= range.start,
                "row range {:?} does not continue from row {}",
                range,
                next
            );
            let (cells, tail) = { rest }.split_at_mut((range.end - range.start) * width);
            rest = tail;
            next = range.end;
            bands.push(Band {
                rows: range.clone(),
                width,
                height,
                cells,
            });
        }
        assert!(next == height, "row ranges end at {} of {}", next, height);
        bands
    }

    /// Writes the raster to `path`.  The codec is picked from the
    /// file extension, so `frame.jpg` becomes a JPEG.
    pub fn store<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let width = self.width;
        let pixels = &self.pixels;
        let img = RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            let c = pixels[y as usize * width + x as usize];
            Rgb([(c >> 16) as u8, (c >> 8) as u8, c as u8])
        });
        img.save(path).map_err(|e| Error::Store {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl<'a> Band<'a> {
    /// The image rows this band owns.
    pub fn rows(&self) -> Range<usize> {
        self.rows.clone()
    }

    /// Width of the parent raster.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the parent raster, not of the band.
    pub fn image_height(&self) -> usize {
        self.height
    }

    /// Sets a cell addressed in image coordinates.  `y` must fall in
    /// this band's rows.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, color: u32) {
        debug_assert!(x < self.width && self.rows.start <= y && y < self.rows.end);
        self.cells[(y - self.rows.start) * self.width + x] = color;
    }
}
