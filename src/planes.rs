// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport, which describes the rectangle of the
//! complex plane an image looks at, and the Framing, which is the
//! same rectangle described the way a camera operator would: a center,
//! a width in plane units, and the size of the picture in pixels.

use num::Complex;

use errors::{Error, Result};

/// The region of the complex plane mapped onto an image, plus the
/// iteration cap used for every point in it.  Once built it is never
/// mutated, and every band of an image reads the same one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Real part of the left edge.
    pub xmin: f64,
    /// Real part of the right edge.
    pub xmax: f64,
    /// Imaginary part of the top row.
    pub ymin: f64,
    /// Imaginary part of the bottom edge.
    pub ymax: f64,
    /// Iteration cap for the escape-time test.
    pub max_iterations: usize,
}

impl Viewport {
    /// Builds a viewport from its four edges.  The edges must be
    /// finite and ordered, and the iteration cap must be at least one.
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, max_iterations: usize) -> Result<Self> {
        if !(xmin.is_finite() && xmax.is_finite() && ymin.is_finite() && ymax.is_finite()) {
            return Err(Error::Config("viewport edges must be finite".to_string()));
        }
        if xmax <= xmin {
            return Err(Error::Config(
                "the left edge is not to the left of the right edge".to_string(),
            ));
        }
        if ymax <= ymin {
            return Err(Error::Config("the top edge is not above the bottom edge".to_string()));
        }
        if max_iterations == 0 {
            return Err(Error::Config("maximum iterations must be at least 1".to_string()));
        }
        Ok(Viewport {
            xmin,
            xmax,
            ymin,
            ymax,
            max_iterations,
        })
    }

    /// Given the column and row of a pixel in a `width` by `height`
    /// image, return the point of the complex plane it samples.  The
    /// pixel's top-left corner is used, not its center.
    #[inline]
    pub fn pixel_to_point(&self, column: usize, row: usize, width: usize, height: usize) -> Complex<f64> {
        Complex::new(
            self.xmin + column as f64 * (self.xmax - self.xmin) / width as f64,
            self.ymin + row as f64 * (self.ymax - self.ymin) / height as f64,
        )
    }
}

/// A picture described by where it points and how wide it looks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Framing {
    /// The point at the middle of the image.
    pub center: Complex<f64>,
    /// Horizontal extent in plane units.  The vertical extent follows
    /// from the aspect ratio.
    pub xscale: f64,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration cap.
    pub max_iterations: usize,
}

impl Framing {
    /// Vertical extent in plane units, keeping pixels square.
    pub fn yscale(&self) -> f64 {
        self.xscale / self.width as f64 * self.height as f64
    }

    /// Checks the framing describes a real picture: a positive finite
    /// scale, a finite center, a non-empty image and a usable
    /// iteration cap.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::Config(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if !(self.xscale.is_finite() && self.xscale > 0.0) {
            return Err(Error::Config(format!("scale {} must be positive", self.xscale)));
        }
        if !(self.center.re.is_finite() && self.center.im.is_finite()) {
            return Err(Error::Config("center must be finite".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(Error::Config("maximum iterations must be at least 1".to_string()));
        }
        Ok(())
    }

    /// The viewport this framing looks at: the center plus or minus
    /// half of each scale.
    pub fn viewport(&self) -> Result<Viewport> {
        self.validate()?;
        let (xscale, yscale) = (self.xscale, self.yscale());
        Viewport::new(
            self.center.re - xscale / 2.0,
            self.center.re + xscale / 2.0,
            self.center.im - yscale / 2.0,
            self.center.im + yscale / 2.0,
            self.max_iterations,
        )
    }
}
