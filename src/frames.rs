// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The zoom: a fixed center and a scale that shrinks geometrically,
//! one frame at a time.

use num::Complex;
use std::path::{Path, PathBuf};

use errors::{Error, Result};
use planes::{Framing, Viewport};

/// Everything one render job needs to know: which frame it is, what
/// it looks at, and where the picture goes.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameDescriptor {
    /// Position in the sequence, from zero.
    pub index: usize,
    /// Center, scale, size and iteration cap of this frame.
    pub framing: Framing,
    /// Where the rendered image is written.
    pub output: PathBuf,
}

impl FrameDescriptor {
    /// The viewport this frame renders.
    pub fn viewport(&self) -> Result<Viewport> {
        self.framing.viewport()
    }
}

/// Parameters of a zoom.
#[derive(Clone, Debug, PartialEq)]
pub struct Zoom {
    /// Number of frames.
    pub frames: usize,
    /// The point every frame is centered on.
    pub center: Complex<f64>,
    /// Horizontal extent of the first frame.
    pub start_scale: f64,
    /// Each frame's scale is the previous one times this.
    pub decay: f64,
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Iteration cap for every frame.
    pub max_iterations: usize,
    /// Directory the frames are written to.
    pub outdir: PathBuf,
}

impl Zoom {
    /// Scale of frame `index`: `start_scale * decay^index`.
    pub fn scale(&self, index: usize) -> f64 {
        self.start_scale * self.decay.powi(index as i32)
    }

    /// Checks the zoom describes a finite, strictly tightening sequence
    /// of real pictures.  Nothing is dispatched unless this passes.
    pub fn validate(&self) -> Result<()> {
        if self.frames == 0 {
            return Err(Error::Config("frame count must be at least 1".to_string()));
        }
        if self.frames > i32::max_value() as usize {
            return Err(Error::Config(format!("frame count {} is too large", self.frames)));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(Error::Config(format!(
                "zoom factor {} must lie strictly between 0 and 1",
                self.decay
            )));
        }
        if !(self.start_scale.is_finite() && self.start_scale > 0.0) {
            return Err(Error::Config(format!(
                "starting scale {} must be positive",
                self.start_scale
            )));
        }
        let last = self.frames - 1;
        if last > 0 && !(self.scale(last) < self.scale(last - 1)) {
            return Err(Error::Config(format!(
                "zoom collapses before frame {}: scale no longer shrinks",
                last
            )));
        }
        // Every frame must still describe a real viewport; the last is
        // the narrowest.
        self.framing(last).viewport().map(|_| ())
    }

    /// Center, scale and size of frame `index`.
    pub fn framing(&self, index: usize) -> Framing {
        Framing {
            center: self.center,
            xscale: self.scale(index),
            width: self.width,
            height: self.height,
            max_iterations: self.max_iterations,
        }
    }

    /// File name of frame `index` inside the output directory.
    pub fn output(&self, index: usize) -> PathBuf {
        frame_path(&self.outdir, index)
    }

    /// The sequence of frame descriptors, validated up front.
    pub fn frames(&self) -> Result<Frames> {
        self.validate()?;
        Ok(Frames {
            zoom: self.clone(),
            next: 0,
        })
    }
}

/// `<outdir>/mandel<index>.jpg`.
pub fn frame_path(outdir: &Path, index: usize) -> PathBuf {
    outdir.join(format!("mandel{}.jpg", index))
}

/// A lazy walk over a zoom's frames.  The only state is the next
/// index, so a clone taken before iterating replays the sequence.
#[derive(Clone, Debug)]
pub struct Frames {
    zoom: Zoom,
    next: usize,
}

impl Iterator for Frames {
    type Item = FrameDescriptor;

    fn next(&mut self) -> Option<FrameDescriptor> {
        if self.next >= self.zoom.frames {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(FrameDescriptor {
            index,
            framing: self.zoom.framing(index),
            output: self.zoom.output(index),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.zoom.frames - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Frames {}
