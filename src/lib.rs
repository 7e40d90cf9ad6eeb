#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mandelbrot zoom movies
//!
//! A movie is a run of still frames, each looking at the same point of
//! the Mandelbrot set from a little closer than the last.  Rendering
//! happens on two tiers.  Within one frame the image is cut into bands
//! of rows and each band is computed on its own thread (`bands`).
//! Across the movie every frame is a separate render job, usually a
//! `mandel` process, and the orchestrator (`pool`) keeps a bounded
//! number of them running until every frame is done or accounted for.

extern crate crossbeam;
#[macro_use]
extern crate failure;
extern crate image;
extern crate itertools;
#[macro_use]
extern crate log;
extern crate num;

#[cfg(test)]
extern crate tempfile;

pub mod bands;
pub mod errors;
pub mod escape;
pub mod frames;
pub mod job;
pub mod planes;
pub mod pool;
pub mod raster;

pub use bands::{compute_image, MAX_WORKERS};
pub use errors::{Error, Result};
pub use frames::{FrameDescriptor, Zoom};
pub use job::{Launcher, Outcome, ProcessLauncher};
pub use planes::{Framing, Viewport};
pub use pool::{Discipline, Orchestrator, Report};
pub use raster::Raster;
