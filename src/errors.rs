// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The error type shared by the renderer and the orchestrator.  Launch
//! failures and failed render jobs are not errors: the orchestrator
//! recovers from the former and records the latter in its report.

use std::io;

/// Everything that can go wrong before or around a render.
#[derive(Debug, Fail)]
pub enum Error {
    /// A parameter was rejected before any work began.
    #[fail(display = "invalid configuration: {}", _0)]
    Config(String),

    /// The raster sink could not write the finished image.
    #[fail(display = "could not store {}: {}", path, reason)]
    Store {
        /// Where the image was headed.
        path: String,
        /// What the codec said.
        reason: String,
    },

    /// A compute worker panicked before its band was finished.
    #[fail(display = "compute worker failed: {}", _0)]
    Worker(String),

    /// Any other I/O failure.
    #[fail(display = "I/O error: {}", _0)]
    Io(#[cause] io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = ::std::result::Result<T, Error>;
