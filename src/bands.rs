// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The thread tier.  An image is cut into horizontal bands of rows,
//! each band is handed to its own worker thread, and the caller waits
//! until every band is done.  Bands never share a row, so the workers
//! need no locks on the raster; the only synchronization is the join
//! at the end of the scope.

extern crate crossbeam;

use crossbeam::channel::bounded;
use itertools::iproduct;
use std::io;
use std::ops::Range;

use errors::{Error, Result};
use escape::{color, iterations};
use planes::Viewport;
use raster::{Band, Raster};

/// The most workers a single image will be split across.
pub const MAX_WORKERS: usize = 20;

/// Clamps a requested worker count to `1..=MAX_WORKERS`.
pub fn clamp_workers(requested: usize) -> usize {
    num::clamp(requested, 1, MAX_WORKERS)
}

/// Row ranges for `workers` bands over an image `height` rows tall.
/// Band `t` covers `t * height / workers .. (t + 1) * height / workers`,
/// which tiles the image exactly whether or not the division is even;
/// later bands pick up the remainder a row at a time.  When there are
/// more workers than rows some bands are empty.
pub fn band_rows(height: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    (0..workers)
        .map(|t| (t * height / workers)..((t + 1) * height / workers))
        .collect()
}

/// One unit of work for a worker: a band of the raster and the
/// viewport it looks at.  Consumed by exactly one worker.
pub struct BandTask<'a, 'v> {
    band: Band<'a>,
    viewport: &'v Viewport,
}

impl<'a, 'v> BandTask<'a, 'v> {
    /// Pairs a band with its viewport.
    pub fn new(band: Band<'a>, viewport: &'v Viewport) -> Self {
        BandTask { band, viewport }
    }

    /// Computes every pixel of the band.
    pub fn render(mut self) {
        let (width, height) = (self.band.width(), self.band.image_height());
        let limit = self.viewport.max_iterations;
        for (row, column) in iproduct!(self.band.rows(), 0..width) {
            let point = self.viewport.pixel_to_point(column, row, width, height);
            self.band
                .set_pixel(column, row, color(iterations(point, limit), limit));
        }
    }
}

/// Renders the whole raster with up to `workers` threads, clamped to
/// `1..=MAX_WORKERS`.  A single worker renders in the calling thread.
/// Returns only once every band is finished.
pub fn compute_image(raster: &mut Raster, viewport: &Viewport, workers: usize) -> Result<()> {
    compute_image_with(raster, viewport, workers, |_| true)
}

/// As `compute_image`, but `admit` is asked before each worker thread
/// is started; a refusal is handled exactly like the operating system
/// refusing to create the thread.
pub fn compute_image_with<A>(
    raster: &mut Raster,
    viewport: &Viewport,
    workers: usize,
    admit: A,
) -> Result<()>
where
    A: Fn(usize) -> bool,
{
    let workers = clamp_workers(workers);
    if workers == 1 {
        BandTask::new(raster.as_band(), viewport).render();
        return Ok(());
    }

    let ranges = band_rows(raster.height(), workers);
    let bands = raster.split_rows(&ranges);

    crossbeam::scope(|scope| {
        for (t, band) in bands.into_iter().enumerate() {
            let task = BandTask::new(band, viewport);
            // The task is handed over only after the thread exists, so a
            // refused launch leaves it here to be run inline.
            let (sender, receiver) = bounded::<BandTask>(1);
            let launched = if admit(t) {
                scope
                    .builder()
                    .name(format!("band-{}", t))
                    .spawn(move |_| {
                        if let Ok(task) = receiver.recv() {
                            task.render();
                        }
                    })
            } else {
                Err(io::Error::new(io::ErrorKind::Other, "worker launch refused"))
            };
            match launched {
                Ok(_) => {
                    debug!("band {} rows {:?} started", t, ranges[t]);
                    if let Err(returned) = sender.send(task) {
                        warn!("band {} worker went away, rendering inline", t);
                        returned.into_inner().render();
                    }
                }
                Err(e) => {
                    warn!("could not start worker for band {} ({}), rendering inline", t, e);
                    task.render();
                }
            }
        }
    })
    .map_err(|_| Error::Worker("a band worker panicked".to_string()))
}
