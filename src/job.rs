// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! What the orchestrator knows about a render job: it can be launched
//! from a frame descriptor, polled for completion, and killed.  Pixels
//! never come back across this boundary, only an outcome.

use std::env;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};

use frames::FrameDescriptor;

/// How a launched job ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The image was stored.
    Succeeded,
    /// The job ran but reported failure; the exit code, if it had one.
    Failed(Option<i32>),
    /// The job outlived its deadline and was killed.
    TimedOut,
}

impl Outcome {
    /// True only for `Succeeded`.
    pub fn is_success(&self) -> bool {
        *self == Outcome::Succeeded
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Outcome::Succeeded => write!(f, "succeeded"),
            Outcome::Failed(Some(code)) => write!(f, "exited with status {}", code),
            Outcome::Failed(None) => write!(f, "killed by a signal"),
            Outcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// A running render job.
pub trait Job: Send {
    /// Returns the outcome if the job has finished, without blocking.
    fn try_wait(&mut self) -> io::Result<Option<Outcome>>;

    /// Stops the job and reaps it.
    fn kill(&mut self) -> io::Result<()>;
}

/// Starts render jobs.  A launch error means the job never started and
/// may be retried; it says nothing about whether the frame can render.
pub trait Launcher: Sync {
    /// The handle for a started job.
    type Job: Job;

    /// Starts rendering `frame`.
    fn launch(&self, frame: &FrameDescriptor) -> io::Result<Self::Job>;
}

/// Runs each frame as a separate `mandel` process.
#[derive(Clone, Debug)]
pub struct ProcessLauncher {
    program: PathBuf,
    workers: usize,
    quiet: bool,
}

impl ProcessLauncher {
    /// Launches `program` with `workers` compute threads per job.
    pub fn new<P: Into<PathBuf>>(program: P, workers: usize) -> Self {
        ProcessLauncher {
            program: program.into(),
            workers,
            quiet: false,
        }
    }

    /// Discards the jobs' standard output.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// The program being launched.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// The command line that renders `frame`.
    pub fn command(&self, frame: &FrameDescriptor) -> Command {
        let framing = &frame.framing;
        let mut cmd = Command::new(&self.program);
        cmd.arg("-x")
            .arg(format!("{:.15}", framing.center.re))
            .arg("-y")
            .arg(format!("{:.15}", framing.center.im))
            .arg("-s")
            .arg(format!("{:.15}", framing.xscale))
            .arg("-W")
            .arg(framing.width.to_string())
            .arg("-H")
            .arg(framing.height.to_string())
            .arg("-m")
            .arg(framing.max_iterations.to_string())
            .arg("-t")
            .arg(self.workers.to_string())
            .arg("-o")
            .arg(&frame.output)
            .stdin(Stdio::null());
        if self.quiet {
            cmd.stdout(Stdio::null());
        }
        cmd
    }
}

impl Launcher for ProcessLauncher {
    type Job = RenderProcess;

    fn launch(&self, frame: &FrameDescriptor) -> io::Result<RenderProcess> {
        let child = self.command(frame).spawn()?;
        debug!("frame {} running as pid {}", frame.index, child.id());
        Ok(RenderProcess { child })
    }
}

/// A `mandel` child process.
#[derive(Debug)]
pub struct RenderProcess {
    child: Child,
}

impl Job for RenderProcess {
    fn try_wait(&mut self) -> io::Result<Option<Outcome>> {
        Ok(self.child.try_wait()?.map(|status| {
            if status.success() {
                Outcome::Succeeded
            } else {
                Outcome::Failed(status.code())
            }
        }))
    }

    fn kill(&mut self) -> io::Result<()> {
        // Killing a child that already exited is not an error worth
        // reporting; reaping it is what matters.
        let _ = self.child.kill();
        self.child.wait().map(|_| ())
    }
}

/// The `mandel` program installed beside the running executable.
pub fn default_render_program() -> PathBuf {
    let name = format!("mandel{}", env::consts::EXE_SUFFIX);
    match env::current_exe() {
        Ok(exe) => match exe.parent() {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        },
        Err(_) => PathBuf::from(name),
    }
}
