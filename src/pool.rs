// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The process tier.  Every frame is rendered by its own job, and no
//! more than a fixed number of jobs run at once.  Two ways of keeping
//! that promise are offered:
//!
//! * **Gated**: a single loop counts the jobs it has running.  When the
//!   count reaches the ceiling it waits for whichever job finishes
//!   first, then launches the next frame.  Frames are launched in index
//!   order and may finish in any order.
//!
//! * **Striped**: frame `i` belongs to supervisor `i % P`.  Each of the
//!   `P` supervisors launches its own frames one at a time, waiting for
//!   each to finish before starting the next.  Nothing is shared between
//!   supervisors.
//!
//! In both, a job that cannot be launched is retried, and a job that
//! launches and then fails is recorded in the report and not retried.
//! The run always visits every frame; one bad frame never stops it.

extern crate crossbeam;

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};

use frames::FrameDescriptor;
use job::{Job, Launcher, Outcome};

/// How jobs are handed out.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Discipline {
    /// One loop, a running count, wait for any job when full.
    Gated,
    /// `P` supervisors, frame `i` to supervisor `i % P`.
    Striped,
}

impl FromStr for Discipline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "gated" => Ok(Discipline::Gated),
            "striped" => Ok(Discipline::Striped),
            _ => Err(format!("unknown dispatch discipline '{}' (gated or striped)", s)),
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Discipline::Gated => write!(f, "gated"),
            Discipline::Striped => write!(f, "striped"),
        }
    }
}

/// Why a frame has no image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// The job ran and did not succeed.
    Job(Outcome),
    /// The job could not be started, even after retrying.
    Launch(String),
    /// The job's status could not be read.
    Wait(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            FailureReason::Job(outcome) => write!(f, "render job {}", outcome),
            FailureReason::Launch(ref e) => write!(f, "could not launch render job: {}", e),
            FailureReason::Wait(ref e) => write!(f, "lost track of render job: {}", e),
        }
    }
}

/// One frame that did not render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameFailure {
    /// The frame's index.
    pub index: usize,
    /// What went wrong.
    pub reason: FailureReason,
}

/// What happened to every frame of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// Frames whose job succeeded, in the order they were seen to finish.
    pub completed: Vec<usize>,
    /// Frames that did not render.
    pub failed: Vec<FrameFailure>,
    /// Most jobs running at once.  For striped runs this is the number
    /// of supervisors that had work.
    pub peak_active: usize,
}

impl Report {
    /// True when every frame rendered.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Indices of the failed frames, ascending.
    pub fn failed_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.failed.iter().map(|f| f.index).collect();
        indices.sort();
        indices
    }

    /// Number of frames accounted for.
    pub fn frames(&self) -> usize {
        self.completed.len() + self.failed.len()
    }

    fn record(&mut self, index: usize, result: Result<Outcome, String>) {
        match result {
            Ok(Outcome::Succeeded) => {
                info!("frame {} done", index);
                self.completed.push(index);
            }
            Ok(outcome) => {
                warn!("frame {}: render job {}", index, outcome);
                self.failed.push(FrameFailure {
                    index,
                    reason: FailureReason::Job(outcome),
                });
            }
            Err(e) => {
                warn!("frame {}: {}", index, e);
                self.failed.push(FrameFailure {
                    index,
                    reason: FailureReason::Wait(e),
                });
            }
        }
    }

    fn give_up(&mut self, index: usize, error: String) {
        warn!("frame {}: giving up on launch: {}", index, error);
        self.failed.push(FrameFailure {
            index,
            reason: FailureReason::Launch(error),
        });
    }

    fn merge(&mut self, other: Report) {
        self.completed.extend(other.completed);
        self.failed.extend(other.failed);
    }
}

/// The running-job count of a gated run.  Owned by the dispatch loop
/// and touched by nothing else.
#[derive(Debug)]
struct Slots {
    active: usize,
    ceiling: usize,
    peak: usize,
}

impl Slots {
    fn new(ceiling: usize) -> Self {
        Slots {
            active: 0,
            ceiling,
            peak: 0,
        }
    }

    fn is_full(&self) -> bool {
        self.active >= self.ceiling
    }

    fn acquire(&mut self) {
        assert!(self.active < self.ceiling, "slot taken past the ceiling");
        self.active += 1;
        self.peak = self.peak.max(self.active);
    }

    fn release(&mut self) {
        self.active -= 1;
    }
}

struct Running<J> {
    index: usize,
    job: J,
    started: Instant,
}

impl<J: Job> Running<J> {
    /// Polls the job once.  Returns its result if it has finished or
    /// has been killed for running past `timeout`.
    fn check(&mut self, timeout: Option<Duration>) -> Option<Result<Outcome, String>> {
        match self.job.try_wait() {
            Ok(Some(outcome)) => Some(Ok(outcome)),
            Ok(None) => match timeout {
                Some(limit) if self.started.elapsed() >= limit => {
                    if let Err(e) = self.job.kill() {
                        warn!("frame {}: could not kill overdue job: {}", self.index, e);
                    }
                    Some(Ok(Outcome::TimedOut))
                }
                _ => None,
            },
            Err(e) => {
                let _ = self.job.kill();
                Some(Err(e.to_string()))
            }
        }
    }
}

/// Grows a wait interval geometrically up to `cap`.
fn backoff(step: u32, base: Duration, cap: Duration) -> Duration {
    let factor = 1u32 << step.min(16);
    let grown = base * factor;
    if grown > cap {
        cap
    } else {
        grown
    }
}

/// Frame indices owned by each of `supervisors` stripes: supervisor
/// `s` owns every index `i` in `0..frames` with `i % supervisors == s`,
/// in ascending order.
pub fn stripes(frames: usize, supervisors: usize) -> Vec<Vec<usize>> {
    let supervisors = supervisors.max(1);
    let mut owned = vec![Vec::new(); supervisors];
    for index in 0..frames {
        owned[index % supervisors].push(index);
    }
    owned
}

/// Runs a sequence of frames as jobs, at most `ceiling` at a time.
#[derive(Clone, Debug)]
pub struct Orchestrator {
    ceiling: usize,
    timeout: Option<Duration>,
    launch_attempts: usize,
    retry_delay: Duration,
    poll_interval: Duration,
}

impl Orchestrator {
    /// An orchestrator that runs at most `ceiling` jobs at once.  A
    /// ceiling of zero is treated as one.
    pub fn new(ceiling: usize) -> Self {
        Orchestrator {
            ceiling: ceiling.max(1),
            timeout: None,
            launch_attempts: 5,
            retry_delay: Duration::from_millis(10),
            poll_interval: Duration::from_millis(50),
        }
    }

    /// Kills and fails any job that runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// How many launch failures in a row a frame may suffer, with no
    /// running job to wait for in between, before it is written off.
    pub fn launch_attempts(mut self, attempts: usize) -> Self {
        self.launch_attempts = attempts.max(1);
        self
    }

    /// First pause after a failed launch; doubles on each further
    /// failure.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Longest pause between polls of running jobs.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn retry_pause(&self, failures: usize) -> Duration {
        backoff(failures as u32 - 1, self.retry_delay, self.poll_interval * 20)
    }

    /// The concurrency ceiling.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Runs every frame under the chosen discipline.
    pub fn run<L, I>(&self, discipline: Discipline, launcher: &L, frames: I) -> Report
    where
        L: Launcher,
        I: IntoIterator<Item = FrameDescriptor>,
    {
        info!(
            "dispatching frames: {} discipline, up to {} jobs",
            discipline, self.ceiling
        );
        match discipline {
            Discipline::Gated => self.run_gated(launcher, frames),
            Discipline::Striped => self.run_striped(launcher, frames),
        }
    }

    /// Gated dispatch: launch frames in order, waiting for any running
    /// job to finish whenever the ceiling is reached.
    pub fn run_gated<L, I>(&self, launcher: &L, frames: I) -> Report
    where
        L: Launcher,
        I: IntoIterator<Item = FrameDescriptor>,
    {
        let mut slots = Slots::new(self.ceiling);
        let mut running: Vec<Running<L::Job>> = Vec::with_capacity(self.ceiling);
        let mut report = Report::default();

        for frame in frames {
            if slots.is_full() {
                self.reap_any(&mut running, &mut slots, &mut report);
            }
            let mut failures = 0;
            loop {
                match launcher.launch(&frame) {
                    Ok(job) => {
                        slots.acquire();
                        debug!("frame {} launched, {} running", frame.index, slots.active);
                        running.push(Running {
                            index: frame.index,
                            job,
                            started: Instant::now(),
                        });
                        break;
                    }
                    Err(e) => {
                        warn!("could not launch frame {}: {}", frame.index, e);
                        if !running.is_empty() {
                            // Freeing a slot may free whatever the launch lacked.
                            self.reap_any(&mut running, &mut slots, &mut report);
                            continue;
                        }
                        failures += 1;
                        if failures >= self.launch_attempts {
                            report.give_up(frame.index, e.to_string());
                            break;
                        }
                        thread::sleep(self.retry_pause(failures));
                    }
                }
            }
        }

        while !running.is_empty() {
            self.reap_any(&mut running, &mut slots, &mut report);
        }
        report.peak_active = slots.peak;
        report
    }

    /// Blocks until one running job finishes, records it, and frees its
    /// slot.  Jobs are polled round-robin, so the first to finish is the
    /// first reaped whatever its launch order.
    fn reap_any<J: Job>(
        &self,
        running: &mut Vec<Running<J>>,
        slots: &mut Slots,
        report: &mut Report,
    ) {
        let mut idle = 0;
        loop {
            for n in 0..running.len() {
                if let Some(result) = running[n].check(self.timeout) {
                    let done = running.swap_remove(n);
                    slots.release();
                    report.record(done.index, result);
                    return;
                }
            }
            if running.is_empty() {
                return;
            }
            thread::sleep(backoff(idle, Duration::from_millis(1), self.poll_interval));
            idle += 1;
        }
    }

    /// Striped dispatch: split the frames into `ceiling` stripes by
    /// index and give each stripe a supervisor thread that renders its
    /// frames one after another.
    pub fn run_striped<L, I>(&self, launcher: &L, frames: I) -> Report
    where
        L: Launcher,
        I: IntoIterator<Item = FrameDescriptor>,
    {
        let mut owned: Vec<Vec<FrameDescriptor>> = vec![Vec::new(); self.ceiling];
        for frame in frames {
            let stripe = frame.index % self.ceiling;
            owned[stripe].push(frame);
        }
        let busy = owned.iter().filter(|stripe| !stripe.is_empty()).count();

        let mut report = Report::default();
        let scoped = crossbeam::scope(|scope| {
            let mut handles = Vec::new();
            let mut orphaned = Vec::new();
            for (s, stripe) in owned.iter().enumerate() {
                if stripe.is_empty() {
                    continue;
                }
                let stripe: &[FrameDescriptor] = stripe;
                let spawned = scope
                    .builder()
                    .name(format!("supervisor-{}", s))
                    .spawn(move |_| self.supervise(launcher, stripe));
                match spawned {
                    Ok(handle) => handles.push((stripe, handle)),
                    Err(e) => {
                        warn!("could not start supervisor {} ({}), supervising inline", s, e);
                        orphaned.push(stripe);
                    }
                }
            }

            let mut merged = Report::default();
            for stripe in orphaned {
                merged.merge(self.supervise(launcher, stripe));
            }
            for (stripe, handle) in handles {
                match handle.join() {
                    Ok(part) => merged.merge(part),
                    Err(_) => {
                        for frame in stripe {
                            merged.failed.push(FrameFailure {
                                index: frame.index,
                                reason: FailureReason::Wait("supervisor panicked".to_string()),
                            });
                        }
                    }
                }
            }
            merged
        });
        match scoped {
            Ok(merged) => report.merge(merged),
            Err(_) => {
                for frame in owned.iter().flatten() {
                    report.failed.push(FrameFailure {
                        index: frame.index,
                        reason: FailureReason::Wait("supervisor panicked".to_string()),
                    });
                }
            }
        }
        report.peak_active = busy;
        report
    }

    /// Renders one stripe, one frame at a time.
    fn supervise<L: Launcher>(&self, launcher: &L, stripe: &[FrameDescriptor]) -> Report {
        let mut report = Report::default();
        for frame in stripe {
            let mut failures = 0;
            let job = loop {
                match launcher.launch(frame) {
                    Ok(job) => break Some(job),
                    Err(e) => {
                        warn!("could not launch frame {}: {}", frame.index, e);
                        failures += 1;
                        if failures >= self.launch_attempts {
                            report.give_up(frame.index, e.to_string());
                            break None;
                        }
                        thread::sleep(self.retry_pause(failures));
                    }
                }
            };
            if let Some(job) = job {
                debug!("frame {} launched", frame.index);
                let mut running = Running {
                    index: frame.index,
                    job,
                    started: Instant::now(),
                };
                let mut idle = 0;
                let result = loop {
                    if let Some(result) = running.check(self.timeout) {
                        break result;
                    }
                    thread::sleep(backoff(idle, Duration::from_millis(1), self.poll_interval));
                    idle += 1;
                };
                report.record(frame.index, result);
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::Complex;
    use planes::Framing;
    use std::collections::{HashMap, HashSet};
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    fn frames(count: usize) -> Vec<FrameDescriptor> {
        (0..count)
            .map(|index| FrameDescriptor {
                index,
                framing: Framing {
                    center: Complex::new(0.0, 0.0),
                    xscale: 4.0,
                    width: 8,
                    height: 8,
                    max_iterations: 10,
                },
                output: PathBuf::from(format!("mandel{}.jpg", index)),
            })
            .collect()
    }

    fn orchestrator(ceiling: usize) -> Orchestrator {
        Orchestrator::new(ceiling)
            .retry_delay(Duration::from_millis(1))
            .poll_interval(Duration::from_millis(2))
            .launch_attempts(3)
    }

    /// Pretends to run jobs.  A job finishes after a number of polls that
    /// depends on its index, so completion order scrambles dispatch order.
    #[derive(Default)]
    struct FakeLauncher {
        live: Arc<AtomicUsize>,
        peak: AtomicUsize,
        launched: Mutex<Vec<(Option<String>, usize)>>,
        attempts: Mutex<HashMap<usize, usize>>,
        refusals: Mutex<HashMap<usize, usize>>,
        failing: HashSet<usize>,
        hanging: HashSet<usize>,
    }

    impl FakeLauncher {
        fn refuse(self, index: usize, times: usize) -> Self {
            self.refusals.lock().unwrap().insert(index, times);
            self
        }

        fn fail(mut self, index: usize) -> Self {
            self.failing.insert(index);
            self
        }

        fn hang(mut self, index: usize) -> Self {
            self.hanging.insert(index);
            self
        }

        fn launches(&self) -> Vec<usize> {
            self.launched.lock().unwrap().iter().map(|l| l.1).collect()
        }

        fn attempts(&self, index: usize) -> usize {
            *self.attempts.lock().unwrap().get(&index).unwrap_or(&0)
        }
    }

    struct FakeJob {
        polls_left: usize,
        hang: bool,
        outcome: Outcome,
        live: Arc<AtomicUsize>,
        done: bool,
    }

    impl FakeJob {
        fn finish(&mut self) {
            if !self.done {
                self.done = true;
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    impl Job for FakeJob {
        fn try_wait(&mut self) -> io::Result<Option<Outcome>> {
            if self.hang {
                return Ok(None);
            }
            if self.polls_left == 0 {
                self.finish();
                return Ok(Some(self.outcome));
            }
            self.polls_left -= 1;
            Ok(None)
        }

        fn kill(&mut self) -> io::Result<()> {
            self.finish();
            Ok(())
        }
    }

    impl Launcher for FakeLauncher {
        type Job = FakeJob;

        fn launch(&self, frame: &FrameDescriptor) -> io::Result<FakeJob> {
            *self.attempts.lock().unwrap().entry(frame.index).or_insert(0) += 1;
            {
                let mut refusals = self.refusals.lock().unwrap();
                if let Some(left) = refusals.get_mut(&frame.index) {
                    if *left > 0 {
                        *left -= 1;
                        return Err(io::Error::new(io::ErrorKind::Other, "fork refused"));
                    }
                }
            }
            let now = self.live.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.launched
                .lock()
                .unwrap()
                .push((thread::current().name().map(String::from), frame.index));
            Ok(FakeJob {
                polls_left: (frame.index * 7) % 5,
                hang: self.hanging.contains(&frame.index),
                outcome: if self.failing.contains(&frame.index) {
                    Outcome::Failed(Some(1))
                } else {
                    Outcome::Succeeded
                },
                live: self.live.clone(),
                done: false,
            })
        }
    }

    fn sorted(mut v: Vec<usize>) -> Vec<usize> {
        v.sort();
        v
    }

    #[test]
    fn gated_never_exceeds_the_ceiling() {
        for &ceiling in &[1, 2, 3, 8] {
            let launcher = FakeLauncher::default();
            let report = orchestrator(ceiling).run_gated(&launcher, frames(30));
            assert!(launcher.peak.load(Ordering::SeqCst) <= ceiling);
            assert_eq!(report.peak_active, ceiling);
            assert_eq!(sorted(report.completed.clone()), (0..30).collect::<Vec<_>>());
            assert!(report.is_success());
            assert_eq!(launcher.live.load(Ordering::SeqCst), 0);
        }
    }

    #[test]
    fn gated_launches_in_index_order() {
        let launcher = FakeLauncher::default();
        orchestrator(4).run_gated(&launcher, frames(20));
        assert_eq!(launcher.launches(), (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn gated_completion_order_is_free() {
        let launcher = FakeLauncher::default();
        let report = orchestrator(5).run_gated(&launcher, frames(20));
        assert_eq!(report.frames(), 20);
        assert_ne!(report.completed, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn zero_ceiling_means_one() {
        let launcher = FakeLauncher::default();
        let report = orchestrator(0).run_gated(&launcher, frames(5));
        assert_eq!(report.peak_active, 1);
        assert_eq!(launcher.peak.load(Ordering::SeqCst), 1);
        assert_eq!(report.completed, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn gated_retries_refused_launches() {
        let launcher = FakeLauncher::default().refuse(4, 2).refuse(0, 1);
        let report = orchestrator(2).run_gated(&launcher, frames(10));
        assert!(report.is_success());
        assert_eq!(launcher.attempts(4), 3);
        assert_eq!(launcher.attempts(0), 2);
        assert_eq!(launcher.launches(), (0..10).collect::<Vec<_>>());
        assert_eq!(sorted(report.completed), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn gated_gives_up_after_repeated_refusals() {
        let launcher = FakeLauncher::default().refuse(2, usize::max_value());
        let report = orchestrator(1).run_gated(&launcher, frames(5));
        assert_eq!(report.failed_indices(), vec![2]);
        match report.failed[0].reason {
            FailureReason::Launch(ref e) => assert!(e.contains("fork refused")),
            ref other => panic!("unexpected reason {:?}", other),
        }
        assert_eq!(launcher.attempts(2), 3);
        assert_eq!(sorted(report.completed), vec![0, 1, 3, 4]);
    }

    #[test]
    fn failed_jobs_are_reported_not_retried() {
        let launcher = FakeLauncher::default().fail(1).fail(5);
        let report = orchestrator(3).run_gated(&launcher, frames(10));
        assert_eq!(report.failed_indices(), vec![1, 5]);
        assert_eq!(report.completed.len(), 8);
        assert_eq!(launcher.attempts(1), 1);
        assert_eq!(launcher.attempts(5), 1);
        assert!(report
            .failed
            .iter()
            .all(|f| f.reason == FailureReason::Job(Outcome::Failed(Some(1)))));
    }

    #[test]
    fn overdue_jobs_are_killed_and_reported() {
        let launcher = FakeLauncher::default().hang(2);
        let report = orchestrator(2)
            .timeout(Some(Duration::from_millis(30)))
            .run_gated(&launcher, frames(6));
        assert_eq!(report.failed_indices(), vec![2]);
        assert_eq!(report.failed[0].reason, FailureReason::Job(Outcome::TimedOut));
        assert_eq!(report.completed.len(), 5);
        assert_eq!(launcher.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn every_frame_belongs_to_exactly_one_stripe() {
        for count in 0..40 {
            for supervisors in 1..9 {
                let owned = stripes(count, supervisors);
                assert_eq!(owned.len(), supervisors);
                let mut seen = vec![0; count];
                for (s, stripe) in owned.iter().enumerate() {
                    for pair in stripe.windows(2) {
                        assert!(pair[0] < pair[1]);
                    }
                    for &index in stripe {
                        assert_eq!(index % supervisors, s);
                        seen[index] += 1;
                    }
                }
                assert!(seen.iter().all(|&n| n == 1));
            }
        }
        assert_eq!(stripes(10, 3), vec![vec![0, 3, 6, 9], vec![1, 4, 7], vec![2, 5, 8]]);
    }

    #[test]
    fn striped_runs_each_stripe_in_order() {
        let launcher = FakeLauncher::default();
        let report = orchestrator(3).run_striped(&launcher, frames(20));
        assert!(report.is_success());
        assert_eq!(sorted(report.completed), (0..20).collect::<Vec<_>>());
        assert!(launcher.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(report.peak_active, 3);

        let mut by_supervisor: HashMap<String, Vec<usize>> = HashMap::new();
        for (name, index) in launcher.launched.lock().unwrap().iter() {
            let name = name.clone().unwrap_or_default();
            by_supervisor.entry(name).or_insert_with(Vec::new).push(*index);
        }
        let owned = stripes(20, 3);
        for s in 0..3 {
            assert_eq!(by_supervisor[&format!("supervisor-{}", s)], owned[s]);
        }
    }

    #[test]
    fn striped_with_more_supervisors_than_frames() {
        let launcher = FakeLauncher::default();
        let report = orchestrator(8).run_striped(&launcher, frames(3));
        assert_eq!(sorted(report.completed), vec![0, 1, 2]);
        assert_eq!(report.peak_active, 3);
    }

    #[test]
    fn striped_reports_failures_and_retries_launches() {
        let launcher = FakeLauncher::default()
            .fail(4)
            .hang(7)
            .refuse(2, 1)
            .refuse(9, usize::max_value());
        let report = orchestrator(4)
            .timeout(Some(Duration::from_millis(30)))
            .run_striped(&launcher, frames(12));
        assert_eq!(report.failed_indices(), vec![4, 7, 9]);
        assert_eq!(report.completed.len(), 9);
        assert_eq!(launcher.attempts(2), 2);
        assert_eq!(launcher.attempts(9), 3);
        assert_eq!(launcher.live.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn run_dispatches_on_discipline() {
        let gated = FakeLauncher::default();
        let striped = FakeLauncher::default();
        let a = orchestrator(2).run(Discipline::Gated, &gated, frames(6));
        let b = orchestrator(2).run(Discipline::Striped, &striped, frames(6));
        assert_eq!(sorted(a.completed), sorted(b.completed));
        let supervised = |l: &(Option<String>, usize)| {
            l.0.as_ref().map_or(false, |n| n.starts_with("supervisor"))
        };
        assert!(!gated.launched.lock().unwrap().iter().any(&supervised));
        assert!(striped.launched.lock().unwrap().iter().all(&supervised));
    }

    #[test]
    fn disciplines_parse() {
        assert_eq!("gated".parse::<Discipline>(), Ok(Discipline::Gated));
        assert_eq!("striped".parse::<Discipline>(), Ok(Discipline::Striped));
        assert!("fifo".parse::<Discipline>().is_err());
        assert_eq!(Discipline::Striped.to_string(), "striped");
    }

    #[test]
    fn backoff_is_capped() {
        let base = Duration::from_millis(1);
        let cap = Duration::from_millis(50);
        assert_eq!(backoff(0, base, cap), base);
        assert_eq!(backoff(3, base, cap), Duration::from_millis(8));
        assert_eq!(backoff(40, base, cap), cap);
    }
}
