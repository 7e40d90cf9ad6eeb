extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate mandelmovie;
extern crate num;
extern crate num_cpus;

use clap::{App, AppSettings, Arg, ArgMatches};
use mandelmovie::job::default_render_program;
use mandelmovie::{Discipline, Error, Orchestrator, ProcessLauncher, Report, Zoom};
use num::Complex;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Given a string and a separator, returns the two values
/// separated by the separator.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// A specific implementation of parse_pair using a comma and expecting
/// floating point numbers.
fn parse_complex(s: &str) -> Option<Complex<f64>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

fn value_of<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| Error::Config(format!("could not parse --{}", name)))
}

const PROCESSES: &str = "processes";
const THREADS: &str = "threads";
const FRAMES: &str = "frames";
const CENTER: &str = "center";
const SCALE: &str = "scale";
const ZOOM: &str = "zoom";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const OUTDIR: &str = "outdir";
const MANDEL: &str = "mandel";
const DISCIPLINE: &str = "discipline";
const TIMEOUT: &str = "timeout";
const LAUNCH_ATTEMPTS: &str = "launch-attempts";

fn args<'a>(default_processes: &'a str) -> ArgMatches<'a> {
    App::new("mandelmovie")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders a Mandelbrot zoom as a numbered sequence of images")
        .setting(AppSettings::AllowNegativeNumbers)
        .arg(
            Arg::with_name(PROCESSES)
                .long(PROCESSES)
                .short("p")
                .takes_value(true)
                .default_value(default_processes)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse process count",
                        "Process count must be at least 1",
                    )
                })
                .help("Most render jobs to run at once"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        20,
                        "Could not parse thread count",
                        "Thread count must be between 1 and 20",
                    )
                })
                .help("Threads each render job computes with"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("n")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Number of frames"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .default_value("-0.743643887037151,0.131825904205330")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Point the zoom closes in on"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("0.004")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse starting scale",
                        "Starting scale must be positive",
                    )
                })
                .help("Width of the first frame in Mandelbrot coordinates"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("0.97")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        1.0 - std::f64::EPSILON,
                        "Could not parse zoom factor",
                        "Zoom factor must lie strictly between 0 and 1",
                    )
                })
                .help("Each frame's width as a fraction of the previous one"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse output image size"))
                .help("Size of each frame"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("m")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse iteration count",
                        "Iteration count must be at least 1",
                    )
                })
                .help("Maximum iterations per point"),
        )
        .arg(
            Arg::with_name(OUTDIR)
                .long(OUTDIR)
                .short("o")
                .takes_value(true)
                .default_value(".")
                .help("Directory the frames are written to"),
        )
        .arg(
            Arg::with_name(MANDEL)
                .long(MANDEL)
                .takes_value(true)
                .help("The single-image renderer to run (default: mandel beside this program)"),
        )
        .arg(
            Arg::with_name(DISCIPLINE)
                .long(DISCIPLINE)
                .short("d")
                .takes_value(true)
                .possible_values(&["gated", "striped"])
                .default_value("gated")
                .help("How render jobs are handed out"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .long(TIMEOUT)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0.001,
                        1.0e9,
                        "Could not parse timeout",
                        "Timeout must be a positive number of seconds",
                    )
                })
                .help("Seconds after which a render job is killed and counted as failed"),
        )
        .arg(
            Arg::with_name(LAUNCH_ATTEMPTS)
                .long(LAUNCH_ATTEMPTS)
                .takes_value(true)
                .default_value("5")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1000,
                        "Could not parse launch attempt count",
                        "Launch attempts must be between 1 and 1000",
                    )
                })
                .help("Launch failures in a row before a frame is given up on"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<Report, Error> {
    let (width, height): (u16, u16) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair(s, 'x'))
        .ok_or_else(|| Error::Config("could not parse --size".to_string()))?;
    let center = matches
        .value_of(CENTER)
        .and_then(parse_complex)
        .ok_or_else(|| Error::Config("could not parse --center".to_string()))?;
    let outdir = PathBuf::from(matches.value_of(OUTDIR).unwrap_or("."));

    let zoom = Zoom {
        frames: value_of(matches, FRAMES)?,
        center,
        start_scale: value_of(matches, SCALE)?,
        decay: value_of(matches, ZOOM)?,
        width: width as usize,
        height: height as usize,
        max_iterations: value_of(matches, ITERATIONS)?,
        outdir: outdir.clone(),
    };
    let frames = zoom.frames()?;

    let discipline: Discipline = matches
        .value_of(DISCIPLINE)
        .unwrap_or("gated")
        .parse()
        .map_err(Error::Config)?;
    let timeout = match matches.value_of(TIMEOUT) {
        Some(_) => Some(Duration::from_millis(
            (value_of::<f64>(matches, TIMEOUT)? * 1000.0) as u64,
        )),
        None => None,
    };
    let program = matches
        .value_of(MANDEL)
        .map(PathBuf::from)
        .unwrap_or_else(default_render_program);

    fs::create_dir_all(&outdir)?;

    let launcher = ProcessLauncher::new(program, value_of(matches, THREADS)?);
    let orchestrator = Orchestrator::new(value_of(matches, PROCESSES)?)
        .timeout(timeout)
        .launch_attempts(value_of(matches, LAUNCH_ATTEMPTS)?);

    info!(
        "{} frames of {}x{} into {}, running {}",
        zoom.frames,
        width,
        height,
        outdir.display(),
        launcher.program().display()
    );
    Ok(orchestrator.run(discipline, &launcher, frames))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let default_processes = num_cpus::get().to_string();
    let matches = args(&default_processes);
    match run(&matches) {
        Err(e) => {
            eprintln!("mandelmovie: {}", e);
            std::process::exit(1);
        }
        Ok(report) => {
            println!(
                "mandelmovie: {} of {} frames rendered, at most {} at once",
                report.completed.len(),
                report.frames(),
                report.peak_active
            );
            if !report.is_success() {
                let mut failed = report.failed.clone();
                failed.sort_by_key(|f| f.index);
                for failure in &failed {
                    eprintln!("mandelmovie: frame {}: {}", failure.index, failure.reason);
                }
                eprintln!(
                    "mandelmovie: failed frames: {:?}",
                    report.failed_indices()
                );
                std::process::exit(1);
            }
        }
    }
}
