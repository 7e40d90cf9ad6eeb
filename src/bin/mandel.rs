extern crate clap;
extern crate env_logger;
extern crate mandelmovie;
extern crate num;

use clap::{App, AppSettings, Arg, ArgMatches};
use mandelmovie::bands::clamp_workers;
use mandelmovie::{compute_image, Error, Framing, Raster};
use num::Complex;
use std::str::FromStr;

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn value_of<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| Error::Config(format!("could not parse {}", name)))
}

const XCENTER: &str = "xcenter";
const YCENTER: &str = "ycenter";
const SCALE: &str = "scale";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const ITERATIONS: &str = "max";
const OUTPUT: &str = "output";
const THREADS: &str = "threads";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Renders one Mandelbrot image")
        .setting(AppSettings::AllowNegativeNumbers)
        .after_help(
            "Some examples are:\n\
             mandel -x -0.5 -y -0.5 -s 0.2\n\
             mandel -x -.38 -y -.665 -s .05 -m 100\n\
             mandel -x 0.286932 -y 0.014287 -s .0005 -m 1000 -t 8",
        )
        .arg(
            Arg::with_name(XCENTER)
                .short("x")
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse X coordinate"))
                .help("X coordinate of image center point"),
        )
        .arg(
            Arg::with_name(YCENTER)
                .short("y")
                .takes_value(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse Y coordinate"))
                .help("Y coordinate of image center point"),
        )
        .arg(
            Arg::with_name(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("4")
                .validator(|s| validate_number::<f64>(&s, "Could not parse scale"))
                .help("Scale of the image in Mandelbrot coordinates (X-axis)"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .short("W")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| validate_number::<usize>(&s, "Could not parse image width"))
                .help("Width of the image in pixels"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .short("H")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| validate_number::<usize>(&s, "Could not parse image height"))
                .help("Height of the image in pixels"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .short("m")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| validate_number::<usize>(&s, "Could not parse iteration count"))
                .help("The maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("mandel.jpg")
                .help("Output file"),
        )
        .arg(
            Arg::with_name(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_number::<usize>(&s, "Could not parse thread count"))
                .help("Number of threads to use (1-20)"),
        )
        .get_matches()
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let framing = Framing {
        center: Complex::new(value_of(matches, XCENTER)?, value_of(matches, YCENTER)?),
        xscale: value_of(matches, SCALE)?,
        width: value_of(matches, WIDTH)?,
        height: value_of(matches, HEIGHT)?,
        max_iterations: value_of(matches, ITERATIONS)?,
    };
    let threads = clamp_workers(value_of(matches, THREADS)?);
    let output = matches.value_of(OUTPUT).unwrap_or("mandel.jpg");

    println!(
        "mandel: x={:.6} y={:.6} xscale={:.6} yscale={:.6} max={} threads={} outfile={}",
        framing.center.re,
        framing.center.im,
        framing.xscale,
        framing.yscale(),
        framing.max_iterations,
        threads,
        output
    );

    let viewport = framing.viewport()?;
    let mut raster = Raster::new(framing.width, framing.height)?;
    compute_image(&mut raster, &viewport, threads)?;
    raster.store(output)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("mandel: {}", e);
        std::process::exit(1);
    }
}
