// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate bandbrot;
extern crate clap;
extern crate env_logger;
extern crate log;
extern crate num_cpus;

use bandbrot::palette::IN_SET;
use bandbrot::{ChannelObserver, RenderConfig, RenderEvent, RenderJob, Viewport};
use clap::{App, Arg, ArgMatches};
use log::{info, warn};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
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

const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const DEEP: &str = "deep";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const ABORT_AFTER: &str = "abort-after";

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get().max(5);

    App::new("bandbrot")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Banded multi-threaded Mandelbrot renderer")
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse image size"))
                .help("Size of the image"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.5,-1.25")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse left lower corner"))
                .help("Left lower corner of the viewport"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("1.0,1.25")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse right upper corner"))
                .help("Right upper corner of the viewport"),
        )
        .arg(
            Arg::with_name(DEEP)
                .long(DEEP)
                .short("d")
                .help("Render the deep-zoom preset instead of the corners given"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("2")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of bands, one thread each"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("10000")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        1_000_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 1000000",
                    )
                })
                .help("Iterations before a point is considered inside the set"),
        )
        .arg(
            Arg::with_name(ABORT_AFTER)
                .required(false)
                .long(ABORT_AFTER)
                .short("a")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        u32::max_value(),
                        "Could not parse row count",
                        "Row count out of range",
                    )
                })
                .help("Request a stop once this many rows have been published"),
        )
        .get_matches()
}

fn config_from(matches: &ArgMatches) -> Result<RenderConfig, String> {
    let size = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<u32>(s, 'x'))
        .ok_or("Error parsing image size")?;
    let viewport = if matches.is_present(DEEP) {
        Viewport::deep_zoom()
    } else {
        let leftlower = matches
            .value_of(LEFTLOWER)
            .and_then(|s| parse_pair::<f64>(s, ','))
            .ok_or("Error parsing left lower corner")?;
        let rightupper = matches
            .value_of(RIGHTUPPER)
            .and_then(|s| parse_pair::<f64>(s, ','))
            .ok_or("Error parsing right upper corner")?;
        Viewport::new(leftlower.0, rightupper.0, leftlower.1, rightupper.1)
            .map_err(|e| e.to_string())?
    };
    let threads = matches
        .value_of(THREADS)
        .and_then(|s| usize::from_str(s).ok())
        .ok_or("Error parsing thread count")?;
    let iterations = matches
        .value_of(ITERATIONS)
        .and_then(|s| u32::from_str(s).ok())
        .ok_or("Error parsing iteration count")?;
    RenderConfig::new(viewport, iterations, threads, size.0, size.1).map_err(|e| e.to_string())
}

fn main() {
    env_logger::init();
    let matches = args();
    let config = match config_from(&matches) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration failure: {}", e);
            std::process::exit(1);
        }
    };
    let abort_after = matches
        .value_of(ABORT_AFTER)
        .and_then(|s| u32::from_str(s).ok());

    let (observer, events) = ChannelObserver::new();
    let mut job = RenderJob::new(Arc::new(observer));
    let started = Instant::now();
    if let Err(e) = job.start(config) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }

    let mut stop_requested = false;
    if abort_after == Some(0) {
        stop_requested = job.request_stop().is_ok();
    }
    let mut published = 0u32;
    for event in events.iter() {
        match event {
            RenderEvent::RowsPublished { first, last } => {
                published += last - first + 1;
                if !stop_requested && abort_after.map_or(false, |n| published >= n) {
                    info!("{} rows published, requesting stop", published);
                    stop_requested = job.request_stop().is_ok();
                }
            }
            RenderEvent::WorkerFault(fault) => warn!("{}", fault),
            RenderEvent::Finished => break,
        }
    }
    let status = job.wait();
    let elapsed = started.elapsed();

    let progress = job.progress();
    let image = job.framebuffer().read_all();
    let in_set = image.pixels().filter(|p| **p == IN_SET).count();
    println!("status: {:?}", status);
    println!("cancelled: {}", if stop_requested { "yes" } else { "no" });
    println!("rows: {}/{}", progress.rows_published, progress.total_rows);
    println!("workers: {}", progress.total_workers);
    println!("in-set pixels: {}", in_set);
    println!("faults: {}", job.faults().len());
    println!("elapsed: {:.3}s", elapsed.as_secs_f64());
}
