use std::error::Error;

use tagtrail_lib::{
    capture_duration_hours, load_sightings, EpochCorrelator, ExposureStats, SessionSummary,
    Sighting,
};

use crate::cli::{ExposureArgs, StatsArgs};

pub fn run_stats(args: StatsArgs) -> Result<(), Box<dyn Error>> {
    // Session boundaries cover every row; the summary filters to tags
    // itself.
    let sightings = load_sightings(&args.datafile)?;

    match SessionSummary::compute(&sightings) {
        Some(summary) => println!("{summary}"),
        None => println!("No tracking-tag sightings in {}", args.datafile.display()),
    }
    Ok(())
}

pub fn run_exposure(args: ExposureArgs) -> Result<(), Box<dyn Error>> {
    // Constructed first so a bad epoch length fails before any row is read.
    let mut correlator = EpochCorrelator::new(args.epoch_length)?;

    let sightings = load_sightings(&args.datafile)?;
    if sightings.is_empty() {
        println!("No capture rows in {}", args.datafile.display());
        return Ok(());
    }

    let duration_hours = capture_duration_hours(&sightings);
    log::info!("Capture duration: {duration_hours:.2} h");

    let tags = filter_tags(sightings);
    let points = correlator.correlate(&tags);
    let stats = ExposureStats::from_noise_points(
        &points,
        duration_hours,
        args.epoch_length,
        args.prefiltering_minimum,
    );
    println!("{stats}");
    Ok(())
}

fn filter_tags(sightings: Vec<Sighting>) -> Vec<Sighting> {
    let total = sightings.len();
    let tags: Vec<Sighting> = sightings
        .into_iter()
        .filter(Sighting::is_tracking_tag)
        .collect();
    log::debug!("{} of {} rows classified as tracking tags", tags.len(), total);
    tags
}
