//! Convert a logger CSV to a coarser sampling interval.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::{
    cli::{create_spinner, Selector},
    config::Config,
    error::{ConvertError, IntervalError},
    series::{
        self, build_aggregation_policy, detect_interval, make_output_file_name,
        AggregationPolicy, IntervalMinutes, TimeSeriesTable,
    },
};

use super::{display_names, has_extension, list_files};

const EXIT: &str = "exit";

/// Runs the whole conversion and returns the path of the new file.
pub fn resample(config: &Config, selector: &mut dyn Selector) -> Result<PathBuf, ConvertError> {
    convert(config, selector, Local::now().date_naive())
}

/// Loads a file and reports its interval without converting it.
pub fn interval(
    config: &Config,
    selector: &mut dyn Selector,
) -> Result<IntervalMinutes, ConvertError> {
    let input = select_input(config, selector)?;
    let (_, current) = load_and_detect(&input)?;

    Ok(current)
}

fn convert(
    config: &Config,
    selector: &mut dyn Selector,
    today: NaiveDate,
) -> Result<PathBuf, ConvertError> {
    let input = select_input(config, selector)?;
    let (table, current) = load_and_detect(&input)?;
    let target = select_target(current, selector)?;

    let policy = build_aggregation_policy(table.columns());
    for (column, agg) in policy.iter() {
        debug!(column, %agg, "Aggregation");
    }

    let bar = create_spinner(format!("Converting to {}-min...", target));
    let written = resample_and_write(&table, target, &policy, &config.output_dir, today, &input);
    match written {
        Ok(_) => bar.finish_with_message(format!(
            "Success. File converted to a {}-min datafile",
            target
        )),
        Err(_) => bar.finish_and_clear(),
    }

    written
}

fn resample_and_write(
    table: &TimeSeriesTable,
    target: IntervalMinutes,
    policy: &AggregationPolicy,
    output_dir: &Path,
    today: NaiveDate,
    input: &Path,
) -> Result<PathBuf, ConvertError> {
    let resampled = series::resample(table, target, policy)?;
    let file_path = make_output_file_name(output_dir, today, target, input);

    Ok(series::write(&resampled, &file_path)?)
}

fn load_and_detect(input: &Path) -> Result<(TimeSeriesTable, IntervalMinutes), ConvertError> {
    let bar = create_spinner(format!("Reading {}...", input.display()));
    let table = series::load(input);
    bar.finish_and_clear();
    let table = table?;

    let current = detect_interval(&table)?;
    println!("{}", current.describe());

    Ok((table, current))
}

fn select_input(config: &Config, selector: &mut dyn Selector) -> Result<PathBuf, ConvertError> {
    let dir = &config.working_dir;
    let files = list_files(dir, |p| has_extension(p, "csv"))
        .map_err(|e| ConvertError::Listing(dir.clone(), e))?;

    if files.is_empty() {
        return Err(ConvertError::NoFiles(dir.clone()));
    }

    let choice = selector
        .select("Select a csv file", &display_names(&files))
        .map_err(ConvertError::Selection)?;

    choice
        .and_then(|i| files.get(i).cloned())
        .ok_or(ConvertError::Cancelled)
}

/// Asks for the target interval. Only intervals at least as long as
/// `current` are accepted.
fn select_target(
    current: IntervalMinutes,
    selector: &mut dyn Selector,
) -> Result<IntervalMinutes, ConvertError> {
    let mut options: Vec<String> = IntervalMinutes::ALL
        .iter()
        .map(|i| i.to_string())
        .collect();
    options.push(EXIT.to_string());

    let choice = selector
        .select("What aggregation would you like to convert to?", &options)
        .map_err(ConvertError::Selection)?;

    let target = choice
        .and_then(|i| IntervalMinutes::ALL.get(i).copied())
        .ok_or(ConvertError::Cancelled)?;

    if target < current {
        return Err(IntervalError::ShorterTarget {
            current: current.minutes(),
            target: target.minutes(),
        }
        .into());
    }

    Ok(target)
}

// -- Tests -------------------------------------------------------------------
