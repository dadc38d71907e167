//! List the data columns of a logger file, ready to paste into a station
//! setup form.

use std::path::Path;

use anyhow::{Context, Result};
use csv::ReaderBuilder;

use crate::{config::Config, series::TIMESTAMP};

const RECORD: &str = "RECORD";

/// Reads the header of `file` in the working directory and returns its data
/// column names joined by spaces.
pub fn columns(config: &Config, file: &str) -> Result<String> {
    let path = config.working_dir.join(file);
    let headers = read_headers(&path)?;

    Ok(data_columns(&headers).join(" "))
}

fn read_headers(path: &Path) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Cannot open `{}`", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Cannot read header of `{}`", path.display()))?;

    Ok(headers.iter().map(|h| h.trim().to_string()).collect())
}

fn data_columns(headers: &[String]) -> Vec<&str> {
    headers
        .iter()
        .map(String::as_str)
        .filter(|h| *h != TIMESTAMP && *h != RECORD)
        .collect()
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn should_list_data_columns() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Site_Hourly.dat"),
            "TIMESTAMP,RECORD,AirTC_Avg, RH ,WS_ms_Max\nTS,RN,Deg C,%,meters/second\n",
        )
        .unwrap();
        let config = Config {
            working_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            downloads_dir: dir.path().to_path_buf(),
        };

        let line = columns(&config, "Site_Hourly.dat").unwrap();

        assert_eq!(line, "AirTC_Avg RH WS_ms_Max");
    }

    #[test]
    fn should_fail_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            working_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            downloads_dir: dir.path().to_path_buf(),
        };

        assert!(columns(&config, "absent.csv").is_err());
    }
}
