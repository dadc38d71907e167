//! Convert raw logger exports to `.csv` or to the `.dat` layout used for
//! server uploads.
//!
//! Raw exports have no header; columns are named `column_1`, `column_2`, ...
//! The first column holds the sample time in one of the known
//! [`RawLayout`]s and is rewritten as `%Y-%m-%d %H:%M:%S`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use tracing::{debug, warn};

use crate::{
    cli::Selector,
    config::Config,
    series::{timestamp::RawLayout, write::format_value},
};

use super::{display_names, has_extension, list_files};

const RECORD_COLUMN: &str = "column_r";

// BAM exports: timestamp, eight measurements, twelve status flags.
const BAM_WIDTH: usize = 21;
const BAM_FLOATS: std::ops::RangeInclusive<usize> = 1..=8;
const BAM_FLAGS: std::ops::RangeInclusive<usize> = 9..=20;

#[derive(Args, Debug, Default)]
pub struct FormatArgs {
    /// Convert the file to .csv
    #[arg(short, long)]
    pub csv: bool,
    /// Convert and reformat to .dat for server uploading
    #[arg(short, long)]
    pub dat: bool,
    /// Add RECORD column for server upload
    #[arg(short, long)]
    pub rec: bool,
    /// Name of the new column to add
    #[arg(long)]
    pub add_col_name: Option<String>,
    /// Index (position) to insert the new column
    #[arg(long)]
    pub add_col_index: Option<usize>,
    /// Value to fill the new column (empty if not given, NaN if given without a value)
    #[arg(long, num_args = 0..=1, default_missing_value = "NaN")]
    pub add_col_val: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    fn width(&self) -> usize {
        self.headers.len()
    }

    fn insert_column(
        &mut self,
        index: usize,
        name: &str,
        values: impl IntoIterator<Item = String>,
    ) {
        self.headers.insert(index, name.to_string());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.insert(index, value);
        }
    }
}

/// Lets the user pick a file in the working directory and converts it.
/// Returns the written file, if any.
pub fn format(
    args: &FormatArgs,
    config: &Config,
    selector: &mut dyn Selector,
) -> Result<Option<PathBuf>> {
    let files = list_files(&config.working_dir, |p| {
        p.extension().is_some() && !has_extension(p, "zip")
    })?;
    if files.is_empty() {
        bail!("No files found in the current directory.");
    }

    let Some(file_path) = selector
        .select("Choose the file to convert.", &display_names(&files))?
        .and_then(|i| files.get(i))
    else {
        return Ok(None);
    };

    convert_file(args, file_path, &config.downloads_dir)
}

fn convert_file(
    args: &FormatArgs,
    file_path: &Path,
    downloads_dir: &Path,
) -> Result<Option<PathBuf>> {
    let mut table = read_raw(file_path)?;

    let layout = normalise_timestamps(&mut table)?;
    debug!(layout = layout.name(), "Normalised timestamps");

    if is_bam_file(file_path) {
        match cast_bam_schema(&table) {
            Ok(cast) => table = cast,
            Err(e) => {
                warn!("{:#}", e);
                println!("Schema mismatch. Proceeding without strict casting.");
            }
        }
    }

    if args.rec && !table.headers.iter().any(|h| h == RECORD_COLUMN) {
        let n = table.rows.len();
        table.insert_column(1.min(table.width()), RECORD_COLUMN, (0..n).map(|i| i.to_string()));
    }

    if let (Some(name), Some(index)) = (&args.add_col_name, args.add_col_index) {
        add_constant_column(&mut table, name, index, args.add_col_val)?;
        println!("Added column '{}' at index {}", name, index);
    }

    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| anyhow!("Invalid file name `{}`", file_path.display()))?;

    if args.dat {
        let out = downloads_dir.join(format!("{}_1.dat", stem));
        write_dat(&table, &out)?;
        println!(".dat file written to {}", out.display());
        Ok(Some(out))
    } else if args.csv {
        if has_extension(file_path, "csv") {
            println!("This is already a .csv file");
            return Ok(None);
        }
        let out = downloads_dir.join(format!("{}.csv", stem));
        write_csv(&table, &out)?;
        println!(".csv file written to {}", out.display());
        Ok(Some(out))
    } else {
        println!("No output format specified. Use --csv or --dat");
        Ok(None)
    }
}

fn read_raw(file_path: &Path) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(file_path)
        .with_context(|| format!("Failed to read file `{}`", file_path.display()))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record =
            record.with_context(|| format!("Failed to read file `{}`", file_path.display()))?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        bail!("`{}` is empty", file_path.display());
    }
    for row in rows.iter_mut() {
        row.resize(width, String::new());
    }

    let headers = (1..=width).map(|i| format!("column_{}", i)).collect();

    Ok(RawTable { headers, rows })
}

/// Detects the layout from the second row (the first if there is only one)
/// and rewrites every timestamp with it.
fn normalise_timestamps(table: &mut RawTable) -> Result<RawLayout> {
    let sample = table
        .rows
        .get(1)
        .or_else(|| table.rows.first())
        .map(|r| r[0].as_str())
        .unwrap_or_default();

    let (layout, parsed) = RawLayout::detect(sample).ok_or_else(|| {
        anyhow!(
            "Format of datetime does not match any known format. \
             Add a new one or fix the file."
        )
    })?;
    println!("Matched {}: {}", layout.name(), parsed);

    for (i, row) in table.rows.iter_mut().enumerate() {
        let normalised = layout.normalise(&row[0]).ok_or_else(|| {
            anyhow!("Row {}: `{}` does not match {}", i + 1, row[0], layout.name())
        })?;
        row[0] = normalised;
    }

    Ok(layout)
}

fn is_bam_file(file_path: &Path) -> bool {
    let name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    ["pm10", "pm2.5", "bam"].iter().any(|tag| name.contains(tag))
}

/// Checks the BAM column types and renders the measurements as floats.
fn cast_bam_schema(table: &RawTable) -> Result<RawTable> {
    if table.width() != BAM_WIDTH {
        bail!("expected {} columns, found {}", BAM_WIDTH, table.width());
    }

    let mut cast = table.clone();
    for (r, row) in cast.rows.iter_mut().enumerate() {
        for (c, cell) in row.iter_mut().enumerate() {
            if cell.is_empty() {
                continue;
            }
            if BAM_FLOATS.contains(&c) {
                let v: f64 = cell.parse().with_context(|| {
                    format!("row {}, column_{}: `{}` is not a float", r + 1, c + 1, cell)
                })?;
                *cell = format_value(v);
            } else if BAM_FLAGS.contains(&c) {
                let v: i8 = cell.parse().with_context(|| {
                    format!(
                        "row {}, column_{}: `{}` is not an 8-bit integer",
                        r + 1,
                        c + 1,
                        cell
                    )
                })?;
                *cell = v.to_string();
            }
        }
    }

    Ok(cast)
}

fn add_constant_column(
    table: &mut RawTable,
    name: &str,
    index: usize,
    value: Option<f64>,
) -> Result<()> {
    if index > table.width() {
        bail!(
            "Failed to add column: index {} is out of bounds for {} columns",
            index,
            table.width()
        );
    }

    let cell = match value {
        Some(v) if v.is_nan() => "NaN".to_string(),
        Some(v) => format_value(v),
        None => String::new(),
    };
    let n = table.rows.len();
    table.insert_column(index, name, std::iter::repeat(cell).take(n));

    Ok(())
}

fn write_dat(table: &RawTable, out: &Path) -> Result<()> {
    create_parent(out)?;
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_path(out)
        .with_context(|| format!("Cannot write `{}`", out.display()))?;

    for row in &table.rows {
        let mut record = row.clone();
        record[0] = format!("\"{}\"", record[0]);
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

fn write_csv(table: &RawTable, out: &Path) -> Result<()> {
    create_parent(out)?;
    let mut writer = WriterBuilder::new()
        .from_path(out)
        .with_context(|| format!("Cannot write `{}`", out.display()))?;

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    Ok(())
}

fn create_parent(out: &Path) -> Result<()> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create `{}`", parent.display()))?;
    }
    Ok(())
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod test {
    use clap::Parser;
    use tempfile::TempDir;

    use super::*;
    use crate::cli::{Cli, Commands, ScriptedSelector};

    const MET: &str = "2024-06-01 13:00:00, 1.5 ,20\n\
        2024-06-01 13:05:00,2,21\n";

    const BAM_ROW: &str = "06/01/24 13:00,1,2,3,4,5,6,7,8,0,0,0,0,0,0,0,0,0,0,0,1";

    fn write_input(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn should_write_dat_layout() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "met.txt", MET);
        let args = FormatArgs {
            dat: true,
            rec: true,
            ..Default::default()
        };

        let out = convert_file(&args, &input, &dir.path().join("Downloads"))
            .unwrap()
            .unwrap();

        assert_eq!(out, dir.path().join("Downloads").join("met_1.dat"));
        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "\"2024-06-01 13:00:00\",0,1.5,20\n\
             \"2024-06-01 13:05:00\",1,2,21\n"
        );
    }

    #[test]
    fn should_write_csv_with_header_and_normalised_time() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "raw.txt", "06/01/24 13:00,5\n06/01/24 14:00,6\n");
        let args = FormatArgs {
            csv: true,
            ..Default::default()
        };

        let out = convert_file(&args, &input, dir.path()).unwrap().unwrap();

        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "column_1,column_2\n\
             2024-06-01 13:00:00,5\n\
             2024-06-01 14:00:00,6\n"
        );
    }

    #[test]
    fn should_not_rewrite_csv_input_as_csv() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "met.csv", MET);
        let args = FormatArgs {
            csv: true,
            ..Default::default()
        };

        assert_eq!(convert_file(&args, &input, dir.path()).unwrap(), None);
    }

    #[test]
    fn should_write_nothing_without_output_flag() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "met.txt", MET);

        assert_eq!(convert_file(&FormatArgs::default(), &input, dir.path()).unwrap(), None);
    }

    #[test]
    fn should_reject_unknown_datetime_layout() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "odd.txt", "1 June 2024,1\n2 June 2024,2\n");
        let args = FormatArgs {
            csv: true,
            ..Default::default()
        };

        assert!(convert_file(&args, &input, dir.path()).is_err());
    }

    #[test]
    fn should_add_constant_column() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "met.txt", MET);
        let args = FormatArgs {
            csv: true,
            add_col_name: Some("flag".to_string()),
            add_col_index: Some(3),
            add_col_val: Some(f64::NAN),
            ..Default::default()
        };

        let out = convert_file(&args, &input, dir.path()).unwrap().unwrap();

        assert_eq!(
            fs::read_to_string(out).unwrap(),
            "column_1,column_2,column_3,flag\n\
             2024-06-01 13:00:00,1.5,20,NaN\n\
             2024-06-01 13:05:00,2,21,NaN\n"
        );
    }

    #[test]
    fn should_reject_out_of_range_column_index() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "met.txt", MET);
        let args = FormatArgs {
            csv: true,
            add_col_name: Some("flag".to_string()),
            add_col_index: Some(9),
            ..Default::default()
        };

        assert!(convert_file(&args, &input, dir.path()).is_err());
    }

    #[test]
    fn should_cast_bam_measurements_to_floats() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "bam_site.txt", &format!("{BAM_ROW}\n{BAM_ROW}\n"));
        let args = FormatArgs {
            csv: true,
            ..Default::default()
        };

        let out = convert_file(&args, &input, dir.path()).unwrap().unwrap();
        let contents = fs::read_to_string(out).unwrap();

        assert!(contents
            .lines()
            .nth(1)
            .unwrap()
            .starts_with("2024-06-01 13:00:00,1.0,2.0,3.0,4.0,5.0,6.0,7.0,8.0,0,0"));
    }

    #[test]
    fn should_keep_uncast_bam_on_mismatch() {
        let table = RawTable {
            headers: vec!["column_1".to_string(), "column_2".to_string()],
            rows: vec![vec!["2024-06-01 13:00:00".to_string(), "x".to_string()]],
        };

        assert!(cast_bam_schema(&table).is_err());
    }

    #[test]
    fn should_detect_bam_file_names() {
        assert!(is_bam_file(Path::new("Site_PM2.5_2024.txt")));
        assert!(is_bam_file(Path::new("pm10.csv")));
        assert!(!is_bam_file(Path::new("met.csv")));
    }

    #[test]
    fn should_skip_zip_archives_in_menu() {
        let dir = TempDir::new().unwrap();
        write_input(&dir, "export.zip", "");
        write_input(&dir, "met.txt", MET);
        let config = Config {
            working_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            downloads_dir: dir.path().join("Downloads"),
        };
        let mut selector = ScriptedSelector::new(&[None]);

        let written = format(&FormatArgs::default(), &config, &mut selector).unwrap();

        assert_eq!(written, None);
        assert_eq!(selector.seen[0].1, vec!["met.txt"]);
    }

    #[test]
    fn should_parse_add_col_val_without_value_as_nan() {
        let cli = Cli::parse_from(["loggerkit", "format", "--add-col-val"]);
        let Commands::Format(args) = cli.command else {
            panic!("expected format");
        };

        assert!(args.add_col_val.unwrap().is_nan());
    }
}
