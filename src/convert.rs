//! NetCDF to NASA Ames FFI 1001 conversion
//!
//! The independent variable is the time axis expressed as seconds after
//! midnight of the first time stamp's UTC day; every variable along the time
//! dimension becomes one dependent variable. String global attributes are
//! kept as special comments and a tab separated column header is written as
//! the normal comment.

use crate::config::ConverterConfig;
use crate::errors::{Nc2NaError, Result};
use crate::na1001::{Ffi1001, WriteOptions, WriteOutcome};
use crate::netcdf_io::{read_dataset, SourceDataset};
use crate::time::seconds_after_midnight;
use crate::utils::{format_general, to_header_line};
use chrono::Utc;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Extension of the files picked up from an input directory
pub const NETCDF_EXTENSION: &str = "nc";

/// Extension of the written files
pub const NASA_AMES_EXTENSION: &str = "na";

/// Result of converting one input file
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub outcome: WriteOutcome,
}

/// Outcome of a batch conversion
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<ConvertedFile>,
    /// Outputs that already existed and were left alone
    pub skipped: Vec<ConvertedFile>,
    pub failed: Vec<(PathBuf, Nc2NaError)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.converted.len() + self.skipped.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Build the FFI 1001 representation of a loaded dataset.
pub fn to_ffi1001(dataset: &SourceDataset, config: &ConverterConfig) -> Result<Ffi1001> {
    let (date, offsets) =
        seconds_after_midnight(&dataset.times).ok_or_else(|| Nc2NaError::EmptyTimeAxis {
            key: dataset.time_key.clone(),
        })?;

    let rows = offsets.len();
    if let Some(column) = dataset.columns.iter().find(|c| c.values.len() != rows) {
        return Err(Nc2NaError::InconsistentData {
            message: format!(
                "variable {} has {} values, time axis has {}",
                column.name,
                column.values.len(),
                rows
            ),
        });
    }
    if dataset.columns.is_empty() {
        warn!(
            "{}: no variables along '{}', writing time axis only",
            dataset.path.display(),
            dataset.time_key
        );
    }

    let header = &config.header;
    let mut na = Ffi1001::new();
    na.oname = to_header_line(&header.oname);
    na.org = to_header_line(&header.org);
    na.sname = to_header_line(&header.sname);
    na.mname = to_header_line(&header.mname);
    na.ivol = header.ivol;
    na.nvol = header.nvol;
    na.xname = to_header_line(&header.xname);
    na.date = date;
    na.rdate = header
        .revision_date
        .unwrap_or_else(|| Utc::now().date_naive());
    // the format requires RDATE >= DATE
    if na.rdate < na.date {
        warn!(
            "{}: revision date {} precedes data date {}, using {}",
            dataset.path.display(),
            na.rdate,
            na.date,
            na.date
        );
        na.rdate = na.date;
    }

    na.set_scom(
        dataset
            .global_attributes
            .iter()
            .map(|(name, value)| to_header_line(&format!("{}: {}", name, value)))
            .collect(),
    );

    let names: Vec<String> = dataset
        .columns
        .iter()
        .map(|c| to_header_line(&c.name))
        .collect();
    let delimiter = config.data_delimiter.as_str();
    na.set_ncom(vec![to_header_line(&format!(
        "{}{}{}",
        dataset.time_key,
        delimiter,
        names.join(delimiter)
    ))]);

    na.vscal = vec![config.vscal.clone(); names.len()];
    na.vmiss = vec![config.vmiss.clone(); names.len()];
    na.set_vname(names);

    let precision = config.precision;
    na.set_x(
        offsets
            .iter()
            .map(|&t| format_general(t, precision))
            .collect(),
    )?;
    na.set_v(
        dataset
            .columns
            .par_iter()
            .map(|column| {
                column
                    .values
                    .iter()
                    .map(|&v| format_general(v, precision))
                    .collect::<Vec<String>>()
            })
            .collect(),
    );

    debug!(
        "{}: {} records, {} variables, DX {}",
        dataset.path.display(),
        rows,
        na.nv(),
        na.dx
    );
    Ok(na)
}

/// Destination of the converted `src`: `<stem>.na`, in `output_dir` when given.
pub fn output_path_for(src: &Path, output_dir: Option<&Path>) -> PathBuf {
    let file_name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(".{}", NETCDF_EXTENSION);
    let out_name = match file_name.strip_suffix(&suffix) {
        Some(stem) => format!("{}.{}", stem, NASA_AMES_EXTENSION),
        None => format!("{}.{}", file_name, NASA_AMES_EXTENSION),
    };

    match output_dir {
        Some(dir) => dir.join(out_name),
        None => src.with_file_name(out_name),
    }
}

/// Input files for `path`: the `*.nc` files of a directory (sorted, not
/// recursive), or the path itself when it is a file.
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.exists() {
        return Err(Nc2NaError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        let is_netcdf = entry_path
            .extension()
            .is_some_and(|ext| ext == NETCDF_EXTENSION);
        if is_netcdf && entry_path.is_file() {
            files.push(entry_path);
        }
    }
    if files.is_empty() {
        return Err(Nc2NaError::NoInputFiles {
            path: path.to_path_buf(),
        });
    }
    files.sort();
    Ok(files)
}

/// Convert one netCDF file.
pub fn convert_file(src: &Path, config: &ConverterConfig) -> Result<ConvertedFile> {
    let dataset = read_dataset(src, config)?;
    let na = to_ffi1001(&dataset, config)?;

    let destination = output_path_for(src, config.output_dir.as_deref());
    let options = WriteOptions {
        sep_data: config.data_delimiter.clone(),
        overwrite: config.overwrite,
        ..WriteOptions::default()
    };
    let outcome = na.write_to_path(&destination, &options)?;

    info!(
        "{} -> {} ({:?}, {} records, {} variables)",
        src.display(),
        destination.display(),
        outcome,
        na.x().len(),
        na.nv()
    );
    Ok(ConvertedFile {
        source: src.to_path_buf(),
        destination,
        outcome,
    })
}

/// Convert every input below `path` in parallel; failures are collected, not fatal.
pub fn convert_all(path: &Path, config: &ConverterConfig) -> Result<BatchReport> {
    let inputs = discover_inputs(path)?;
    info!(
        "converting {} file(s) using {} threads",
        inputs.len(),
        rayon::current_num_threads()
    );

    let results: Vec<(PathBuf, Result<ConvertedFile>)> = inputs
        .into_par_iter()
        .map(|src| {
            let result = convert_file(&src, config);
            (src, result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (src, result) in results {
        match result {
            Ok(file) if file.outcome == WriteOutcome::Skipped => report.skipped.push(file),
            Ok(file) => report.converted.push(file),
            Err(e) => {
                warn!("failed to convert {}: {}", src.display(), e);
                report.failed.push((src, e));
            }
        }
    }
    Ok(report)
}
