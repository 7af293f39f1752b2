//! Inspection output for netCDF inputs and NASA Ames files
//!
//! A [`ConversionPlan`] describes what a conversion of a netCDF file would
//! produce without writing anything. [`print_ffi1001`] renders a parsed NA file.

use crate::config::ConverterConfig;
use crate::errors::Result;
use crate::na1001::Ffi1001;
use crate::netcdf_io::{read_dataset, SkippedVariable};
use crate::time::seconds_after_midnight;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Number of data records shown by [`print_ffi1001`]
const PREVIEW_ROWS: usize = 5;

/// What a conversion of one netCDF file would contain
#[derive(Debug, Clone)]
pub struct ConversionPlan {
    pub path: PathBuf,
    pub time_key: String,
    pub records: usize,
    pub first_date: Option<NaiveDate>,
    /// Variables that become dependent variables, in file order
    pub columns: Vec<String>,
    pub skipped: Vec<SkippedVariable>,
    pub special_comments: usize,
}

impl ConversionPlan {
    /// Header line count of the resulting file.
    pub fn nlhead(&self) -> usize {
        // one normal comment line carries the column names
        crate::na1001::MIN_HEADER_LINES + self.columns.len() + self.special_comments + 1
    }
}

/// Inspect a netCDF file the way `convert` would read it.
pub fn conversion_plan(path: &Path, config: &ConverterConfig) -> Result<ConversionPlan> {
    let dataset = read_dataset(path, config)?;
    let first_date = seconds_after_midnight(&dataset.times).map(|(day, _)| day);

    Ok(ConversionPlan {
        path: dataset.path,
        time_key: dataset.time_key,
        records: dataset.times.len(),
        first_date,
        columns: dataset.columns.into_iter().map(|c| c.name).collect(),
        skipped: dataset.skipped,
        special_comments: dataset.global_attributes.len(),
    })
}

/// Prints a conversion plan.
pub fn print_plan(plan: &ConversionPlan) {
    println!("\n Conversion plan: {}", plan.path.display());
    println!("================================");
    println!("   Time axis: {} ({} records)", plan.time_key, plan.records);
    match plan.first_date {
        Some(date) => println!("   DATE: {}", date.format("%Y %m %d")),
        None => println!("   DATE: (none)"),
    }
    println!("   Special comment lines: {}", plan.special_comments);
    println!("   Header lines: {}", plan.nlhead());

    println!("\n Variables ({})", plan.columns.len());
    if plan.columns.is_empty() {
        println!("   (No variables along {})", plan.time_key);
    }
    for name in &plan.columns {
        println!("    {}", name);
    }

    if !plan.skipped.is_empty() {
        println!("\n Skipped ({})", plan.skipped.len());
        for skipped in &plan.skipped {
            println!("    {}: {}", skipped.name, skipped.reason);
        }
    }
}

/// Prints the header summary and the first records of a NASA Ames file.
pub fn print_ffi1001(na: &Ffi1001) {
    println!("{}", na);
    println!("\n Header");
    println!("==============");
    for line in na.summary().lines() {
        println!("    {}", line);
    }

    if !na.scom().is_empty() {
        println!("\n Special comments");
        for line in na.scom() {
            println!("    {}", line);
        }
    }
    if !na.ncom().is_empty() {
        println!("\n Normal comments");
        for line in na.ncom() {
            println!("    {}", line);
        }
    }

    let records = na.x().len();
    println!("\n Data ({} records)", records);
    for (row, x) in na.x().iter().enumerate().take(PREVIEW_ROWS) {
        let values: Vec<&str> = na
            .v()
            .iter()
            .filter_map(|column| column.get(row).map(String::as_str))
            .collect();
        println!("    {}\t{}", x, values.join("\t"));
    }
    if records > PREVIEW_ROWS {
        println!("    ... {} more", records - PREVIEW_ROWS);
    }
}
