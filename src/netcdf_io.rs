//! NetCDF input: time axis, global attributes and time series columns
//!
//! This module loads everything the converter needs from a netCDF file into a
//! [`SourceDataset`]. Values are decoded the CF way: `_FillValue` and
//! `missing_value` become NaN, then `scale_factor` and `add_offset` apply.

use crate::config::ConverterConfig;
use crate::errors::{Nc2NaError, Result};
use crate::time::{check_calendar, TimeUnits};
use chrono::{DateTime, Utc};
use netcdf::{AttributeValue, File, Variable};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One dependent variable along the time axis
#[derive(Debug, Clone, PartialEq)]
pub struct DataColumn {
    pub name: String,
    pub values: Vec<f64>,
}

/// Why a variable was left out of the conversion
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Variable without dimensions
    Scalar,
    /// Variable whose dimensions are not exactly the time dimension
    NotAlongTime { dims: Vec<String> },
    /// Variable whose values cannot be read as numbers
    NotNumeric { reason: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Scalar => write!(f, "scalar variable"),
            SkipReason::NotAlongTime { dims } => write!(f, "dimensions ({})", dims.join(", ")),
            SkipReason::NotNumeric { reason } => write!(f, "not numeric: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedVariable {
    pub name: String,
    pub reason: SkipReason,
}

/// Content of a netCDF file relevant for a FFI 1001 conversion
#[derive(Debug, Clone)]
pub struct SourceDataset {
    pub path: PathBuf,
    pub time_key: String,
    pub times: Vec<DateTime<Utc>>,
    /// String-valued global attributes in file order
    pub global_attributes: Vec<(String, String)>,
    pub columns: Vec<DataColumn>,
    pub skipped: Vec<SkippedVariable>,
}

fn attribute_scalar(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Uchar(v) => Some(f64::from(*v)),
        AttributeValue::Schar(v) => Some(f64::from(*v)),
        AttributeValue::Ushort(v) => Some(f64::from(*v)),
        AttributeValue::Short(v) => Some(f64::from(*v)),
        AttributeValue::Uint(v) => Some(f64::from(*v)),
        AttributeValue::Int(v) => Some(f64::from(*v)),
        AttributeValue::Ulonglong(v) => Some(*v as f64),
        AttributeValue::Longlong(v) => Some(*v as f64),
        AttributeValue::Float(v) => Some(f64::from(*v)),
        AttributeValue::Double(v) => Some(*v),
        _ => None,
    }
}

/// All numeric entries of an attribute; a scalar gives a single entry.
pub fn attribute_to_f64_list(value: &AttributeValue) -> Option<Vec<f64>> {
    let values = match value {
        AttributeValue::Uchars(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Schars(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ushorts(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Shorts(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Uints(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ints(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Ulonglongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Longlongs(v) => v.iter().map(|&x| x as f64).collect(),
        AttributeValue::Floats(v) => v.iter().map(|&x| f64::from(x)).collect(),
        AttributeValue::Doubles(v) => v.clone(),
        other => vec![attribute_scalar(other)?],
    };
    Some(values)
}

/// Numeric value of a scalar attribute, or the first element of an array attribute.
fn attribute_to_f64(value: &AttributeValue) -> Option<f64> {
    attribute_to_f64_list(value)?.first().copied()
}

fn variable_string_attribute(var: &Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn variable_numeric_attribute(var: &Variable, name: &str) -> Option<Vec<f64>> {
    let value = var.attribute_value(name)?.ok()?;
    attribute_to_f64_list(&value)
}

fn variable_scalar_attribute(var: &Variable, name: &str) -> Option<f64> {
    let value = var.attribute_value(name)?.ok()?;
    attribute_to_f64(&value)
}

/// Read a numeric variable with CF mask-and-scale applied.
pub fn read_decoded_values(var: &Variable) -> Result<Vec<f64>> {
    let mut values = var.get_values::<f64, _>(..)?;

    let mut missing = Vec::new();
    for name in ["_FillValue", "missing_value"] {
        if let Some(markers) = variable_numeric_attribute(var, name) {
            missing.extend(markers);
        }
    }
    let scale = variable_scalar_attribute(var, "scale_factor");
    let offset = variable_scalar_attribute(var, "add_offset");

    for value in values.iter_mut() {
        if missing.iter().any(|m| *m == *value) {
            *value = f64::NAN;
            continue;
        }
        if let Some(scale) = scale {
            *value *= scale;
        }
        if let Some(offset) = offset {
            *value += offset;
        }
    }
    Ok(values)
}

/// Decode the time coordinate into UTC timestamps.
pub fn read_time_axis(file: &File, time_key: &str) -> Result<Vec<DateTime<Utc>>> {
    let var = file
        .variable(time_key)
        .ok_or_else(|| Nc2NaError::VariableNotFound {
            var: time_key.to_string(),
        })?;

    let units = variable_string_attribute(&var, "units").ok_or_else(|| {
        Nc2NaError::InvalidTime {
            reason: format!("time variable '{}' has no 'units' attribute", time_key),
        }
    })?;
    let units = TimeUnits::parse(&units)?;
    check_calendar(variable_string_attribute(&var, "calendar").as_deref())?;

    let raw = read_decoded_values(&var)?;
    if raw.iter().any(|v| v.is_nan()) {
        return Err(Nc2NaError::InvalidTime {
            reason: format!("time variable '{}' contains missing values", time_key),
        });
    }
    units.decode(&raw)
}

fn global_string_attributes(file: &File) -> Vec<(String, String)> {
    file.attributes()
        .filter_map(|attr| match attr.value() {
            Ok(AttributeValue::Str(value)) => Some((attr.name().to_string(), value)),
            Ok(_) => None,
            Err(e) => {
                warn!("failed to read global attribute '{}': {}", attr.name(), e);
                None
            }
        })
        .collect()
}

/// Load the time axis, string attributes and time series of a netCDF file.
pub fn read_dataset(path: &Path, config: &ConverterConfig) -> Result<SourceDataset> {
    if !path.exists() {
        return Err(Nc2NaError::PathNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = netcdf::open(path)?;
    let time_key = config.time_key.as_str();

    if file.variable(time_key).is_none() {
        return Err(Nc2NaError::VariableNotFound {
            var: time_key.to_string(),
        });
    }
    let time_len = file
        .dimension(time_key)
        .ok_or_else(|| Nc2NaError::DimensionNotFound {
            dim: time_key.to_string(),
        })?
        .len();
    if time_len == 0 {
        return Err(Nc2NaError::EmptyTimeAxis {
            key: time_key.to_string(),
        });
    }

    let times = read_time_axis(&file, time_key)?;
    if times.len() != time_len {
        return Err(Nc2NaError::InvalidTime {
            reason: format!(
                "time variable '{}' has {} values, dimension has {}",
                time_key,
                times.len(),
                time_len
            ),
        });
    }

    let mut columns = Vec::new();
    let mut skipped = Vec::new();
    for var in file.variables() {
        let name = var.name();
        if name == time_key {
            continue;
        }
        let dims: Vec<String> = var.dimensions().iter().map(|d| d.name()).collect();
        let reason = match dims.as_slice() {
            [] => Some(SkipReason::Scalar),
            [dim] if dim == time_key => None,
            _ => Some(SkipReason::NotAlongTime { dims }),
        };
        if let Some(reason) = reason {
            warn!("skipping variable '{}': {}", name, reason);
            skipped.push(SkippedVariable { name, reason });
            continue;
        }

        match read_decoded_values(&var) {
            Ok(values) => {
                debug!("read {} values of '{}'", values.len(), name);
                columns.push(DataColumn { name, values });
            }
            Err(e) => {
                let reason = SkipReason::NotNumeric {
                    reason: e.to_string(),
                };
                warn!("skipping variable '{}': {}", name, reason);
                skipped.push(SkippedVariable { name, reason });
            }
        }
    }

    Ok(SourceDataset {
        path: path.to_path_buf(),
        time_key: time_key.to_string(),
        times,
        global_attributes: global_string_attributes(&file),
        columns,
        skipped,
    })
}
