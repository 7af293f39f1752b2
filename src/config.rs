//! Converter configuration
//!
//! Settings are read from an optional TOML file; every field has a default
//! so an empty file (or no file) reproduces the stock converter behaviour.

use crate::errors::{Nc2NaError, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level converter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConverterConfig {
    /// Name of the time variable and dimension.
    #[serde(default = "default_time_key")]
    pub time_key: String,

    /// Delimiter between data columns.
    #[serde(default = "default_data_delimiter")]
    pub data_delimiter: String,

    /// VSCAL entry written for every variable.
    #[serde(default = "default_vscal")]
    pub vscal: String,

    /// VMISS entry written for every variable.
    #[serde(default = "default_vmiss")]
    pub vmiss: String,

    /// Significant digits of the general number format.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Replace existing output files.
    #[serde(default = "default_true")]
    pub overwrite: bool,

    /// Directory for output files, next to the inputs when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// NASA Ames header fields.
    #[serde(default)]
    pub header: HeaderConfig,
}

/// Header fields that cannot be derived from the netCDF content.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeaderConfig {
    #[serde(default = "default_oname")]
    pub oname: String,
    #[serde(default = "default_org")]
    pub org: String,
    #[serde(default = "default_sname")]
    pub sname: String,
    #[serde(default = "default_mname")]
    pub mname: String,
    #[serde(default = "default_volume")]
    pub ivol: u32,
    #[serde(default = "default_volume")]
    pub nvol: u32,
    #[serde(default = "default_xname")]
    pub xname: String,
    /// Revision date; today (UTC) when unset.
    #[serde(default)]
    pub revision_date: Option<NaiveDate>,
}

fn default_time_key() -> String {
    "time".to_string()
}
fn default_data_delimiter() -> String {
    "\t".to_string()
}
fn default_vscal() -> String {
    "1".to_string()
}
fn default_vmiss() -> String {
    "nan".to_string()
}
fn default_precision() -> usize {
    6
}
fn default_true() -> bool {
    true
}
fn default_oname() -> String {
    "data origin: nc 2 na converter".to_string()
}
fn default_org() -> String {
    "organization".to_string()
}
fn default_sname() -> String {
    "sampling description".to_string()
}
fn default_mname() -> String {
    "mission name".to_string()
}
fn default_volume() -> u32 {
    1
}
fn default_xname() -> String {
    "seconds after midnight on DATE".to_string()
}

impl Default for HeaderConfig {
    fn default() -> Self {
        Self {
            oname: default_oname(),
            org: default_org(),
            sname: default_sname(),
            mname: default_mname(),
            ivol: default_volume(),
            nvol: default_volume(),
            xname: default_xname(),
            revision_date: None,
        }
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            time_key: default_time_key(),
            data_delimiter: default_data_delimiter(),
            vscal: default_vscal(),
            vmiss: default_vmiss(),
            precision: default_precision(),
            overwrite: default_true(),
            output_dir: None,
            header: HeaderConfig::default(),
        }
    }
}

impl ConverterConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Nc2NaError::Config {
            path: origin.to_path_buf(),
            reason: e.to_string(),
        })?;
        config.validate(origin)?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Nc2NaError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text, path)
    }

    /// Read `path` when given, defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let fail = |reason: &str| -> Result<()> {
            Err(Nc2NaError::Config {
                path: origin.to_path_buf(),
                reason: reason.to_string(),
            })
        };
        if self.time_key.trim().is_empty() {
            return fail("time_key must not be empty");
        }
        if self.data_delimiter.is_empty() {
            return fail("data_delimiter must not be empty");
        }
        if self.precision == 0 {
            return fail("precision must be at least 1");
        }
        if self.vscal.contains(char::is_whitespace) || self.vmiss.contains(char::is_whitespace) {
            return fail("vscal and vmiss must not contain whitespace");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ConverterConfig::from_toml_str("", Path::new("nc2na.toml")).unwrap();
        assert_eq!(config.time_key, "time");
        assert_eq!(config.data_delimiter, "\t");
        assert_eq!(config.vscal, "1");
        assert_eq!(config.vmiss, "nan");
        assert_eq!(config.precision, 6);
        assert!(config.overwrite);
        assert!(config.output_dir.is_none());
        assert_eq!(config.header.oname, "data origin: nc 2 na converter");
        assert_eq!(config.header.xname, "seconds after midnight on DATE");
        assert!(config.header.revision_date.is_none());
    }

    #[test]
    fn header_overrides() {
        let text = r#"
time_key = "Time"
precision = 8
output_dir = "out"

[header]
org = "Institute of Meteorology"
mname = "summer campaign"
revision_date = "2024-05-01"
"#;
        let config = ConverterConfig::from_toml_str(text, Path::new("nc2na.toml")).unwrap();
        assert_eq!(config.time_key, "Time");
        assert_eq!(config.precision, 8);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(config.header.org, "Institute of Meteorology");
        assert_eq!(config.header.mname, "summer campaign");
        assert_eq!(config.header.sname, "sampling description");
        assert_eq!(
            config.header.revision_date,
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
    }

    #[test]
    fn unknown_keys_rejected() {
        let result = ConverterConfig::from_toml_str("tme_key = \"t\"", Path::new("bad.toml"));
        assert!(matches!(result, Err(Nc2NaError::Config { .. })));
    }

    #[test]
    fn invalid_values_rejected() {
        assert!(ConverterConfig::from_toml_str("precision = 0", Path::new("c.toml")).is_err());
        assert!(ConverterConfig::from_toml_str("vmiss = \"-9 9\"", Path::new("c.toml")).is_err());
        assert!(ConverterConfig::from_toml_str("data_delimiter = \"\"", Path::new("c.toml")).is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let result = ConverterConfig::from_file(Path::new("/nonexistent/nc2na.toml"));
        assert!(matches!(result, Err(Nc2NaError::Config { .. })));
    }
}
