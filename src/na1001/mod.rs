//! NASA Ames File Format Index 1001 model
//!
//! FFI 1001 is the simplest NASA Ames layout: one independent variable (X)
//! and any number of dependent variables (V) sharing it, stored as ASCII
//! text. The header counts (`NV`, `NSCOML`, `NNCOML`, `NLHEAD`) are derived
//! from the stored blocks so they always agree with the content.
//!
//! Parsing lives in [`reader`], serialization in [`writer`].

pub mod reader;
pub mod writer;

use crate::errors::{Nc2NaError, Result};
use chrono::{NaiveDate, Utc};
use std::fmt;
use std::path::PathBuf;

pub use reader::ReadOptions;
pub use writer::{WriteOptions, WriteOutcome};

/// File format index handled by this module
pub const FFI: u32 = 1001;

/// Number of header lines in an FFI 1001 file without variables or comments
pub const MIN_HEADER_LINES: usize = 14;

/// Interval between independent variable values.
///
/// NASA Ames writes integral intervals without a decimal point, so the
/// integer/float distinction is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dx {
    Int(i64),
    Float(f64),
}

impl Default for Dx {
    fn default() -> Self {
        Dx::Int(0)
    }
}

impl Dx {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Dx::Int(v) => v as f64,
            Dx::Float(v) => v,
        }
    }

    /// Derives the interval from consecutive X values.
    ///
    /// Differences are rounded to 4 decimals; a single unique difference is
    /// the interval, anything else (no data, irregular spacing) gives 0.
    pub fn from_values(x: &[f64]) -> Self {
        let mut diffs: Vec<f64> = x
            .windows(2)
            .map(|w| ((w[1] - w[0]) * 1e4).round() / 1e4)
            .collect();
        if diffs.iter().any(|d| !d.is_finite()) {
            return Dx::Int(0);
        }
        diffs.sort_by(|a, b| a.total_cmp(b));
        diffs.dedup();

        match diffs.as_slice() {
            [dx] => {
                let truncated = dx.trunc();
                if (dx - truncated).abs() <= 1e-8 + 1e-5 * truncated.abs() {
                    Dx::Int(truncated as i64)
                } else {
                    Dx::Float(*dx)
                }
            }
            _ => Dx::Int(0),
        }
    }
}

impl fmt::Display for Dx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Dx::Int(v) => write!(f, "{}", v),
            Dx::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Dx::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A NASA Ames FFI 1001 file
#[derive(Debug, Clone, PartialEq)]
pub struct Ffi1001 {
    pub oname: String,
    pub org: String,
    pub sname: String,
    pub mname: String,
    pub ivol: u32,
    pub nvol: u32,
    pub date: NaiveDate,
    pub rdate: NaiveDate,
    pub dx: Dx,
    pub xname: String,
    pub vscal: Vec<String>,
    pub vmiss: Vec<String>,
    vname: Vec<String>,
    scom: Vec<String>,
    ncom: Vec<String>,
    x: Vec<String>,
    v: Vec<Vec<String>>,
    /// Path the file was parsed from, `None` for in-memory sources
    pub src: Option<PathBuf>,
    /// Raw header lines of a parsed file
    pub header: Vec<String>,
}

impl Default for Ffi1001 {
    fn default() -> Self {
        Self {
            oname: "data origin".to_string(),
            org: "organization".to_string(),
            sname: "sampling description".to_string(),
            mname: "mission name".to_string(),
            ivol: 1,
            nvol: 1,
            date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            rdate: Utc::now().date_naive(),
            dx: Dx::default(),
            xname: "x name".to_string(),
            vscal: vec!["1".to_string()],
            vmiss: vec!["-9999".to_string()],
            vname: vec!["v names".to_string()],
            scom: vec!["special comments".to_string()],
            ncom: vec!["normal comments".to_string()],
            x: vec![String::new()],
            v: vec![vec![String::new()]],
            src: None,
            header: Vec::new(),
        }
    }
}

impl Ffi1001 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ffi(&self) -> u32 {
        FFI
    }

    /// Number of dependent variables
    pub fn nv(&self) -> usize {
        self.vname.len()
    }

    /// Number of special comment lines
    pub fn nscoml(&self) -> usize {
        self.scom.len()
    }

    /// Number of normal comment lines
    pub fn nncoml(&self) -> usize {
        self.ncom.len()
    }

    /// Number of header lines, including the first line
    pub fn nlhead(&self) -> usize {
        MIN_HEADER_LINES + self.nv() + self.nscoml() + self.nncoml()
    }

    pub fn vname(&self) -> &[String] {
        &self.vname
    }

    pub fn set_vname(&mut self, names: Vec<String>) {
        self.vname = names;
    }

    pub fn scom(&self) -> &[String] {
        &self.scom
    }

    pub fn set_scom(&mut self, lines: Vec<String>) {
        self.scom = lines;
    }

    pub fn ncom(&self) -> &[String] {
        &self.ncom
    }

    pub fn set_ncom(&mut self, lines: Vec<String>) {
        self.ncom = lines;
    }

    pub fn x(&self) -> &[String] {
        &self.x
    }

    /// Stores the independent variable and derives [`Dx`] from it.
    pub fn set_x(&mut self, values: Vec<String>) -> Result<()> {
        let parsed = values
            .iter()
            .map(|s| {
                s.trim().parse::<f64>().map_err(|_| Nc2NaError::InconsistentData {
                    message: format!("independent variable value '{}' is not numeric", s),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        self.dx = Dx::from_values(&parsed);
        self.x = values;
        Ok(())
    }

    pub fn v(&self) -> &[Vec<String>] {
        &self.v
    }

    pub fn set_v(&mut self, columns: Vec<Vec<String>>) {
        self.v = columns;
    }

    /// Replaces X and V as read from a file, keeping the header's DX.
    pub(crate) fn set_data_raw(&mut self, x: Vec<String>, v: Vec<Vec<String>>) {
        self.x = x;
        self.v = v;
    }

    /// Values of dependent variable `index`; missing or non-numeric entries are `None`.
    pub fn column_values(&self, index: usize) -> Option<Vec<Option<f64>>> {
        let column = self.v.get(index)?;
        let vmiss = self.vmiss.get(index).map(|s| s.as_str());
        Some(
            column
                .iter()
                .map(|s| {
                    if Some(s.as_str()) == vmiss {
                        None
                    } else {
                        s.parse::<f64>().ok()
                    }
                })
                .collect(),
        )
    }

    /// Multi-line listing of every header key.
    pub fn summary(&self) -> String {
        let src = self
            .src
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        let mut s = format!("NASA Ames {}\n---\n", self.ffi());
        s.push_str(&format!("SRC : {}\n", src));
        s.push_str(&format!("NLHEAD : {}\n", self.nlhead()));
        s.push_str(&format!("ONAME : {}\n", self.oname));
        s.push_str(&format!("ORG : {}\n", self.org));
        s.push_str(&format!("SNAME : {}\n", self.sname));
        s.push_str(&format!("MNAME : {}\n", self.mname));
        s.push_str(&format!("IVOL : {}\n", self.ivol));
        s.push_str(&format!("NVOL : {}\n", self.nvol));
        s.push_str(&format!("DATE : {}\n", self.date));
        s.push_str(&format!("RDATE : {}\n", self.rdate));
        s.push_str(&format!("DX : {}\n", self.dx));
        s.push_str(&format!("XNAME : {}\n", self.xname));
        s.push_str(&format!("NV : {}\n", self.nv()));
        s.push_str(&format!("VSCAL : {:?}\n", self.vscal));
        s.push_str(&format!("VMISS : {:?}\n", self.vmiss));
        s.push_str(&format!("VNAME : {:?}\n", self.vname));
        s.push_str(&format!("NSCOML : {}\n", self.nscoml()));
        s.push_str(&format!("SCOM : {:?}\n", self.scom));
        s.push_str(&format!("NNCOML : {}\n", self.nncoml()));
        s.push_str(&format!("NCOM : {:?}\n", self.ncom));
        s
    }
}

impl fmt::Display for Ffi1001 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let src = self
            .src
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<memory>".to_string());
        writeln!(f, "NASA Ames {}", self.ffi())?;
        writeln!(f, "SRC: {}", src)?;
        writeln!(f, "---")?;
        writeln!(f, "ONAME: {}", self.oname)?;
        writeln!(f, "ORG: {}", self.org)?;
        writeln!(f, "SNAME: {}", self.sname)?;
        write!(f, "DATE: {}, RDATE: {}", self.date, self.rdate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dx_regular_integer_spacing() {
        assert_eq!(Dx::from_values(&[0.0, 10.0, 20.0, 30.0]), Dx::Int(10));
    }

    #[test]
    fn dx_irregular_spacing_is_zero() {
        assert_eq!(Dx::from_values(&[0.0, 10.0, 25.0]), Dx::Int(0));
    }

    #[test]
    fn dx_fractional_spacing() {
        assert_eq!(Dx::from_values(&[0.0, 0.5, 1.0]), Dx::Float(0.5));
    }

    #[test]
    fn dx_rounding_absorbs_float_noise() {
        assert_eq!(Dx::from_values(&[0.1, 0.2, 0.3, 0.4]), Dx::Float(0.1));
        assert_eq!(Dx::from_values(&[1.00001, 2.00002, 3.00003]), Dx::Int(1));
    }

    #[test]
    fn dx_without_differences() {
        assert_eq!(Dx::from_values(&[]), Dx::Int(0));
        assert_eq!(Dx::from_values(&[42.0]), Dx::Int(0));
        assert_eq!(Dx::from_values(&[0.0, f64::NAN]), Dx::Int(0));
    }

    #[test]
    fn dx_display() {
        assert_eq!(Dx::Int(10).to_string(), "10");
        assert_eq!(Dx::Float(0.5).to_string(), "0.5");
        assert_eq!(Dx::Float(2.0).to_string(), "2.0");
    }

    #[test]
    fn header_counts_follow_blocks() {
        let mut na = Ffi1001::new();
        assert_eq!(na.nlhead(), 17);

        na.set_vname(strings(&["o3", "no2", "co"]));
        na.set_scom(Vec::new());
        na.set_ncom(strings(&["time\to3\tno2\tco", "second line"]));
        assert_eq!(na.nv(), 3);
        assert_eq!(na.nscoml(), 0);
        assert_eq!(na.nncoml(), 2);
        assert_eq!(na.nlhead(), 19);
    }

    #[test]
    fn set_x_derives_dx() {
        let mut na = Ffi1001::new();
        na.set_x(strings(&["3600", "3610", "3620"])).unwrap();
        assert_eq!(na.dx, Dx::Int(10));
        assert_eq!(na.x().len(), 3);
    }

    #[test]
    fn set_x_rejects_non_numeric() {
        let mut na = Ffi1001::new();
        let result = na.set_x(strings(&["0", "ten"]));
        assert!(matches!(result, Err(Nc2NaError::InconsistentData { .. })));
    }

    #[test]
    fn column_values_treat_vmiss_as_missing() {
        let mut na = Ffi1001::new();
        na.vmiss = strings(&["-9999"]);
        na.set_v(vec![strings(&["1.5", "-9999", "abc", "2"])]);
        assert_eq!(
            na.column_values(0).unwrap(),
            vec![Some(1.5), None, None, Some(2.0)]
        );
        assert!(na.column_values(1).is_none());
    }

    #[test]
    fn display_lists_origin_and_dates() {
        let mut na = Ffi1001::new();
        na.rdate = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let text = na.to_string();
        assert!(text.starts_with("NASA Ames 1001\nSRC: <memory>\n---\n"));
        assert!(text.contains("ONAME: data origin"));
        assert!(text.ends_with("DATE: 1970-01-01, RDATE: 2024-05-01"));
    }

    #[test]
    fn summary_lists_every_key() {
        let na = Ffi1001::new();
        let summary = na.summary();
        for key in [
            "SRC", "NLHEAD", "ONAME", "ORG", "SNAME", "MNAME", "IVOL", "NVOL", "DATE", "RDATE",
            "DX", "XNAME", "NV", "VSCAL", "VMISS", "VNAME", "NSCOML", "SCOM", "NNCOML", "NCOM",
        ] {
            assert!(summary.contains(&format!("{} : ", key)), "missing {}", key);
        }
    }
}
