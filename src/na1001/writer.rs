//! NASA Ames FFI 1001 writer

use super::{Ffi1001, FFI};
use crate::errors::{Nc2NaError, Result};
use chrono::Datelike;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Serializer settings for FFI 1001 files
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// General delimiter
    pub sep: String,
    /// Delimiter between data columns
    pub sep_data: String,
    /// Replace an existing file at the destination
    pub overwrite: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            sep: " ".to_string(),
            sep_data: "\t".to_string(),
            overwrite: false,
        }
    }
}

/// What happened at the destination path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Overwritten,
    /// Destination existed and overwriting was not allowed
    Skipped,
}

impl Ffi1001 {
    /// Write the file to `path`, creating the parent directory if needed.
    pub fn write_to_path(&self, path: &Path, options: &WriteOptions) -> Result<WriteOutcome> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                fs::create_dir_all(parent)?;
            }
        }

        let outcome = if path.is_file() {
            if !options.overwrite {
                warn!(
                    "write skipped: {} already exists, enable overwrite to replace it",
                    path.display()
                );
                return Ok(WriteOutcome::Skipped);
            }
            WriteOutcome::Overwritten
        } else {
            WriteOutcome::Written
        };

        // Validate before touching the destination
        self.check_consistency()?;

        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer, options)?;
        writer.flush()?;

        debug!("{:?} {}", outcome, path.display());
        Ok(outcome)
    }

    /// Serialize into any writer.
    pub fn write_to<W: Write>(&self, writer: &mut W, options: &WriteOptions) -> Result<()> {
        self.check_consistency()?;

        let sep = options.sep.as_str();
        let mut header: Vec<String> = Vec::with_capacity(self.nlhead());
        header.push(format!("{}{}{}", self.nlhead(), sep, FFI));
        header.push(self.oname.clone());
        header.push(self.org.clone());
        header.push(self.sname.clone());
        header.push(self.mname.clone());
        header.push(format!("{}{}{}", self.ivol, sep, self.nvol));
        header.push(format!(
            "{:04}{sep}{:02}{sep}{:02}{sep}{:04}{sep}{:02}{sep}{:02}",
            self.date.year(),
            self.date.month(),
            self.date.day(),
            self.rdate.year(),
            self.rdate.month(),
            self.rdate.day(),
            sep = sep
        ));
        header.push(self.dx.to_string());
        header.push(self.xname.clone());
        header.push(self.nv().to_string());
        header.push(self.vscal.join(sep));
        header.push(self.vmiss.join(sep));
        header.extend(self.vname().iter().cloned());
        header.push(self.nscoml().to_string());
        header.extend(self.scom().iter().cloned());
        header.push(self.nncoml().to_string());
        header.extend(self.ncom().iter().cloned());

        for (i, line) in header.iter().enumerate() {
            ensure_ascii(line, i + 1)?;
            writeln!(writer, "{}", line)?;
        }

        let nlhead = header.len();
        for (i, x) in self.x().iter().enumerate() {
            let mut line = x.clone();
            for column in self.v() {
                line.push_str(&options.sep_data);
                line.push_str(&column[i]);
            }
            ensure_ascii(&line, nlhead + i + 1)?;
            writeln!(writer, "{}", line)?;
        }

        Ok(())
    }

    fn check_consistency(&self) -> Result<()> {
        let nv = self.nv();
        if self.v().len() != nv {
            return Err(Nc2NaError::InconsistentData {
                message: format!(
                    "n vars in V and VNAME not equal, {} vs. {}",
                    self.v().len(),
                    nv
                ),
            });
        }
        if self.vscal.len() != nv || self.vmiss.len() != nv {
            return Err(Nc2NaError::InconsistentData {
                message: format!(
                    "VSCAL ({}) and VMISS ({}) must have one entry per variable ({})",
                    self.vscal.len(),
                    self.vmiss.len(),
                    nv
                ),
            });
        }
        let rows = self.x().len();
        if let Some((j, column)) = self
            .v()
            .iter()
            .enumerate()
            .find(|(_, column)| column.len() != rows)
        {
            return Err(Nc2NaError::InconsistentData {
                message: format!(
                    "variable {} has {} values, X has {}",
                    self.vname()[j],
                    column.len(),
                    rows
                ),
            });
        }
        Ok(())
    }
}

fn ensure_ascii(line: &str, line_no: usize) -> Result<()> {
    if line.is_ascii() {
        Ok(())
    } else {
        Err(Nc2NaError::Encoding {
            message: format!("line {} is not ASCII: '{}'", line_no, line),
        })
    }
}
