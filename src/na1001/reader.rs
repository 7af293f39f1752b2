//! NASA Ames FFI 1001 reader
//!
//! NASA Ames is ASCII by definition. [`ReadOptions::ensure_ascii`] can be
//! relaxed to accept files written with other encodings. UTF-8, Windows-1252
//! and Latin-1 are tried in that order and the decoding that succeeded is
//! logged.

use super::{Dx, Ffi1001, FFI, MIN_HEADER_LINES};
use crate::errors::{Nc2NaError, Result};
use chrono::NaiveDate;
use encoding_rs::WINDOWS_1252;
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Parser settings for FFI 1001 files
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// General delimiter
    pub sep: String,
    /// Delimiter used exclusively in the data block
    pub sep_data: String,
    /// Remove surrounding whitespace from all lines before parsing
    pub strip_lines: bool,
    /// Derive the number of normal comment lines from NLHEAD
    pub auto_nncoml: bool,
    /// Collapse repeated general delimiters (e.g. double spaces)
    pub remove_repeated_seps: bool,
    /// VSCAL and VMISS hold one entry per line instead of one line each
    pub vscal_vmiss_vertical: bool,
    /// Reject anything that is not pure ASCII
    pub ensure_ascii: bool,
    /// Accept files that only contain a header
    pub allow_empty_data: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sep: " ".to_string(),
            sep_data: "\t".to_string(),
            strip_lines: true,
            auto_nncoml: true,
            remove_repeated_seps: false,
            vscal_vmiss_vertical: false,
            ensure_ascii: true,
            allow_empty_data: false,
        }
    }
}

impl Ffi1001 {
    /// Load a NASA Ames 1001 file from disk.
    pub fn from_path(path: &Path, options: &ReadOptions) -> Result<Self> {
        let bytes = fs::read(path)?;
        let mut na = parse(&bytes, options, &path.display().to_string())?;
        na.src = Some(path.to_path_buf());
        Ok(na)
    }

    /// Load a NASA Ames 1001 file from any byte source.
    pub fn from_reader<R: Read>(mut reader: R, options: &ReadOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        parse(&bytes, options, "<reader>")
    }
}

/// Bytes without a character in Windows-1252
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

fn decode(bytes: &[u8], ensure_ascii: bool, source: &str) -> Result<String> {
    if bytes.is_ascii() {
        // ASCII is valid UTF-8
        return Ok(String::from_utf8_lossy(bytes).into_owned());
    }
    if ensure_ascii {
        return Err(Nc2NaError::Encoding {
            message: "could not decode input (ASCII-only: true)".to_string(),
        });
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        warn!("non-ascii encoding 'utf-8' used in file {}", source);
        return Ok(text.to_string());
    }
    if !bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
        let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
        warn!("non-ascii encoding 'cp1252' used in file {}", source);
        return Ok(text.into_owned());
    }
    warn!("non-ascii encoding 'latin-1' used in file {}", source);
    Ok(bytes.iter().map(|&b| char::from(b)).collect())
}

fn parse_ints(line: &str, line_no: usize) -> Result<Vec<i64>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<i64>().map_err(|_| {
                Nc2NaError::format(line_no, format!("expected integers, got '{}'", line))
            })
        })
        .collect()
}

fn parse_count(line: &str, line_no: usize, what: &str) -> Result<usize> {
    line.trim().parse::<usize>().map_err(|_| {
        Nc2NaError::format(line_no, format!("invalid {} '{}'", what, line))
    })
}

fn make_date(parts: &[i64], line_no: usize) -> Result<NaiveDate> {
    let invalid = || {
        Nc2NaError::format(
            line_no,
            format!("invalid date {:04}-{:02}-{:02}", parts[0], parts[1], parts[2]),
        )
    };
    let year = i32::try_from(parts[0]).map_err(|_| invalid())?;
    let month = u32::try_from(parts[1]).map_err(|_| invalid())?;
    let day = u32::try_from(parts[2]).map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn parse_dx(line: &str, line_no: usize) -> Result<Dx> {
    let invalid = || Nc2NaError::format(line_no, format!("invalid DX '{}'", line));
    if line.contains('.') {
        line.trim().parse::<f64>().map(Dx::Float).map_err(|_| invalid())
    } else {
        line.trim().parse::<i64>().map(Dx::Int).map_err(|_| invalid())
    }
}

fn parse(bytes: &[u8], options: &ReadOptions, source: &str) -> Result<Ffi1001> {
    let decoded = decode(bytes, options.ensure_ascii, source)?;

    let mut lines: Vec<String> = decoded.split('\n').map(str::to_string).collect();
    if options.strip_lines {
        for line in lines.iter_mut() {
            *line = line.trim().to_string();
        }
    }
    if options.remove_repeated_seps && !options.sep.is_empty() {
        let doubled = options.sep.repeat(2);
        for line in lines.iter_mut() {
            while line.contains(&doubled) {
                *line = line.replace(&doubled, &options.sep);
            }
        }
    }

    let first = parse_ints(&lines[0], 1)?;
    let [nlhead, ffi] = first.as_slice() else {
        return Err(Nc2NaError::format(
            1,
            format!("expected 'NLHEAD FFI', got '{}'", lines[0]),
        ));
    };
    if *nlhead < MIN_HEADER_LINES as i64 + 1 {
        return Err(Nc2NaError::format(
            1,
            format!(
                "NASA Ames FFI 1001 has at least 15 header lines (specified: {})",
                nlhead
            ),
        ));
    }
    if *ffi != FFI as i64 {
        return Err(Nc2NaError::format(
            1,
            format!("reader is for FFI 1001 only, got {}", ffi),
        ));
    }
    let nlhead = *nlhead as usize;
    if lines.len() < nlhead {
        return Err(Nc2NaError::format(
            lines.len(),
            format!("file ends after {} lines, NLHEAD is {}", lines.len(), nlhead),
        ));
    }

    let (header, data) = lines.split_at(nlhead);
    let has_data = data.iter().any(|l| !l.trim().is_empty());
    if !has_data && !options.allow_empty_data {
        return Err(Nc2NaError::format(nlhead + 1, "no data found."));
    }

    let mut na = Ffi1001 {
        oname: header[1].clone(),
        org: header[2].clone(),
        sname: header[3].clone(),
        mname: header[4].clone(),
        ..Ffi1001::default()
    };

    let vol = parse_ints(&header[5], 6)?;
    let [ivol, nvol] = vol.as_slice() else {
        return Err(Nc2NaError::format(
            6,
            format!("expected 'IVOL NVOL', got '{}'", header[5]),
        ));
    };
    na.ivol = u32::try_from(*ivol)
        .map_err(|_| Nc2NaError::format(6, format!("invalid IVOL {}", ivol)))?;
    na.nvol = u32::try_from(*nvol)
        .map_err(|_| Nc2NaError::format(6, format!("invalid NVOL {}", nvol)))?;

    let dates = parse_ints(&header[6], 7)?;
    if dates.len() != 6 {
        return Err(Nc2NaError::format(
            7,
            format!("expected 'DATE RDATE' as six integers, got '{}'", header[6]),
        ));
    }
    na.date = make_date(&dates[..3], 7)?;
    na.rdate = make_date(&dates[3..], 7)?;
    if na.date > na.rdate {
        return Err(Nc2NaError::format(
            7,
            format!(
                "RDATE must be greater or equal to DATE, have DATE {}, RDATE {}",
                na.date, na.rdate
            ),
        ));
    }

    na.dx = parse_dx(&header[7], 8)?;
    na.xname = header[8].clone();

    let nv = parse_count(&header[9], 10, "NV")?;
    // every variable takes at least one VNAME line
    if nv > nlhead {
        return Err(Nc2NaError::format(
            10,
            format!("NV {} exceeds header size (NLHEAD {})", nv, nlhead),
        ));
    }

    // Index of the first line after VSCAL and VMISS
    let (vscal, vmiss, after_scale) = if options.vscal_vmiss_vertical {
        let end = 10 + 2 * nv;
        if end > nlhead {
            return Err(Nc2NaError::format(10, format!("NV {} exceeds header size", nv)));
        }
        (
            header[10..10 + nv].to_vec(),
            header[10 + nv..end].to_vec(),
            end,
        )
    } else {
        (
            header[10].split_whitespace().map(str::to_string).collect::<Vec<_>>(),
            header[11].split_whitespace().map(str::to_string).collect::<Vec<_>>(),
            12,
        )
    };
    if vscal.len() != nv {
        return Err(Nc2NaError::format(
            11,
            format!(
                "number of elements in VSCAL (have: {}) must match number of variables specified ({})",
                vscal.len(),
                nv
            ),
        ));
    }
    if vmiss.len() != nv {
        return Err(Nc2NaError::format(
            if options.vscal_vmiss_vertical { 11 + nv } else { 12 },
            format!(
                "number of elements in VMISS (have: {}) must match number of variables specified ({})",
                vmiss.len(),
                nv
            ),
        ));
    }
    na.vscal = vscal;
    na.vmiss = vmiss;

    let nscoml_idx = after_scale + nv;
    // NSCOML line plus NNCOML line must still fit in the header
    if nscoml_idx + 2 > nlhead {
        return Err(Nc2NaError::format(
            nscoml_idx,
            format!("NLHEAD {} too small for {} variables", nlhead, nv),
        ));
    }
    na.set_vname(header[after_scale..nscoml_idx].to_vec());

    let nscoml = parse_count(&header[nscoml_idx], nscoml_idx + 1, "NSCOML")?;
    if nscoml >= nlhead || nscoml_idx + 1 + nscoml >= nlhead {
        return Err(Nc2NaError::format(
            nscoml_idx + 1,
            format!("NSCOML {} exceeds header size (NLHEAD {})", nscoml, nlhead),
        ));
    }
    let nncoml_idx = nscoml_idx + 1 + nscoml;
    na.set_scom(header[nscoml_idx + 1..nncoml_idx].to_vec());

    let remaining = nlhead - (nncoml_idx + 1);
    let nncoml = if options.auto_nncoml {
        remaining
    } else {
        parse_count(&header[nncoml_idx], nncoml_idx + 1, "NNCOML")?
    };
    if nncoml != remaining {
        return Err(Nc2NaError::format(
            nncoml_idx + 1,
            format!(
                "NLHEAD {} does not match header content: NNCOML {} but {} comment lines remain",
                nlhead, nncoml, remaining
            ),
        ));
    }
    na.set_ncom(header[nncoml_idx + 1..nlhead].to_vec());
    na.header = header.to_vec();

    debug!(
        "parsed header of {}: NLHEAD {}, NV {}, NSCOML {}, NNCOML {}",
        source, nlhead, nv, nscoml, nncoml
    );

    let mut x = Vec::new();
    let mut v: Vec<Vec<String>> = vec![Vec::new(); nv];
    for (ix, line) in data.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.split(options.sep_data.as_str()).collect();
        if parts.len() != nv + 1 {
            return Err(Nc2NaError::format(
                ix + nlhead + 1,
                format!(
                    "invalid number of parameters, have {}, want {}",
                    parts.len(),
                    nv + 1
                ),
            ));
        }
        x.push(parts[0].trim().to_string());
        for (column, part) in v.iter_mut().zip(&parts[1..]) {
            column.push(part.trim().to_string());
        }
    }
    na.set_data_raw(x, v);

    Ok(na)
}
