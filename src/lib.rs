//! nc2na: netCDF time series to NASA Ames FFI 1001 conversion
//!
//! Reads netCDF files holding one time axis and any number of variables along
//! it, and writes them as NASA Ames files of format index 1001 (one
//! independent variable, any number of dependent variables). The NASA Ames
//! side can also be read back and validated.
//!
//! ## Key Features
//!
//! - **FFI 1001 model**: Header counts derived from content, never out of sync
//! - **Reader and writer**: Line-numbered format errors, strict ASCII output
//! - **CF decoding**: Time units, `_FillValue`/`missing_value`, scale and offset
//! - **Batch conversion**: Whole directories converted in parallel using Rayon
//! - **Configuration**: Header fields and output settings from a TOML file
//!
//! ## Module Organization
//!
//! - [`na1001`]: The FFI 1001 data model, reader and writer
//! - [`netcdf_io`]: Loading time axis, attributes and columns from netCDF
//! - [`time`]: CF time unit parsing and seconds after midnight
//! - [`convert`]: netCDF to FFI 1001 conversion of single files and directories
//! - [`metadata`]: Conversion plans and NA file inspection output
//! - [`config`]: TOML configuration
//! - [`parallel`]: Parallel processing configuration
//! - [`errors`]: Centralized error handling
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use nc2na::prelude::*;
//! use std::path::Path;
//!
//! let config = ConverterConfig::default();
//! let converted = convert_file(Path::new("flight.nc"), &config).unwrap();
//! println!("wrote {}", converted.destination.display());
//!
//! let na = Ffi1001::from_path(&converted.destination, &ReadOptions::default()).unwrap();
//! assert_eq!(na.nlhead(), 14 + na.nv() + na.nscoml() + na.nncoml());
//! ```

pub mod config;
pub mod convert;
pub mod errors;
pub mod metadata;
pub mod na1001;
pub mod netcdf_io;
pub mod parallel;
pub mod time;
pub mod utils;

pub use config::{ConverterConfig, HeaderConfig};
pub use convert::{convert_all, convert_file, output_path_for, to_ffi1001, BatchReport};
pub use errors::{Nc2NaError, Result};
pub use na1001::{Dx, Ffi1001, ReadOptions, WriteOptions, WriteOutcome};

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::config::{ConverterConfig, HeaderConfig};
    pub use crate::convert::{convert_all, convert_file, BatchReport, ConvertedFile};
    pub use crate::errors::{Nc2NaError, Result};
    pub use crate::metadata::{conversion_plan, ConversionPlan};
    pub use crate::na1001::{Dx, Ffi1001, ReadOptions, WriteOptions, WriteOutcome};
    pub use crate::netcdf_io::{read_dataset, SourceDataset};
    pub use crate::parallel::ParallelConfig;
}
