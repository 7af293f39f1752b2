//! Defines command-line interface options using `clap` for the nc2na application.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Convert netCDF time series to NASA Ames FFI 1001 files
#[derive(Parser, Debug)]
#[command(
    name = "nc2na",
    version,
    about = "Convert netCDF time series to NASA Ames FFI 1001 files"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a netCDF file, or every *.nc file in a directory
    Convert(ConvertArgs),
    /// Show what a netCDF file converts to, or parse and summarize a NASA Ames file
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// netCDF file or directory of netCDF files
    pub path: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for the output files. Defaults to the input file's directory.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Number of threads to use for parallel processing. Defaults to number of CPU cores.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Name of the time variable and dimension
    #[arg(long)]
    pub time_key: Option<String>,

    /// Significant digits written for data values
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=17))]
    pub precision: Option<u8>,

    /// Keep existing output files instead of replacing them
    #[arg(long)]
    pub no_overwrite: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// netCDF (.nc) or NASA Ames file
    pub file: PathBuf,

    /// Path to TOML configuration file, used for netCDF inputs
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Separator of the data section of a NASA Ames file
    #[arg(long, default_value = "\t")]
    pub sep_data: String,

    /// Accept NASA Ames files without data lines
    #[arg(long)]
    pub allow_empty_data: bool,

    /// VSCAL and VMISS hold one value per line
    #[arg(long)]
    pub vertical_vscal_vmiss: bool,

    /// Accept UTF-8 and Latin-1 encoded NASA Ames files
    #[arg(long)]
    pub lenient_encoding: bool,
}
