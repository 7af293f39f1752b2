//! Entry point for the nc2na application.
//! Handles CLI parsing and dispatches to conversion or inspection.

mod cli;
mod logging;

use clap::Parser;
use nc2na::config::ConverterConfig;
use nc2na::convert::{convert_all, NETCDF_EXTENSION};
use nc2na::errors::Result;
use nc2na::metadata::{conversion_plan, print_ffi1001, print_plan};
use nc2na::na1001::{Ffi1001, ReadOptions};
use nc2na::parallel::{get_parallel_info, ParallelConfig};
use std::process;
use tracing::info;

use cli::{Cli, Command, ConvertArgs, InspectArgs};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but some inputs failed.
fn run(command: Command) -> Result<bool> {
    match command {
        Command::Convert(args) => convert(args),
        Command::Inspect(args) => inspect(args).map(|_| true),
    }
}

fn convert(args: ConvertArgs) -> Result<bool> {
    let mut config = ConverterConfig::load(args.config.as_deref())?;
    if let Some(time_key) = args.time_key {
        config.time_key = time_key;
    }
    if let Some(precision) = args.precision {
        config.precision = usize::from(precision);
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = Some(output_dir);
    }
    if args.no_overwrite {
        config.overwrite = false;
    }

    ParallelConfig::new(args.threads).setup_global_pool()?;
    get_parallel_info().log();

    let report = convert_all(&args.path, &config)?;
    for file in &report.converted {
        println!("{} -> {}", file.source.display(), file.destination.display());
    }
    for file in &report.skipped {
        println!(
            "{} -> {} (exists, skipped)",
            file.source.display(),
            file.destination.display()
        );
    }
    for (src, e) in &report.failed {
        eprintln!("Error: {}: {}", src.display(), e);
    }
    info!(
        "{} of {} file(s) converted, {} skipped, {} failed",
        report.converted.len(),
        report.total(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(report.is_success())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let is_netcdf = args
        .file
        .extension()
        .is_some_and(|ext| ext == NETCDF_EXTENSION);

    if is_netcdf {
        let config = ConverterConfig::load(args.config.as_deref())?;
        let plan = conversion_plan(&args.file, &config)?;
        print_plan(&plan);
        return Ok(());
    }

    let options = ReadOptions {
        sep_data: args.sep_data,
        allow_empty_data: args.allow_empty_data,
        vscal_vmiss_vertical: args.vertical_vscal_vmiss,
        ensure_ascii: !args.lenient_encoding,
        ..ReadOptions::default()
    };
    let na = Ffi1001::from_path(&args.file, &options)?;
    print_ffi1001(&na);
    Ok(())
}
