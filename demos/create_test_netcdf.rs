//! Creates a sample netCDF time series for trying out nc2na.
//!
//! The file holds one hour of 10 s records with two 1-D variables, a 2-D
//! variable that the converter skips, and a few global attributes that end up
//! as special comments.
//!
//! ```text
//! cargo run --example create_test_netcdf
//! cargo run -- -v convert test_flight.nc
//! cargo run -- inspect test_flight.na
//! ```

use ndarray::{Array1, Array2};
use netcdf::create;
use std::path::Path;

const RECORDS: usize = 360;
const LEVELS: usize = 4;
const FILL_VALUE: f64 = -9999.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_flight.nc");

    println!("Creating test netCDF file: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    file.add_attribute("title", "Test flight time series")?;
    file.add_attribute("institution", "nc2na test suite")?;
    file.add_attribute("platform", "research aircraft")?;
    file.add_attribute("created_by", "create_test_netcdf.rs")?;

    file.add_dimension("time", RECORDS)?;
    file.add_dimension("level", LEVELS)?;

    {
        let mut time_var = file.add_variable::<f64>("time", &["time"])?;
        time_var.put_attribute("units", "seconds since 2023-06-01 00:00:00")?;
        time_var.put_attribute("long_name", "time")?;
        time_var.put_attribute("calendar", "standard")?;

        // takeoff at 09:30 UTC
        let time_data: Vec<f64> = (0..RECORDS).map(|i| 34200.0 + i as f64 * 10.0).collect();
        time_var.put(Array1::from(time_data).view(), ..)?;
    }

    {
        let mut o3_var = file.add_variable::<f64>("o3", &["time"])?;
        o3_var.put_attribute("_FillValue", FILL_VALUE)?;
        o3_var.put_attribute("units", "ppb")?;
        o3_var.put_attribute("long_name", "ozone mixing ratio")?;

        let o3_data: Vec<f64> = (0..RECORDS)
            .map(|i| {
                if i % 50 == 7 {
                    FILL_VALUE
                } else {
                    45.0 + 5.0 * (i as f64 * 0.05).sin()
                }
            })
            .collect();
        o3_var.put(Array1::from(o3_data).view(), ..)?;
    }

    {
        let mut pressure_var = file.add_variable::<f64>("pressure", &["time"])?;
        pressure_var.put_attribute("units", "hPa")?;
        pressure_var.put_attribute("scale_factor", 0.01)?;

        let pressure_data: Vec<f64> = (0..RECORDS)
            .map(|i| 101325.0 - 20.0 * i as f64)
            .collect();
        pressure_var.put(Array1::from(pressure_data).view(), ..)?;
    }

    {
        let mut profile_var = file.add_variable::<f64>("temperature_profile", &["time", "level"])?;
        profile_var.put_attribute("units", "K")?;

        let profile_data: Vec<f64> = (0..RECORDS * LEVELS)
            .map(|i| 288.0 - (i % LEVELS) as f64 * 6.5)
            .collect();
        let profile_array = Array2::from_shape_vec((RECORDS, LEVELS), profile_data)?;
        profile_var.put(profile_array.view(), ..)?;
    }

    println!("Created {} records", RECORDS);
    println!("temperature_profile is 2-D and will be skipped by the converter");

    Ok(())
}
