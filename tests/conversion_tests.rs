use chrono::NaiveDate;
use nc2na::config::ConverterConfig;
use nc2na::convert::{convert_all, convert_file};
use nc2na::errors::Nc2NaError;
use nc2na::metadata::conversion_plan;
use nc2na::na1001::{Dx, Ffi1001, ReadOptions, WriteOutcome};
use nc2na::netcdf_io::{read_dataset, SkipReason};
use ndarray::{Array1, Array2};
use netcdf::create;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Flight time series: 3 records starting 01:00 UTC, one masked ozone value,
/// a packed pressure column, a 2-D profile and a scalar.
fn create_flight_file(path: &Path) {
    let mut file = create(path).expect("Failed to create NetCDF file");

    file.add_attribute("title", "Flight über Zürich")
        .expect("Failed to add title");
    file.add_attribute("institution", "IMK").unwrap();
    file.add_attribute("version", 3i32).unwrap();

    file.add_dimension("time", 3).unwrap();
    file.add_dimension("level", 2).unwrap();

    {
        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_attribute("units", "seconds since 2023-06-01 00:00:00")
            .unwrap();
        time.put_attribute("calendar", "standard").unwrap();
        let values = Array1::from(vec![3600.0, 3610.0, 3620.0]);
        time.put(values.view(), ..).expect("Failed to write time");
    }

    {
        let mut o3 = file.add_variable::<f64>("o3", &["time"]).unwrap();
        o3.put_attribute("_FillValue", -999.0f64).unwrap();
        o3.put_attribute("units", "ppb").unwrap();
        let values = Array1::from(vec![41.5, -999.0, 40.0]);
        o3.put(values.view(), ..).expect("Failed to write o3");
    }

    {
        let mut pressure = file.add_variable::<f64>("pressure", &["time"]).unwrap();
        pressure.put_attribute("scale_factor", 0.5f64).unwrap();
        pressure.put_attribute("add_offset", 0.25f64).unwrap();
        let values = Array1::from(vec![2026.0, 2027.0, 2028.0]);
        pressure.put(values.view(), ..).expect("Failed to write pressure");
    }

    {
        let mut profile = file
            .add_variable::<f64>("profile", &["time", "level"])
            .unwrap();
        let values = Array2::from_shape_vec((3, 2), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();
        profile.put(values.view(), ..).expect("Failed to write profile");
    }

    file.add_variable::<f64>("station_height", &[]).unwrap();
}

fn test_config() -> ConverterConfig {
    let mut config = ConverterConfig::default();
    config.header.revision_date = NaiveDate::from_ymd_opt(2024, 1, 9);
    config
}

fn flight_dir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("flight.nc");
    create_flight_file(&path);
    (dir, path)
}

#[test]
fn test_convert_file_layout() {
    let (dir, src) = flight_dir();

    let converted = convert_file(&src, &test_config()).expect("conversion failed");
    assert_eq!(converted.destination, dir.path().join("flight.na"));
    assert_eq!(converted.outcome, WriteOutcome::Written);

    let text = fs::read_to_string(&converted.destination).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    let expected = vec![
        "19 1001",
        "data origin: nc 2 na converter",
        "organization",
        "sampling description",
        "mission name",
        "1 1",
        "2023 06 01 2024 01 09",
        "10",
        "seconds after midnight on DATE",
        "2",
        "1 1",
        "nan nan",
        "o3",
        "pressure",
        "2",
        "title: Flight ?ber Z?rich",
        "institution: IMK",
        "1",
        "time\to3\tpressure",
        "3600\t41.5\t1013.25",
        "3610\tnan\t1013.75",
        "3620\t40\t1014.25",
    ];
    assert_eq!(lines, expected);
}

#[test]
fn test_converted_file_reads_back() {
    let (_dir, src) = flight_dir();
    let converted = convert_file(&src, &test_config()).unwrap();

    let na = Ffi1001::from_path(&converted.destination, &ReadOptions::default())
        .expect("written file must parse");
    assert_eq!(na.nlhead(), 19);
    assert_eq!(na.nv(), 2);
    assert_eq!(na.nscoml(), 2);
    assert_eq!(na.nncoml(), 1);
    assert_eq!(na.date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
    assert_eq!(na.dx, Dx::Int(10));
    assert_eq!(na.vname(), ["o3", "pressure"]);
    assert_eq!(na.x(), ["3600", "3610", "3620"]);
    assert_eq!(na.column_values(0).unwrap(), vec![Some(41.5), None, Some(40.0)]);
    assert_eq!(na.src.as_deref(), Some(converted.destination.as_path()));
}

#[test]
fn test_dataset_classification() {
    let (_dir, src) = flight_dir();
    let dataset = read_dataset(&src, &test_config()).unwrap();

    let names: Vec<&str> = dataset.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["o3", "pressure"]);
    assert!(dataset.columns[0].values[1].is_nan());

    assert_eq!(dataset.skipped.len(), 2);
    assert_eq!(dataset.skipped[0].name, "profile");
    assert_eq!(
        dataset.skipped[0].reason,
        SkipReason::NotAlongTime {
            dims: vec!["time".to_string(), "level".to_string()]
        }
    );
    assert_eq!(dataset.skipped[1].name, "station_height");
    assert_eq!(dataset.skipped[1].reason, SkipReason::Scalar);

    // numeric global attributes are not comments
    let keys: Vec<&str> = dataset
        .global_attributes
        .iter()
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(keys, ["title", "institution"]);
}

#[test]
fn test_missing_time_variable() {
    let (_dir, src) = flight_dir();
    let mut config = test_config();
    config.time_key = "Time".to_string();

    let err = convert_file(&src, &config).unwrap_err();
    assert!(matches!(err, Nc2NaError::VariableNotFound { ref var } if var == "Time"));
}

#[test]
fn test_time_variable_without_dimension() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("odd.nc");
    {
        let mut file = create(&src).unwrap();
        file.add_dimension("obs", 2).unwrap();
        let mut time = file.add_variable::<f64>("time", &["obs"]).unwrap();
        time.put_attribute("units", "seconds since 2023-06-01").unwrap();
        time.put(Array1::from(vec![0.0, 1.0]).view(), ..).unwrap();
    }

    let err = convert_file(&src, &test_config()).unwrap_err();
    assert!(matches!(err, Nc2NaError::DimensionNotFound { .. }));
    assert!(!dir.path().join("odd.na").exists());
}

#[test]
fn test_time_without_units() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("nounits.nc");
    {
        let mut file = create(&src).unwrap();
        file.add_dimension("time", 2).unwrap();
        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put(Array1::from(vec![0.0, 1.0]).view(), ..).unwrap();
    }

    let err = read_dataset(&src, &test_config()).unwrap_err();
    assert!(matches!(err, Nc2NaError::InvalidTime { .. }));
}

#[test]
fn test_missing_input() {
    let err = convert_file(Path::new("/nonexistent/flight.nc"), &test_config()).unwrap_err();
    assert!(matches!(err, Nc2NaError::PathNotFound { .. }));
}

#[test]
fn test_no_overwrite_keeps_existing_output() {
    let (dir, src) = flight_dir();
    let destination = dir.path().join("flight.na");
    fs::write(&destination, "existing").unwrap();

    let mut config = test_config();
    config.overwrite = false;
    let converted = convert_file(&src, &config).unwrap();
    assert_eq!(converted.outcome, WriteOutcome::Skipped);
    assert_eq!(fs::read_to_string(&destination).unwrap(), "existing");

    config.overwrite = true;
    let converted = convert_file(&src, &config).unwrap();
    assert_eq!(converted.outcome, WriteOutcome::Overwritten);
    assert!(fs::read_to_string(&destination).unwrap().starts_with("19 1001"));
}

#[test]
fn test_batch_conversion_into_output_dir() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("input");
    let output = dir.path().join("output");
    fs::create_dir(&input).unwrap();

    create_flight_file(&input.join("a.nc"));
    create_flight_file(&input.join("b.nc"));
    fs::write(input.join("broken.nc"), b"not a netcdf file").unwrap();
    fs::write(input.join("readme.txt"), b"ignored").unwrap();

    let mut config = test_config();
    config.output_dir = Some(output.clone());
    let report = convert_all(&input, &config).unwrap();

    assert_eq!(report.total(), 3);
    assert_eq!(report.converted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, input.join("broken.nc"));
    assert!(!report.is_success());

    assert!(output.join("a.na").is_file());
    assert!(output.join("b.na").is_file());
    assert!(!output.join("broken.na").exists());
}

#[test]
fn test_conversion_plan() {
    let (_dir, src) = flight_dir();
    let plan = conversion_plan(&src, &test_config()).unwrap();

    assert_eq!(plan.records, 3);
    assert_eq!(plan.first_date, NaiveDate::from_ymd_opt(2023, 6, 1));
    assert_eq!(plan.columns, vec!["o3", "pressure"]);
    assert_eq!(plan.skipped.len(), 2);
    assert_eq!(plan.special_comments, 2);
    assert_eq!(plan.nlhead(), 19);
}

/// Single-column series with the given time attributes.
fn create_series_file(path: &Path, calendar: Option<&str>, missing_value: Option<f64>) {
    let mut file = create(path).expect("Failed to create NetCDF file");
    file.add_dimension("time", 3).unwrap();

    {
        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_attribute("units", "hours since 2023-06-01").unwrap();
        if let Some(calendar) = calendar {
            time.put_attribute("calendar", calendar).unwrap();
        }
        time.put(Array1::from(vec![0.0, 1.0, 2.0]).view(), ..)
            .unwrap();
    }

    let mut h2o = file.add_variable::<f64>("h2o", &["time"]).unwrap();
    if let Some(missing) = missing_value {
        h2o.put_attribute("missing_value", missing).unwrap();
    }
    h2o.put(Array1::from(vec![12.5, -1.0, 13.0]).view(), ..)
        .unwrap();
}

#[test]
fn test_empty_time_axis() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("empty.nc");
    {
        let mut file = create(&src).unwrap();
        file.add_unlimited_dimension("time").unwrap();
        let mut time = file.add_variable::<f64>("time", &["time"]).unwrap();
        time.put_attribute("units", "seconds since 2023-06-01").unwrap();
        file.add_variable::<f64>("o3", &["time"]).unwrap();
    }

    let err = read_dataset(&src, &test_config()).unwrap_err();
    assert!(matches!(err, Nc2NaError::EmptyTimeAxis { ref key } if key == "time"));

    let err = convert_file(&src, &test_config()).unwrap_err();
    assert!(matches!(err, Nc2NaError::EmptyTimeAxis { .. }));
    assert!(!dir.path().join("empty.na").exists());
}

#[test]
fn test_missing_value_is_masked() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("masked.nc");
    create_series_file(&src, None, Some(-1.0));

    let dataset = read_dataset(&src, &test_config()).unwrap();
    let values = &dataset.columns[0].values;
    assert_eq!(values[0], 12.5);
    assert!(values[1].is_nan());
    assert_eq!(values[2], 13.0);

    let converted = convert_file(&src, &test_config()).unwrap();
    let text = fs::read_to_string(&converted.destination).unwrap();
    let data: Vec<&str> = text.lines().skip(16).collect();
    assert_eq!(data, ["0\t12.5", "3600\tnan", "7200\t13"]);
}

#[test]
fn test_unmasked_series_keeps_values() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("plain.nc");
    create_series_file(&src, Some("gregorian"), None);

    let dataset = read_dataset(&src, &test_config()).unwrap();
    assert_eq!(dataset.columns[0].values, vec![12.5, -1.0, 13.0]);
}

#[test]
fn test_unsupported_calendar() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("noleap.nc");
    create_series_file(&src, Some("noleap"), None);

    let err = read_dataset(&src, &test_config()).unwrap_err();
    assert!(matches!(err, Nc2NaError::InvalidTime { ref reason } if reason.contains("noleap")));
    assert!(convert_file(&src, &test_config()).is_err());
    assert!(!dir.path().join("noleap.na").exists());
}
