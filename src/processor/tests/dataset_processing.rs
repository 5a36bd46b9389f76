//! Single dataset pipeline tests

use super::{console, create_files, processor, test_config};
use crate::format::DecodingStrategy;
use crate::models::{CruiseId, InstrumentDataset};
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use tempfile::TempDir;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[test]
fn test_multibeam_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("rawdata"),
        &["XX_20190615_143000.all", "XX_20190616_090000.all", "notes.txt"],
    );

    let mut processor = processor(test_config(&temp_dir));
    let dataset = InstrumentDataset::new(CruiseId::new("RR1905"), "multibeam", dir);
    let outcomes = processor.process_dataset(&dataset).unwrap();

    assert_eq!(outcomes.len(), 1);
    let outcome = &outcomes[0];
    assert_eq!(outcome.device, "multibeam");
    assert_eq!(outcome.range.min, at(2019, 6, 15, 14, 30, 0));
    assert_eq!(outcome.range.max, at(2019, 6, 16, 9, 0, 0));
    assert_eq!(outcome.files_decoded, 2);
    assert_eq!(outcome.statements, 3);

    let logs = temp_dir.path().join("logs");
    let file_sql =
        fs::read_to_string(logs.join("fileupdate").join("RR1905_multibeam.sql")).unwrap();
    assert_eq!(file_sql.lines().count(), 2);
    assert!(file_sql.contains("path LIKE '%XX_20190615_143000.all';"));

    let range_sql = fs::read_to_string(
        logs.join("minmaxupdate")
            .join("RR1905_multibeam_MINMAX_UPDATE.sql"),
    )
    .unwrap();
    assert_eq!(
        range_sql.trim(),
        "UPDATE cruise_issues SET unols_start_date = '2019-06-15 14:30:00', \
         unols_end_date = '2019-06-16 09:00:00' WHERE cruise = 'RR1905';"
    );

    let output = console(processor);
    assert!(output.contains("MIN DATE: 2019-06-15 14:30:00"));
    assert!(output.contains("MAX DATE: 2019-06-16 09:00:00"));
}

#[test]
fn test_julian_day_dataset_groups_by_device() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("adcp"),
        &[
            "os7519032_03600.raw",
            "os7519033_00000.raw",
            "wh3019032_07200.raw",
        ],
    );

    let mut processor = processor(test_config(&temp_dir));
    let dataset = InstrumentDataset::new(CruiseId::new("BH1901"), "adcp", dir);
    let outcomes = processor.process_dataset(&dataset).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].device, "adcp_os75");
    assert_eq!(outcomes[0].range.min, at(2019, 2, 1, 1, 0, 0));
    assert_eq!(outcomes[0].range.max, at(2019, 2, 2, 0, 0, 0));
    assert_eq!(outcomes[1].device, "adcp_wh30");
    assert_eq!(outcomes[1].range.min, at(2019, 2, 1, 2, 0, 0));
    assert_eq!(outcomes[1].range.min, outcomes[1].range.max);

    // Each device gets its own range file
    let minmax = temp_dir.path().join("logs").join("minmaxupdate");
    assert!(minmax.join("BH1901_adcp_os75_MINMAX_UPDATE.sql").exists());
    assert!(minmax.join("BH1901_adcp_wh30_MINMAX_UPDATE.sql").exists());
}

#[test]
fn test_iso_dash_groups_by_full_sensor_name() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("scs"),
        &[
            "GPS_GGA_20190615-1430.Raw",
            "GPS_GGA_20190616-0000.Raw",
            "GYRO_20190615-1200.Raw",
        ],
    );

    let mut processor = processor(test_config(&temp_dir));
    let dataset = InstrumentDataset::new(CruiseId::new("RC0101"), "scs", dir);
    let outcomes = processor.process_dataset(&dataset).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].device, "scs_GPS_GGA");
    assert_eq!(outcomes[0].files_decoded, 2);
    assert_eq!(outcomes[0].range.min, at(2019, 6, 15, 14, 30, 0));
    assert_eq!(outcomes[0].range.max, at(2019, 6, 16, 0, 0, 0));
    assert_eq!(outcomes[1].device, "scs_GYRO");
    assert_eq!(outcomes[1].range.min, at(2019, 6, 15, 12, 0, 0));
    assert_eq!(processor.stats().files_skipped, 0);
}

#[test]
fn test_underscore_split_trailing_token_is_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("gyro"),
        &["gyro_20190615-143005.Raw", "gyro_20190701-000000_bak.Raw"],
    );

    let mut processor = processor(test_config(&temp_dir));
    let dataset = InstrumentDataset::new(CruiseId::new("OC1906A"), "gyro", dir);
    let outcomes = processor.process_dataset(&dataset).unwrap();

    assert_eq!(outcomes[0].range.min, at(2019, 6, 15, 14, 30, 5));
    assert_eq!(outcomes[0].range.max, outcomes[0].range.min);
    assert_eq!(outcomes[0].files_skipped, 1);
}

#[test]
fn test_precheck_failures_do_not_move_range() {
    let temp_dir = TempDir::new().unwrap();
    let clean = create_files(
        &temp_dir.path().join("clean").join("gyro"),
        &["gyro_20190615143000.raw", "gyro_20190616100000.raw"],
    );
    let noisy = create_files(
        &temp_dir.path().join("noisy").join("gyro"),
        &[
            "gyro_20190615143000.raw",
            "gyro_20190616100000.raw",
            "gyro_notes.raw",
        ],
    );

    let mut processor = processor(test_config(&temp_dir));
    let cruise = CruiseId::new("RR1905");
    let clean_outcome = processor
        .process_dataset(&InstrumentDataset::new(cruise.clone(), "gyro", clean))
        .unwrap();
    let noisy_outcome = processor
        .process_dataset(&InstrumentDataset::new(cruise, "gyro", noisy))
        .unwrap();

    assert_eq!(clean_outcome[0].range, noisy_outcome[0].range);
    assert_eq!(noisy_outcome[0].files_decoded, 2);
    assert_eq!(noisy_outcome[0].files_skipped, 1);
}

#[test]
fn test_csv_log_header_written_once_per_run() {
    let temp_dir = TempDir::new().unwrap();
    let gyro = create_files(
        &temp_dir.path().join("cruise").join("gyro"),
        &["gyro_20190615143000.raw"],
    );
    let gnss = create_files(
        &temp_dir.path().join("cruise").join("gnss"),
        &["gnss_20190617080000.raw", "gnss_20190614000000.raw"],
    );

    let config = test_config(&temp_dir).with_csv();
    let mut processor = processor(config);
    let cruise = CruiseId::new("RR1905");
    processor
        .process_dataset(&InstrumentDataset::new(cruise.clone(), "gyro", gyro))
        .unwrap();
    processor
        .process_dataset(&InstrumentDataset::new(cruise, "gnss", gnss))
        .unwrap();

    let csv_path = temp_dir
        .path()
        .join("logs")
        .join("dateranges")
        .join("2026-10-16T12-00-00_RR_dateranges.csv");
    let content = fs::read_to_string(csv_path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "cruise,devicetype,start_date,end_date",
            "RR1905,gyro,2019-06-15 14:30:00,2019-06-15 14:30:00",
            "RR1905,gnss,2019-06-14 00:00:00,2019-06-17 08:00:00",
        ]
    );
}

#[test]
fn test_print_only_writes_no_files() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("gyro"),
        &["gyro_20190615-143005.Raw", "gyro_20190614-000000.Raw"],
    );

    let config = test_config(&temp_dir).with_output_toggles(true, false, false);
    let mut processor = processor(config);
    let dataset = InstrumentDataset::new(CruiseId::new("OC1906A"), "gyro", dir);
    processor.process_dataset(&dataset).unwrap();

    assert!(!temp_dir.path().join("logs").exists());

    let output = console(processor);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("'2019-06-14 00:00:00'"));
    assert!(lines[1].contains("'2019-06-15 14:30:05'"));
    assert!(lines[2].starts_with("UPDATE cruise_issues"));
    assert!(!output.contains("MIN DATE"));
}

#[test]
fn test_strategy_override_for_unconfigured_vessel() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("gyro"),
        &["gyro_20190615-143000.Raw"],
    );

    let mut processor =
        processor(test_config(&temp_dir)).with_strategy(Some(DecodingStrategy::UnderscoreSplit));
    let dataset = InstrumentDataset::new(CruiseId::new("ZZ1234"), "gyro", dir);
    let outcomes = processor.process_dataset(&dataset).unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].range.min, at(2019, 6, 15, 14, 30, 0));
}

#[test]
fn test_pass_through_vessel_accepts_every_file() {
    let temp_dir = TempDir::new().unwrap();
    let dir = create_files(
        &temp_dir.path().join("gyro"),
        &["gyro.20190615T1430Z.txt", "gyro.20190616T0915Z.log"],
    );

    let mut processor = processor(test_config(&temp_dir));
    let dataset = InstrumentDataset::new(CruiseId::new("SKQ201910S"), "gyro", dir);
    let outcomes = processor.process_dataset(&dataset).unwrap();

    assert_eq!(outcomes[0].range.min, at(2019, 6, 15, 14, 30, 0));
    assert_eq!(outcomes[0].range.max, at(2019, 6, 16, 9, 15, 0));

    // Statistics are only recorded by run_dataset
    assert_eq!(processor.stats().datasets_emitted, 0);
}
