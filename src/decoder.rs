//! Filename timestamp decoding.
//!
//! Each strategy first locates its date-bearing token and checks it is all
//! digits. Names failing that precheck are not part of the dataset and are
//! skipped (`Ok(None)`). Once the precheck passes the remaining fields must
//! decode to a real calendar value; anything else is a `Decode` error that
//! aborts the dataset.

use crate::constants::MIN_FILENAME_LEN;
use crate::error::{DateParseError, Result};
use crate::format::DecodingStrategy;
use crate::models::DecodedTimestamp;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::ops::Range;
use tracing::trace;

/// Byte offset of the `YYDDD` window in Julian-day filenames
const JULIAN_WINDOW_OFFSET: usize = 4;

/// Width of the Julian-day window: two-digit year, day of year, delimiter
const JULIAN_WINDOW_LEN: usize = 6;

const SECONDS_PER_DAY: u32 = 86_400;

/// Decode the acquisition timestamp encoded in `filename`
pub fn decode(filename: &str, strategy: DecodingStrategy) -> Result<Option<DecodedTimestamp>> {
    if filename.len() < MIN_FILENAME_LEN {
        trace!("Skipping short filename {}", filename);
        return Ok(None);
    }

    let decoded = match strategy {
        DecodingStrategy::Multibeam => decode_multibeam(filename)?,
        DecodingStrategy::UnderscoreSplit => decode_underscore_split(filename)?,
        DecodingStrategy::UnderscoreCompact => decode_underscore_compact(filename)?,
        DecodingStrategy::DotIso => decode_dot_iso(filename)?,
        DecodingStrategy::JulianDay => decode_julian_day(filename)?,
        DecodingStrategy::IsoDash => decode_iso_dash(filename)?,
    };

    if decoded.is_none() {
        trace!("Date precheck failed for {}, skipping", filename);
    }

    Ok(decoded.map(|datetime| DecodedTimestamp::new(filename, datetime)))
}

/// Text identifying the device inside a mixed directory.
///
/// Only strategies that group by prefix have one.
pub fn group_key(filename: &str, strategy: DecodingStrategy) -> Option<&str> {
    match strategy {
        DecodingStrategy::JulianDay => filename.get(..JULIAN_WINDOW_OFFSET),
        DecodingStrategy::IsoDash => filename
            .rsplit_once('_')
            .map(|(sensor, _)| sensor)
            .filter(|k| !k.is_empty()),
        _ => None,
    }
}

/// `XX_YYYYMMDD_HHMMSS...`
fn decode_multibeam(filename: &str) -> Result<Option<NaiveDateTime>> {
    let mut tokens = filename.split('_');
    let Some(date) = tokens.nth(1).and_then(|t| digit_run(t, 0..8)) else {
        return Ok(None);
    };
    let time = tokens
        .next()
        .ok_or_else(|| DateParseError::decode(filename, "missing time token"))?;

    let (year, month, day) = ymd(filename, date)?;
    let (hour, minute, second) = hms(filename, time)?;
    build(filename, year, month, day, hour, minute, second).map(Some)
}

/// `name_YYYYMMDD-HHMMSS...`
///
/// The precheck looks at the last `_` token while the date itself is read
/// from the token after the first `_`.
fn decode_underscore_split(filename: &str) -> Result<Option<NaiveDateTime>> {
    let stamp = filename.rsplit('_').next().unwrap_or_default();
    if digit_run(stamp, 0..8).is_none() {
        return Ok(None);
    }
    let date = filename
        .split('_')
        .nth(1)
        .ok_or_else(|| DateParseError::decode(filename, "missing date token"))?;
    let time = filename.rsplit('-').next().unwrap_or_default();

    let (year, month, day) = ymd(filename, date)?;
    let (hour, minute, second) = hms(filename, time)?;
    build(filename, year, month, day, hour, minute, second).map(Some)
}

/// `name_YYYYMMDDHHMMSS...`
fn decode_underscore_compact(filename: &str) -> Result<Option<NaiveDateTime>> {
    let stamp = filename.rsplit('_').next().unwrap_or_default();
    let Some(date) = digit_run(stamp, 0..8) else {
        return Ok(None);
    };
    let time = stamp.get(8..).unwrap_or_default();

    let (year, month, day) = ymd(filename, date)?;
    let (hour, minute, second) = hms(filename, time)?;
    build(filename, year, month, day, hour, minute, second).map(Some)
}

/// `name.YYYYMMDDTHHMMZ...`
fn decode_dot_iso(filename: &str) -> Result<Option<NaiveDateTime>> {
    let Some((date, time)) = filename
        .split('.')
        .nth(1)
        .and_then(|t| t.split_once('T'))
    else {
        return Ok(None);
    };
    let Some(date) = digit_run(date, 0..8) else {
        return Ok(None);
    };

    let (year, month, day) = ymd(filename, date)?;
    let hour = field(filename, time, 0..2, "hour")?;
    let minute = field(filename, time, 2..4, "minute")?;
    build(filename, year, month, day, hour, minute, 0).map(Some)
}

/// `tagxYYDDD_SSSSS...`: day of year plus seconds of day
fn decode_julian_day(filename: &str) -> Result<Option<NaiveDateTime>> {
    let window_end = JULIAN_WINDOW_OFFSET + JULIAN_WINDOW_LEN;
    let Some(window) = filename.get(JULIAN_WINDOW_OFFSET..window_end) else {
        return Ok(None);
    };
    let Some(yyddd) = digit_run(window, 0..5) else {
        return Ok(None);
    };

    let yy = field(filename, yyddd, 0..2, "year")?;
    let ordinal = field(filename, yyddd, 2..5, "day of year")?;
    let year = expand_two_digit_year(yy);
    let date = NaiveDate::from_yo_opt(year, ordinal).ok_or_else(|| {
        DateParseError::decode(filename, format!("day of year {} out of range for {}", ordinal, year))
    })?;

    let tail = filename.rsplit('_').next().unwrap_or_default();
    let digits: String = tail.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(DateParseError::decode(filename, "missing seconds of day"));
    }
    let seconds_of_day: u32 = digits
        .parse()
        .map_err(|_| DateParseError::decode(filename, format!("bad seconds of day '{}'", digits)))?;
    if seconds_of_day >= SECONDS_PER_DAY {
        return Err(DateParseError::decode(
            filename,
            format!("seconds of day {} out of range", seconds_of_day),
        ));
    }

    let (minutes, second) = (seconds_of_day / 60, seconds_of_day % 60);
    let (hour, minute) = (minutes / 60, minutes % 60);
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or_else(|| DateParseError::decode(filename, "time of day out of range"))?;

    Ok(Some(date.and_time(time)))
}

/// `sensor_YYYYMMDD-HHMM...`, where the sensor name may itself contain `_`
fn decode_iso_dash(filename: &str) -> Result<Option<NaiveDateTime>> {
    let Some((date, time)) = filename
        .rsplit_once('_')
        .and_then(|(_, stamp)| stamp.split_once('-'))
    else {
        return Ok(None);
    };
    let Some(date) = digit_run(date, 0..8) else {
        return Ok(None);
    };

    let (year, month, day) = ymd(filename, date)?;
    let hour = field(filename, time, 0..2, "hour")?;
    let minute = field(filename, time, 2..4, "minute")?;
    build(filename, year, month, day, hour, minute, 0).map(Some)
}

/// `%y`: 69-99 map to the 1900s, 00-68 to the 2000s
fn expand_two_digit_year(yy: u32) -> i32 {
    let yy = yy as i32;
    if yy < 69 { 2000 + yy } else { 1900 + yy }
}

/// The slice at `range` if it exists and is all ASCII digits
fn digit_run(s: &str, range: Range<usize>) -> Option<&str> {
    s.get(range)
        .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
}

fn field(filename: &str, s: &str, range: Range<usize>, name: &str) -> Result<u32> {
    let raw = s
        .get(range)
        .ok_or_else(|| DateParseError::decode(filename, format!("missing {}", name)))?;
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::decode(
            filename,
            format!("non-numeric {} '{}'", name, raw),
        ));
    }
    raw.parse()
        .map_err(|_| DateParseError::decode(filename, format!("bad {} '{}'", name, raw)))
}

fn ymd(filename: &str, date: &str) -> Result<(i32, u32, u32)> {
    let year = field(filename, date, 0..4, "year")? as i32;
    let month = field(filename, date, 4..6, "month")?;
    let day = field(filename, date, 6..8, "day")?;
    Ok((year, month, day))
}

fn hms(filename: &str, time: &str) -> Result<(u32, u32, u32)> {
    let hour = field(filename, time, 0..2, "hour")?;
    let minute = field(filename, time, 2..4, "minute")?;
    let second = field(filename, time, 4..6, "second")?;
    Ok((hour, minute, second))
}

fn build(
    filename: &str,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        DateParseError::decode(
            filename,
            format!("invalid date {:04}-{:02}-{:02}", year, month, day),
        )
    })?;
    let time = NaiveTime::from_hms_opt(hour, minute, second).ok_or_else(|| {
        DateParseError::decode(
            filename,
            format!("invalid time {:02}:{:02}:{:02}", hour, minute, second),
        )
    })?;
    Ok(date.and_time(time))
}
