// Copyright 2019-2026 s7-client contributors. All rights reserved.
// This software may be modified and distributed under the terms
// of the BSD license. See the LICENSE file for details.

//! BCD and wire date/time codecs shared by the clock and block-info operations.

use byteorder::{BigEndian, ByteOrder};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};

use super::error::Error;

/// Binary-coded decimal: two packed base-10 digits per byte, 0..99.
pub fn decode_bcd(b: u8) -> u32 {
    ((b >> 4) * 10 + (b & 0x0F)) as u32
}

pub fn encode_bcd(value: u32) -> u8 {
    (((value / 10) << 4) | (value % 10)) as u8
}

/// Decodes an S7 `DATE_AND_TIME` value at `buf[pos..pos+8]`.
pub fn get_datetime_at(buf: &[u8], pos: usize) -> Result<NaiveDateTime, Error> {
    let invalid = || Error::InvalidResponse {
        reason: "invalid BCD datetime".to_string(),
        bytes: buf[pos..pos + 8].to_vec(),
    };

    let mut year = decode_bcd(buf[pos]);
    year += if year < 90 { 2000 } else { 1900 };
    let month = decode_bcd(buf[pos + 1]);
    let day = decode_bcd(buf[pos + 2]);
    let hour = decode_bcd(buf[pos + 3]);
    let min = decode_bcd(buf[pos + 4]);
    let sec = decode_bcd(buf[pos + 5]);
    let milli = decode_bcd(buf[pos + 6]) * 10 + decode_bcd(buf[pos + 7] >> 4);

    let date = NaiveDate::from_ymd_opt(year as i32, month, day).ok_or_else(invalid)?;
    let time = NaiveTime::from_hms_milli_opt(hour, min, sec, milli).ok_or_else(invalid)?;
    Ok(NaiveDateTime::new(date, time))
}

/// Encodes `value` as an S7 `DATE_AND_TIME` BCD block into `buf[pos..pos+8]`.
pub fn set_datetime_at(buf: &mut [u8], pos: usize, value: NaiveDateTime) {
    let y = value.year();
    let y = if y >= 2000 { y - 2000 } else { y - 1900 } as u32;

    buf[pos] = encode_bcd(y);
    buf[pos + 1] = encode_bcd(value.month());
    buf[pos + 2] = encode_bcd(value.day());
    buf[pos + 3] = encode_bcd(value.hour());
    buf[pos + 4] = encode_bcd(value.minute());
    buf[pos + 5] = encode_bcd(value.second());

    let milli = value.and_utc().timestamp_subsec_millis();
    buf[pos + 6] = encode_bcd(milli / 10);
    let weekday = match value.weekday() {
        Weekday::Sun => 1,
        Weekday::Mon => 2,
        Weekday::Tue => 3,
        Weekday::Wed => 4,
        Weekday::Thu => 5,
        Weekday::Fri => 6,
        Weekday::Sat => 7,
    };
    buf[pos + 7] = (encode_bcd(milli % 10) << 4) | encode_bcd(weekday);
}

fn s7_date_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).expect("1990-01-01 is a valid date")
}

/// Decodes an S7 `DATE` value (signed 16-bit day count since 1990-01-01).
pub fn get_date_at(buf: &[u8], pos: usize) -> NaiveDate {
    let days = BigEndian::read_i16(&buf[pos..pos + 2]);
    s7_date_epoch() + Duration::days(days as i64)
}

/// Encodes `value` as an S7 `DATE` value at `buf[pos..pos+2]`.
pub fn set_date_at(buf: &mut [u8], pos: usize, value: NaiveDate) {
    let days = (value - s7_date_epoch()).num_days() as i16;
    BigEndian::write_i16(&mut buf[pos..pos + 2], days);
}

/// Decodes an S7 `TIME_OF_DAY` value (unsigned 32-bit milliseconds since midnight).
pub fn get_tod_at(buf: &[u8], pos: usize) -> Result<NaiveTime, Error> {
    let ms = BigEndian::read_u32(&buf[pos..pos + 4]);
    NaiveTime::from_num_seconds_from_midnight_opt(ms / 1000, (ms % 1000) * 1_000_000).ok_or(
        Error::InvalidResponse {
            reason: "time-of-day out of range".to_string(),
            bytes: buf[pos..pos + 4].to_vec(),
        },
    )
}

/// Encodes `value` as an S7 `TIME_OF_DAY` value at `buf[pos..pos+4]`.
pub fn set_tod_at(buf: &mut [u8], pos: usize, value: NaiveTime) {
    let ms = value.num_seconds_from_midnight() as u32 * 1000 + value.nanosecond() / 1_000_000;
    BigEndian::write_u32(&mut buf[pos..pos + 4], ms);
}

/// Siemens block-info timestamp: unsigned day count since 1984-01-01.
pub fn siemens_timestamp(encoded_days: u16) -> NaiveDate {
    NaiveDate::from_ymd_opt(1984, 1, 1).expect("1984-01-01 is a valid date")
        + Duration::days(encoded_days as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn bcd_round_trips_0_to_99() {
        for v in 0..100u32 {
            assert_eq!(decode_bcd(encode_bcd(v)), v);
        }
    }

    #[test]
    fn datetime_round_trip() {
        let dt = NaiveDate::from_ymd_opt(2018, 1, 22)
            .unwrap()
            .and_hms_milli_opt(13, 5, 9, 250)
            .unwrap();
        let mut buf = [0u8; 8];
        set_datetime_at(&mut buf, 0, dt);
        let decoded = get_datetime_at(&buf, 0).unwrap();
        assert_eq!(decoded.date(), dt.date());
        assert_eq!(decoded.time(), dt.time());
    }

    #[test]
    fn datetime_year_bias() {
        // year byte 0x95 => 95 => 1995
        let mut buf = [0x95, 0x01, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(get_datetime_at(&buf, 0).unwrap().year(), 1995);
        // year byte 0x18 => 18 => 2018
        buf[0] = 0x18;
        assert_eq!(get_datetime_at(&buf, 0).unwrap().year(), 2018);
    }

    #[test]
    fn siemens_timestamp_matches_known_value() {
        assert_eq!(
            siemens_timestamp(12440),
            NaiveDate::from_ymd_opt(2018, 1, 22).unwrap()
        );
    }

    #[test]
    fn date_round_trip() {
        let d = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut buf = [0u8; 2];
        set_date_at(&mut buf, 0, d);
        assert_eq!(get_date_at(&buf, 0), d);
    }

    #[test]
    fn tod_round_trip() {
        let t = NaiveTime::from_hms_milli_opt(13, 30, 5, 250).unwrap();
        let mut buf = [0u8; 4];
        set_tod_at(&mut buf, 0, t);
        assert_eq!(get_tod_at(&buf, 0).unwrap(), t);
    }
}
