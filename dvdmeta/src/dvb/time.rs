//! DVB-SI dates and times: Modified Julian Dates plus BCD clock times.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::io::{Read, Seek};

use crate::cursor::ByteCursor;
use crate::errors::SiError;

/// Convert a Modified Julian Date to a `(year, month, day)` triple.
///
/// This is the conversion given in Annex C of ETSI EN 300 468.  It is
/// valid from 1900-03-01 to 2100-02-28, and it looks odd, but the
/// constants are chosen so that truncating to whole days gives the right
/// answer.  Don't "simplify" it.
pub fn mjd_to_ymd(mjd: u16) -> (i64, i64, i64) {
    let mjd = f64::from(mjd);
    let y1 = ((mjd - 15078.2) / 365.25).floor();
    let y1_days = (y1 * 365.25).floor();
    let m1 = ((mjd - 14956.1 - y1_days) / 30.6001).floor();
    let day = mjd - 14956.0 - y1_days - (m1 * 30.6001).floor();
    let k = if m1 == 14.0 || m1 == 15.0 { 1.0 } else { 0.0 };
    let year = y1 + k + 1900.0;
    let month = m1 - 1.0 - 12.0 * k;
    (year as i64, month as i64, day as i64)
}

/// Read a 5-byte start time: a 16-bit MJD followed by BCD hours, minutes
/// and seconds, in UTC.
pub(crate) fn read_start_time<R: Read + Seek>(
    c: &mut ByteCursor<R>,
) -> Result<DateTime<Utc>, SiError> {
    let mjd = c.read_u16()?;
    let hour = u32::from(c.read_bcd()?);
    let minute = u32::from(c.read_bcd()?);
    let second = u32::from(c.read_bcd()?);

    let invalid = || SiError::InvalidStartTime { mjd, hour, minute, second };
    let (year, month, day) = mjd_to_ymd(mjd);
    let year = i32::try_from(year).map_err(|_| invalid())?;
    let month = u32::try_from(month).map_err(|_| invalid())?;
    let day = u32::try_from(day).map_err(|_| invalid())?;
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .ok_or_else(invalid)?;
    Ok(Utc.from_utc_datetime(&naive))
}

/// Read a 3-byte BCD `hh:mm:ss` duration, in seconds.
pub(crate) fn read_duration<R: Read + Seek>(c: &mut ByteCursor<R>) -> Result<u32, SiError> {
    let hours = u32::from(c.read_bcd()?);
    let minutes = u32::from(c.read_bcd()?);
    let seconds = u32::from(c.read_bcd()?);
    Ok((hours * 60 + minutes) * 60 + seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ReadError;

    #[test]
    fn converts_reference_dates() {
        // The worked example from EN 300 468.
        assert_eq!(mjd_to_ymd(45218), (1982, 9, 6));
        assert_eq!(mjd_to_ymd(40587), (1970, 1, 1));
        assert_eq!(mjd_to_ymd(51544), (2000, 1, 1));
        assert_eq!(mjd_to_ymd(58849), (2020, 1, 1));
        // Leap days, and the January/February months which need `k`.
        assert_eq!(mjd_to_ymd(58907), (2020, 2, 28));
        assert_eq!(mjd_to_ymd(58908), (2020, 2, 29));
        assert_eq!(mjd_to_ymd(58909), (2020, 3, 1));
    }

    #[test]
    fn agrees_with_chrono_day_counts() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        for mjd in (15079..=u16::MAX).step_by(97) {
            let (y, m, d) = mjd_to_ymd(mjd);
            let date = NaiveDate::from_ymd_opt(y as i32, m as u32, d as u32).unwrap();
            assert_eq!((date - epoch).num_days(), i64::from(mjd) - 40587, "MJD {}", mjd);
        }
    }

    #[test]
    fn reads_start_times() {
        let bytes = [0xe5, 0xe1, 0x20, 0x15, 0x00];
        let time = read_start_time(&mut ByteCursor::from_slice(&bytes, 0)).unwrap();
        assert_eq!(time, Utc.with_ymd_and_hms(2020, 1, 1, 20, 15, 0).unwrap());
    }

    #[test]
    fn rejects_impossible_times() {
        let bytes = [0xe5, 0xe1, 0x25, 0x00, 0x00];
        assert!(matches!(
            read_start_time(&mut ByteCursor::from_slice(&bytes, 0)),
            Err(SiError::InvalidStartTime { hour: 25, .. })
        ));
        let bytes = [0xe5, 0xe1, 0x2a, 0x00, 0x00];
        assert!(matches!(
            read_start_time(&mut ByteCursor::from_slice(&bytes, 0)),
            Err(SiError::Read(ReadError::InvalidBcd { offset: 2, .. }))
        ));
    }

    #[test]
    fn reads_durations() {
        let bytes = [0x01, 0x45, 0x30];
        assert_eq!(read_duration(&mut ByteCursor::from_slice(&bytes, 0)).unwrap(), 6330);
    }
}
