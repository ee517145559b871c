//! Cabrillo `QSO:` lines for HF contests (160m-10m, no WARC bands)

use crate::canonical::{contest_mode, export_frequency_khz, CanonicalError};
use crate::record::{Record, RecordError};
use crate::timestamp::{parse_timestamp, TimestampError, DATE_FIELD, TIME_FIELD};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Fields a record needs to become a Cabrillo line
pub const REQUIRED_FIELDS: &[&str] = &[
    "station_callsign",
    "call",
    "band",
    "mode",
    DATE_FIELD,
    TIME_FIELD,
    "rst_sent",
    "rst_rcvd",
    "stx_string",
    "srx_string",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CabrilloError {
    #[error(transparent)]
    Missing(#[from] RecordError),

    #[error(transparent)]
    Canonical(#[from] CanonicalError),

    #[error(transparent)]
    Timestamp(#[from] TimestampError),
}

/// One contact in Cabrillo terms
#[derive(Debug, Clone, PartialEq)]
pub struct CabrilloQso {
    pub freq_khz: u32,
    pub mode: &'static str,
    pub time: DateTime<Utc>,
    pub sent_call: String,
    pub sent_rst: String,
    pub sent_exchange: String,
    pub rcvd_call: String,
    pub rcvd_rst: String,
    pub rcvd_exchange: String,
}

impl CabrilloQso {
    pub fn from_record(record: &Record) -> Result<Self, CabrilloError> {
        for field in REQUIRED_FIELDS {
            record.require(field)?;
        }
        let band = record.require("band")?;
        let freq_khz = export_frequency_khz(band, record.get("freq"))?;
        let mode = contest_mode(record.require("mode")?)?;
        let time = parse_timestamp(record.require(DATE_FIELD)?, record.require(TIME_FIELD)?)?;

        Ok(Self {
            freq_khz,
            mode,
            time,
            sent_call: record.require("station_callsign")?.to_string(),
            sent_rst: record.require("rst_sent")?.to_string(),
            sent_exchange: record.require("stx_string")?.to_string(),
            rcvd_call: record.require("call")?.to_string(),
            rcvd_rst: record.require("rst_rcvd")?.to_string(),
            rcvd_exchange: record.require("srx_string")?.to_string(),
        })
    }

    /// Render the `QSO:` line, without line terminator
    pub fn to_line(&self) -> String {
        format!(
            "QSO: {:>5} {} {} {:<13} {:<3} {:<6} {:<13} {:<3} {:<6}",
            self.freq_khz,
            self.mode,
            self.time.format("%Y-%m-%d %H%M"),
            self.sent_call,
            self.sent_rst,
            self.sent_exchange,
            self.rcvd_call,
            self.rcvd_rst,
            self.rcvd_exchange,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contest_record() -> Record {
        Record::from_pairs([
            ("station_callsign", "JJ1BDX"),
            ("call", "W1AW"),
            ("band", "20m"),
            ("mode", "SSB"),
            ("qso_date", "20221011"),
            ("time_on", "123345"),
            ("rst_sent", "59"),
            ("rst_rcvd", "59"),
            ("stx_string", "25"),
            ("srx_string", "05"),
        ])
    }

    #[test]
    fn test_line_layout() {
        let qso = CabrilloQso::from_record(&contest_record()).unwrap();
        assert_eq!(
            qso.to_line(),
            "QSO: 14000 PH 2022-10-11 1233 JJ1BDX        59  25     W1AW          59  05    "
        );
    }

    #[test]
    fn test_explicit_frequency_overrides_band() {
        let mut record = contest_record();
        record.set("freq", "14.2505");
        let qso = CabrilloQso::from_record(&record).unwrap();
        assert_eq!(qso.freq_khz, 14250);
        assert!(qso.to_line().starts_with("QSO: 14250 PH "));
    }

    #[test]
    fn test_low_band_frequency_is_right_aligned() {
        let mut record = contest_record();
        record.set("band", "160m");
        record.set("mode", "CW");
        assert!(CabrilloQso::from_record(&record)
            .unwrap()
            .to_line()
            .starts_with("QSO:  1800 CW "));
    }

    #[test]
    fn test_missing_required_field() {
        let mut record = contest_record();
        record.delete("rst_rcvd");
        assert_eq!(
            CabrilloQso::from_record(&record),
            Err(CabrilloError::Missing(RecordError::MissingField(
                "rst_rcvd".to_string()
            )))
        );
    }

    #[test]
    fn test_unknown_band_and_mode() {
        let mut record = contest_record();
        record.set("band", "20M");
        assert!(matches!(
            CabrilloQso::from_record(&record),
            Err(CabrilloError::Canonical(CanonicalError::UnknownBand(_)))
        ));

        let mut record = contest_record();
        record.set("mode", "PSK31");
        assert!(matches!(
            CabrilloQso::from_record(&record),
            Err(CabrilloError::Canonical(CanonicalError::UnknownMode(_)))
        ));
    }

    #[test]
    fn test_malformed_time() {
        let mut record = contest_record();
        record.set("time_on", "12");
        assert!(matches!(
            CabrilloQso::from_record(&record),
            Err(CabrilloError::Timestamp(_))
        ));
    }
}
