//! Band and mode canonicalization
//!
//! Two band tables exist. The contest table covers the six HF contest bands
//! and maps each to its base frequency; Cabrillo export accepts nothing else
//! and matches tokens exactly (lower-case only). The band plan lists every
//! amateur band in frequency order; statistics fold band tokens to lower case
//! and render them in this order.

use thiserror::Error;

/// Errors raised by the strict (Cabrillo) canonicalization path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CanonicalError {
    #[error("unknown band: {0}")]
    UnknownBand(String),

    #[error("unknown mode: {0}")]
    UnknownMode(String),

    #[error("invalid frequency: {0}")]
    InvalidFrequency(String),
}

/// HF contest bands and their base frequencies in kHz
pub const CONTEST_BANDS: &[(&str, u32)] = &[
    ("10m", 28000),
    ("15m", 21000),
    ("20m", 14000),
    ("40m", 7000),
    ("80m", 3500),
    ("160m", 1800),
];

/// Amateur band plan, longest wavelength first
pub const BAND_PLAN: &[&str] = &[
    "2190m", "630m", "560m", "160m", "80m", "60m", "40m", "30m", "20m", "17m", "15m", "12m",
    "10m", "6m", "5m", "4m", "2m", "1.25m", "70cm", "33cm", "23cm", "13cm", "9cm", "6cm", "3cm",
    "1.25cm", "6mm", "4mm", "2.5mm", "2mm", "1mm",
];

/// Logging mode to contest exchange mode
pub const CONTEST_MODES: &[(&str, &str)] = &[
    ("CW", "CW"),
    ("SSB", "PH"),
    ("FM", "FM"),
    ("RTTY", "RY"),
    ("FT8", "DG"),
    ("MFSK", "DG"),
];

/// Base frequency in kHz of a contest band token
pub fn contest_band_base_khz(band: &str) -> Result<u32, CanonicalError> {
    CONTEST_BANDS
        .iter()
        .find(|(token, _)| *token == band)
        .map(|(_, khz)| *khz)
        .ok_or_else(|| CanonicalError::UnknownBand(band.to_string()))
}

/// Contest exchange mode for a logging mode
///
/// Already-translated exchange tokens map to themselves so that the
/// translation can be applied twice.
pub fn contest_mode(mode: &str) -> Result<&'static str, CanonicalError> {
    if let Some((_, to)) = CONTEST_MODES.iter().find(|(from, _)| *from == mode) {
        return Ok(*to);
    }
    CONTEST_MODES
        .iter()
        .map(|(_, to)| *to)
        .find(|to| *to == mode)
        .ok_or_else(|| CanonicalError::UnknownMode(mode.to_string()))
}

/// Band token as tallied by statistics
pub fn stats_band(band: &str) -> String {
    band.to_lowercase()
}

/// Position of a band in the band plan
pub fn band_plan_index(band: &str) -> Option<usize> {
    BAND_PLAN.iter().position(|b| *b == band)
}

/// Frequency in whole kHz for export
///
/// An explicit `freq` value in MHz replaces the band base frequency and is
/// truncated, never rounded.
pub fn export_frequency_khz(band: &str, freq_mhz: Option<&str>) -> Result<u32, CanonicalError> {
    let base = contest_band_base_khz(band)?;
    match freq_mhz {
        None | Some("") => Ok(base),
        Some(raw) => {
            let invalid = || CanonicalError::InvalidFrequency(raw.to_string());
            let text = raw.trim();
            if let Some(khz) = decimal_mhz_to_khz(text) {
                return khz.ok_or_else(invalid);
            }
            let mhz: f64 = text.parse().map_err(|_| invalid())?;
            let khz = (mhz * 1000.0).floor();
            if !khz.is_finite() || khz < 0.0 || khz > u32::MAX as f64 {
                return Err(invalid());
            }
            Ok(khz as u32)
        }
    }
}

/// Exact kHz for plain decimal text such as `14.2005`
///
/// `None` when the text is not plain `digits[.digits]`; `Some(None)` when it
/// is but overflows.
fn decimal_mhz_to_khz(text: &str) -> Option<Option<u32>> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    let plain = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if int_part.is_empty() && frac_part.is_empty() || !plain(int_part) || !plain(frac_part) {
        return None;
    }
    let mhz: u64 = if int_part.is_empty() {
        0
    } else {
        match int_part.parse() {
            Ok(n) => n,
            Err(_) => return Some(None),
        }
    };
    let khz_digits: String = frac_part.chars().chain("000".chars()).take(3).collect();
    let khz_frac: u64 = khz_digits.parse().unwrap_or(0);
    Some(
        mhz.checked_mul(1000)
            .and_then(|k| k.checked_add(khz_frac))
            .and_then(|k| u32::try_from(k).ok()),
    )
}
