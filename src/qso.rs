//! Data structures representing logged contacts.
//!
//! A [`ContactRecord`] is created by the ADIF parser, has its missing entity
//! fields filled in by the resolver, and is then read by the statistics
//! engine without further changes.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geo::Coordinates;

/// A single logged radio contact (QSO).
///
/// Every field except the callsign is optional because ADIF records carry
/// whatever subset of fields the logging program chose to export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    /// The worked station's callsign, upper-case.
    pub callsign: String,

    /// Band in lower-case band-plan form, e.g. `20m`.
    pub band: Option<String>,
    /// Frequency in MHz.
    pub freq_mhz: Option<f64>,
    pub mode: Option<String>,
    pub submode: Option<String>,

    /// Calendar date of the contact.
    pub date: Option<NaiveDate>,
    /// The date exactly as it appeared in the log (`YYYYMMDD`).
    pub raw_date: Option<String>,
    pub time_on: Option<NaiveTime>,
    pub time_off: Option<NaiveTime>,
    /// `date` + `time_on` interpreted as UTC.
    pub timestamp: Option<DateTime<Utc>>,

    pub rst_sent: Option<String>,
    pub rst_rcvd: Option<String>,

    // Entity data, from the log or filled by resolution
    pub dxcc: Option<u16>,
    pub country: Option<String>,
    pub continent: Option<String>,
    pub cq_zone: Option<u8>,
    pub itu_zone: Option<u8>,
    pub prefix: Option<String>,

    /// Entity coordinates from resolution.
    pub lat: Option<f64>,
    pub lon: Option<f64>,

    pub grid_square: Option<String>,
    pub my_grid_square: Option<String>,
    pub name: Option<String>,
    pub qth: Option<String>,
    pub comment: Option<String>,
    pub tx_power: Option<f64>,

    pub contest_id: Option<String>,
    pub serial_sent: Option<String>,
    pub serial_received: Option<String>,

    pub operator: Option<String>,
    pub station_callsign: Option<String>,
    pub my_dxcc: Option<u16>,
    pub my_country: Option<String>,

    /// Distance in kilometers as recorded by the logging program.
    pub distance_km: Option<f64>,
    pub prop_mode: Option<String>,
    pub sat_name: Option<String>,

    pub lotw_qsl_rcvd: Option<String>,
    pub eqsl_qsl_rcvd: Option<String>,
    pub qsl_rcvd: Option<String>,
    pub qsl_sent: Option<String>,

    pub iota: Option<String>,
    pub sota_ref: Option<String>,
    pub pota_ref: Option<String>,
    pub wwff_ref: Option<String>,
}

impl ContactRecord {
    /// Create a record with only a callsign set.
    pub fn new(callsign: impl AsRef<str>) -> Self {
        Self {
            callsign: callsign.as_ref().trim().to_ascii_uppercase(),
            ..Default::default()
        }
    }

    /// The four-digit year of the contact.
    ///
    /// The raw log date wins over the parsed date so that a record with an
    /// impossible calendar date still lands in the right year.
    pub fn year(&self) -> Option<i32> {
        self.raw_date
            .as_deref()
            .and_then(|raw| raw.get(0..4))
            .and_then(|y| y.parse().ok())
            .or_else(|| self.date.map(|d| d.year()))
    }

    /// Resolved entity coordinates, if both halves are known.
    pub fn entity_coords(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.lat?, self.lon?))
    }

    /// Mode used for statistics: submode if present, otherwise mode.
    pub fn effective_mode(&self) -> Option<&str> {
        self.submode.as_deref().or(self.mode.as_deref())
    }

    /// True when the contact was made through a satellite.
    pub fn is_satellite(&self) -> bool {
        self.sat_name.is_some() || self.prop_mode.as_deref() == Some("SAT")
    }

    /// Compose `timestamp` from `date` and `time_on`.
    pub(crate) fn update_timestamp(&mut self) {
        self.timestamp = match (self.date, self.time_on) {
            (Some(date), Some(time)) => Some(date.and_time(time).and_utc()),
            _ => None,
        };
    }
}

impl fmt::Display for ContactRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.callsign)?;
        if let Some(ts) = self.timestamp {
            write!(f, " {}", ts.format("%Y-%m-%d %H:%MZ"))?;
        } else if let Some(date) = self.date {
            write!(f, " {}", date.format("%Y-%m-%d"))?;
        }
        if let Some(ref band) = self.band {
            write!(f, " {}", band)?;
        }
        if let Some(mode) = self.effective_mode() {
            write!(f, " {}", mode)?;
        }
        if let Some(ref country) = self.country {
            write!(f, " ({})", country)?;
        }
        Ok(())
    }
}

/// Returns the amateur radio band for a frequency in MHz.
///
/// Returns `None` if the frequency doesn't fall within a recognized band.
pub fn band_for_frequency(freq_mhz: f64) -> Option<&'static str> {
    if !freq_mhz.is_finite() || freq_mhz <= 0.0 {
        return None;
    }

    match (freq_mhz * 1000.0) as u64 {
        135..=138 => Some("2200m"),
        472..=479 => Some("630m"),
        1800..=2000 => Some("160m"),
        3500..=4000 => Some("80m"),
        5060..=5450 => Some("60m"),
        7000..=7300 => Some("40m"),
        10100..=10150 => Some("30m"),
        14000..=14350 => Some("20m"),
        18068..=18168 => Some("17m"),
        21000..=21450 => Some("15m"),
        24890..=24990 => Some("12m"),
        28000..=29700 => Some("10m"),
        50000..=54000 => Some("6m"),
        70000..=71000 => Some("4m"),
        144000..=148000 => Some("2m"),
        222000..=225000 => Some("1.25m"),
        420000..=450000 => Some("70cm"),
        902000..=928000 => Some("33cm"),
        1240000..=1300000 => Some("23cm"),
        _ => None,
    }
}
