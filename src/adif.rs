//! Parser for ADIF (Amateur Data Interchange Format) logs.
//!
//! This module uses the `nom` parsing library to recognise field tags. Field
//! values are taken by their declared length rather than by scanning for the
//! next `<`, so values that contain tag-like text are read intact.
//!
//! # Record Format
//!
//! ```text
//! header text <EOH>
//! <CALL:4>W1AW <QSO_DATE:8>20250101 <TIME_ON:4>1200 <BAND:3>20m <MODE:2>CW <EOR>
//! ```
//!
//! A tag is `<NAME:LENGTH>` or `<NAME:LENGTH:TYPE>`, followed by exactly
//! `LENGTH` characters of value.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{alpha1, char, digit1},
    combinator::{map_res, opt},
    sequence::preceded,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

use crate::qso::{ContactRecord, band_for_frequency};

/// Year kept by [`parse_adif`]. Contacts from other years are discarded.
pub const TARGET_YEAR: i32 = 2025;

/// Result of parsing a log.
#[derive(Debug, Clone, Default)]
pub struct AdifLog {
    /// Records from the target year, in log order.
    pub records: Vec<ContactRecord>,

    /// Chunks that had tags but no callsign.
    pub skipped: usize,

    /// Records dropped by the year filter, keyed by year.
    pub other_years: BTreeMap<i32, usize>,

    /// Records dropped because they carry no date at all.
    pub undated: usize,
}

impl AdifLog {
    /// Total number of records removed by the year filter.
    pub fn discarded(&self) -> usize {
        self.other_years.values().sum::<usize>() + self.undated
    }

    /// Distinct years present in the kept records, newest first.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().filter_map(|q| q.year()).collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        years.dedup();
        years
    }

    /// Earliest and latest timestamps among the kept records.
    pub fn date_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let mut stamps = self.records.iter().filter_map(|q| q.timestamp);
        let first = stamps.next()?;
        Some(stamps.fold((first, first), |(lo, hi), ts| (lo.min(ts), hi.max(ts))))
    }
}

/// ADIF fields understood by the parser.
///
/// Everything else in a record is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdifField {
    Call,
    QsoDate,
    TimeOn,
    TimeOff,
    Band,
    Freq,
    Mode,
    Submode,
    RstSent,
    RstRcvd,
    Dxcc,
    Country,
    Continent,
    /// N1MM Logger's continent, used only when `CONT` is absent.
    N1mmContinent,
    Prefix,
    CqZone,
    ItuZone,
    GridSquare,
    MyGridSquare,
    Name,
    Qth,
    Comment,
    TxPower,
    ContestId,
    SerialReceived,
    SerialSent,
    Operator,
    StationCallsign,
    MyDxcc,
    MyCountry,
    Distance,
    PropMode,
    SatName,
    LotwQslRcvd,
    EqslQslRcvd,
    QslRcvd,
    QslSent,
    Iota,
    SotaRef,
    PotaRef,
    WwffRef,
}

/// Tag name to field mapping. Names are upper-case.
const FIELD_TABLE: &[(&str, AdifField)] = &[
    ("CALL", AdifField::Call),
    ("QSO_DATE", AdifField::QsoDate),
    ("TIME_ON", AdifField::TimeOn),
    ("TIME_OFF", AdifField::TimeOff),
    ("BAND", AdifField::Band),
    ("FREQ", AdifField::Freq),
    ("MODE", AdifField::Mode),
    ("SUBMODE", AdifField::Submode),
    ("RST_SENT", AdifField::RstSent),
    ("RST_RCVD", AdifField::RstRcvd),
    ("DXCC", AdifField::Dxcc),
    ("COUNTRY", AdifField::Country),
    ("CONT", AdifField::Continent),
    ("APP_N1MM_CONTINENT", AdifField::N1mmContinent),
    ("PFX", AdifField::Prefix),
    ("CQZ", AdifField::CqZone),
    ("ITUZ", AdifField::ItuZone),
    ("GRIDSQUARE", AdifField::GridSquare),
    ("MY_GRIDSQUARE", AdifField::MyGridSquare),
    ("NAME", AdifField::Name),
    ("QTH", AdifField::Qth),
    ("COMMENT", AdifField::Comment),
    ("COMMENTS", AdifField::Comment),
    ("TX_PWR", AdifField::TxPower),
    ("CONTEST_ID", AdifField::ContestId),
    ("SRX", AdifField::SerialReceived),
    ("SRX_STRING", AdifField::SerialReceived),
    ("STX", AdifField::SerialSent),
    ("STX_STRING", AdifField::SerialSent),
    ("OPERATOR", AdifField::Operator),
    ("STATION_CALLSIGN", AdifField::StationCallsign),
    ("MY_DXCC", AdifField::MyDxcc),
    ("MY_COUNTRY", AdifField::MyCountry),
    ("DISTANCE", AdifField::Distance),
    ("PROP_MODE", AdifField::PropMode),
    ("SAT_NAME", AdifField::SatName),
    ("LOTW_QSL_RCVD", AdifField::LotwQslRcvd),
    ("EQSL_QSL_RCVD", AdifField::EqslQslRcvd),
    ("QSL_RCVD", AdifField::QslRcvd),
    ("QSL_SENT", AdifField::QslSent),
    ("IOTA", AdifField::Iota),
    ("SOTA_REF", AdifField::SotaRef),
    ("POTA_REF", AdifField::PotaRef),
    ("WWFF_REF", AdifField::WwffRef),
];

static FIELD_INDEX: LazyLock<HashMap<&'static str, AdifField>> =
    LazyLock::new(|| FIELD_TABLE.iter().copied().collect());

impl AdifField {
    /// Look up a field by tag name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        FIELD_INDEX.get(name.to_ascii_uppercase().as_str()).copied()
    }

    /// Store a trimmed field value on the record.
    fn apply(self, qso: &mut ContactRecord, value: &str) {
        let upper = || Some(value.to_ascii_uppercase());
        let text = || Some(value.to_string());

        match self {
            AdifField::Call => qso.callsign = value.to_ascii_uppercase(),
            AdifField::QsoDate => {
                qso.date = parse_date(value);
                qso.raw_date = text();
            }
            AdifField::TimeOn => qso.time_on = parse_time(value),
            AdifField::TimeOff => qso.time_off = parse_time(value),
            AdifField::Band => qso.band = Some(value.to_ascii_lowercase()),
            AdifField::Freq => qso.freq_mhz = value.parse().ok(),
            AdifField::Mode => qso.mode = upper(),
            AdifField::Submode => qso.submode = upper(),
            AdifField::RstSent => qso.rst_sent = text(),
            AdifField::RstRcvd => qso.rst_rcvd = text(),
            AdifField::Dxcc => qso.dxcc = nonzero(value),
            AdifField::Country => qso.country = text(),
            AdifField::Continent => qso.continent = upper(),
            AdifField::N1mmContinent => {
                if qso.continent.is_none() {
                    qso.continent = upper();
                }
            }
            AdifField::Prefix => qso.prefix = upper(),
            AdifField::CqZone => qso.cq_zone = nonzero(value),
            AdifField::ItuZone => qso.itu_zone = nonzero(value),
            AdifField::GridSquare => qso.grid_square = upper(),
            AdifField::MyGridSquare => qso.my_grid_square = upper(),
            AdifField::Name => qso.name = text(),
            AdifField::Qth => qso.qth = text(),
            AdifField::Comment => qso.comment = text(),
            AdifField::TxPower => qso.tx_power = value.parse().ok(),
            AdifField::ContestId => qso.contest_id = text(),
            AdifField::SerialReceived => qso.serial_received = text(),
            AdifField::SerialSent => qso.serial_sent = text(),
            AdifField::Operator => qso.operator = upper(),
            AdifField::StationCallsign => qso.station_callsign = upper(),
            AdifField::MyDxcc => qso.my_dxcc = nonzero(value),
            AdifField::MyCountry => qso.my_country = text(),
            AdifField::Distance => qso.distance_km = value.parse().ok(),
            AdifField::PropMode => qso.prop_mode = upper(),
            AdifField::SatName => qso.sat_name = upper(),
            AdifField::LotwQslRcvd => qso.lotw_qsl_rcvd = upper(),
            AdifField::EqslQslRcvd => qso.eqsl_qsl_rcvd = upper(),
            AdifField::QslRcvd => qso.qsl_rcvd = upper(),
            AdifField::QslSent => qso.qsl_sent = upper(),
            AdifField::Iota => qso.iota = upper(),
            AdifField::SotaRef => qso.sota_ref = upper(),
            AdifField::PotaRef => qso.pota_ref = upper(),
            AdifField::WwffRef => qso.wwff_ref = upper(),
        }
    }
}

/// A field tag such as `<QSO_DATE:8:D>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FieldTag<'a> {
    name: &'a str,
    length: usize,
}

/// Check if a character is valid in a field name.
fn is_field_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a field tag, leaving the input positioned at the start of the value.
fn parse_field_tag(input: &str) -> IResult<&str, FieldTag<'_>> {
    let (input, _) = char('<').parse(input)?;
    let (input, name) = take_while1(is_field_name_char).parse(input)?;
    let (input, length) =
        preceded(char(':'), map_res(digit1, |s: &str| s.parse::<usize>())).parse(input)?;
    let (input, _) = opt(preceded(char(':'), alpha1)).parse(input)?;
    let (input, _) = char('>').parse(input)?;

    Ok((input, FieldTag { name, length }))
}

/// Split `input` after `count` characters (or at the end, if shorter).
fn split_chars(input: &str, count: usize) -> (&str, &str) {
    let end = input
        .char_indices()
        .nth(count)
        .map_or(input.len(), |(i, _)| i);
    input.split_at(end)
}

/// Extract `(name, value)` pairs from one record in order of appearance.
fn record_fields(record: &str) -> Vec<(&str, &str)> {
    let mut fields = Vec::new();
    let mut rest = record;

    while let Some(pos) = rest.find('<') {
        let candidate = &rest[pos..];
        match parse_field_tag(candidate) {
            Ok((after_tag, tag)) => {
                let (value, after_value) = split_chars(after_tag, tag.length);
                fields.push((tag.name, value.trim()));
                rest = after_value;
            }
            Err(_) => {
                // Not a field tag (e.g. <EOR> remnants or stray markup)
                rest = &candidate[1..];
            }
        }
    }

    fields
}

/// Parse one record chunk into a contact.
///
/// Returns `None` if the chunk yields no callsign.
pub fn parse_record(record: &str) -> Option<ContactRecord> {
    let mut qso = ContactRecord::default();

    for (name, value) in record_fields(record) {
        // Loggers export unset fields as zero-length tags
        if value.is_empty() {
            continue;
        }
        if let Some(field) = AdifField::from_name(name) {
            field.apply(&mut qso, value);
        }
    }

    if qso.callsign.is_empty() {
        return None;
    }

    if qso.band.is_none() {
        qso.band = qso
            .freq_mhz
            .and_then(band_for_frequency)
            .map(str::to_string);
    }
    qso.update_timestamp();

    Some(qso)
}

/// Parse an entity or zone number, where `0` means unset.
fn nonzero<T: std::str::FromStr + PartialEq + Default>(value: &str) -> Option<T> {
    value.parse().ok().filter(|n| *n != T::default())
}

/// Parse an ADIF date (`YYYYMMDD`).
fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() < 8 {
        return None;
    }
    let year = value.get(0..4)?.parse().ok()?;
    let month = value.get(4..6)?.parse().ok()?;
    let day = value.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an ADIF time (`HHMM` or `HHMMSS`).
fn parse_time(value: &str) -> Option<NaiveTime> {
    if value.len() < 4 {
        return None;
    }
    let hours = value.get(0..2)?.parse().ok()?;
    let minutes = value.get(2..4)?.parse().ok()?;
    let seconds = match value.get(4..6) {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    NaiveTime::from_hms_opt(hours, minutes, seconds)
}

/// Split a log into raw record chunks, dropping the header.
///
/// Both markers are matched case-insensitively.
fn record_chunks(content: &str) -> Vec<&str> {
    // ASCII upper-casing keeps byte offsets aligned with `content`
    let upper = content.to_ascii_uppercase();

    let data_start = upper.find("<EOH>").map_or(0, |i| i + "<EOH>".len());
    let data = &content[data_start..];
    let data_upper = &upper[data_start..];

    let mut chunks = Vec::new();
    let mut start = 0;
    for (i, marker) in data_upper.match_indices("<EOR>") {
        chunks.push(&data[start..i]);
        start = i + marker.len();
    }
    chunks.push(&data[start..]);
    chunks
}

/// Quick check whether text looks like an ADIF log at all.
#[inline]
pub fn looks_like_adif(content: &str) -> bool {
    let upper = content.to_ascii_uppercase();
    upper.contains("<EOH>")
        || upper.contains("<EOR>")
        || content
            .match_indices('<')
            .any(|(i, _)| parse_field_tag(&content[i..]).is_ok())
}

/// Parse a log, keeping only contacts from [`TARGET_YEAR`].
///
/// # Example
///
/// ```
/// use ham_wrapped::adif::parse_adif;
///
/// let log = parse_adif("<CALL:4>W1AW <QSO_DATE:8>20250704 <BAND:3>20m <EOR>");
/// assert_eq!(log.records.len(), 1);
/// assert_eq!(log.records[0].callsign, "W1AW");
/// ```
pub fn parse_adif(content: &str) -> AdifLog {
    parse_adif_for_year(content, TARGET_YEAR)
}

/// Parse a log, keeping only contacts from `year`.
///
/// Malformed chunks are skipped; this never fails as a whole.
pub fn parse_adif_for_year(content: &str, year: i32) -> AdifLog {
    let mut log = AdifLog::default();
    let mut parsed = Vec::new();

    for chunk in record_chunks(content) {
        if chunk.trim().is_empty() || !chunk.contains('<') {
            continue;
        }
        match parse_record(chunk) {
            Some(qso) => parsed.push(qso),
            None => {
                log.skipped += 1;
                debug!("Skipping record without callsign: {}", chunk.trim());
            }
        }
    }

    let total = parsed.len();
    for qso in parsed {
        match qso.year() {
            Some(y) if y == year => log.records.push(qso),
            Some(y) => *log.other_years.entry(y).or_insert(0) += 1,
            None => log.undated += 1,
        }
    }

    for (y, count) in &log.other_years {
        warn!("Log contains {} QSOs from {} (not {}), ignoring them", count, y, year);
    }
    if log.undated > 0 {
        warn!("Ignoring {} QSOs without a date", log.undated);
    }
    info!(
        "Parsed {} QSOs, kept {} from {}",
        total,
        log.records.len(),
        year
    );

    log
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SAMPLE_LOG: &str = "Generated by a logger\n\
        <ADIF_VER:5>3.1.4\n\
        <PROGRAMID:4>TEST\n\
        <EOH>\n\
        <CALL:4>W1AW <QSO_DATE:8>20250101 <TIME_ON:6>123456 <BAND:3>20M <MODE:2>cw <EOR>\n\
        <call:6>ja1abc <qso_date:8:D>20250102 <time_on:4>0830 <freq:5>7.074 <mode:4>MFSK <submode:3>FT4 <eor>\n";

    #[test]
    fn test_parse_field_tag() {
        let (rest, tag) = parse_field_tag("<CALL:4>W1AW").unwrap();
        assert_eq!(tag, FieldTag { name: "CALL", length: 4 });
        assert_eq!(rest, "W1AW");

        let (rest, tag) = parse_field_tag("<QSO_DATE:8:D>20250101").unwrap();
        assert_eq!(tag.name, "QSO_DATE");
        assert_eq!(tag.length, 8);
        assert_eq!(rest, "20250101");

        assert!(parse_field_tag("<EOR>").is_err());
        assert!(parse_field_tag("<CALL>").is_err());
        assert!(parse_field_tag("<CALL:x>").is_err());
    }

    #[test]
    fn test_parse_basic_log() {
        let log = parse_adif(SAMPLE_LOG);
        assert_eq!(log.records.len(), 2);
        assert_eq!(log.skipped, 0);
        assert_eq!(log.discarded(), 0);

        let first = &log.records[0];
        assert_eq!(first.callsign, "W1AW");
        assert_eq!(first.band.as_deref(), Some("20m"));
        assert_eq!(first.mode.as_deref(), Some("CW"));
        assert_eq!(first.raw_date.as_deref(), Some("20250101"));
        assert_eq!(first.time_on, NaiveTime::from_hms_opt(12, 34, 56));

        let second = &log.records[1];
        assert_eq!(second.callsign, "JA1ABC");
        assert_eq!(second.effective_mode(), Some("FT4"));
        // Band derived from frequency
        assert_eq!(second.band.as_deref(), Some("40m"));
    }

    #[test]
    fn test_value_uses_declared_length() {
        let record = "<COMMENT:11>a <b:1>c> d<e <CALL:5>K1ABC";
        let qso = parse_record(record).unwrap();
        assert_eq!(qso.comment.as_deref(), Some("a <b:1>c> d"));
        assert_eq!(qso.callsign, "K1ABC");
    }

    #[test]
    fn test_value_length_counts_characters() {
        let qso = parse_record("<NAME:6>Zoë Ł.<CALL:4>SP3A").unwrap();
        assert_eq!(qso.name.as_deref(), Some("Zoë Ł."));
        assert_eq!(qso.callsign, "SP3A");
    }

    #[test]
    fn test_truncated_value() {
        let qso = parse_record("<CALL:10>W1AW").unwrap();
        assert_eq!(qso.callsign, "W1AW");
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let qso = parse_record("<CALL:4>W1AW <APP_FOO_BAR:3>xyz <MY_RIG:5>IC705").unwrap();
        assert_eq!(qso.callsign, "W1AW");
        assert!(qso.comment.is_none());
    }

    #[test]
    fn test_n1mm_continent_fallback() {
        let qso = parse_record("<CALL:4>W1AW <APP_N1MM_CONTINENT:2>na").unwrap();
        assert_eq!(qso.continent.as_deref(), Some("NA"));

        let qso = parse_record("<CALL:4>W1AW <CONT:2>EU <APP_N1MM_CONTINENT:2>NA").unwrap();
        assert_eq!(qso.continent.as_deref(), Some("EU"));

        let qso = parse_record("<CALL:4>W1AW <APP_N1MM_CONTINENT:2>NA <CONT:2>EU").unwrap();
        assert_eq!(qso.continent.as_deref(), Some("EU"));
    }

    #[test]
    fn test_numeric_fields() {
        let qso = parse_record(
            "<CALL:4>W1AW <DXCC:3>291 <CQZ:1>5 <ITUZ:1>8 <DISTANCE:6>6543.2 <TX_PWR:3>100 <MY_DXCC:3>269",
        )
        .unwrap();
        assert_eq!(qso.dxcc, Some(291));
        assert_eq!(qso.cq_zone, Some(5));
        assert_eq!(qso.itu_zone, Some(8));
        assert_eq!(qso.distance_km, Some(6543.2));
        assert_eq!(qso.tx_power, Some(100.0));
        assert_eq!(qso.my_dxcc, Some(269));

        let qso = parse_record("<CALL:4>W1AW <CQZ:3>abc").unwrap();
        assert_eq!(qso.cq_zone, None);
    }

    #[test]
    fn test_field_aliases() {
        let qso = parse_record(
            "<CALL:4>W1AW <COMMENTS:2>hi <SRX_STRING:3>001 <STX:2>42 <CONTEST_ID:6>CQ-WPX",
        )
        .unwrap();
        assert_eq!(qso.comment.as_deref(), Some("hi"));
        assert_eq!(qso.serial_received.as_deref(), Some("001"));
        assert_eq!(qso.serial_sent.as_deref(), Some("42"));
        assert_eq!(qso.contest_id.as_deref(), Some("CQ-WPX"));
    }

    #[test]
    fn test_timestamp_composition() {
        let qso = parse_record("<CALL:4>W1AW <QSO_DATE:8>20250315 <TIME_ON:4>2359").unwrap();
        let ts = qso.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 3, 15));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (23, 59, 0));

        let qso = parse_record("<CALL:4>W1AW <QSO_DATE:8>20250315").unwrap();
        assert!(qso.timestamp.is_none());
    }

    #[test]
    fn test_invalid_date_and_time() {
        let qso = parse_record("<CALL:4>W1AW <QSO_DATE:8>20250231 <TIME_ON:4>2561").unwrap();
        assert!(qso.date.is_none());
        assert!(qso.time_on.is_none());
        assert_eq!(qso.raw_date.as_deref(), Some("20250231"));
        assert_eq!(qso.year(), Some(2025));

        assert!(parse_date("2025").is_none());
        assert!(parse_time("12").is_none());
    }

    #[test]
    fn test_records_without_callsign_skipped() {
        let log = parse_adif(
            "<EOH><BAND:3>20m <QSO_DATE:8>20250101 <EOR> just text <EOR>\n<CALL:4>W1AW <QSO_DATE:8>20250101 <EOR>",
        );
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.skipped, 1);
    }

    #[test]
    fn test_no_header() {
        let log = parse_adif("<CALL:4>W1AW <QSO_DATE:8>20250101 <eor><CALL:4>K1AB <QSO_DATE:8>20250102 <EoR>");
        assert_eq!(log.records.len(), 2);
    }

    #[test]
    fn test_header_fields_not_records() {
        let log = parse_adif("<PROGRAMID:4>TEST <CALL:4>HDR1 <EOH><CALL:4>W1AW <QSO_DATE:8>20250101 <EOR>");
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.records[0].callsign, "W1AW");
    }

    #[test]
    fn test_year_filter() {
        let log = parse_adif_for_year(
            "<EOH>\
             <CALL:4>W1AW <QSO_DATE:8>20250101 <EOR>\
             <CALL:4>K1AB <QSO_DATE:8>20241231 <EOR>\
             <CALL:4>N1CD <QSO_DATE:8>20240601 <EOR>\
             <CALL:4>W2EF <QSO_DATE:8>20230601 <EOR>\
             <CALL:4>W3GH <EOR>",
            2025,
        );
        assert_eq!(log.records.len(), 1);
        assert_eq!(log.other_years.get(&2024), Some(&2));
        assert_eq!(log.other_years.get(&2023), Some(&1));
        assert_eq!(log.undated, 1);
        assert_eq!(log.discarded(), 4);
    }

    #[test]
    fn test_empty_and_garbage_input() {
        assert!(parse_adif("").records.is_empty());
        assert!(parse_adif("no tags here").records.is_empty());
        assert!(parse_adif("<EOH>").records.is_empty());
        assert!(parse_adif("<<<:::>>>").records.is_empty());
    }

    #[test]
    fn test_looks_like_adif() {
        assert!(looks_like_adif(SAMPLE_LOG));
        assert!(looks_like_adif("<call:4>W1AW"));
        assert!(looks_like_adif("header <eoh>"));
        assert!(!looks_like_adif("START-OF-LOG: 3.0\nQSO: 14000 CW"));
        assert!(!looks_like_adif(""));
    }

    #[test]
    fn test_available_years_and_date_range() {
        let log = parse_adif(SAMPLE_LOG);
        assert_eq!(log.available_years(), vec![2025]);

        let (start, end) = log.date_range().unwrap();
        assert_eq!(start.to_rfc3339(), "2025-01-01T12:34:56+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-02T08:30:00+00:00");

        assert!(AdifLog::default().date_range().is_none());
    }

    #[test]
    fn test_empty_fields_are_unset() {
        let qso = parse_record(
            "<CALL:6>JA1ABC <QSO_DATE:8>20250301 <BAND:0> <FREQ:6>14.025 <CONT:0> \
             <COUNTRY:0> <DXCC:1>0 <CQZ:1>0 <ITUZ:1>0 <CONTEST_ID:0> <SOTA_REF:0> <POTA_REF:0>",
        )
        .unwrap();

        assert_eq!(qso.band.as_deref(), Some("20m"));
        assert!(qso.continent.is_none());
        assert!(qso.country.is_none());
        assert!(qso.dxcc.is_none());
        assert!(qso.cq_zone.is_none());
        assert!(qso.itu_zone.is_none());
        assert!(qso.contest_id.is_none());
        assert!(qso.sota_ref.is_none());
        assert!(qso.pota_ref.is_none());
    }

    #[test]
    fn test_empty_call_is_skipped() {
        assert!(parse_record("<CALL:0> <QSO_DATE:8>20250301").is_none());
    }
}
