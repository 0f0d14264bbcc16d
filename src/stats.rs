//! Year-in-review statistics over a set of contacts.
//!
//! [`compute_all`] makes a single pass per category over resolved
//! [`ContactRecord`]s and returns an immutable [`LogStatistics`]. Rankings
//! sort by descending count with a stable sort, so equal counts keep the
//! order in which their keys first appeared in the log.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use hdrhistogram::Histogram;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use tracing::{info, warn};

use crate::cty::{Entity, ReferenceDatabase};
use crate::geo::{Coordinates, distance_km, is_valid_locator, locator_to_coords};
use crate::qso::ContactRecord;

/// Station position assumed when neither a locator nor logged distances are
/// available.
pub const DEFAULT_STATION: Coordinates = Coordinates {
    lat: 52.0,
    lon: 20.0,
};

/// Key used for contacts without a mode or band.
pub const UNKNOWN: &str = "UNKNOWN";

/// Largest distance tracked by the distance histogram, in kilometers.
const MAX_TRACKED_DISTANCE_KM: u64 = 40_000;

const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Inputs to [`compute_all`] besides the records themselves.
#[derive(Debug, Clone, Copy)]
pub struct StatsContext<'a> {
    /// Country file used to look up entity data missing from a record.
    pub db: Option<&'a ReferenceDatabase>,
    /// Station position for estimated distances.
    pub fallback_station: Coordinates,
    /// Length of the ranked callsign table.
    pub top_callsigns: usize,
}

impl Default for StatsContext<'_> {
    fn default() -> Self {
        Self {
            db: None,
            fallback_station: DEFAULT_STATION,
            top_callsigns: 10,
        }
    }
}

impl<'a> StatsContext<'a> {
    pub fn with_db(db: &'a ReferenceDatabase) -> Self {
        Self {
            db: Some(db),
            ..Default::default()
        }
    }

    /// Entity for a record, by DXCC number first and then by country name.
    fn entity_for(&self, record: &ContactRecord) -> Option<&'a Entity> {
        let db = self.db?;
        record
            .dxcc
            .and_then(|id| db.entity_by_dxcc(id))
            .or_else(|| record.country.as_deref().and_then(|n| db.entity_by_name(n)))
    }

    fn entity_coords(&self, record: &ContactRecord) -> Option<Coordinates> {
        record
            .entity_coords()
            .or_else(|| self.entity_for(record).map(Entity::coords))
    }

    fn country_name(&self, record: &ContactRecord) -> Option<String> {
        record
            .country
            .clone()
            .or_else(|| self.entity_for(record).map(|e| e.name.clone()))
    }
}

/// Counter that remembers the order in which keys were first seen.
#[derive(Debug, Clone)]
struct Tally<K> {
    entries: Vec<(K, usize)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// A tally with every key present at zero, in the given order.
    fn seeded(keys: impl IntoIterator<Item = K>) -> Self {
        let mut tally = Self::new();
        for key in keys {
            tally.index.insert(key.clone(), tally.entries.len());
            tally.entries.push((key, 0));
        }
        tally
    }

    fn add(&mut self, key: K) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, 1));
            }
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    /// First key reaching the highest non-zero count.
    fn best(&self) -> Option<(&K, usize)> {
        let mut best: Option<(&K, usize)> = None;
        for (key, count) in &self.entries {
            if *count > best.map_or(0, |(_, c)| c) {
                best = Some((key, *count));
            }
        }
        best
    }

    /// Entries by descending count, ties in first-seen order.
    fn ranked(&self) -> Vec<(K, usize)> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }

    fn distribution(&self) -> TimeDistribution<K> {
        TimeDistribution {
            distribution: self.buckets(),
            best: self.best().map(|(key, count)| Bucket {
                key: key.clone(),
                count,
            }),
        }
    }

    fn buckets(&self) -> Vec<Bucket<K>> {
        self.entries
            .iter()
            .map(|(key, count)| Bucket {
                key: key.clone(),
                count: *count,
            })
            .collect()
    }
}

/// `count / total` as a percentage rounded to one decimal place.
fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (count as f64 / total as f64 * 1000.0).round() / 10.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// A key with its count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket<K> {
    pub key: K,
    pub count: usize,
}

/// A key with its count and share of all contacts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountShare {
    pub key: String,
    pub count: usize,
    pub percentage: f64,
}

fn shares(ranked: Vec<(String, usize)>, total: usize) -> Vec<CountShare> {
    ranked
        .into_iter()
        .map(|(key, count)| CountShare {
            percentage: percentage(count, total),
            key,
            count,
        })
        .collect()
}

/// Distinct and most-worked callsigns.
#[derive(Debug, Clone, Serialize)]
pub struct CallsignStats {
    pub unique_count: usize,
    /// Distinct callsigns in first-seen order.
    pub unique: Vec<String>,
    pub top: Vec<CountShare>,
    pub favorite: Option<CountShare>,
}

/// Counts per time bucket with the busiest bucket.
#[derive(Debug, Clone, Serialize)]
pub struct TimeDistribution<K> {
    pub distribution: Vec<Bucket<K>>,
    pub best: Option<Bucket<K>>,
}

/// Ranked counts for a categorical attribute such as band or mode.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub sorted: Vec<CountShare>,
    pub favorite: Option<CountShare>,
    /// Number of distinct keys.
    pub count: usize,
}

impl CategoryStats {
    fn from_tally(tally: &Tally<String>, total: usize) -> Self {
        let sorted = shares(tally.ranked(), total);
        Self {
            favorite: sorted.first().cloned(),
            count: sorted.len(),
            sorted,
        }
    }
}

/// Identity of a DXCC entity within a log.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EntityKey {
    Dxcc(u16),
    Name(String),
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKey::Dxcc(id) => write!(f, "{}", id),
            EntityKey::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Contacts with one DXCC entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DxccEntry {
    pub dxcc: Option<u16>,
    pub name: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DxccStats {
    pub sorted: Vec<DxccEntry>,
    pub top: Option<DxccEntry>,
    /// Number of distinct entities.
    pub count: usize,
}

impl DxccStats {
    /// The `n` most-worked entities.
    pub fn top_n(&self, n: usize) -> &[DxccEntry] {
        &self.sorted[..n.min(self.sorted.len())]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CqZoneStats {
    /// Zones in first-seen order.
    pub distribution: Vec<Bucket<u8>>,
    /// Number of distinct zones.
    pub count: usize,
}

/// Where contact distances came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceSource {
    /// Computed from the station locator.
    Locator,
    /// Taken from `DISTANCE` fields in the log.
    Log,
    /// Computed from entity positions against the fallback station.
    Estimated,
}

/// A contact together with its distance from the station.
#[derive(Debug, Clone, Serialize)]
pub struct DistanceRecord {
    pub contact: ContactRecord,
    pub distance_km: f64,
    pub country: Option<String>,
}

/// Percentile values from a histogram.
#[derive(Debug, Clone, Serialize)]
pub struct HistogramPercentiles {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistanceStats {
    pub source: Option<DistanceSource>,
    /// Farthest contact.
    pub odx: Option<DistanceRecord>,
    /// Nearest contact with a non-zero distance.
    pub closest: Option<DistanceRecord>,
    pub percentiles: Option<HistogramPercentiles>,
}

impl DistanceStats {
    fn from_measurements<'r>(
        source: DistanceSource,
        measured: impl IntoIterator<Item = (&'r ContactRecord, f64)>,
        ctx: &StatsContext<'_>,
    ) -> Self {
        let mut histogram = Histogram::<u64>::new_with_bounds(1, MAX_TRACKED_DISTANCE_KM, 3).ok();
        let mut odx: Option<(&ContactRecord, f64)> = None;
        let mut closest: Option<(&ContactRecord, f64)> = None;

        for (record, distance) in measured {
            if distance.is_nan() || distance <= 0.0 {
                continue;
            }

            if let Some(ref mut hist) = histogram {
                let _ = hist.record((distance.round() as u64).clamp(1, MAX_TRACKED_DISTANCE_KM));
            }

            if distance > odx.map_or(0.0, |(_, d)| d) {
                odx = Some((record, distance));
            }
            if closest.is_none_or(|(_, d)| distance < d) {
                closest = Some((record, distance));
            }
        }

        let to_record = |(record, distance): (&ContactRecord, f64)| DistanceRecord {
            contact: record.clone(),
            distance_km: distance,
            country: ctx.country_name(record),
        };

        let percentiles = histogram
            .filter(|h| !h.is_empty())
            .map(|h| HistogramPercentiles {
                p50: h.value_at_quantile(0.50),
                p90: h.value_at_quantile(0.90),
                p99: h.value_at_quantile(0.99),
                min: h.min(),
                max: h.max(),
                mean: h.mean(),
            });

        Self {
            source: odx.map(|_| source),
            odx: odx.map(to_record),
            closest: closest.map(to_record),
            percentiles,
        }
    }
}

/// Busiest clock hour.
#[derive(Debug, Clone, Serialize)]
pub struct QsoRate {
    pub max_rate: usize,
    /// Bucket key, e.g. `2025-06-28T18:00:00.000Z`.
    pub peak_hour: Option<String>,
    pub peak_time: Option<DateTime<Utc>>,
}

/// The day with the longest span between first and last contact.
#[derive(Debug, Clone, Serialize)]
pub struct LongestDay {
    pub date: NaiveDate,
    /// Span in hours, one decimal place.
    pub hours: f64,
    pub count: usize,
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContestStats {
    /// Number of distinct contests.
    pub total: usize,
    pub contests: Vec<Bucket<String>>,
    pub qsos_in_contests: usize,
}

/// Contacts made as part of special programs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpecialActivity {
    pub satellite: usize,
    pub sota: usize,
    pub pota: usize,
    pub iota: usize,
    pub wwff: usize,
}

/// Longest run of consecutive active days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub length: usize,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSlotEntity {
    /// DXCC number, or the country name when no number is known.
    pub key: String,
    pub name: String,
    pub slots: usize,
    /// Bands worked, in first-seen order.
    pub bands: Vec<String>,
}

/// Distinct entity and band combinations.
#[derive(Debug, Clone, Serialize)]
pub struct BandSlotStats {
    pub total_slots: usize,
    pub entity_count: usize,
    pub band_count: usize,
    pub top: Vec<BandSlotEntity>,
    pub all: Vec<BandSlotEntity>,
}

/// Everything computed for a log.
#[derive(Debug, Clone, Serialize)]
pub struct LogStatistics {
    pub total_qsos: usize,
    pub callsigns: CallsignStats,
    /// Months 1-12.
    pub by_month: TimeDistribution<u32>,
    pub by_day: TimeDistribution<NaiveDate>,
    /// Days of the week, 0 = Sunday.
    pub by_day_of_week: TimeDistribution<u32>,
    /// UTC hours 0-23.
    pub by_hour: TimeDistribution<u32>,
    pub by_mode: CategoryStats,
    pub by_band: CategoryStats,
    pub by_continent: CategoryStats,
    pub by_dxcc: DxccStats,
    pub by_cq_zone: CqZoneStats,
    pub distances: DistanceStats,
    pub qso_rate: QsoRate,
    pub longest_day: Option<LongestDay>,
    pub first_qso: Option<ContactRecord>,
    pub last_qso: Option<ContactRecord>,
    pub contests: ContestStats,
    pub special: SpecialActivity,
    pub active_days: usize,
    pub average_per_day: f64,
    pub streak: Streak,
    pub band_slots: BandSlotStats,
}

impl LogStatistics {
    pub fn is_empty(&self) -> bool {
        self.total_qsos == 0
    }
}

/// Compute all statistics for a set of contacts.
///
/// `user_locator` is the operator's Maidenhead locator. When it is missing or
/// invalid, distances come from the log's `DISTANCE` fields, or failing that
/// are estimated from `ctx.fallback_station`.
pub fn compute_all(
    records: &[ContactRecord],
    user_locator: Option<&str>,
    ctx: &StatsContext<'_>,
) -> LogStatistics {
    let total = records.len();

    let stats = LogStatistics {
        total_qsos: total,
        callsigns: callsign_stats(records, ctx.top_callsigns),
        by_month: by_month(records),
        by_day: by_day(records),
        by_day_of_week: by_day_of_week(records),
        by_hour: by_hour(records),
        by_mode: by_mode(records),
        by_band: by_band(records),
        by_continent: by_continent(records, ctx),
        by_dxcc: by_dxcc(records, ctx),
        by_cq_zone: by_cq_zone(records, ctx),
        distances: distance_stats(records, user_locator, ctx),
        qso_rate: qso_rate(records),
        longest_day: longest_day(records),
        first_qso: first_qso(records),
        last_qso: last_qso(records),
        contests: contest_stats(records),
        special: special_activity(records),
        active_days: active_days(records),
        average_per_day: average_per_day(records),
        streak: longest_streak(records),
        band_slots: band_slots(records, ctx),
    };

    info!(
        "Computed statistics: {} QSOs, {} callsigns, {} entities, {} active days",
        stats.total_qsos, stats.callsigns.unique_count, stats.by_dxcc.count, stats.active_days
    );
    stats
}

pub fn callsign_stats(records: &[ContactRecord], top: usize) -> CallsignStats {
    let mut tally = Tally::new();
    for record in records.iter().filter(|r| !r.callsign.is_empty()) {
        tally.add(record.callsign.clone());
    }

    let unique = tally.entries.iter().map(|(call, _)| call.clone()).collect();
    let mut ranked = shares(tally.ranked(), records.len());
    let favorite = ranked.first().cloned();
    ranked.truncate(top);

    CallsignStats {
        unique_count: tally.len(),
        unique,
        top: ranked,
        favorite,
    }
}

pub fn by_month(records: &[ContactRecord]) -> TimeDistribution<u32> {
    let mut tally = Tally::new();
    for date in records.iter().filter_map(|r| r.date) {
        tally.add(date.month());
    }
    tally.distribution()
}

pub fn by_day(records: &[ContactRecord]) -> TimeDistribution<NaiveDate> {
    let mut tally = Tally::new();
    for date in records.iter().filter_map(|r| r.date) {
        tally.add(date);
    }
    tally.distribution()
}

pub fn by_day_of_week(records: &[ContactRecord]) -> TimeDistribution<u32> {
    let mut tally = Tally::seeded(0..7);
    for ts in records.iter().filter_map(|r| r.timestamp) {
        tally.add(ts.weekday().num_days_from_sunday());
    }
    tally.distribution()
}

pub fn by_hour(records: &[ContactRecord]) -> TimeDistribution<u32> {
    let mut tally = Tally::seeded(0..24);
    for time in records.iter().filter_map(|r| r.time_on) {
        tally.add(time.hour());
    }
    tally.distribution()
}

pub fn by_mode(records: &[ContactRecord]) -> CategoryStats {
    let mut tally = Tally::new();
    for record in records {
        tally.add(record.effective_mode().unwrap_or(UNKNOWN).to_string());
    }
    CategoryStats::from_tally(&tally, records.len())
}

pub fn by_band(records: &[ContactRecord]) -> CategoryStats {
    let mut tally = Tally::new();
    for record in records {
        tally.add(record.band.as_deref().unwrap_or(UNKNOWN).to_string());
    }
    CategoryStats::from_tally(&tally, records.len())
}

pub fn by_continent(records: &[ContactRecord], ctx: &StatsContext<'_>) -> CategoryStats {
    let mut tally = Tally::new();
    for record in records {
        let continent = record
            .continent
            .clone()
            .or_else(|| ctx.entity_for(record).map(|e| e.continent.clone()));
        if let Some(continent) = continent {
            tally.add(continent);
        }
    }
    CategoryStats::from_tally(&tally, records.len())
}

/// Entity key and display name for a record, if it has either a DXCC
/// number or a country.
fn entity_key(record: &ContactRecord, ctx: &StatsContext<'_>) -> Option<(EntityKey, String)> {
    if let Some(id) = record.dxcc {
        let name = ctx
            .db
            .and_then(|db| db.entity_by_dxcc(id))
            .map(|e| e.name.clone())
            .or_else(|| record.country.clone())
            .unwrap_or_else(|| format!("DXCC {}", id));
        return Some((EntityKey::Dxcc(id), name));
    }

    let country = record.country.as_ref()?;
    Some((EntityKey::Name(country.clone()), country.clone()))
}

pub fn by_dxcc(records: &[ContactRecord], ctx: &StatsContext<'_>) -> DxccStats {
    let mut tally = Tally::new();
    let mut names: HashMap<EntityKey, String> = HashMap::new();

    for record in records {
        if let Some((key, name)) = entity_key(record, ctx) {
            names.entry(key.clone()).or_insert(name);
            tally.add(key);
        }
    }

    let total = records.len();
    let sorted: Vec<DxccEntry> = tally
        .ranked()
        .into_iter()
        .map(|(key, count)| DxccEntry {
            dxcc: match key {
                EntityKey::Dxcc(id) => Some(id),
                EntityKey::Name(_) => None,
            },
            name: names.get(&key).cloned().unwrap_or_else(|| key.to_string()),
            count,
            percentage: percentage(count, total),
        })
        .collect();

    DxccStats {
        top: sorted.first().cloned(),
        count: sorted.len(),
        sorted,
    }
}

pub fn by_cq_zone(records: &[ContactRecord], ctx: &StatsContext<'_>) -> CqZoneStats {
    let mut tally = Tally::new();
    for record in records {
        let zone = record
            .cq_zone
            .or_else(|| ctx.entity_for(record).map(|e| e.cq_zone));
        if let Some(zone) = zone.filter(|z| (1..=40).contains(z)) {
            tally.add(zone);
        }
    }

    CqZoneStats {
        count: tally.len(),
        distribution: tally.buckets(),
    }
}

/// Station position from a locator, if it is a valid 4, 6 or 8 character one.
fn station_position(user_locator: Option<&str>) -> Option<Coordinates> {
    let locator = user_locator.map(str::trim).filter(|l| !l.is_empty())?;
    if !is_valid_locator(locator) {
        warn!("Ignoring invalid station locator '{}'", locator);
        return None;
    }
    locator_to_coords(locator).ok()
}

pub fn distance_stats(
    records: &[ContactRecord],
    user_locator: Option<&str>,
    ctx: &StatsContext<'_>,
) -> DistanceStats {
    if let Some(station) = station_position(user_locator) {
        let measured = records.iter().filter_map(|record| {
            let target = record
                .grid_square
                .as_deref()
                .filter(|g| is_valid_locator(g))
                .and_then(|g| locator_to_coords(g).ok())
                .or_else(|| ctx.entity_coords(record))?;
            Some((record, f64::from(distance_km(station, target))))
        });
        return DistanceStats::from_measurements(DistanceSource::Locator, measured, ctx);
    }

    let logged: Vec<(&ContactRecord, f64)> = records
        .iter()
        .filter_map(|r| r.distance_km.filter(|d| d.is_finite()).map(|d| (r, d)))
        .filter(|(_, d)| *d > 0.0)
        .collect();
    if !logged.is_empty() {
        return DistanceStats::from_measurements(DistanceSource::Log, logged, ctx);
    }

    let estimated = records.iter().filter_map(|record| {
        let target = ctx.entity_coords(record)?;
        Some((
            record,
            f64::from(distance_km(ctx.fallback_station, target)),
        ))
    });
    DistanceStats::from_measurements(DistanceSource::Estimated, estimated, ctx)
}

pub fn qso_rate(records: &[ContactRecord]) -> QsoRate {
    let mut tally = Tally::new();
    for ts in records.iter().filter_map(|r| r.timestamp) {
        tally.add(ts.format("%Y-%m-%dT%H:00:00.000Z").to_string());
    }

    match tally.best() {
        Some((hour, count)) => QsoRate {
            max_rate: count,
            peak_time: DateTime::parse_from_rfc3339(hour)
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            peak_hour: Some(hour.clone()),
        },
        None => QsoRate {
            max_rate: 0,
            peak_hour: None,
            peak_time: None,
        },
    }
}

pub fn longest_day(records: &[ContactRecord]) -> Option<LongestDay> {
    let mut order: Vec<NaiveDate> = Vec::new();
    let mut spans: HashMap<NaiveDate, (DateTime<Utc>, DateTime<Utc>, usize)> = HashMap::new();

    for record in records {
        let (Some(date), Some(ts)) = (record.date, record.timestamp) else {
            continue;
        };
        let span = spans.entry(date).or_insert_with(|| {
            order.push(date);
            (ts, ts, 0)
        });
        span.0 = span.0.min(ts);
        span.1 = span.1.max(ts);
        span.2 += 1;
    }

    let mut longest: Option<LongestDay> = None;
    for date in order {
        let (first, last, count) = spans[&date];
        let hours = (last - first).num_seconds() as f64 / 3600.0;
        if hours > longest.as_ref().map_or(0.0, |d| d.hours) {
            longest = Some(LongestDay {
                date,
                hours,
                count,
                first,
                last,
            });
        }
    }

    longest.map(|day| LongestDay {
        hours: round1(day.hours),
        ..day
    })
}

pub fn first_qso(records: &[ContactRecord]) -> Option<ContactRecord> {
    records
        .iter()
        .filter(|r| r.timestamp.is_some())
        .reduce(|best, r| if r.timestamp < best.timestamp { r } else { best })
        .cloned()
}

pub fn last_qso(records: &[ContactRecord]) -> Option<ContactRecord> {
    records
        .iter()
        .filter(|r| r.timestamp.is_some())
        .reduce(|best, r| if r.timestamp > best.timestamp { r } else { best })
        .cloned()
}

pub fn contest_stats(records: &[ContactRecord]) -> ContestStats {
    let mut tally = Tally::new();
    for contest in records.iter().filter_map(|r| r.contest_id.as_ref()) {
        tally.add(contest.clone());
    }

    ContestStats {
        total: tally.len(),
        qsos_in_contests: tally.total(),
        contests: tally
            .ranked()
            .into_iter()
            .map(|(key, count)| Bucket { key, count })
            .collect(),
    }
}

pub fn special_activity(records: &[ContactRecord]) -> SpecialActivity {
    let mut special = SpecialActivity::default();
    for record in records {
        if record.is_satellite() {
            special.satellite += 1;
        }
        if record.sota_ref.is_some() {
            special.sota += 1;
        }
        if record.pota_ref.is_some() {
            special.pota += 1;
        }
        if record.iota.is_some() {
            special.iota += 1;
        }
        if record.wwff_ref.is_some() {
            special.wwff += 1;
        }
    }
    special
}

fn distinct_days(records: &[ContactRecord]) -> BTreeSet<NaiveDate> {
    records.iter().filter_map(|r| r.date).collect()
}

pub fn active_days(records: &[ContactRecord]) -> usize {
    distinct_days(records).len()
}

/// Contacts per active day, one decimal place.
pub fn average_per_day(records: &[ContactRecord]) -> f64 {
    match active_days(records) {
        0 => 0.0,
        days => round1(records.len() as f64 / days as f64),
    }
}

pub fn longest_streak(records: &[ContactRecord]) -> Streak {
    let days = distinct_days(records);
    let mut best = Streak {
        length: 0,
        start: None,
        end: None,
    };

    let mut run_start: Option<NaiveDate> = None;
    let mut prev: Option<NaiveDate> = None;
    let mut run = 0;

    for day in days {
        match prev {
            Some(p) if (day - p).num_days() == 1 => run += 1,
            _ => {
                run = 1;
                run_start = Some(day);
            }
        }
        if run > best.length {
            best = Streak {
                length: run,
                start: run_start,
                end: Some(day),
            };
        }
        prev = Some(day);
    }

    best
}

/// Like [`entity_key`], but a country known to the database is keyed by its
/// DXCC number so it merges with contacts that logged the number.
fn slot_key(record: &ContactRecord, ctx: &StatsContext<'_>) -> Option<(EntityKey, String)> {
    if record.dxcc.is_none()
        && let Some(entity) = ctx.entity_for(record)
        && let Some(id) = entity.dxcc()
    {
        let name = record.country.clone().unwrap_or_else(|| entity.name.clone());
        return Some((EntityKey::Dxcc(id), name));
    }
    entity_key(record, ctx)
}

pub fn band_slots(records: &[ContactRecord], ctx: &StatsContext<'_>) -> BandSlotStats {
    let mut slots: HashSet<(EntityKey, String)> = HashSet::new();
    let mut per_entity = Tally::new();
    let mut names: HashMap<EntityKey, String> = HashMap::new();
    let mut bands: HashMap<EntityKey, Vec<String>> = HashMap::new();
    let mut distinct_bands: HashSet<String> = HashSet::new();

    for record in records {
        let Some(band) = record.band.as_ref() else {
            continue;
        };
        let Some((key, name)) = slot_key(record, ctx) else {
            continue;
        };

        if !slots.insert((key.clone(), band.clone())) {
            continue;
        }

        names.entry(key.clone()).or_insert(name);
        bands.entry(key.clone()).or_default().push(band.clone());
        distinct_bands.insert(band.clone());
        per_entity.add(key);
    }

    let all: Vec<BandSlotEntity> = per_entity
        .ranked()
        .into_iter()
        .map(|(key, count)| BandSlotEntity {
            key: key.to_string(),
            name: names.remove(&key).unwrap_or_else(|| key.to_string()),
            slots: count,
            bands: bands.remove(&key).unwrap_or_default(),
        })
        .collect();

    BandSlotStats {
        total_slots: slots.len(),
        entity_count: per_entity.len(),
        band_count: distinct_bands.len(),
        top: all.iter().take(5).cloned().collect(),
        all,
    }
}

impl fmt::Display for LogStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "═══════════════════════════════════════════════════════")?;
        writeln!(f, "                  YEAR IN REVIEW")?;
        writeln!(f, "═══════════════════════════════════════════════════════")?;
        writeln!(f)?;
        writeln!(f, "Total QSOs: {}", self.total_qsos)?;
        writeln!(f, "Unique callsigns: {}", self.callsigns.unique_count)?;
        writeln!(f, "DXCC entities: {}", self.by_dxcc.count)?;
        writeln!(f, "CQ zones: {}", self.by_cq_zone.count)?;
        writeln!(
            f,
            "Active days: {} ({:.1} QSOs/day)",
            self.active_days, self.average_per_day
        )?;
        if let (Some(start), Some(end)) = (self.streak.start, self.streak.end) {
            writeln!(
                f,
                "Longest streak: {} days ({} to {})",
                self.streak.length, start, end
            )?;
        }
        writeln!(f)?;

        if let Some(ref first) = self.first_qso {
            writeln!(f, "First QSO: {}", first)?;
        }
        if let Some(ref last) = self.last_qso {
            writeln!(f, "Last QSO: {}", last)?;
        }
        if let Some(ref best) = self.by_day.best {
            writeln!(f, "Best day: {} ({} QSOs)", best.key, best.count)?;
        }
        if let Some(ref best) = self.by_day_of_week.best {
            let name = WEEKDAY_NAMES.get(best.key as usize).unwrap_or(&"?");
            writeln!(f, "Favorite weekday: {} ({} QSOs)", name, best.count)?;
        }
        if let Some(ref peak) = self.by_hour.best {
            writeln!(f, "Peak hour: {:02}:00 UTC ({} QSOs)", peak.key, peak.count)?;
        }
        if let Some(ref hour) = self.qso_rate.peak_hour {
            writeln!(f, "Best rate: {} QSOs/hour at {}", self.qso_rate.max_rate, hour)?;
        }
        if let Some(ref day) = self.longest_day {
            writeln!(
                f,
                "Longest day: {} ({:.1}h, {} QSOs)",
                day.date, day.hours, day.count
            )?;
        }
        writeln!(f)?;

        if let Some(ref odx) = self.distances.odx {
            writeln!(
                f,
                "ODX: {} {:.0} km{}",
                odx.contact.callsign,
                odx.distance_km,
                odx.country
                    .as_ref()
                    .map(|c| format!(" ({})", c))
                    .unwrap_or_default()
            )?;
        }
        if let Some(ref closest) = self.distances.closest {
            writeln!(
                f,
                "Closest: {} {:.0} km",
                closest.contact.callsign, closest.distance_km
            )?;
        }
        if let Some(ref p) = self.distances.percentiles {
            writeln!(f, "Distance Distribution (km):")?;
            writeln!(f, "  Min: {}, Max: {}, Mean: {:.1}", p.min, p.max, p.mean)?;
            writeln!(f, "  P50: {}, P90: {}, P99: {}", p.p50, p.p90, p.p99)?;
        }
        writeln!(f)?;

        write_shares(f, "QSOs by Band:", &self.by_band.sorted)?;
        write_shares(f, "QSOs by Mode:", &self.by_mode.sorted)?;
        write_shares(f, "QSOs by Continent:", &self.by_continent.sorted)?;

        if !self.by_dxcc.sorted.is_empty() {
            writeln!(f, "Top Entities:")?;
            for (i, entry) in self.by_dxcc.top_n(10).iter().enumerate() {
                writeln!(
                    f,
                    "  {}. {}: {} ({:.1}%)",
                    i + 1,
                    entry.name,
                    entry.count,
                    entry.percentage
                )?;
            }
            writeln!(f)?;
        }

        if self.band_slots.total_slots > 0 {
            writeln!(
                f,
                "Band slots: {} ({} entities on {} bands)",
                self.band_slots.total_slots, self.band_slots.entity_count, self.band_slots.band_count
            )?;
            writeln!(f)?;
        }

        if self.contests.total > 0 {
            writeln!(f, "Contests:")?;
            for contest in &self.contests.contests {
                writeln!(f, "  {}: {}", contest.key, contest.count)?;
            }
            writeln!(f)?;
        }

        let s = &self.special;
        if *s != SpecialActivity::default() {
            writeln!(
                f,
                "Satellite: {}, SOTA: {}, POTA: {}, IOTA: {}, WWFF: {}",
                s.satellite, s.sota, s.pota, s.iota, s.wwff
            )?;
            writeln!(f)?;
        }

        if !self.callsigns.top.is_empty() {
            writeln!(f, "Top {} Callsigns:", self.callsigns.top.len())?;
            for (i, entry) in self.callsigns.top.iter().enumerate() {
                writeln!(f, "  {}. {}: {}", i + 1, entry.key, entry.count)?;
            }
        }

        Ok(())
    }
}

fn write_shares(f: &mut fmt::Formatter<'_>, title: &str, shares: &[CountShare]) -> fmt::Result {
    if shares.is_empty() {
        return Ok(());
    }
    writeln!(f, "{}", title)?;
    for share in shares {
        writeln!(f, "  {}: {} ({:.1}%)", share.key, share.count, share.percentage)?;
    }
    writeln!(f)
}
