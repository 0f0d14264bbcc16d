//! Callsign to DXCC entity resolution.
//!
//! Resolution tries, in order: the exact-callsign index, the exact index
//! again for the base call of a portable callsign, the longest matching
//! prefix of that base call, and finally the longest matching prefix of the
//! callsign as logged.

use serde::Serialize;
use tracing::debug;

use crate::cty::{AliasTarget, ReferenceDatabase};
use crate::dxcc::dxcc_for_prefix;
use crate::geo::Coordinates;
use crate::qso::ContactRecord;

/// Portable designators that never identify a location.
const PORTABLE_SUFFIXES: &[&str] = &[
    "P", "M", "MM", "AM", "QRP", "A", "B", "LH", "LGT", "J", "T", "G", "E", "0", "1", "2", "3",
    "4", "5", "6", "7", "8", "9",
];

/// Entity information resolved for a callsign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub country: String,
    pub continent: String,
    pub cq_zone: u8,
    pub itu_zone: u8,
    pub lat: f64,
    pub lon: f64,
    pub utc_offset: f64,
    pub primary_prefix: String,
    pub dxcc: Option<u16>,
}

impl Resolution {
    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

impl ReferenceDatabase {
    /// Resolve a callsign to its entity.
    ///
    /// Returns `None` for an empty callsign or when nothing in the database
    /// matches.
    ///
    /// # Example
    ///
    /// ```
    /// use ham_wrapped::ReferenceDatabase;
    ///
    /// let db = ReferenceDatabase::parse(
    ///     "Canary Islands: 33: 36: AF: 28.32: 15.85: 0.0: EA8:\n    EA8,EB8;\n\
    ///      Poland: 15: 28: EU: 52.28: -18.67: -1.0: SP:\n    SP,SQ;\n",
    /// );
    /// assert_eq!(db.resolve("EA8/SP3ABC").unwrap().country, "Canary Islands");
    /// assert_eq!(db.resolve("SP3ABC/P").unwrap().country, "Poland");
    /// ```
    pub fn resolve(&self, callsign: &str) -> Option<Resolution> {
        let call = callsign.trim().to_uppercase();
        if call.is_empty() {
            return None;
        }

        if let Some(target) = self.exact_match(&call) {
            return Some(self.build_resolution(target));
        }

        let search = if call.contains('/') {
            portable_search_call(&call, self)
        } else {
            call.as_str()
        };
        let derived = search != call;

        if derived && let Some(target) = self.exact_match(search) {
            return Some(self.build_resolution(target));
        }

        if let Some(target) = self.longest_prefix_match(search) {
            return Some(self.build_resolution(target));
        }

        // Derived forms can miss prefixes that contain a slash
        if derived && let Some(target) = self.longest_prefix_match(&call) {
            return Some(self.build_resolution(target));
        }

        None
    }

    fn build_resolution(&self, target: &AliasTarget) -> Resolution {
        let entity = self.entity(target.entity);
        let overrides = &target.overrides;
        let coords = overrides.coords.unwrap_or_else(|| entity.coords());

        Resolution {
            country: entity.name.clone(),
            continent: overrides
                .continent
                .clone()
                .unwrap_or_else(|| entity.continent.clone()),
            cq_zone: overrides.cq_zone.unwrap_or(entity.cq_zone),
            itu_zone: overrides.itu_zone.unwrap_or(entity.itu_zone),
            lat: coords.lat,
            lon: coords.lon,
            utc_offset: overrides.utc_offset.unwrap_or(entity.utc_offset),
            primary_prefix: entity.primary_prefix.clone(),
            dxcc: dxcc_for_prefix(&entity.primary_prefix),
        }
    }
}

/// True when `part` ends in a digit followed by two or more letters, the
/// shape of a complete callsign such as `SP3ABC`.
fn looks_like_full_call(part: &str) -> bool {
    let bytes = part.as_bytes();
    let letters = bytes
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_uppercase())
        .count();
    letters >= 2
        && bytes
            .len()
            .checked_sub(letters + 1)
            .is_some_and(|i| bytes[i].is_ascii_digit())
}

fn starts_with_indexed_prefix(part: &str, db: &ReferenceDatabase) -> bool {
    db.sorted_prefixes()
        .iter()
        .any(|prefix| part.starts_with(prefix.as_str()))
}

/// Choose the part of a slash-separated callsign that identifies the entity.
///
/// `callsign` must already be upper-case. For two parts `A/B`:
///
/// 1. `B` is a portable designator or a single character: use `A`.
/// 2. `A` is at most four characters and not a full callsign: use `A`
///    (`EA8/SP3ABC`).
/// 3. `B` is at most four characters, not a full callsign, and starts with
///    a known prefix: use `B` (`SP3ABC/EA8`).
/// 4. Otherwise use `A`.
///
/// With more parts, the first part starting with a known prefix wins,
/// falling back to the first part.
pub fn portable_search_call<'a>(callsign: &'a str, db: &ReferenceDatabase) -> &'a str {
    let parts: Vec<&str> = callsign.split('/').collect();

    if let &[first, second] = parts.as_slice() {
        if PORTABLE_SUFFIXES.contains(&second) || second.chars().count() == 1 {
            return first;
        }

        if first.chars().count() <= 4 && !looks_like_full_call(first) {
            return first;
        }

        if second.chars().count() <= 4
            && !looks_like_full_call(second)
            && starts_with_indexed_prefix(second, db)
        {
            return second;
        }

        return first;
    }

    parts
        .iter()
        .copied()
        .find(|part| starts_with_indexed_prefix(part, db))
        .unwrap_or(parts[0])
}

/// Fill in missing entity fields on each record from the database.
///
/// Fields present in the log are kept. Entity coordinates are set from the
/// resolution unless the log names a different entity. Returns the number
/// of records that resolved.
pub fn enrich(records: &mut [ContactRecord], db: &ReferenceDatabase) -> usize {
    if db.is_empty() {
        return 0;
    }

    let mut resolved = 0;
    for record in records.iter_mut() {
        let Some(resolution) = db.resolve(&record.callsign) else {
            debug!("No entity found for {}", record.callsign);
            continue;
        };
        resolved += 1;

        let same_entity = match record.dxcc {
            Some(logged) => resolution.dxcc == Some(logged),
            None => record
                .country
                .as_deref()
                .is_none_or(|c| c.eq_ignore_ascii_case(&resolution.country)),
        };

        if record.dxcc.is_none() {
            record.dxcc = resolution.dxcc;
        }
        if record.continent.is_none() {
            record.continent = Some(resolution.continent.clone());
        }
        if record.country.is_none() {
            record.country = Some(resolution.country.clone());
        }
        if record.cq_zone.is_none() {
            record.cq_zone = Some(resolution.cq_zone);
        }
        if record.itu_zone.is_none() {
            record.itu_zone = Some(resolution.itu_zone);
        }
        // A logged entity that disagrees with the callsign keeps its own position
        if same_entity {
            record.lat = Some(resolution.lat);
            record.lon = Some(resolution.lon);
        } else {
            debug!(
                "{} resolves to {} but is logged as another entity",
                record.callsign, resolution.country
            );
        }
    }

    debug!("Resolved {} of {} records", resolved, records.len());
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CTY: &str = "\
Poland:                   15:  28:  EU:   52.28:   -18.67:    -1.0:  SP:
    3Z,HF,SN,SO,SP,SQ,SR,=HF0POL(38)[67]{AN}<-62.08/58.40>~-3.0~;
Canary Islands:           33:  36:  AF:   28.32:    15.85:     0.0:  EA8:
    AM8,AN8,AO8,EA8,EB8,EC8,ED8,EE8,EF8,EG8,EH8;
Hawaii:                   31:  61:  OC:   21.12:   157.48:    10.0:  KH6:
    AH6,AH7,KH6,KH7,NH6,NH7,WH6,WH7;
United States:            05:  08:  NA:   37.53:    91.67:     5.0:  K:
    AA,AB,AC,AD,AE,AF,AG,AI,AJ,AK,K,N,W,=W1AW(5)[8],=KH6BB;
";

    fn db() -> ReferenceDatabase {
        ReferenceDatabase::parse(SAMPLE_CTY)
    }

    #[test]
    fn test_resolve_basic_prefix() {
        let r = db().resolve("sp3abc").unwrap();
        assert_eq!(r.country, "Poland");
        assert_eq!(r.continent, "EU");
        assert_eq!(r.cq_zone, 15);
        assert_eq!(r.itu_zone, 28);
        assert_eq!(r.primary_prefix, "SP");
        assert_eq!(r.dxcc, Some(269));
        assert!((r.lon - 18.67).abs() < 1e-9);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let db = db();
        assert_eq!(db.resolve("K1ABC").unwrap().primary_prefix, "K");
        assert_eq!(db.resolve("KH6ABC").unwrap().primary_prefix, "KH6");
    }

    #[test]
    fn test_exact_alias_beats_prefix() {
        let db = db();
        // KH6 prefix would say Hawaii
        let r = db.resolve("KH6BB").unwrap();
        assert_eq!(r.country, "United States");
        assert_eq!(r.cq_zone, 5);
    }

    #[test]
    fn test_exact_alias_overrides() {
        let r = db().resolve("HF0POL").unwrap();
        assert_eq!(r.country, "Poland");
        assert_eq!(r.continent, "AN");
        assert_eq!(r.cq_zone, 38);
        assert_eq!(r.itu_zone, 67);
        assert!((r.lat + 62.08).abs() < 1e-9);
        assert!((r.lon + 58.40).abs() < 1e-9);
        assert_eq!(r.utc_offset, -3.0);
        assert_eq!(r.primary_prefix, "SP");
    }

    #[test]
    fn test_exact_alias_round_trip() {
        let db = db();
        for entity in db.entities() {
            for call in &entity.exact_calls {
                assert_eq!(db.resolve(call).unwrap().country, entity.name);
            }
        }
    }

    #[test]
    fn test_portable_prefix_forms() {
        let db = db();
        assert_eq!(db.resolve("EA8/SP3ABC").unwrap().country, "Canary Islands");
        assert_eq!(db.resolve("SP3ABC/EA8").unwrap().country, "Canary Islands");
        assert_eq!(db.resolve("SP3ABC/P").unwrap().country, "Poland");
        assert_eq!(db.resolve("SP3ABC/MM").unwrap().country, "Poland");
        assert_eq!(db.resolve("W1AW/QRP").unwrap().cq_zone, 5);
    }

    #[test]
    fn test_portable_exact_after_strip() {
        let r = db().resolve("W1AW/P").unwrap();
        assert_eq!(r.country, "United States");
        assert_eq!(r.itu_zone, 8);
    }

    #[test]
    fn test_portable_search_call_rules() {
        let db = db();
        assert_eq!(portable_search_call("SP3ABC/P", &db), "SP3ABC");
        assert_eq!(portable_search_call("SP3ABC/7", &db), "SP3ABC");
        assert_eq!(portable_search_call("SP3ABC/X", &db), "SP3ABC");
        assert_eq!(portable_search_call("EA8/SP3ABC", &db), "EA8");
        assert_eq!(portable_search_call("SP3ABC/EA8", &db), "EA8");
        // Both parts are full calls
        assert_eq!(portable_search_call("SP3ABC/DL1XYZ", &db), "SP3ABC");
        // Second part is short but unknown
        assert_eq!(portable_search_call("SP3ABC/ZZ9", &db), "SP3ABC");
        assert_eq!(portable_search_call("ZZ/EA8/P", &db), "EA8");
        assert_eq!(portable_search_call("ZZ/QQ/XX", &db), "ZZ");
    }

    #[test]
    fn test_fallback_to_full_callsign() {
        let db = ReferenceDatabase::parse("Testland:1:1:EU:0.0:0.0:0.0:ZZ/:\n    ZZ/;\n");
        // The base call matches nothing, the call as logged does
        assert_eq!(portable_search_call("ZZ/AB", &db), "ZZ");
        assert_eq!(db.resolve("ZZ/AB").unwrap().country, "Testland");
    }

    #[test]
    fn test_looks_like_full_call() {
        assert!(looks_like_full_call("SP3ABC"));
        assert!(looks_like_full_call("W1AW"));
        assert!(!looks_like_full_call("EA8"));
        assert!(!looks_like_full_call("W1A"));
        assert!(!looks_like_full_call("ABC"));
        assert!(!looks_like_full_call(""));
    }

    #[test]
    fn test_resolve_misses() {
        let db = db();
        assert!(db.resolve("").is_none());
        assert!(db.resolve("   ").is_none());
        assert!(db.resolve("ZZ9ZZ").is_none());
        assert!(ReferenceDatabase::default().resolve("W1AW").is_none());
    }

    #[test]
    fn test_enrich_fills_missing_only() {
        let db = db();
        let mut logged = ContactRecord::new("SP3ABC");
        logged.continent = Some("AS".to_string());
        logged.cq_zone = Some(17);
        let mut records = vec![logged, ContactRecord::new("KH6XYZ"), ContactRecord::new("ZZ9ZZ")];

        assert_eq!(enrich(&mut records, &db), 2);

        assert_eq!(records[0].continent.as_deref(), Some("AS"));
        assert_eq!(records[0].cq_zone, Some(17));
        assert_eq!(records[0].country.as_deref(), Some("Poland"));
        assert_eq!(records[0].dxcc, Some(269));
        assert_eq!(records[0].itu_zone, Some(28));
        assert!(records[0].entity_coords().is_some());

        assert_eq!(records[1].country.as_deref(), Some("Hawaii"));
        assert_eq!(records[1].continent.as_deref(), Some("OC"));
        assert_eq!(records[1].dxcc, Some(110));

        assert!(records[2].country.is_none());
        assert!(records[2].entity_coords().is_none());
    }

    #[test]
    fn test_enrich_empty_database() {
        let mut records = vec![ContactRecord::new("SP3ABC")];
        assert_eq!(enrich(&mut records, &ReferenceDatabase::default()), 0);
        assert!(records[0].country.is_none());
    }

    #[test]
    fn test_enrich_keeps_position_of_logged_entity() {
        let db = db();
        let mut other = ContactRecord::new("W1AW");
        other.dxcc = Some(339);
        other.country = Some("Japan".to_string());
        let mut by_name = ContactRecord::new("KH6XYZ");
        by_name.country = Some("United States".to_string());
        let mut agreeing = ContactRecord::new("SP3ABC");
        agreeing.dxcc = Some(269);
        let mut records = vec![other, by_name, agreeing];

        assert_eq!(enrich(&mut records, &db), 3);

        assert_eq!(records[0].country.as_deref(), Some("Japan"));
        assert!(records[0].entity_coords().is_none());
        assert!(records[1].entity_coords().is_none());
        assert!(records[2].entity_coords().is_some());
    }
}
