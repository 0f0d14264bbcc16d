//! Ham Wrapped - A year-in-review statistics engine for amateur radio logs.
//!
//! This crate provides:
//! - A nom-based parser for ADIF logs with a fixed target-year filter
//! - A CTY.DAT country file parser and callsign to DXCC entity resolver
//! - Maidenhead locator and great-circle distance helpers
//! - Statistics over the resolved contacts, with HDR histogram percentiles
//!
//! # Example
//!
//! ```rust
//! use ham_wrapped::{ReferenceDatabase, StatsContext, compute_all, enrich, parse_adif};
//!
//! let cty = "United States: 05: 08: NA: 37.53: 91.67: 5.0: K:\n    K,N,W;\n";
//! let db = ReferenceDatabase::parse(cty);
//!
//! let mut log = parse_adif(
//!     "<EOH><CALL:4>W1AW <QSO_DATE:8>20250704 <TIME_ON:4>1200 <BAND:3>20m <MODE:2>CW <EOR>",
//! );
//! enrich(&mut log.records, &db);
//!
//! let stats = compute_all(&log.records, Some("FN31"), &StatsContext::with_db(&db));
//! assert_eq!(stats.total_qsos, 1);
//! assert_eq!(stats.by_continent.favorite.as_ref().unwrap().key, "NA");
//! println!("{}", stats);
//! ```

pub mod adif;
pub mod config;
pub mod cty;
pub mod dxcc;
pub mod geo;
pub mod loader;
pub mod qso;
pub mod resolver;
pub mod stats;

pub use adif::{AdifLog, TARGET_YEAR, looks_like_adif, parse_adif, parse_adif_for_year};
pub use config::Config;
pub use cty::{AliasOverride, Entity, EntitySummary, ReferenceDatabase};
pub use dxcc::dxcc_for_prefix;
pub use geo::{Coordinates, LocatorError, distance_km, is_valid_locator, locator_to_coords};
pub use loader::LoadError;
pub use qso::{ContactRecord, band_for_frequency};
pub use resolver::{Resolution, enrich, portable_search_call};
pub use stats::{DEFAULT_STATION, LogStatistics, StatsContext, compute_all};
