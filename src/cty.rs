//! Parser for CTY.DAT country files.
//!
//! The country file (Big CTY by AD1C, <https://www.country-files.com/>)
//! lists every DXCC entity as a header line followed by indented alias lines:
//!
//! ```text
//! Hawaii:                   31:  61:  OC:   21.12:   157.48:    10.0:  KH6:
//!     AH6,AH7,KH6,KH7,NH6,NH7,WH6,WH7,=AH0AA(3)[6],=KH6DX/W;
//! ```
//!
//! Header fields are `name:cq:itu:continent:lat:lon:utc_offset:prefix:`.
//! Longitudes in the file are west-positive and are flipped on load.
//! Aliases are comma separated and terminated by `;`. A leading `=` marks an
//! exact callsign, and an alias may carry overrides: `(cq)`, `[itu]`,
//! `{continent}`, `<lat/lon>` and `~utc_offset~`.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_while_m_n, take_while1},
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, recognize},
    multi::fold_many0,
    sequence::{delimited, separated_pair},
};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::dxcc::dxcc_for_prefix;
use crate::geo::Coordinates;

/// Field replacements attached to a single alias.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AliasOverride {
    pub cq_zone: Option<u8>,
    pub itu_zone: Option<u8>,
    pub continent: Option<String>,
    pub coords: Option<Coordinates>,
    pub utc_offset: Option<f64>,
}

impl AliasOverride {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A DXCC entity from the country file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entity {
    pub name: String,
    pub primary_prefix: String,
    pub continent: String,
    pub cq_zone: u8,
    pub itu_zone: u8,
    /// Latitude, north positive.
    pub lat: f64,
    /// Longitude, east positive.
    pub lon: f64,
    /// Offset from UTC in hours.
    pub utc_offset: f64,
    /// Entity only counts for the WAE award (`*` in the file).
    pub waedc_only: bool,
    /// Prefix aliases in file order.
    pub prefixes: Vec<String>,
    /// Exact callsign aliases in file order.
    pub exact_calls: Vec<String>,
}

impl Entity {
    /// ARRL DXCC entity number for this entity's primary prefix.
    pub fn dxcc(&self) -> Option<u16> {
        dxcc_for_prefix(&self.primary_prefix)
    }

    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}

/// Condensed view of an entity for listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySummary {
    pub name: String,
    pub continent: String,
    pub cq_zone: u8,
    pub primary_prefix: String,
    pub dxcc: Option<u16>,
}

/// An index entry pointing at an entity plus the alias's overrides.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct AliasTarget {
    pub(crate) entity: usize,
    pub(crate) overrides: AliasOverride,
}

/// Immutable callsign lookup database built from a country file.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDatabase {
    entities: Vec<Entity>,
    prefix_index: HashMap<String, AliasTarget>,
    exact_index: HashMap<String, AliasTarget>,
    /// Prefixes ordered longest first, for longest-match search.
    sorted_prefixes: Vec<String>,
    name_index: HashMap<String, usize>,
    dxcc_index: HashMap<u16, usize>,
}

impl ReferenceDatabase {
    /// Build a database from country file text.
    ///
    /// Malformed headers are skipped together with their alias lines; the
    /// rest of the file still loads.
    pub fn parse(content: &str) -> Self {
        let mut builder = Builder::default();
        let mut current: Option<usize> = None;
        let mut alias_buffer = String::new();

        for line in content.lines() {
            let starts_indented = line.starts_with(char::is_whitespace);

            if !line.is_empty() && !starts_indented && line.contains(':') {
                if let Some(entity) = current {
                    builder.add_aliases(entity, &alias_buffer);
                }
                alias_buffer.clear();

                current = match parse_entity_header(line) {
                    Some(entity) => Some(builder.push_entity(entity)),
                    None => {
                        debug!("Skipping malformed entity header: {}", line.trim());
                        None
                    }
                };
            } else if current.is_some() && !line.trim().is_empty() {
                alias_buffer.push_str(line.trim());
            }
        }

        if let Some(entity) = current {
            builder.add_aliases(entity, &alias_buffer);
        }

        let db = builder.finish();
        info!(
            "Loaded CTY.DAT: {} entities, {} prefixes, {} exact callsigns",
            db.entity_count(),
            db.prefix_count(),
            db.exact_count()
        );
        db
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn prefix_count(&self) -> usize {
        self.prefix_index.len()
    }

    pub fn exact_count(&self) -> usize {
        self.exact_index.len()
    }

    /// True when no entities were loaded.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Prefixes ordered from longest to shortest.
    pub fn sorted_prefixes(&self) -> &[String] {
        &self.sorted_prefixes
    }

    /// Check whether `prefix` is an indexed prefix alias.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefix_index.contains_key(prefix)
    }

    /// Find an entity by its primary prefix, ignoring case.
    pub fn entity_by_prefix(&self, primary_prefix: &str) -> Option<&Entity> {
        let wanted = primary_prefix.trim().trim_start_matches('*');
        self.entities
            .iter()
            .find(|e| e.primary_prefix.eq_ignore_ascii_case(wanted))
    }

    /// One summary row per entity, in file order.
    pub fn all_entities(&self) -> Vec<EntitySummary> {
        self.entities
            .iter()
            .map(|e| EntitySummary {
                name: e.name.clone(),
                continent: e.continent.clone(),
                cq_zone: e.cq_zone,
                primary_prefix: e.primary_prefix.clone(),
                dxcc: e.dxcc(),
            })
            .collect()
    }

    /// Find an entity by name, ignoring case.
    pub fn entity_by_name(&self, name: &str) -> Option<&Entity> {
        self.name_index
            .get(&name.trim().to_uppercase())
            .map(|&i| &self.entities[i])
    }

    /// Find the first entity carrying a DXCC entity number.
    pub fn entity_by_dxcc(&self, dxcc: u16) -> Option<&Entity> {
        self.dxcc_index.get(&dxcc).map(|&i| &self.entities[i])
    }

    pub(crate) fn entity(&self, index: usize) -> &Entity {
        &self.entities[index]
    }

    pub(crate) fn exact_match(&self, callsign: &str) -> Option<&AliasTarget> {
        self.exact_index.get(callsign)
    }

    /// First prefix in longest-first order that `callsign` starts with.
    pub(crate) fn longest_prefix_match(&self, callsign: &str) -> Option<&AliasTarget> {
        self.sorted_prefixes
            .iter()
            .find(|prefix| callsign.starts_with(prefix.as_str()))
            .and_then(|prefix| self.prefix_index.get(prefix))
    }
}

/// Accumulates entities and indices while the file is read.
#[derive(Default)]
struct Builder {
    entities: Vec<Entity>,
    prefix_index: HashMap<String, AliasTarget>,
    exact_index: HashMap<String, AliasTarget>,
    prefix_order: Vec<String>,
}

impl Builder {
    fn push_entity(&mut self, entity: Entity) -> usize {
        self.entities.push(entity);
        self.entities.len() - 1
    }

    fn add_aliases(&mut self, entity: usize, buffer: &str) {
        let list = buffer.trim().trim_end_matches(';');

        for raw in list.split(',').map(str::trim).filter(|a| !a.is_empty()) {
            let Some(alias) = parse_alias_entry(raw) else {
                debug!("Skipping unparseable alias '{}'", raw);
                continue;
            };

            let target = AliasTarget {
                entity,
                overrides: alias.overrides,
            };

            if alias.exact {
                self.entities[entity].exact_calls.push(alias.call.clone());
                self.exact_index.insert(alias.call, target);
            } else {
                self.entities[entity].prefixes.push(alias.call.clone());
                // The first entity to claim a prefix keeps it
                if !self.prefix_index.contains_key(&alias.call) {
                    self.prefix_order.push(alias.call.clone());
                    self.prefix_index.insert(alias.call, target);
                }
            }
        }
    }

    fn finish(self) -> ReferenceDatabase {
        let mut sorted_prefixes = self.prefix_order;
        sorted_prefixes.sort_by(|a, b| b.len().cmp(&a.len()));

        let mut name_index = HashMap::new();
        let mut dxcc_index = HashMap::new();
        for (i, entity) in self.entities.iter().enumerate() {
            name_index.entry(entity.name.to_uppercase()).or_insert(i);
            if let Some(id) = entity.dxcc() {
                dxcc_index.entry(id).or_insert(i);
            }
        }

        ReferenceDatabase {
            entities: self.entities,
            prefix_index: self.prefix_index,
            exact_index: self.exact_index,
            sorted_prefixes,
            name_index,
            dxcc_index,
        }
    }
}

/// Parse an entity header line.
///
/// Returns `None` if the line has fewer than eight fields or a field does
/// not parse.
fn parse_entity_header(line: &str) -> Option<Entity> {
    let parts: Vec<&str> = line.split(':').map(str::trim).collect();
    if parts.len() < 8 {
        return None;
    }

    let (waedc_only, primary_prefix) = match parts[7].strip_prefix('*') {
        Some(stripped) => (true, stripped),
        None => (false, parts[7]),
    };

    Some(Entity {
        name: parts[0].to_string(),
        cq_zone: parts[1].parse().ok()?,
        itu_zone: parts[2].parse().ok()?,
        continent: parts[3].to_string(),
        lat: parts[4].parse().ok()?,
        lon: -parts[5].parse::<f64>().ok()?,
        utc_offset: parts[6].parse().ok()?,
        primary_prefix: primary_prefix.to_string(),
        waedc_only,
        prefixes: Vec::new(),
        exact_calls: Vec::new(),
    })
}

/// One parsed alias from an entity's alias list.
#[derive(Debug, Clone, PartialEq)]
struct AliasEntry {
    call: String,
    exact: bool,
    overrides: AliasOverride,
}

/// A single override annotation.
#[derive(Debug, Clone, PartialEq)]
enum Override {
    CqZone(u8),
    ItuZone(u8),
    Continent(String),
    Coords(f64, f64),
    UtcOffset(f64),
}

impl Override {
    fn apply(self, overrides: &mut AliasOverride) {
        match self {
            Override::CqZone(z) => overrides.cq_zone = Some(z),
            Override::ItuZone(z) => overrides.itu_zone = Some(z),
            Override::Continent(c) => overrides.continent = Some(c),
            // West-positive in the file
            Override::Coords(lat, lon) => overrides.coords = Some(Coordinates::new(lat, -lon)),
            Override::UtcOffset(tz) => overrides.utc_offset = Some(tz),
        }
    }
}

fn is_alias_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '/'
}

/// Parse a signed decimal number such as `-12.5` or `7`.
fn parse_decimal(input: &str) -> IResult<&str, f64> {
    map_res(
        recognize((opt(char('-')), digit1, opt((char('.'), digit1)))),
        |s: &str| s.parse::<f64>(),
    )
    .parse(input)
}

fn parse_zone(input: &str) -> IResult<&str, u8> {
    map_res(digit1, |s: &str| s.parse::<u8>()).parse(input)
}

fn parse_override(input: &str) -> IResult<&str, Override> {
    alt((
        map(delimited(char('('), parse_zone, char(')')), Override::CqZone),
        map(delimited(char('['), parse_zone, char(']')), Override::ItuZone),
        map(
            delimited(
                char('{'),
                take_while_m_n(2, 2, |c: char| c.is_ascii_alphabetic()),
                char('}'),
            ),
            |c: &str| Override::Continent(c.to_ascii_uppercase()),
        ),
        map(
            delimited(
                char('<'),
                separated_pair(parse_decimal, char('/'), parse_decimal),
                char('>'),
            ),
            |(lat, lon)| Override::Coords(lat, lon),
        ),
        map(
            delimited(char('~'), parse_decimal, char('~')),
            Override::UtcOffset,
        ),
    ))
    .parse(input)
}

/// Parse an alias such as `=VP2MDG(8)[11]` or `KH6`.
fn parse_alias(input: &str) -> IResult<&str, AliasEntry> {
    let (input, exact) = opt(char('=')).parse(input)?;
    let (input, call) = take_while1(is_alias_char).parse(input)?;
    let (input, overrides) = fold_many0(parse_override, AliasOverride::default, |mut acc, o| {
        o.apply(&mut acc);
        acc
    })
    .parse(input)?;

    Ok((
        input,
        AliasEntry {
            call: call.to_ascii_uppercase(),
            exact: exact.is_some(),
            overrides,
        },
    ))
}

fn parse_alias_entry(raw: &str) -> Option<AliasEntry> {
    match parse_alias(raw) {
        Ok((rest, alias)) => {
            if !rest.is_empty() {
                debug!("Ignoring trailing text '{}' in alias '{}'", rest, raw);
            }
            Some(alias)
        }
        Err(_) => None,
    }
}
