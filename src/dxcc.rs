//! ARRL DXCC entity numbers keyed by CTY.DAT primary prefix.
//!
//! CTY.DAT identifies entities by name and primary prefix only, so the
//! numeric DXCC identifier comes from this table. Variant entities use the
//! country file's `/x` suffix convention (e.g. `3D2/c` for Conway Reef).

use std::collections::HashMap;
use std::sync::LazyLock;

/// Primary prefix to DXCC entity number.
pub const PREFIX_TO_DXCC: &[(&str, u16)] = &[
    ("1A", 246), ("1S", 247), ("3A", 260), ("3B6", 4), ("3B8", 165), ("3B9", 207), ("3C", 49),
    ("3C0", 195), ("3D2", 176), ("3D2/c", 489), ("3D2/r", 460), ("3DA", 468), ("3V", 474),
    ("3W", 293), ("3X", 107), ("3Y/b", 24), ("3Y/p", 199), ("4J", 18), ("4L", 75), ("4O", 514),
    ("4S", 315), ("4U1I", 117), ("4U1U", 289), ("4U1V", 117), ("4W", 511), ("4X", 336),
    ("5A", 436), ("5B", 215), ("5H", 470), ("5N", 450), ("5R", 438), ("5T", 444), ("5U", 187),
    ("5V", 483), ("5W", 190), ("5X", 286), ("5Z", 430), ("6W", 456), ("6Y", 82), ("7O", 492),
    ("7P", 432), ("7Q", 440), ("7X", 400), ("8P", 62), ("8Q", 159), ("8R", 129), ("9A", 497),
    ("9G", 424), ("9H", 257), ("9J", 482), ("9K", 348), ("9L", 458), ("9M2", 299), ("9M6", 46),
    ("9N", 369), ("9Q", 414), ("9U", 404), ("9V", 381), ("9X", 454), ("9Y", 90), ("A2", 402),
    ("A3", 160), ("A4", 370), ("A5", 306), ("A6", 391), ("A7", 376), ("A9", 304), ("AP", 372),
    ("BS7", 506), ("BV", 386), ("BV9P", 505), ("BY", 318), ("C2", 157), ("C3", 203), ("C5", 422),
    ("C6", 60), ("C9", 181), ("CE", 112), ("CE0X", 217), ("CE0Y", 47), ("CE0Z", 125), ("CE9", 13),
    ("CM", 70), ("CN", 446), ("CP", 104), ("CT", 272), ("CT3", 256), ("CU", 149), ("CX", 144),
    ("CY0", 252), ("CY9", 211), ("D2", 401), ("D4", 409), ("D6", 39), ("DL", 81), ("DU", 375),
    ("E3", 51), ("E4", 510), ("E5/n", 191), ("E5/s", 234), ("E6", 188), ("E7", 501), ("EA", 281),
    ("EA6", 21), ("EA8", 29), ("EA9", 32), ("EI", 245), ("EK", 14), ("EL", 434), ("EP", 330),
    ("ER", 179), ("ES", 52), ("ET", 53), ("EU", 27), ("EX", 135), ("EY", 262), ("EZ", 280),
    ("F", 227), ("FG", 79), ("FH", 169), ("FJ", 516), ("FK", 162), ("FK/c", 512), ("FM", 84),
    ("FO", 175), ("FO/a", 508), ("FO/c", 36), ("FO/m", 509), ("FP", 277), ("FR", 453),
    ("FR/g", 99), ("FR/j", 124), ("FR/t", 276), ("FS", 213), ("FT5W", 41), ("FT5X", 131),
    ("FT5Z", 10), ("FW", 298), ("FY", 63), ("G", 223), ("GD", 114), ("GI", 265), ("GJ", 122),
    ("GM", 279), ("GU", 106), ("GW", 294), ("H4", 185), ("H40", 507), ("HA", 239), ("HB", 287),
    ("HB0", 251), ("HC", 120), ("HC8", 71), ("HH", 78), ("HI", 72), ("HK", 116), ("HK0/a", 216),
    ("HK0/m", 161), ("HL", 137), ("HP", 88), ("HR", 80), ("HS", 387), ("HV", 295), ("HZ", 378),
    ("I", 248), ("IS", 225), ("IS0", 225), ("IT9", 248), ("J2", 382), ("J3", 77), ("J5", 109),
    ("J6", 97), ("J7", 95), ("J8", 98), ("JA", 339), ("JD/m", 177), ("JD/o", 192), ("JT", 363),
    ("JW", 259), ("JX", 118), ("JY", 342), ("K", 291), ("KG4", 105), ("KH0", 166), ("KH1", 20),
    ("KH2", 103), ("KH3", 123), ("KH4", 174), ("KH5", 197), ("KH5K", 134), ("KH6", 110),
    ("KH7K", 138), ("KH8", 9), ("KH8/s", 515), ("KH9", 297), ("KL", 6), ("KP1", 182), ("KP2", 285),
    ("KP4", 202), ("KP5", 43), ("LA", 266), ("LU", 100), ("LX", 254), ("LY", 146), ("LZ", 212),
    ("OA", 136), ("OD", 354), ("OE", 206), ("OH", 224), ("OH0", 5), ("OJ0", 167), ("OK", 503),
    ("OM", 504), ("ON", 209), ("OX", 237), ("OY", 222), ("OZ", 221), ("P2", 163), ("P4", 91),
    ("P5", 344), ("PA", 263), ("PJ2", 517), ("PJ4", 520), ("PJ5", 519), ("PJ7", 518), ("PY", 108),
    ("PY0F", 56), ("PY0S", 253), ("PY0T", 273), ("PZ", 140), ("R1FJ", 61), ("R1MV", 151),
    ("S0", 302), ("S2", 305), ("S5", 499), ("S7", 379), ("S9", 219), ("SM", 284), ("SP", 269),
    ("ST", 466), ("ST0", 244), ("SU", 478), ("SV", 236), ("SV/a", 180), ("SV5", 45), ("SV9", 40),
    ("T2", 282), ("T30", 301), ("T31", 31), ("T32", 48), ("T33", 490), ("T5", 232), ("T7", 278),
    ("T8", 22), ("TA", 390), ("TF", 242), ("TG", 76), ("TI", 308), ("TI9", 37), ("TJ", 406),
    ("TK", 214), ("TL", 408), ("TN", 412), ("TR", 420), ("TT", 410), ("TU", 428), ("TY", 416),
    ("TZ", 442), ("UA", 54), ("UA2", 126), ("UA9", 15), ("UK", 292), ("UN", 130), ("UR", 288),
    ("V2", 94), ("V3", 66), ("V4", 249), ("V5", 464), ("V6", 173), ("V7", 168), ("V8", 345),
    ("VE", 1), ("VK", 150), ("VK0H", 111), ("VK0M", 153), ("VK9C", 38), ("VK9L", 147),
    ("VK9M", 171), ("VK9N", 189), ("VK9W", 303), ("VK9X", 35), ("VP2E", 12), ("VP2M", 96),
    ("VP2V", 65), ("VP5", 89), ("VP6", 172), ("VP6/d", 513), ("VP8", 141), ("VP8/g", 235),
    ("VP8/h", 238), ("VP8/o", 238), ("VP8/s", 240), ("VP9", 64), ("VQ9", 33), ("VR", 321),
    ("VU", 324), ("VU4", 11), ("VU7", 142), ("XE", 50), ("XF4", 204), ("XT", 480), ("XU", 312),
    ("XW", 143), ("XX9", 152), ("XZ", 309), ("YA", 3), ("YB", 327), ("YI", 333), ("YJ", 158),
    ("YK", 384), ("YL", 145), ("YN", 86), ("YO", 275), ("YS", 74), ("YU", 296), ("YV", 148),
    ("YV0", 17), ("Z2", 452), ("Z3", 502), ("Z6", 522), ("Z8", 521), ("ZA", 7), ("ZB", 233),
    ("ZC4", 283), ("ZD7", 250), ("ZD8", 205), ("ZD9", 274), ("ZF", 69), ("ZK1/n", 191),
    ("ZK1/s", 234), ("ZK2", 188), ("ZK3", 270), ("ZL", 170), ("ZL7", 34), ("ZL8", 133),
    ("ZL9", 16), ("ZP", 132), ("ZS", 462), ("ZS8", 201),
];

static DXCC_INDEX: LazyLock<HashMap<&'static str, u16>> =
    LazyLock::new(|| PREFIX_TO_DXCC.iter().copied().collect());

/// Look up the DXCC entity number for a primary prefix.
///
/// A leading `*` (WAEDC marker) is ignored. If the prefix itself is not in
/// the table, the `/variant` suffix and any trailing digits are stripped and
/// the lookup is retried once, so `CE0` style prefixes fall back to `CE`.
pub fn dxcc_for_prefix(prefix: &str) -> Option<u16> {
    let prefix = prefix.trim().trim_start_matches('*');

    if let Some(&id) = DXCC_INDEX.get(prefix) {
        return Some(id);
    }

    let base = prefix.split('/').next().unwrap_or(prefix);
    let base = base.trim_end_matches(|c: char| c.is_ascii_digit());
    if base.is_empty() || base == prefix {
        return None;
    }

    DXCC_INDEX.get(base).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_lookup() {
        assert_eq!(dxcc_for_prefix("K"), Some(291));
        assert_eq!(dxcc_for_prefix("SP"), Some(269));
        assert_eq!(dxcc_for_prefix("KH6"), Some(110));
        assert_eq!(dxcc_for_prefix("EA8"), Some(29));
        assert_eq!(dxcc_for_prefix("3D2/c"), Some(489));
    }

    #[test]
    fn test_waedc_marker_ignored() {
        assert_eq!(dxcc_for_prefix("*4U1V"), Some(117));
        assert_eq!(dxcc_for_prefix("*IT9"), Some(248));
    }

    #[test]
    fn test_base_prefix_fallback() {
        // Trailing digits stripped
        assert_eq!(dxcc_for_prefix("DL0"), Some(81));
        // Variant suffix and digits stripped
        assert_eq!(dxcc_for_prefix("FR/x"), Some(453));
        assert_eq!(dxcc_for_prefix("VE9/z"), Some(1));
    }

    #[test]
    fn test_unknown_prefix() {
        assert_eq!(dxcc_for_prefix("QQ"), None);
        assert_eq!(dxcc_for_prefix("9M4"), None);
        assert_eq!(dxcc_for_prefix(""), None);
        assert_eq!(dxcc_for_prefix("123"), None);
    }

    #[test]
    fn test_table_has_no_duplicate_prefixes() {
        assert_eq!(DXCC_INDEX.len(), PREFIX_TO_DXCC.len());
    }
}
