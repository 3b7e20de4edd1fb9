//! Character classification for the tokenizer.
//!
//! Code points in the BMP are answered from packed bit tables; astral code
//! points are looked up by binary search over sorted, disjoint ranges. Both
//! are derived once from the Unicode `XID_Start`/`XID_Continue` data plus the
//! ECMAScript additions (`$`, `_`, ZWNJ, ZWJ and the `Other_ID_*` code
//! points) and are read-only afterwards.

use once_cell::sync::Lazy;

const BMP_WORDS: usize = 0x10000 / 64;

struct BmpTable {
    bits: Box<[u64; BMP_WORDS]>,
}

impl BmpTable {
    fn build(predicate: impl Fn(char) -> bool) -> Self {
        let mut bits = Box::new([0u64; BMP_WORDS]);
        for cp in 0..0x10000u32 {
            if let Some(ch) = char::from_u32(cp) {
                if predicate(ch) {
                    bits[(cp >> 6) as usize] |= 1 << (cp & 63);
                }
            }
        }
        Self { bits }
    }

    #[inline]
    fn contains(&self, cp: u32) -> bool {
        self.bits[(cp >> 6) as usize] & (1 << (cp & 63)) != 0
    }
}

/// Sorted, disjoint, inclusive code point ranges
struct RangeTable {
    ranges: Vec<(u32, u32)>,
}

impl RangeTable {
    fn build(predicate: impl Fn(char) -> bool) -> Self {
        let mut ranges: Vec<(u32, u32)> = Vec::new();
        for cp in 0x10000..=0x10FFFFu32 {
            let Some(ch) = char::from_u32(cp) else {
                continue;
            };
            if !predicate(ch) {
                continue;
            }
            match ranges.last_mut() {
                Some(last) if last.1 + 1 == cp => last.1 = cp,
                _ => ranges.push((cp, cp)),
            }
        }
        Self { ranges }
    }

    fn contains(&self, cp: u32) -> bool {
        self.ranges
            .binary_search_by(|&(lo, hi)| {
                if hi < cp {
                    std::cmp::Ordering::Less
                } else if lo > cp {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }
}

/// Code points with the Other_ID_Start property, plus the few ID_Start
/// characters that XID_Start drops under NFKC closure.
fn is_other_id_start(ch: char) -> bool {
    matches!(
        ch,
        '\u{1885}'
            | '\u{1886}'
            | '\u{2118}'
            | '\u{212E}'
            | '\u{309B}'
            | '\u{309C}'
            | '\u{037A}'
            | '\u{0E33}'
            | '\u{0EB3}'
    )
}

/// Code points with the Other_ID_Continue property
fn is_other_id_continue(ch: char) -> bool {
    matches!(
        ch,
        '\u{00B7}' | '\u{0387}' | '\u{1369}'..='\u{1371}' | '\u{19DA}' | '\u{30FB}' | '\u{FF65}'
    )
}

fn id_start(ch: char) -> bool {
    ch == '$' || ch == '_' || unicode_ident::is_xid_start(ch) || is_other_id_start(ch)
}

fn id_part(ch: char) -> bool {
    id_start(ch)
        || ch == '\u{200C}'
        || ch == '\u{200D}'
        || unicode_ident::is_xid_continue(ch)
        || is_other_id_continue(ch)
}

static BMP_ID_START: Lazy<BmpTable> = Lazy::new(|| BmpTable::build(id_start));
static BMP_ID_PART: Lazy<BmpTable> = Lazy::new(|| BmpTable::build(id_part));
static ASTRAL_ID_START: Lazy<RangeTable> = Lazy::new(|| RangeTable::build(id_start));
static ASTRAL_ID_PART: Lazy<RangeTable> = Lazy::new(|| RangeTable::build(id_part));

/// Test whether a code point can start an identifier
pub fn is_identifier_start(cp: u32) -> bool {
    if cp < 0x80 {
        return matches!(cp, 0x24 | 0x5F | 0x41..=0x5A | 0x61..=0x7A);
    }
    if cp <= 0xFFFF {
        return BMP_ID_START.contains(cp);
    }
    ASTRAL_ID_START.contains(cp)
}

/// Test whether a code point can continue an identifier
pub fn is_identifier_char(cp: u32) -> bool {
    if cp < 0x80 {
        return matches!(cp, 0x24 | 0x5F | 0x30..=0x39 | 0x41..=0x5A | 0x61..=0x7A);
    }
    if cp <= 0xFFFF {
        return BMP_ID_PART.contains(cp);
    }
    ASTRAL_ID_PART.contains(cp)
}

/// Test whether a code point is ECMAScript WhiteSpace (line terminators excluded)
pub fn is_white_space(cp: u32) -> bool {
    matches!(
        cp,
        0x09 | 0x0B
            | 0x0C
            | 0x20
            | 0xA0
            | 0x1680
            | 0x2000..=0x200A
            | 0x202F
            | 0x205F
            | 0x3000
            | 0xFEFF
    )
}

/// Test whether a code point is an ECMAScript LineTerminator
pub fn is_new_line(cp: u32) -> bool {
    matches!(cp, 0x0A | 0x0D | 0x2028 | 0x2029)
}

/// Test whether every code point of `name` forms a valid IdentifierName
pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_identifier_start(first as u32) => {
            chars.all(|ch| is_identifier_char(ch as u32))
        }
        _ => false,
    }
}

/// Split an astral code point into its UTF-16 surrogate pair
pub fn to_surrogate_pair(cp: u32) -> (u16, u16) {
    let v = cp - 0x10000;
    ((0xD800 + (v >> 10)) as u16, (0xDC00 + (v & 0x3FF)) as u16)
}

/// Combine a surrogate pair into a code point
pub fn from_surrogate_pair(lead: u32, trail: u32) -> u32 {
    ((lead - 0xD800) << 10) + (trail - 0xDC00) + 0x10000
}

/// Test whether a code unit is a lead surrogate
pub fn is_lead_surrogate(cp: u32) -> bool {
    (0xD800..=0xDBFF).contains(&cp)
}

/// Test whether a code unit is a trail surrogate
pub fn is_trail_surrogate(cp: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&cp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_identifier_chars() {
        assert!(is_identifier_start('a' as u32));
        assert!(is_identifier_start('$' as u32));
        assert!(!is_identifier_start('1' as u32));
        assert!(is_identifier_char('1' as u32));
        assert!(!is_identifier_char('-' as u32));
    }

    #[test]
    fn test_bmp_identifier_chars() {
        assert!(is_identifier_start('ü' as u32));
        assert!(is_identifier_start(0x2118));
        assert!(is_identifier_char(0x200C));
        assert!(is_identifier_char(0x00B7));
        assert!(!is_identifier_start(0x00B7));
    }

    #[test]
    fn test_astral_identifier_chars() {
        // MATHEMATICAL BOLD CAPITAL A
        assert!(is_identifier_start(0x1D400));
        // PILE OF POO
        assert!(!is_identifier_start(0x1F4A9));
        assert!(!is_identifier_char(0x1F4A9));
    }

    #[test]
    fn test_white_space_and_new_lines() {
        assert!(is_white_space(0xFEFF));
        assert!(is_white_space(0x3000));
        assert!(!is_white_space(0x0A));
        assert!(is_new_line(0x2029));
        assert!(!is_new_line(0x85));
    }

    #[test]
    fn test_surrogate_pair_round_trip() {
        let (lead, trail) = to_surrogate_pair(0x1F4A9);
        assert_eq!((lead, trail), (0xD83D, 0xDCA9));
        assert_eq!(from_surrogate_pair(lead as u32, trail as u32), 0x1F4A9);
    }

    #[test]
    fn test_identifier_name() {
        assert!(is_identifier_name("_private$"));
        assert!(!is_identifier_name("1abc"));
        assert!(!is_identifier_name(""));
    }
}
