//! Unicode property names accepted in `\p{...}` escapes

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// General_Category values as `(canonical, aliases)`; the canonical long
/// name is what the host engine understands.
const GENERAL_CATEGORIES: &[(&str, &[&str])] = &[
    ("Cased_Letter", &["LC"]),
    ("Close_Punctuation", &["Pe"]),
    ("Connector_Punctuation", &["Pc"]),
    ("Control", &["Cc", "cntrl"]),
    ("Currency_Symbol", &["Sc"]),
    ("Dash_Punctuation", &["Pd"]),
    ("Decimal_Number", &["Nd", "digit"]),
    ("Enclosing_Mark", &["Me"]),
    ("Final_Punctuation", &["Pf"]),
    ("Format", &["Cf"]),
    ("Initial_Punctuation", &["Pi"]),
    ("Letter", &["L"]),
    ("Letter_Number", &["Nl"]),
    ("Line_Separator", &["Zl"]),
    ("Lowercase_Letter", &["Ll"]),
    ("Mark", &["M", "Combining_Mark"]),
    ("Math_Symbol", &["Sm"]),
    ("Modifier_Letter", &["Lm"]),
    ("Modifier_Symbol", &["Sk"]),
    ("Nonspacing_Mark", &["Mn"]),
    ("Number", &["N"]),
    ("Open_Punctuation", &["Ps"]),
    ("Other", &["C"]),
    ("Other_Letter", &["Lo"]),
    ("Other_Number", &["No"]),
    ("Other_Punctuation", &["Po"]),
    ("Other_Symbol", &["So"]),
    ("Paragraph_Separator", &["Zp"]),
    ("Private_Use", &["Co"]),
    ("Punctuation", &["P", "punct"]),
    ("Separator", &["Z"]),
    ("Space_Separator", &["Zs"]),
    ("Spacing_Mark", &["Mc"]),
    ("Surrogate", &["Cs"]),
    ("Symbol", &["S"]),
    ("Titlecase_Letter", &["Lt"]),
    ("Unassigned", &["Cn"]),
    ("Uppercase_Letter", &["Lu"]),
];

/// Binary properties (long names and aliases)
const BINARY_PROPERTIES: &[&str] = &[
    "ASCII", "ASCII_Hex_Digit", "AHex", "Alphabetic", "Alpha", "Any", "Assigned",
    "Bidi_Control", "Bidi_C", "Bidi_Mirrored", "Bidi_M", "Case_Ignorable", "CI", "Cased",
    "Changes_When_Casefolded", "CWCF", "Changes_When_Casemapped", "CWCM",
    "Changes_When_Lowercased", "CWL", "Changes_When_NFKC_Casefolded", "CWKCF",
    "Changes_When_Titlecased", "CWT", "Changes_When_Uppercased", "CWU", "Dash",
    "Default_Ignorable_Code_Point", "DI", "Deprecated", "Dep", "Diacritic", "Dia", "Emoji",
    "Emoji_Component", "EComp", "Emoji_Modifier", "EMod", "Emoji_Modifier_Base", "EBase",
    "Emoji_Presentation", "EPres", "Extended_Pictographic", "ExtPict", "Extender", "Ext",
    "Grapheme_Base", "Gr_Base", "Grapheme_Extend", "Gr_Ext", "Hex_Digit", "Hex",
    "IDS_Binary_Operator", "IDSB", "IDS_Trinary_Operator", "IDST", "ID_Continue", "IDC",
    "ID_Start", "IDS", "Ideographic", "Ideo", "Join_Control", "Join_C",
    "Logical_Order_Exception", "LOE", "Lowercase", "Lower", "Math", "Noncharacter_Code_Point",
    "NChar", "Pattern_Syntax", "Pat_Syn", "Pattern_White_Space", "Pat_WS", "Quotation_Mark",
    "QMark", "Radical", "Regional_Indicator", "RI", "Sentence_Terminal", "STerm", "Soft_Dotted",
    "SD", "Terminal_Punctuation", "Term", "Unified_Ideograph", "UIdeo", "Uppercase", "Upper",
    "Variation_Selector", "VS", "White_Space", "space", "XID_Continue", "XIDC", "XID_Start",
    "XIDS",
];

/// Properties of strings, only valid with the `v` flag
const STRING_PROPERTIES: &[&str] = &[
    "Basic_Emoji",
    "Emoji_Keycap_Sequence",
    "RGI_Emoji_Modifier_Sequence",
    "RGI_Emoji_Flag_Sequence",
    "RGI_Emoji_Tag_Sequence",
    "RGI_Emoji_ZWJ_Sequence",
    "RGI_Emoji",
];

/// Script values as `(long name, short names)`
const SCRIPTS: &[(&str, &[&str])] = &[
    ("Adlam", &["Adlm"]), ("Ahom", &[]), ("Anatolian_Hieroglyphs", &["Hluw"]),
    ("Arabic", &["Arab"]), ("Armenian", &["Armn"]), ("Avestan", &["Avst"]),
    ("Balinese", &["Bali"]), ("Bamum", &["Bamu"]), ("Bassa_Vah", &["Bass"]),
    ("Batak", &["Batk"]), ("Bengali", &["Beng"]), ("Bhaiksuki", &["Bhks"]),
    ("Bopomofo", &["Bopo"]), ("Brahmi", &["Brah"]), ("Braille", &["Brai"]),
    ("Buginese", &["Bugi"]), ("Buhid", &["Buhd"]), ("Canadian_Aboriginal", &["Cans"]),
    ("Carian", &["Cari"]), ("Caucasian_Albanian", &["Aghb"]), ("Chakma", &["Cakm"]),
    ("Cham", &[]), ("Cherokee", &["Cher"]), ("Chorasmian", &["Chrs"]), ("Common", &["Zyyy"]),
    ("Coptic", &["Copt", "Qaac"]), ("Cuneiform", &["Xsux"]), ("Cypriot", &["Cprt"]),
    ("Cypro_Minoan", &["Cpmn"]), ("Cyrillic", &["Cyrl"]), ("Deseret", &["Dsrt"]),
    ("Devanagari", &["Deva"]), ("Dives_Akuru", &["Diak"]), ("Dogra", &["Dogr"]),
    ("Duployan", &["Dupl"]), ("Egyptian_Hieroglyphs", &["Egyp"]), ("Elbasan", &["Elba"]),
    ("Elymaic", &["Elym"]), ("Ethiopic", &["Ethi"]), ("Georgian", &["Geor"]),
    ("Glagolitic", &["Glag"]), ("Gothic", &["Goth"]), ("Grantha", &["Gran"]),
    ("Greek", &["Grek"]), ("Gujarati", &["Gujr"]), ("Gunjala_Gondi", &["Gong"]),
    ("Gurmukhi", &["Guru"]), ("Han", &["Hani"]), ("Hangul", &["Hang"]),
    ("Hanifi_Rohingya", &["Rohg"]), ("Hanunoo", &["Hano"]), ("Hatran", &["Hatr"]),
    ("Hebrew", &["Hebr"]), ("Hiragana", &["Hira"]), ("Imperial_Aramaic", &["Armi"]),
    ("Inherited", &["Zinh", "Qaai"]), ("Inscriptional_Pahlavi", &["Phli"]),
    ("Inscriptional_Parthian", &["Prti"]), ("Javanese", &["Java"]), ("Kaithi", &["Kthi"]),
    ("Kannada", &["Knda"]), ("Katakana", &["Kana"]), ("Kawi", &[]), ("Kayah_Li", &["Kali"]),
    ("Kharoshthi", &["Khar"]), ("Khitan_Small_Script", &["Kits"]), ("Khmer", &["Khmr"]),
    ("Khojki", &["Khoj"]), ("Khudawadi", &["Sind"]), ("Lao", &["Laoo"]), ("Latin", &["Latn"]),
    ("Lepcha", &["Lepc"]), ("Limbu", &["Limb"]), ("Linear_A", &["Lina"]),
    ("Linear_B", &["Linb"]), ("Lisu", &[]), ("Lycian", &["Lyci"]), ("Lydian", &["Lydi"]),
    ("Mahajani", &["Mahj"]), ("Makasar", &["Maka"]), ("Malayalam", &["Mlym"]),
    ("Mandaic", &["Mand"]), ("Manichaean", &["Mani"]), ("Marchen", &["Marc"]),
    ("Masaram_Gondi", &["Gonm"]), ("Medefaidrin", &["Medf"]), ("Meetei_Mayek", &["Mtei"]),
    ("Mende_Kikakui", &["Mend"]), ("Meroitic_Cursive", &["Merc"]),
    ("Meroitic_Hieroglyphs", &["Mero"]), ("Miao", &["Plrd"]), ("Modi", &[]),
    ("Mongolian", &["Mong"]), ("Mro", &["Mroo"]), ("Multani", &["Mult"]),
    ("Myanmar", &["Mymr"]), ("Nabataean", &["Nbat"]), ("Nag_Mundari", &["Nagm"]),
    ("Nandinagari", &["Nand"]), ("New_Tai_Lue", &["Talu"]), ("Newa", &[]), ("Nko", &["Nkoo"]),
    ("Nushu", &["Nshu"]), ("Nyiakeng_Puachue_Hmong", &["Hmnp"]), ("Ogham", &["Ogam"]),
    ("Ol_Chiki", &["Olck"]), ("Old_Hungarian", &["Hung"]), ("Old_Italic", &["Ital"]),
    ("Old_North_Arabian", &["Narb"]), ("Old_Permic", &["Perm"]), ("Old_Persian", &["Xpeo"]),
    ("Old_Sogdian", &["Sogo"]), ("Old_South_Arabian", &["Sarb"]), ("Old_Turkic", &["Orkh"]),
    ("Old_Uyghur", &["Ougr"]), ("Oriya", &["Orya"]), ("Osage", &["Osge"]),
    ("Osmanya", &["Osma"]), ("Pahawh_Hmong", &["Hmng"]), ("Palmyrene", &["Palm"]),
    ("Pau_Cin_Hau", &["Pauc"]), ("Phags_Pa", &["Phag"]), ("Phoenician", &["Phnx"]),
    ("Psalter_Pahlavi", &["Phlp"]), ("Rejang", &["Rjng"]), ("Runic", &["Runr"]),
    ("Samaritan", &["Samr"]), ("Saurashtra", &["Saur"]), ("Sharada", &["Shrd"]),
    ("Shavian", &["Shaw"]), ("Siddham", &["Sidd"]), ("SignWriting", &["Sgnw"]),
    ("Sinhala", &["Sinh"]), ("Sogdian", &["Sogd"]), ("Sora_Sompeng", &["Sora"]),
    ("Soyombo", &["Soyo"]), ("Sundanese", &["Sund"]), ("Syloti_Nagri", &["Sylo"]),
    ("Syriac", &["Syrc"]), ("Tagalog", &["Tglg"]), ("Tagbanwa", &["Tagb"]),
    ("Tai_Le", &["Tale"]), ("Tai_Tham", &["Lana"]), ("Tai_Viet", &["Tavt"]),
    ("Takri", &["Takr"]), ("Tamil", &["Taml"]), ("Tangsa", &["Tnsa"]), ("Tangut", &["Tang"]),
    ("Telugu", &["Telu"]), ("Thaana", &["Thaa"]), ("Thai", &[]), ("Tibetan", &["Tibt"]),
    ("Tifinagh", &["Tfng"]), ("Tirhuta", &["Tirh"]), ("Toto", &[]), ("Ugaritic", &["Ugar"]),
    ("Vai", &["Vaii"]), ("Vithkuqi", &["Vith"]), ("Wancho", &["Wcho"]),
    ("Warang_Citi", &["Wara"]), ("Yezidi", &["Yezi"]), ("Yi", &["Yiii"]),
    ("Zanabazar_Square", &["Zanb"]), ("Unknown", &["Zzzz"]),
];

static GENERAL_CATEGORY_LOOKUP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for &(canonical, aliases) in GENERAL_CATEGORIES {
        map.insert(canonical, canonical);
        for &alias in aliases {
            map.insert(alias, canonical);
        }
    }
    map
});

static SCRIPT_LOOKUP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for &(long, short) in SCRIPTS {
        map.insert(long, long);
        for &alias in short {
            map.insert(alias, long);
        }
    }
    map
});

/// A resolved `\p{...}` expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnicodeProperty {
    /// General_Category value, by canonical name
    GeneralCategory(&'static str),
    /// Script or Script_Extensions value, by long name
    Script(&'static str),
    /// Binary property
    Binary,
    /// Property of strings (`v` flag only)
    Strings,
}

/// Resolve the contents of `\p{...}`.
///
/// `name` is the part before `=` (or the lone name), `value` the part after.
pub fn resolve_property(
    name: &str,
    value: Option<&str>,
    unicode_sets: bool,
) -> Option<UnicodeProperty> {
    match value {
        Some(value) => match name {
            "General_Category" | "gc" => GENERAL_CATEGORY_LOOKUP
                .get(value)
                .map(|&canonical| UnicodeProperty::GeneralCategory(canonical)),
            "Script" | "sc" | "Script_Extensions" | "scx" => SCRIPT_LOOKUP
                .get(value)
                .map(|&long| UnicodeProperty::Script(long)),
            _ => None,
        },
        None => {
            if let Some(&canonical) = GENERAL_CATEGORY_LOOKUP.get(name) {
                return Some(UnicodeProperty::GeneralCategory(canonical));
            }
            if BINARY_PROPERTIES.contains(&name) {
                return Some(UnicodeProperty::Binary);
            }
            if unicode_sets && STRING_PROPERTIES.contains(&name) {
                return Some(UnicodeProperty::Strings);
            }
            None
        }
    }
}

/// ECMAScript WhiteSpace and LineTerminator code points, as ranges
pub const JS_WHITESPACE: &[(u32, u32)] = &[
    (0x09, 0x0D),
    (0x20, 0x20),
    (0xA0, 0xA0),
    (0x1680, 0x1680),
    (0x2000, 0x200A),
    (0x2028, 0x2029),
    (0x202F, 0x202F),
    (0x205F, 0x205F),
    (0x3000, 0x3000),
    (0xFEFF, 0xFEFF),
];

/// `\d`
pub const JS_DIGITS: &[(u32, u32)] = &[(0x30, 0x39)];

/// `\w`
pub const JS_WORD: &[(u32, u32)] = &[(0x30, 0x39), (0x41, 0x5A), (0x5F, 0x5F), (0x61, 0x7A)];

/// `\w` with the `u` and `i` flags also matches U+017F and U+212A
pub const JS_WORD_UNICODE_IGNORE_CASE: &[(u32, u32)] = &[
    (0x30, 0x39),
    (0x41, 0x5A),
    (0x5F, 0x5F),
    (0x61, 0x7A),
    (0x017F, 0x017F),
    (0x212A, 0x212A),
];

/// Code units that match one another under the `i` flag without `u`,
/// grouped by canonical form. Singleton groups are left out.
struct LegacyCaseGroups {
    groups: Vec<Vec<u32>>,
    index: HashMap<u32, usize>,
}

impl LegacyCaseGroups {
    fn build() -> Self {
        let mut by_canonical: HashMap<u32, Vec<u32>> = HashMap::new();
        for cp in 0..=0xFFFF {
            if let Some(ch) = char::from_u32(cp) {
                by_canonical
                    .entry(legacy_canonicalize(ch) as u32)
                    .or_default()
                    .push(cp);
            }
        }
        let mut groups: Vec<Vec<u32>> = by_canonical
            .into_values()
            .filter(|group| group.len() > 1)
            .collect();
        groups.sort_unstable();
        let index = groups
            .iter()
            .enumerate()
            .flat_map(|(i, group)| group.iter().map(move |&cp| (cp, i)))
            .collect();
        Self { groups, index }
    }
}

static LEGACY_CASE_GROUPS: Lazy<LegacyCaseGroups> = Lazy::new(LegacyCaseGroups::build);

/// Canonical form of a code unit for ignore-case matching without `u`:
/// the single-character uppercase mapping, except that nothing outside
/// ASCII maps into ASCII.
pub fn legacy_canonicalize(ch: char) -> char {
    let mut upper = ch.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(single), None) if ch.is_ascii() || !single.is_ascii() => single,
        _ => ch,
    }
}

/// Every code unit equal to `cp` under legacy ignore-case matching,
/// including `cp`; empty when `cp` only matches itself
pub fn legacy_case_variants(cp: u32) -> &'static [u32] {
    let groups = &*LEGACY_CASE_GROUPS;
    groups
        .index
        .get(&cp)
        .map(|&i| groups.groups[i].as_slice())
        .unwrap_or(&[])
}

/// All groups of code units that are equal under legacy ignore-case matching
pub fn legacy_case_groups() -> impl Iterator<Item = &'static [u32]> {
    LEGACY_CASE_GROUPS.groups.iter().map(Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_case_variants() {
        assert_eq!(legacy_case_variants('k' as u32), &['K' as u32, 'k' as u32]);
        assert!(legacy_case_variants(0x212A).is_empty());
        assert!(legacy_case_variants(0x017F).is_empty());
        assert!(legacy_case_variants(0xDF).is_empty());
        let sigma = legacy_case_variants(0x03C3);
        assert!(sigma.contains(&0x03A3) && sigma.contains(&0x03C2));
        assert_eq!(legacy_canonicalize('\u{0131}'), '\u{0131}');
        assert!(legacy_case_groups().all(|group| group.len() > 1));
    }

    #[test]
    fn test_general_category_aliases() {
        assert_eq!(
            resolve_property("Lu", None, false),
            Some(UnicodeProperty::GeneralCategory("Uppercase_Letter"))
        );
        assert_eq!(
            resolve_property("gc", Some("L"), false),
            Some(UnicodeProperty::GeneralCategory("Letter"))
        );
        assert_eq!(
            resolve_property("General_Category", Some("digit"), false),
            Some(UnicodeProperty::GeneralCategory("Decimal_Number"))
        );
    }

    #[test]
    fn test_script_values() {
        assert_eq!(
            resolve_property("Script", Some("Grek"), false),
            Some(UnicodeProperty::Script("Greek"))
        );
        assert_eq!(
            resolve_property("scx", Some("Latin"), false),
            Some(UnicodeProperty::Script("Latin"))
        );
        assert_eq!(resolve_property("Script", Some("Klingon"), false), None);
    }

    #[test]
    fn test_binary_and_string_properties() {
        assert_eq!(resolve_property("ASCII", None, false), Some(UnicodeProperty::Binary));
        assert_eq!(resolve_property("RGI_Emoji", None, false), None);
        assert_eq!(resolve_property("RGI_Emoji", None, true), Some(UnicodeProperty::Strings));
        assert_eq!(resolve_property("ascii", None, false), None);
        assert_eq!(resolve_property("Alphabetic", Some("Yes"), false), None);
    }
}
