//! Identifier reconciliation: raw country/language strings to canonical codes.
//!
//! Sources disagree on identifiers (the catalog says "en", the market source
//! says "Korea", the economy source says "KOR"). Everything is normalized here
//! into one canonical space: ISO-3166 alpha-3 for countries, ISO-639-1 for
//! languages. Lookup tables are immutable process-wide statics; unknown input
//! resolves to [`Resolution::Unresolved`], never to a guess.

use crate::domain::Resolution;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Country name -> ISO-3166 alpha-3. Covers the markets the sources emit;
/// anything outside the table is Unresolved and excluded from economy joins.
const COUNTRIES: &[(&str, &str)] = &[
    ("Afghanistan", "AFG"),
    ("Argentina", "ARG"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Bangladesh", "BGD"),
    ("Belgium", "BEL"),
    ("Bolivia", "BOL"),
    ("Brazil", "BRA"),
    ("Bulgaria", "BGR"),
    ("Canada", "CAN"),
    ("Chile", "CHL"),
    ("China", "CHN"),
    ("Colombia", "COL"),
    ("Croatia", "HRV"),
    ("Cuba", "CUB"),
    ("Czech Republic", "CZE"),
    ("Denmark", "DNK"),
    ("Ecuador", "ECU"),
    ("Egypt", "EGY"),
    ("Estonia", "EST"),
    ("Ethiopia", "ETH"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Germany", "DEU"),
    ("Greece", "GRC"),
    ("Hong Kong", "HKG"),
    ("Hungary", "HUN"),
    ("Iceland", "ISL"),
    ("India", "IND"),
    ("Indonesia", "IDN"),
    ("Iran, Islamic Republic of", "IRN"),
    ("Iraq", "IRQ"),
    ("Ireland", "IRL"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    ("Japan", "JPN"),
    ("Kazakhstan", "KAZ"),
    ("Kenya", "KEN"),
    ("Latvia", "LVA"),
    ("Lithuania", "LTU"),
    ("Malaysia", "MYS"),
    ("Mexico", "MEX"),
    ("Morocco", "MAR"),
    ("Netherlands", "NLD"),
    ("New Zealand", "NZL"),
    ("Nigeria", "NGA"),
    ("North Korea", "PRK"),
    ("Norway", "NOR"),
    ("Pakistan", "PAK"),
    ("Peru", "PER"),
    ("Philippines", "PHL"),
    ("Poland", "POL"),
    ("Portugal", "PRT"),
    ("Romania", "ROU"),
    ("Russian Federation", "RUS"),
    ("Saudi Arabia", "SAU"),
    ("Serbia", "SRB"),
    ("Singapore", "SGP"),
    ("Slovakia", "SVK"),
    ("Slovenia", "SVN"),
    ("South Africa", "ZAF"),
    ("South Korea", "KOR"),
    ("Spain", "ESP"),
    ("Sweden", "SWE"),
    ("Switzerland", "CHE"),
    ("Taiwan", "TWN"),
    ("Thailand", "THA"),
    ("Turkey", "TUR"),
    ("Ukraine", "UKR"),
    ("United Arab Emirates", "ARE"),
    ("United Kingdom", "GBR"),
    ("United States", "USA"),
    ("Uruguay", "URY"),
    ("Venezuela", "VEN"),
    ("Vietnam", "VNM"),
];

/// Colloquial/abbreviated synonyms -> primary country name (secondary table;
/// the fallback path). Alias resolves to a name, which then resolves to a code.
const COUNTRY_ALIASES: &[(&str, &str)] = &[
    ("America", "United States"),
    ("Britain", "United Kingdom"),
    ("Czechia", "Czech Republic"),
    ("Great Britain", "United Kingdom"),
    ("Holland", "Netherlands"),
    ("Iran", "Iran, Islamic Republic of"),
    ("Korea", "South Korea"),
    ("Korea, Republic of", "South Korea"),
    ("Korea, Democratic People's Republic of", "North Korea"),
    ("Republic of Korea", "South Korea"),
    ("Russia", "Russian Federation"),
    ("Turkiye", "Turkey"),
    ("U.K.", "United Kingdom"),
    ("U.S.", "United States"),
    ("U.S.A.", "United States"),
    ("UAE", "United Arab Emirates"),
    ("UK", "United Kingdom"),
    ("USA", "United States"),
    ("United States of America", "United States"),
    ("Viet Nam", "Vietnam"),
];

/// ISO-639-1 code -> English name. The stable language-code table.
const LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("bn", "Bengali"),
    ("cs", "Czech"),
    ("da", "Danish"),
    ("de", "German"),
    ("el", "Greek"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fa", "Persian"),
    ("fi", "Finnish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("hi", "Hindi"),
    ("hu", "Hungarian"),
    ("id", "Indonesian"),
    ("it", "Italian"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ms", "Malay"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pl", "Polish"),
    ("pt", "Portuguese"),
    ("ro", "Romanian"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("sw", "Swahili"),
    ("ta", "Tamil"),
    ("th", "Thai"),
    ("tl", "Tagalog"),
    ("tr", "Turkish"),
    ("uk", "Ukrainian"),
    ("ur", "Urdu"),
    ("vi", "Vietnamese"),
    ("zh", "Chinese"),
];

/// Language-name synonyms -> ISO-639-1 code.
const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("Cantonese", "zh"),
    ("Castilian", "es"),
    ("Farsi", "fa"),
    ("Filipino", "tl"),
    ("Mandarin", "zh"),
];

static COUNTRY_BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    COUNTRIES
        .iter()
        .map(|(name, code)| (name.to_lowercase(), *code))
        .collect()
});

static COUNTRY_ALIAS_BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    COUNTRY_ALIASES
        .iter()
        .map(|(alias, name)| (alias.to_lowercase(), *name))
        .collect()
});

static COUNTRY_CODES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| COUNTRIES.iter().map(|(name, code)| (*code, *name)).collect());

static LANGUAGE_BY_CODE: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| LANGUAGES.iter().copied().collect());

static LANGUAGE_BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut map: HashMap<String, &'static str> = LANGUAGES
        .iter()
        .map(|(code, name)| (name.to_lowercase(), *code))
        .collect();
    for (alias, code) in LANGUAGE_ALIASES {
        map.insert(alias.to_lowercase(), code);
    }
    map
});

/// Resolve a raw country string to its ISO-3166 alpha-3 code.
///
/// Primary path: exact (case-insensitive) name or alpha-3 code lookup.
/// Fallback path: alias table ("Korea" -> "South Korea" -> "KOR").
/// Same input always yields the same output; no fuzzy guessing.
pub fn resolve_country(raw: &str) -> Resolution {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Resolution::Unresolved;
    }
    let upper = trimmed.to_uppercase();
    if trimmed.len() == 3 && COUNTRY_CODES.contains_key(upper.as_str()) {
        return Resolution::Canonical(upper);
    }
    let key = trimmed.to_lowercase();
    if let Some(code) = COUNTRY_BY_NAME.get(&key) {
        return Resolution::Canonical((*code).to_string());
    }
    if let Some(name) = COUNTRY_ALIAS_BY_NAME.get(&key) {
        if let Some(code) = COUNTRY_BY_NAME.get(&name.to_lowercase()) {
            return Resolution::Canonical((*code).to_string());
        }
    }
    Resolution::Unresolved
}

/// Resolve a raw language string (code, compound code like "en-US", or
/// English name) to its ISO-639-1 code.
pub fn resolve_language(raw: &str) -> Resolution {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Resolution::Unresolved;
    }
    let lower = trimmed.to_lowercase();
    if LANGUAGE_BY_CODE.contains_key(lower.as_str()) {
        return Resolution::Canonical(lower);
    }
    if let Some(code) = LANGUAGE_BY_NAME.get(&lower) {
        return Resolution::Canonical((*code).to_string());
    }
    // Compound regional codes ("en-US", "zh_TW"): retry with the base subtag.
    if let Some(base) = lower.split(['-', '_']).next() {
        if base.len() == 2 && base != lower && LANGUAGE_BY_CODE.contains_key(base) {
            return Resolution::Canonical(base.to_string());
        }
    }
    Resolution::Unresolved
}

/// English display name for a canonical language code.
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGE_BY_CODE.get(code).copied()
}

/// All known ISO-3166 alpha-3 codes (sorted). The economy source iterates
/// these when fetching indicators country-by-country.
pub fn known_country_codes() -> Vec<&'static str> {
    let mut codes: Vec<&'static str> = COUNTRY_CODES.keys().copied().collect();
    codes.sort_unstable();
    codes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_country_name() {
        assert_eq!(
            resolve_country("South Korea"),
            Resolution::Canonical("KOR".into())
        );
        assert_eq!(resolve_country("France"), Resolution::Canonical("FRA".into()));
    }

    #[test]
    fn test_country_alias_chain() {
        // "Korea" -> "South Korea" -> "KOR" (the two-step fallback path)
        assert_eq!(resolve_country("Korea"), Resolution::Canonical("KOR".into()));
        assert_eq!(
            resolve_country("Russia"),
            Resolution::Canonical("RUS".into())
        );
        assert_eq!(resolve_country("USA"), Resolution::Canonical("USA".into()));
    }

    #[test]
    fn test_country_case_and_whitespace() {
        assert_eq!(
            resolve_country("  korea  "),
            Resolution::Canonical("KOR".into())
        );
        assert_eq!(
            resolve_country("UNITED KINGDOM"),
            Resolution::Canonical("GBR".into())
        );
    }

    #[test]
    fn test_country_alpha3_passthrough() {
        assert_eq!(resolve_country("KOR"), Resolution::Canonical("KOR".into()));
        assert_eq!(resolve_country("deu"), Resolution::Canonical("DEU".into()));
    }

    #[test]
    fn test_unknown_country_is_unresolved() {
        assert_eq!(resolve_country("Atlantis"), Resolution::Unresolved);
        assert_eq!(resolve_country(""), Resolution::Unresolved);
        // Unknown three-letter strings are not mistaken for codes.
        assert_eq!(resolve_country("ZZZ"), Resolution::Unresolved);
    }

    #[test]
    fn test_resolver_is_deterministic() {
        for _ in 0..3 {
            assert_eq!(resolve_country("Korea"), Resolution::Canonical("KOR".into()));
            assert_eq!(resolve_language("English"), Resolution::Canonical("en".into()));
        }
    }

    #[test]
    fn test_language_code_and_name() {
        assert_eq!(resolve_language("en"), Resolution::Canonical("en".into()));
        assert_eq!(resolve_language("Korean"), Resolution::Canonical("ko".into()));
        assert_eq!(resolve_language("KO"), Resolution::Canonical("ko".into()));
    }

    #[test]
    fn test_language_compound_code() {
        assert_eq!(resolve_language("en-US"), Resolution::Canonical("en".into()));
        assert_eq!(resolve_language("zh_TW"), Resolution::Canonical("zh".into()));
    }

    #[test]
    fn test_language_alias() {
        assert_eq!(
            resolve_language("Mandarin"),
            Resolution::Canonical("zh".into())
        );
        assert_eq!(resolve_language("Klingon"), Resolution::Unresolved);
    }

    #[test]
    fn test_language_name_lookup() {
        assert_eq!(language_name("ko"), Some("Korean"));
        assert_eq!(language_name("xx"), None);
    }

    #[test]
    fn test_known_country_codes_sorted_unique() {
        let codes = known_country_codes();
        assert!(codes.contains(&"KOR"));
        assert!(codes.windows(2).all(|w| w[0] < w[1]));
    }
}
