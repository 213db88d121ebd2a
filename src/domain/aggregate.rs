//! Derived metrics over store content. Pure, read-only, deterministic.
//!
//! Every function takes already-fetched rows and returns a mapping from group
//! key to [`Metric`]. Ratio denominators are always guarded: zero or missing
//! data yields `Metric::NotComputable`, never a numeric zero.

use crate::domain::{CountryEconomy, LanguageMarketEntry, Metric, Movie};
use chrono::{Datelike, NaiveDate};
use std::collections::{BTreeMap, BTreeSet};

/// One (genre, revenue) row from the genre/movie join. A movie with N genres
/// appears in N rows; its full revenue counts toward each group.
#[derive(Debug, Clone)]
pub struct GenreRevenueRow {
    pub genre: String,
    pub revenue: Option<f64>,
}

/// Per-language market rollup joined against country economies.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageRollup {
    pub language: String,
    /// Speaker population summed over countries that resolved to a canonical
    /// code and joined an economy row.
    pub total_population: i64,
    /// Mean GDP across the joined market rows. `NotComputable` when no
    /// country resolved.
    pub avg_gdp: Metric,
    /// Distinct resolved countries hosting the language.
    pub countries: usize,
}

/// Audience reach of a single film through its primary language.
#[derive(Debug, Clone)]
pub struct AudienceReach {
    pub title: String,
    pub language_code: String,
    pub revenue: f64,
    /// Global speaker population of the film's language.
    pub population: i64,
    pub revenue_per_million: Metric,
}

/// Extract the calendar month (1-12) from an ISO `YYYY-MM-DD` date string.
/// Unparseable dates yield `None` and the movie is excluded, not defaulted.
pub fn release_month(release_date: &str) -> Option<u32> {
    NaiveDate::parse_from_str(release_date.trim(), "%Y-%m-%d")
        .ok()
        .map(|d| d.month())
}

/// Mean revenue per genre label.
pub fn revenue_by_genre(rows: &[GenreRevenueRow]) -> BTreeMap<String, Metric> {
    let mut sums: BTreeMap<String, (f64, u64)> = BTreeMap::new();
    for row in rows {
        let Some(revenue) = row.revenue else { continue };
        let entry = sums.entry(row.genre.clone()).or_insert((0.0, 0));
        entry.0 += revenue;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(genre, (sum, count))| (genre, Metric::ratio(sum, count as f64)))
        .collect()
}

/// Mean revenue per calendar release month. Movies with a missing or
/// unparseable release date are excluded.
pub fn revenue_by_month(movies: &[Movie]) -> BTreeMap<u32, Metric> {
    let mut sums: BTreeMap<u32, (f64, u64)> = BTreeMap::new();
    for movie in movies {
        let Some(revenue) = movie.revenue else { continue };
        let Some(month) = movie.release_date.as_deref().and_then(release_month) else {
            continue;
        };
        let entry = sums.entry(month).or_insert((0.0, 0));
        entry.0 += revenue;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(month, (sum, count))| (month, Metric::ratio(sum, count as f64)))
        .collect()
}

/// Total revenue per primary-language field of the movie itself. This is NOT
/// the reconciled language-market relation; the two concepts stay separate.
pub fn revenue_by_language(movies: &[Movie]) -> BTreeMap<String, Metric> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for movie in movies {
        let (Some(language), Some(revenue)) = (movie.language.as_deref(), movie.revenue) else {
            continue;
        };
        *sums.entry(language.to_string()).or_insert(0.0) += revenue;
    }
    sums.into_iter()
        .map(|(language, sum)| (language, Metric::Value(sum)))
        .collect()
}

/// Speaker population per language code, summed over its market rows.
fn population_by_language(market: &[LanguageMarketEntry]) -> BTreeMap<String, i64> {
    let mut populations: BTreeMap<String, i64> = BTreeMap::new();
    for entry in market {
        *populations.entry(entry.language_code.clone()).or_insert(0) += entry.population;
    }
    populations
}

/// Revenue per million speakers, per language: total revenue of movies whose
/// primary language matches, divided by (speaker population / 1e6).
/// A language with zero mapped speakers is `NotComputable` even when its gross
/// revenue is positive.
pub fn revenue_per_million_speakers(
    movies: &[Movie],
    market: &[LanguageMarketEntry],
) -> BTreeMap<String, Metric> {
    let populations = population_by_language(market);
    let mut revenues: BTreeMap<String, f64> = BTreeMap::new();
    for movie in movies {
        let (Some(language), Some(revenue)) = (movie.language.as_deref(), movie.revenue) else {
            continue;
        };
        *revenues.entry(language.to_string()).or_insert(0.0) += revenue;
    }
    revenues
        .into_iter()
        .map(|(language, revenue)| {
            let population = populations.get(&language).copied().unwrap_or(0);
            let metric = Metric::ratio(revenue, population as f64 / 1_000_000.0);
            (language, metric)
        })
        .collect()
}

/// Audience reach per film: speaker population of the film's language and the
/// film's own revenue-per-million ratio. Sorted by population, descending.
pub fn audience_reach(movies: &[Movie], market: &[LanguageMarketEntry]) -> Vec<AudienceReach> {
    let populations = population_by_language(market);
    let mut reach: Vec<AudienceReach> = movies
        .iter()
        .filter_map(|movie| {
            let language = movie.language.as_deref()?;
            let revenue = movie.revenue?;
            let population = populations.get(language).copied().unwrap_or(0);
            Some(AudienceReach {
                title: movie.title.clone(),
                language_code: language.to_string(),
                revenue,
                population,
                revenue_per_million: Metric::ratio(revenue, population as f64 / 1_000_000.0),
            })
        })
        .collect();
    reach.sort_by(|a, b| b.population.cmp(&a.population).then(a.title.cmp(&b.title)));
    reach
}

/// Per-language rollup against country economies, joined via the canonical
/// alpha-3 code. Market rows whose country is unresolved are excluded, not
/// coerced to a zero economy.
pub fn language_rollup(
    market: &[LanguageMarketEntry],
    economies: &[CountryEconomy],
) -> BTreeMap<String, LanguageRollup> {
    let gdp_by_code: BTreeMap<&str, f64> = economies
        .iter()
        .filter_map(|e| e.gdp.map(|gdp| (e.iso_code.as_str(), gdp)))
        .collect();

    let mut rollups: BTreeMap<String, (String, i64, Vec<f64>, BTreeSet<String>)> = BTreeMap::new();
    for entry in market {
        let Some(code) = entry.country_code.as_deref() else {
            continue;
        };
        let Some(gdp) = gdp_by_code.get(code) else {
            continue;
        };
        let slot = rollups
            .entry(entry.language_code.clone())
            .or_insert_with(|| (entry.language.clone(), 0, Vec::new(), BTreeSet::new()));
        slot.1 += entry.population;
        slot.2.push(*gdp);
        slot.3.insert(code.to_string());
    }

    rollups
        .into_iter()
        .map(|(code, (language, total_population, gdps, countries))| {
            let avg_gdp = Metric::ratio(gdps.iter().sum(), gdps.len() as f64);
            (
                code,
                LanguageRollup {
                    language,
                    total_population,
                    avg_gdp,
                    countries: countries.len(),
                },
            )
        })
        .collect()
}

/// (iso_code, gdp, population) triples for countries where both indicators
/// are present. Feed for the GDP-vs-population view.
pub fn gdp_population(economies: &[CountryEconomy]) -> Vec<(String, f64, i64)> {
    let mut rows: Vec<(String, f64, i64)> = economies
        .iter()
        .filter_map(|e| Some((e.iso_code.clone(), e.gdp?, e.population_gdp?)))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: i64, revenue: Option<f64>, date: Option<&str>, language: Option<&str>) -> Movie {
        Movie {
            movie_id: id,
            title: format!("Movie {}", id),
            release_date: date.map(String::from),
            budget: Some(1_000_000.0),
            revenue,
            language: language.map(String::from),
        }
    }

    fn market(language_code: &str, country: &str, code: Option<&str>, population: i64) -> LanguageMarketEntry {
        LanguageMarketEntry {
            language_code: language_code.into(),
            language: "Korean".into(),
            country: country.into(),
            country_code: code.map(String::from),
            capital: None,
            population,
        }
    }

    #[test]
    fn test_release_month() {
        assert_eq!(release_month("2024-07-15"), Some(7));
        assert_eq!(release_month(" 2024-01-01 "), Some(1));
        assert_eq!(release_month("not-a-date"), None);
        assert_eq!(release_month("2024-13-01"), None);
    }

    #[test]
    fn test_revenue_by_genre_mean() {
        let rows = vec![
            GenreRevenueRow { genre: "Action".into(), revenue: Some(100.0) },
            GenreRevenueRow { genre: "Action".into(), revenue: Some(300.0) },
            GenreRevenueRow { genre: "Drama".into(), revenue: Some(50.0) },
            GenreRevenueRow { genre: "Drama".into(), revenue: None },
        ];
        let agg = revenue_by_genre(&rows);
        assert_eq!(agg["Action"], Metric::Value(200.0));
        // Missing revenue is excluded from both numerator and denominator.
        assert_eq!(agg["Drama"], Metric::Value(50.0));
    }

    #[test]
    fn test_revenue_by_month_includes_ingested_movie() {
        // Budget 1M, revenue 50M, released in July: month 7 must include it.
        let movies = vec![
            movie(1, Some(50_000_000.0), Some("2023-07-21"), Some("en")),
            movie(2, Some(10_000_000.0), Some("2023-07-01"), Some("en")),
            movie(3, Some(99.0), None, Some("en")),
            movie(4, Some(99.0), Some("garbage"), Some("en")),
        ];
        let agg = revenue_by_month(&movies);
        assert_eq!(agg[&7], Metric::Value(30_000_000.0));
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn test_revenue_by_language_sums() {
        let movies = vec![
            movie(1, Some(100.0), None, Some("en")),
            movie(2, Some(250.0), None, Some("en")),
            movie(3, Some(40.0), None, Some("ko")),
            movie(4, None, None, Some("ko")),
            movie(5, Some(7.0), None, None),
        ];
        let agg = revenue_by_language(&movies);
        assert_eq!(agg["en"], Metric::Value(350.0));
        assert_eq!(agg["ko"], Metric::Value(40.0));
        assert_eq!(agg.len(), 2);
    }

    #[test]
    fn test_revenue_per_million_speakers() {
        let movies = vec![movie(1, Some(50_000_000.0), None, Some("ko"))];
        let market_rows = vec![
            market("ko", "South Korea", Some("KOR"), 50_000_000),
            market("ko", "North Korea", Some("PRK"), 25_000_000),
        ];
        let agg = revenue_per_million_speakers(&movies, &market_rows);
        // 50M revenue / (75M speakers / 1M) ≈ 666_666.67 per million speakers
        let Metric::Value(v) = agg["ko"] else {
            panic!("expected a computable ratio");
        };
        assert!((v - 50_000_000.0 / 75.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_speaker_population_not_computable() {
        // Gross revenue is positive, but no speakers are mapped.
        let movies = vec![movie(1, Some(1_000.0), None, Some("sw"))];
        let agg = revenue_per_million_speakers(&movies, &[]);
        assert_eq!(agg["sw"], Metric::NotComputable);

        let zero_market = vec![market("sw", "Kenya", Some("KEN"), 0)];
        let agg = revenue_per_million_speakers(&movies, &zero_market);
        assert_eq!(agg["sw"], Metric::NotComputable);
    }

    #[test]
    fn test_audience_reach_sorted_by_population() {
        let movies = vec![
            movie(1, Some(100.0), None, Some("ko")),
            movie(2, Some(200.0), None, Some("en")),
        ];
        let market_rows = vec![
            market("ko", "South Korea", Some("KOR"), 50_000_000),
            market("en", "United States", Some("USA"), 330_000_000),
        ];
        let reach = audience_reach(&movies, &market_rows);
        assert_eq!(reach.len(), 2);
        assert_eq!(reach[0].language_code, "en");
        assert_eq!(reach[0].population, 330_000_000);
    }

    #[test]
    fn test_language_rollup_excludes_unresolved() {
        let market_rows = vec![
            market("ko", "South Korea", Some("KOR"), 50_000_000),
            market("ko", "Koryo", None, 10_000_000),
        ];
        let economies = vec![CountryEconomy {
            iso_code: "KOR".into(),
            gdp: Some(1.8e12),
            population_gdp: Some(51_000_000),
        }];
        let rollups = language_rollup(&market_rows, &economies);
        let ko = &rollups["ko"];
        // The unresolved "Koryo" row contributes nothing.
        assert_eq!(ko.total_population, 50_000_000);
        assert_eq!(ko.countries, 1);
        assert_eq!(ko.avg_gdp, Metric::Value(1.8e12));
    }

    #[test]
    fn test_language_rollup_without_economies_is_empty() {
        let market_rows = vec![market("ko", "South Korea", Some("KOR"), 1)];
        let rollups = language_rollup(&market_rows, &[]);
        assert!(rollups.is_empty());
    }

    #[test]
    fn test_gdp_population_requires_both_fields() {
        let economies = vec![
            CountryEconomy { iso_code: "KOR".into(), gdp: Some(1.8e12), population_gdp: Some(51) },
            CountryEconomy { iso_code: "ABW".into(), gdp: None, population_gdp: Some(100) },
            CountryEconomy { iso_code: "AFG".into(), gdp: Some(1.0), population_gdp: None },
        ];
        let rows = gdp_population(&economies);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].0, "KOR");
    }
}
