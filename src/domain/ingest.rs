//! Raw source records and their validation into domain entities.
//!
//! Sources deliver these shapes as-is (CSV rows, API payloads). Validation is
//! skip-and-report: a malformed record is rejected with
//! [`DomainError::MalformedRecord`] and the rest of the batch continues.

use crate::domain::{
    reconcile, CastCredit, CountryEconomy, DomainError, GenreTag, LanguageMarketEntry, Movie,
};
use std::collections::HashSet;

/// Movie row as delivered by the catalog source.
#[derive(Debug, Clone, Default)]
pub struct RawMovieRecord {
    pub movie_id: Option<i64>,
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
    pub language: Option<String>,
}

/// (movie, genre) association row.
#[derive(Debug, Clone, Default)]
pub struct RawGenreRecord {
    pub movie_id: Option<i64>,
    pub genre: Option<String>,
}

/// (movie, actor) association row.
#[derive(Debug, Clone, Default)]
pub struct RawCastRecord {
    pub movie_id: Option<i64>,
    pub actor: Option<String>,
}

/// Language-market row (country, language, speaker population).
#[derive(Debug, Clone, Default)]
pub struct RawMarketRecord {
    pub country: Option<String>,
    pub capital: Option<String>,
    pub language_code: Option<String>,
    pub language: Option<String>,
    pub population: Option<i64>,
}

/// Macro-indicator row keyed by ISO alpha-3 code.
#[derive(Debug, Clone, Default)]
pub struct RawEconomyRecord {
    pub iso_code: Option<String>,
    pub gdp: Option<f64>,
    pub population_gdp: Option<i64>,
}

fn required_text(value: Option<String>, field: &str) -> Result<String, DomainError> {
    match value {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(DomainError::MalformedRecord(format!("missing {}", field))),
    }
}

fn non_negative(value: Option<f64>, field: &str) -> Result<Option<f64>, DomainError> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DomainError::MalformedRecord(format!(
            "{} must be non-negative, got {}",
            field, v
        ))),
        other => Ok(other),
    }
}

/// Validate a raw movie row. Budget/revenue may be absent but never negative.
pub fn movie_from_raw(raw: RawMovieRecord) -> Result<Movie, DomainError> {
    let movie_id = raw
        .movie_id
        .ok_or_else(|| DomainError::MalformedRecord("movie without movie_id".into()))?;
    let title = required_text(raw.title, "movie title")?;
    let budget = non_negative(raw.budget, "budget")?;
    let revenue = non_negative(raw.revenue, "revenue")?;
    Ok(Movie {
        movie_id,
        title,
        release_date: raw.release_date.filter(|d| !d.trim().is_empty()),
        budget,
        revenue,
        language: raw.language.filter(|l| !l.trim().is_empty()),
    })
}

/// Validate a genre association. The movie must exist in the ingested batch;
/// dangling associations are rejected, keeping the store referentially sound.
pub fn genre_from_raw(
    raw: RawGenreRecord,
    known_movie_ids: &HashSet<i64>,
) -> Result<GenreTag, DomainError> {
    let movie_id = raw
        .movie_id
        .ok_or_else(|| DomainError::MalformedRecord("genre row without movie_id".into()))?;
    if !known_movie_ids.contains(&movie_id) {
        return Err(DomainError::MalformedRecord(format!(
            "genre row references unknown movie {}",
            movie_id
        )));
    }
    Ok(GenreTag {
        movie_id,
        genre: required_text(raw.genre, "genre label")?,
    })
}

/// Validate a cast association, same referential rule as genres.
pub fn cast_from_raw(
    raw: RawCastRecord,
    known_movie_ids: &HashSet<i64>,
) -> Result<CastCredit, DomainError> {
    let movie_id = raw
        .movie_id
        .ok_or_else(|| DomainError::MalformedRecord("cast row without movie_id".into()))?;
    if !known_movie_ids.contains(&movie_id) {
        return Err(DomainError::MalformedRecord(format!(
            "cast row references unknown movie {}",
            movie_id
        )));
    }
    Ok(CastCredit {
        movie_id,
        actor: required_text(raw.actor, "actor name")?,
    })
}

/// Validate a market row and reconcile its identifiers. The language must
/// resolve to a canonical code (a market row without one is unusable); the
/// country may stay unresolved — the row is kept with `country_code: None`
/// and excluded from economy joins downstream.
pub fn market_from_raw(raw: RawMarketRecord) -> Result<LanguageMarketEntry, DomainError> {
    let country = required_text(raw.country, "market country")?;
    let population = match raw.population {
        Some(p) if p < 0 => {
            return Err(DomainError::MalformedRecord(format!(
                "speaker population must be non-negative, got {}",
                p
            )));
        }
        Some(p) => p,
        None => {
            return Err(DomainError::MalformedRecord(
                "market row without population".into(),
            ));
        }
    };

    let raw_language = raw
        .language_code
        .or(raw.language)
        .ok_or_else(|| DomainError::MalformedRecord("market row without language".into()))?;
    let language_code = reconcile::resolve_language(&raw_language)
        .canonical()
        .map(String::from)
        .ok_or_else(|| {
            DomainError::MalformedRecord(format!("unrecognized language '{}'", raw_language))
        })?;
    let language = reconcile::language_name(&language_code)
        .unwrap_or(raw_language.as_str())
        .to_string();

    let country_code = reconcile::resolve_country(&country)
        .canonical()
        .map(String::from);

    Ok(LanguageMarketEntry {
        language_code,
        language,
        country,
        country_code,
        capital: raw.capital.filter(|c| !c.trim().is_empty()),
        population,
    })
}

/// Validate an economy row: alpha-3 key, non-negative indicators.
pub fn economy_from_raw(raw: RawEconomyRecord) -> Result<CountryEconomy, DomainError> {
    let iso_code = required_text(raw.iso_code, "iso_code")?.to_uppercase();
    if iso_code.len() != 3 || !iso_code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::MalformedRecord(format!(
            "'{}' is not an alpha-3 country code",
            iso_code
        )));
    }
    let gdp = non_negative(raw.gdp, "gdp")?;
    let population_gdp = match raw.population_gdp {
        Some(p) if p < 0 => {
            return Err(DomainError::MalformedRecord(format!(
                "population must be non-negative, got {}",
                p
            )));
        }
        other => other,
    };
    Ok(CountryEconomy {
        iso_code,
        gdp,
        population_gdp,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_negative_budget_rejected() {
        let raw = RawMovieRecord {
            movie_id: Some(1),
            title: Some("Bad Numbers".into()),
            budget: Some(-5.0),
            ..Default::default()
        };
        let err = movie_from_raw(raw).unwrap_err();
        assert!(matches!(err, DomainError::MalformedRecord(_)));
    }

    #[test]
    fn test_movie_missing_fields_become_none() {
        let raw = RawMovieRecord {
            movie_id: Some(7),
            title: Some("  Sparse  ".into()),
            release_date: Some("".into()),
            language: Some(" ".into()),
            ..Default::default()
        };
        let movie = movie_from_raw(raw).unwrap();
        assert_eq!(movie.title, "Sparse");
        assert!(movie.release_date.is_none());
        assert!(movie.language.is_none());
        assert!(movie.budget.is_none());
    }

    #[test]
    fn test_movie_without_id_rejected() {
        let raw = RawMovieRecord {
            title: Some("No Key".into()),
            ..Default::default()
        };
        assert!(movie_from_raw(raw).is_err());
    }

    #[test]
    fn test_genre_referential_check() {
        let known: HashSet<i64> = [1, 2].into_iter().collect();
        let ok = genre_from_raw(
            RawGenreRecord { movie_id: Some(1), genre: Some("Action".into()) },
            &known,
        );
        assert!(ok.is_ok());

        let dangling = genre_from_raw(
            RawGenreRecord { movie_id: Some(99), genre: Some("Action".into()) },
            &known,
        );
        assert!(matches!(dangling, Err(DomainError::MalformedRecord(_))));
    }

    #[test]
    fn test_cast_requires_actor_name() {
        let known: HashSet<i64> = [1].into_iter().collect();
        let err = cast_from_raw(RawCastRecord { movie_id: Some(1), actor: None }, &known);
        assert!(err.is_err());
    }

    #[test]
    fn test_market_reconciles_country_alias() {
        let raw = RawMarketRecord {
            country: Some("Korea".into()),
            language_code: Some("ko".into()),
            population: Some(50_000_000),
            ..Default::default()
        };
        let entry = market_from_raw(raw).unwrap();
        assert_eq!(entry.country_code.as_deref(), Some("KOR"));
        assert_eq!(entry.language_code, "ko");
        assert_eq!(entry.language, "Korean");
    }

    #[test]
    fn test_market_unresolved_country_is_kept() {
        let raw = RawMarketRecord {
            country: Some("Atlantis".into()),
            language_code: Some("en".into()),
            population: Some(1),
            ..Default::default()
        };
        let entry = market_from_raw(raw).unwrap();
        assert!(entry.country_code.is_none());
    }

    #[test]
    fn test_market_negative_population_rejected() {
        let raw = RawMarketRecord {
            country: Some("France".into()),
            language_code: Some("fr".into()),
            population: Some(-1),
            ..Default::default()
        };
        assert!(market_from_raw(raw).is_err());
    }

    #[test]
    fn test_market_language_by_name() {
        let raw = RawMarketRecord {
            country: Some("Brazil".into()),
            language: Some("Portuguese".into()),
            population: Some(210_000_000),
            ..Default::default()
        };
        let entry = market_from_raw(raw).unwrap();
        assert_eq!(entry.language_code, "pt");
    }

    #[test]
    fn test_economy_validation() {
        let ok = economy_from_raw(RawEconomyRecord {
            iso_code: Some("kor".into()),
            gdp: Some(1.8e12),
            population_gdp: Some(51_000_000),
        })
        .unwrap();
        assert_eq!(ok.iso_code, "KOR");

        let bad_code = economy_from_raw(RawEconomyRecord {
            iso_code: Some("K1".into()),
            ..Default::default()
        });
        assert!(bad_code.is_err());

        let negative = economy_from_raw(RawEconomyRecord {
            iso_code: Some("KOR".into()),
            gdp: Some(-1.0),
            population_gdp: None,
        });
        assert!(matches!(negative, Err(DomainError::MalformedRecord(_))));
    }
}
