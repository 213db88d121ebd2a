//! SQLite-backed entity store via libsql. Implements StorePort with batch
//! upserts and the join queries the aggregation engine reads.
//!
//! Single database file: data/film.db. All writes are transactional upserts
//! keyed by the natural key of each table, so re-running ingestion for the
//! same source data yields the same final content.

use crate::domain::aggregate::GenreRevenueRow;
use crate::domain::{CastCredit, CountryEconomy, DomainError, GenreTag, LanguageMarketEntry, Movie};
use crate::ports::StorePort;
use libsql::{params, Database};
use std::path::{Path, PathBuf};
use tracing::info;

const MOVIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS movies (
    movie_id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    release_date TEXT,
    budget REAL,
    revenue REAL,
    language TEXT
)"#;

const GENRES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS genres (
    movie_id INTEGER NOT NULL,
    genre TEXT NOT NULL,
    PRIMARY KEY (movie_id, genre)
)"#;

const CAST_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS movie_cast (
    movie_id INTEGER NOT NULL,
    actor TEXT NOT NULL,
    PRIMARY KEY (movie_id, actor)
)"#;

/// country_code is the reconciled ISO-3166 alpha-3; NULL = unresolved.
const MARKET_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS language_market (
    language_code TEXT NOT NULL,
    language TEXT NOT NULL,
    country TEXT NOT NULL,
    country_code TEXT,
    capital TEXT,
    population INTEGER NOT NULL,
    PRIMARY KEY (language_code, country)
)"#;

const ECONOMY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS world_bank_data (
    iso_code TEXT PRIMARY KEY,
    gdp REAL,
    population_gdp INTEGER
)"#;

const GENRES_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_genres_movie ON genres (movie_id)";
const MARKET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_market_country_code ON language_market (country_code)";

/// SQLite store. One database file (film.db) in the given base directory.
pub struct SqliteStore {
    db: Database,
    db_path: PathBuf,
}

impl SqliteStore {
    /// Connect to (or create) the database and ensure the schema exists.
    /// Call once at startup; the returned store is safe to share via Arc.
    ///
    /// WAL mode and synchronous=NORMAL match the refresh-then-read discipline:
    /// aggregation and training read only after ingestion committed.
    pub async fn connect(base_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let base = base_dir.as_ref();
        std::fs::create_dir_all(base).map_err(|e| DomainError::Store(e.to_string()))?;
        let db_path = base.join("film.db");
        let path_str = db_path.to_string_lossy();
        let db = libsql::Builder::new_local(path_str.as_ref())
            .build()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let conn = db.connect().map_err(|e| DomainError::Store(e.to_string()))?;

        // PRAGMA returns a row (new value); use query and consume rows
        // (execute fails when rows are returned).
        let mut wal_rows = conn
            .query("PRAGMA journal_mode=WAL", ())
            .await
            .map_err(|e| DomainError::Store(format!("WAL pragma failed: {}", e)))?;
        while wal_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
            .is_some()
        {}
        let mut sync_rows = conn
            .query("PRAGMA synchronous=NORMAL", ())
            .await
            .map_err(|e| DomainError::Store(format!("synchronous pragma failed: {}", e)))?;
        while sync_rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
            .is_some()
        {}

        for statement in [
            MOVIES_TABLE,
            GENRES_TABLE,
            CAST_TABLE,
            MARKET_TABLE,
            ECONOMY_TABLE,
            GENRES_INDEX,
            MARKET_INDEX,
        ] {
            conn.execute(statement, ())
                .await
                .map_err(|e| DomainError::Store(e.to_string()))?;
        }

        info!(path = %db_path.display(), "SQLite store connected with WAL mode");

        Ok(Self { db, db_path })
    }

    fn conn(&self) -> Result<libsql::Connection, DomainError> {
        self.db.connect().map_err(|e| DomainError::Store(e.to_string()))
    }
}

#[async_trait::async_trait]
impl StorePort for SqliteStore {
    async fn upsert_movies(&self, movies: &[Movie]) -> Result<(), DomainError> {
        if movies.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        for m in movies {
            tx.execute(
                r#"
                INSERT INTO movies (movie_id, title, release_date, budget, revenue, language)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT (movie_id) DO UPDATE SET
                    title = excluded.title,
                    release_date = excluded.release_date,
                    budget = excluded.budget,
                    revenue = excluded.revenue,
                    language = excluded.language
                "#,
                params![
                    m.movie_id,
                    m.title.as_str(),
                    m.release_date.clone(),
                    m.budget,
                    m.revenue,
                    m.language.clone()
                ],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        info!(path = %self.db_path.display(), count = movies.len(), "saved movies");
        Ok(())
    }

    async fn upsert_genres(&self, tags: &[GenreTag]) -> Result<(), DomainError> {
        if tags.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        for t in tags {
            tx.execute(
                r#"
                INSERT INTO genres (movie_id, genre) VALUES (?1, ?2)
                ON CONFLICT (movie_id, genre) DO NOTHING
                "#,
                params![t.movie_id, t.genre.as_str()],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn upsert_cast(&self, credits: &[CastCredit]) -> Result<(), DomainError> {
        if credits.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        for c in credits {
            tx.execute(
                r#"
                INSERT INTO movie_cast (movie_id, actor) VALUES (?1, ?2)
                ON CONFLICT (movie_id, actor) DO NOTHING
                "#,
                params![c.movie_id, c.actor.as_str()],
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn upsert_market(&self, entries: &[LanguageMarketEntry]) -> Result<(), DomainError> {
        if entries.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        for e in entries {
            tx.execute(
                r#"
                INSERT INTO language_market
                    (language_code, language, country, country_code, capital, population)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ON CONFLICT (language_code, country) DO UPDATE SET
                    language = excluded.language,
                    country_code = excluded.country_code,
                    capital = excluded.capital,
                    population = excluded.population
                "#,
                params![
                    e.language_code.as_str(),
                    e.language.as_str(),
                    e.country.as_str(),
                    e.country_code.clone(),
                    e.capital.clone(),
                    e.population
                ],
            )
            .await
            .map_err(|err| DomainError::Store(err.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn upsert_economies(&self, economies: &[CountryEconomy]) -> Result<(), DomainError> {
        if economies.is_empty() {
            return Ok(());
        }
        let conn = self.conn()?;
        let tx = conn
            .transaction()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        for e in economies {
            tx.execute(
                r#"
                INSERT INTO world_bank_data (iso_code, gdp, population_gdp)
                VALUES (?1, ?2, ?3)
                ON CONFLICT (iso_code) DO UPDATE SET
                    gdp = excluded.gdp,
                    population_gdp = excluded.population_gdp
                "#,
                params![e.iso_code.as_str(), e.gdp, e.population_gdp],
            )
            .await
            .map_err(|err| DomainError::Store(err.to_string()))?;
        }
        tx.commit()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        Ok(())
    }

    async fn get_movies(&self) -> Result<Vec<Movie>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT movie_id, title, release_date, budget, revenue, language
                FROM movies ORDER BY movie_id
                "#,
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut movies = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            movies.push(Movie {
                movie_id: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                title: row.get(1).map_err(|e| DomainError::Store(e.to_string()))?,
                release_date: row.get(2).ok(),
                budget: row.get(3).ok(),
                revenue: row.get(4).ok(),
                language: row.get(5).ok(),
            });
        }
        Ok(movies)
    }

    async fn get_genre_revenue(&self) -> Result<Vec<GenreRevenueRow>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT genres.genre, movies.revenue
                FROM genres JOIN movies ON movies.movie_id = genres.movie_id
                ORDER BY genres.genre
                "#,
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            out.push(GenreRevenueRow {
                genre: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                revenue: row.get(1).ok(),
            });
        }
        Ok(out)
    }

    async fn get_market(&self) -> Result<Vec<LanguageMarketEntry>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                r#"
                SELECT language_code, language, country, country_code, capital, population
                FROM language_market ORDER BY language_code, country
                "#,
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut entries = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            entries.push(LanguageMarketEntry {
                language_code: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                language: row.get(1).map_err(|e| DomainError::Store(e.to_string()))?,
                country: row.get(2).map_err(|e| DomainError::Store(e.to_string()))?,
                country_code: row.get(3).ok(),
                capital: row.get(4).ok(),
                population: row.get(5).map_err(|e| DomainError::Store(e.to_string()))?,
            });
        }
        Ok(entries)
    }

    async fn get_economies(&self) -> Result<Vec<CountryEconomy>, DomainError> {
        let conn = self.conn()?;
        let mut rows = conn
            .query(
                "SELECT iso_code, gdp, population_gdp FROM world_bank_data ORDER BY iso_code",
                (),
            )
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut economies = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| DomainError::Store(e.to_string()))?
        {
            economies.push(CountryEconomy {
                iso_code: row.get(0).map_err(|e| DomainError::Store(e.to_string()))?,
                gdp: row.get(1).ok(),
                population_gdp: row.get(2).ok(),
            });
        }
        Ok(economies)
    }
}
