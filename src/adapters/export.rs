//! CSV export for the movie table. Uses the `csv` crate for safe quoting.

use crate::domain::Movie;

/// Serialize the movie table to a CSV string (header row included). The
/// column layout matches the catalog source, so an export can be re-ingested.
pub fn movies_to_csv(movies: &[Movie]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(["movie_id", "title", "release_date", "budget", "revenue", "language"])?;

    for movie in movies {
        wtr.write_record([
            movie.movie_id.to_string(),
            movie.title.clone(),
            movie.release_date.clone().unwrap_or_default(),
            movie.budget.map(|b| b.to_string()).unwrap_or_default(),
            movie.revenue.map(|r| r.to_string()).unwrap_or_default(),
            movie.language.clone().unwrap_or_default(),
        ])?;
    }

    wtr.flush()?;
    let bytes = wtr.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::other(e.to_string()))
    })?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}
