//! The movie dataset.
//!
//! The catalog is loaded once from a CSV file with the columns
//! `title,year,genre,rating,description` and is read-only afterwards.

use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FinderError;

/// Highest rating a movie can carry.
pub const MAX_RATING: f64 = 10.0;

/// A single movie record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    /// Release title
    pub title: String,
    /// Release year
    pub year: i32,
    /// Genre, a single categorical value such as "Sci-Fi"
    pub genre: String,
    /// Average rating between 0 and 10
    pub rating: f64,
    /// Short synopsis
    #[serde(default)]
    pub description: String,
}

impl Movie {
    pub fn new(
        title: impl Into<String>,
        year: i32,
        genre: impl Into<String>,
        rating: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            year,
            genre: genre.into(),
            rating,
            description: description.into(),
        }
    }
}

impl fmt::Display for Movie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.title, self.year)?;
        writeln!(f, "  Genre: {}", self.genre)?;
        writeln!(f, "  Rating: {}", self.rating)?;
        write!(f, "  Description: {}", self.description)
    }
}

/// The full, immutable movie collection.
#[derive(Debug, Clone, Default)]
pub struct MovieCatalog {
    movies: Vec<Movie>,
}

impl MovieCatalog {
    pub fn new(movies: Vec<Movie>) -> Self {
        Self { movies }
    }

    /// Loads the catalog from a CSV file with a header row.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FinderError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            FinderError::IoError(format!("cannot open dataset {}: {e}", path.display()))
        })?;
        let catalog = Self::from_reader(file)?;
        log::debug!(
            "loaded {} movies from {}",
            catalog.movies.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Loads the catalog from any CSV source with a header row.
    ///
    /// Rows whose rating falls outside `0..=10` are rejected with the line they came from.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, FinderError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let mut record = csv::StringRecord::new();
        let mut movies = Vec::new();
        while rdr.read_record(&mut record)? {
            let movie: Movie = record.deserialize(Some(&headers))?;
            if !(0.0..=MAX_RATING).contains(&movie.rating) {
                return Err(FinderError::DatasetError(format!(
                    "line {}: rating {} of \"{}\" is outside 0-10",
                    record.position().map_or(0, |pos| pos.line()),
                    movie.rating,
                    movie.title
                )));
            }
            movies.push(movie);
        }
        Ok(Self { movies })
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Distinct genres, sorted, for the genre selector.
    pub fn genres(&self) -> Vec<String> {
        let mut genres: Vec<String> = self.movies.iter().map(|m| m.genre.clone()).collect();
        genres.sort();
        genres.dedup();
        genres
    }

    /// The `n` most frequent genres, most frequent first.
    ///
    /// Ties keep the order in which the genres first appear in the dataset.
    /// Independent of any active filter.
    pub fn trending_genres(&self, n: usize) -> Vec<String> {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (idx, movie) in self.movies.iter().enumerate() {
            counts.entry(movie.genre.as_str()).or_insert((0, idx)).0 += 1;
        }

        let mut ranked: Vec<(&str, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
        ranked
            .into_iter()
            .take(n)
            .map(|(genre, _)| genre.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "title,year,genre,rating,description
Inception,2010,Sci-Fi,8.8,Dreams within dreams
Parasite,2019,Thriller,8.5,A family infiltrates a household
Interstellar,2014,Sci-Fi,8.6,Space travel through a wormhole
Joker,2019,Drama,8.4,A failed comedian
Arrival,2016,Sci-Fi,7.9,Linguist meets aliens
Tenet,2020,Thriller,7.3,Time inversion
";

    #[test]
    fn loads_csv_rows() {
        let catalog = MovieCatalog::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 6);
        assert_eq!(catalog.movies()[0], Movie::new("Inception", 2010, "Sci-Fi", 8.8, "Dreams within dreams"));
    }

    #[test]
    fn rejects_out_of_range_rating() {
        let csv = "title,year,genre,rating,description\nBad,2000,Drama,11.5,Nope\n";
        let err = MovieCatalog::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, FinderError::DatasetError(ref m) if m.contains("line 2")));
    }

    #[test]
    fn error_line_counts_blank_and_multiline_rows() {
        let csv = "title,year,genre,rating,description\n\nHeat,1995,Crime,8.3,\"Cops\nand robbers\"\nBad,2000,Drama,11.5,Nope\n";
        let err = MovieCatalog::from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, FinderError::DatasetError(ref m) if m.contains("line 5")), "{err}");
    }

    #[test]
    fn rejects_non_numeric_year() {
        let csv = "title,year,genre,rating,description\nBad,soon,Drama,5,Nope\n";
        assert!(matches!(
            MovieCatalog::from_reader(csv.as_bytes()),
            Err(FinderError::DatasetError(_))
        ));
    }

    #[test]
    fn genres_are_sorted_and_distinct() {
        let catalog = MovieCatalog::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(catalog.genres(), vec!["Drama", "Sci-Fi", "Thriller"]);
    }

    #[test]
    fn trending_ranks_by_count() {
        let catalog = MovieCatalog::from_reader(CSV.as_bytes()).unwrap();
        assert_eq!(catalog.trending_genres(3), vec!["Sci-Fi", "Thriller", "Drama"]);
        assert_eq!(catalog.trending_genres(1), vec!["Sci-Fi"]);
    }

    #[test]
    fn trending_on_empty_catalog() {
        assert!(MovieCatalog::default().trending_genres(3).is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MovieCatalog::from_path(dir.path().join("movies.csv")).unwrap_err();
        assert!(matches!(err, FinderError::IoError(_)));
    }
}
