//! Filter engine: narrows the catalog by year, rating floor, genre and title.
//!
//! The year, rating and genre predicates are independent and combined with AND.
//! A non-empty title query then keeps the union of exact (case-insensitive)
//! matches and substring matches, exact matches first, without duplicates.

use std::collections::HashSet;
use std::fmt;
use std::ops::RangeInclusive;

use crate::{error::FinderError, movie::Movie, movie::MAX_RATING};

/// Years offered by the year selector.
pub const YEAR_RANGE: RangeInclusive<i32> = 1990..=2025;

/// Keyword that leaves a selector unconstrained.
pub const ALL: &str = "All";

/// User-chosen constraints. Every field defaults to "unconstrained".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    /// Title query, matched case-insensitively. Empty means no title filter.
    pub title: String,
    /// Exact release year
    pub year: Option<i32>,
    /// Inclusive rating floor
    pub min_rating: Option<f64>,
    /// Exact genre
    pub genre: Option<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn min_rating(mut self, rating: f64) -> Self {
        self.min_rating = Some(rating);
        self
    }

    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// True when no constraint is active.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }

    fn keeps(&self, movie: &Movie) -> bool {
        self.year.map_or(true, |y| movie.year == y)
            && self.min_rating.map_or(true, |r| movie.rating >= r)
            && self.genre.as_deref().map_or(true, |g| movie.genre == g)
    }

    /// Applies the criteria to `movies`, returning references into the input.
    pub fn apply<'a>(&self, movies: &'a [Movie]) -> Vec<&'a Movie> {
        let filtered: Vec<&Movie> = movies.iter().filter(|m| self.keeps(m)).collect();

        let query = self.title.to_lowercase();
        if query.is_empty() {
            return filtered;
        }

        let exact = filtered
            .iter()
            .enumerate()
            .filter(|(_, m)| m.title.to_lowercase() == query);
        let partial = filtered
            .iter()
            .enumerate()
            .filter(|(_, m)| m.title.to_lowercase().contains(&query));

        let mut seen: HashSet<usize> = HashSet::new();
        exact
            .chain(partial)
            .filter(|(idx, _)| seen.insert(*idx))
            .map(|(_, m)| *m)
            .collect()
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.is_empty() {
            "(any)"
        } else {
            self.title.as_str()
        };
        write!(f, "title: {title} | year: ")?;
        match self.year {
            Some(y) => write!(f, "{y}")?,
            None => write!(f, "{ALL}")?,
        }
        write!(f, " | rating: ")?;
        match self.min_rating {
            Some(r) => write!(f, ">= {r}")?,
            None => write!(f, "{ALL}")?,
        }
        write!(f, " | genre: {}", self.genre.as_deref().unwrap_or(ALL))
    }
}

fn is_all(input: &str) -> bool {
    let input = input.trim();
    input.is_empty() || input.eq_ignore_ascii_case(ALL)
}

/// Parses the year selector: `All` or a year within [`YEAR_RANGE`].
pub fn parse_year(input: &str) -> Result<Option<i32>, FinderError> {
    if is_all(input) {
        return Ok(None);
    }
    let year: i32 = input
        .trim()
        .parse()
        .map_err(|_| FinderError::InvalidRequest(format!("\"{}\" is not a year", input.trim())))?;
    if !YEAR_RANGE.contains(&year) {
        return Err(FinderError::InvalidRequest(format!(
            "year must be between {} and {}",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )));
    }
    Ok(Some(year))
}

/// Parses the minimum-rating selector: `All` or a number between 0 and 10.
pub fn parse_rating(input: &str) -> Result<Option<f64>, FinderError> {
    if is_all(input) {
        return Ok(None);
    }
    let rating: f64 = input.trim().parse().map_err(|_| {
        FinderError::InvalidRequest(format!("\"{}\" is not a rating", input.trim()))
    })?;
    if !(0.0..=MAX_RATING).contains(&rating) {
        return Err(FinderError::InvalidRequest(
            "rating must be between 0 and 10".to_string(),
        ));
    }
    Ok(Some(rating))
}

/// Parses the genre selector. Any name is accepted; an unknown genre simply matches nothing.
pub fn parse_genre(input: &str) -> Option<String> {
    if is_all(input) {
        None
    } else {
        Some(input.trim().to_string())
    }
}
