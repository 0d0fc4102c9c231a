//! Event handlers behind the front-end.
//!
//! [`App`] owns the catalog, the session state and both remote clients. Each
//! user action maps to one method; the front-end only renders what they return.

use crate::{
    assistant::Assistant,
    error::FinderError,
    filter::{self, FilterCriteria},
    movie::{Movie, MovieCatalog},
    session::Session,
    speech::{Audio, Speaker},
};

/// Number of genres shown as trending.
pub const TRENDING_COUNT: usize = 3;

/// Warning shown when a search matches nothing.
pub const NOT_FOUND_WARNING: &str = "Movie not found — not released or missing from dataset.";

/// Result of a submitted search.
#[derive(Debug, PartialEq)]
pub enum SearchOutcome<'a> {
    Found(Vec<&'a Movie>),
    NotFound,
}

impl<'a> SearchOutcome<'a> {
    pub fn from_matches(movies: Vec<&'a Movie>) -> Self {
        if movies.is_empty() {
            SearchOutcome::NotFound
        } else {
            SearchOutcome::Found(movies)
        }
    }

    pub fn movies(&self) -> &[&'a Movie] {
        match self {
            SearchOutcome::Found(movies) => movies,
            SearchOutcome::NotFound => &[],
        }
    }

    /// One-line status for the outcome.
    pub fn message(&self) -> String {
        match self {
            SearchOutcome::Found(movies) => format!("Found {} movie(s)", movies.len()),
            SearchOutcome::NotFound => NOT_FOUND_WARNING.to_string(),
        }
    }
}

pub struct App {
    catalog: MovieCatalog,
    session: Session,
    assistant: Assistant,
    speaker: Speaker,
}

impl App {
    pub fn new(catalog: MovieCatalog, assistant: Assistant, speaker: Speaker) -> Self {
        Self {
            catalog,
            session: Session::new(),
            assistant,
            speaker,
        }
    }

    pub fn catalog(&self) -> &MovieCatalog {
        &self.catalog
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Draft form values, not yet submitted.
    pub fn draft(&self) -> &FilterCriteria {
        &self.session.draft
    }

    pub fn set_title(&mut self, title: &str) {
        self.session.draft.title = title.trim().to_string();
    }

    /// Sets the draft year from selector text ("All" or a year in range).
    pub fn set_year(&mut self, input: &str) -> Result<(), FinderError> {
        self.session.draft.year = filter::parse_year(input)?;
        Ok(())
    }

    /// Sets the draft rating floor from selector text ("All" or 0 to 10).
    pub fn set_rating(&mut self, input: &str) -> Result<(), FinderError> {
        self.session.draft.min_rating = filter::parse_rating(input)?;
        Ok(())
    }

    /// Sets the draft genre. Only genres present in the dataset are accepted.
    pub fn set_genre(&mut self, input: &str) -> Result<(), FinderError> {
        let genre = filter::parse_genre(input);
        if let Some(name) = &genre {
            if !self.catalog.genres().iter().any(|g| g == name) {
                return Err(FinderError::InvalidRequest(format!(
                    "Unknown genre: {name}"
                )));
            }
        }
        self.session.draft.genre = genre;
        Ok(())
    }

    /// Commits the draft form and runs the filter over the whole catalog.
    pub fn search(&mut self) -> SearchOutcome<'_> {
        self.session.clear_error();
        let criteria = self.session.submit().clone();
        log::debug!("search: {criteria}");
        SearchOutcome::from_matches(criteria.apply(self.catalog.movies()))
    }

    /// Resets every filter field and the held reply.
    pub fn clear(&mut self) {
        self.session.reset();
    }

    /// Most frequent genres of the whole dataset.
    pub fn trending(&self) -> Vec<String> {
        self.catalog.trending_genres(TRENDING_COUNT)
    }

    /// Asks the assistant, streaming fragments to `on_fragment`.
    ///
    /// The reply is stored only once the stream completes. A blank prompt
    /// leaves the session untouched; a remote failure is recorded and the
    /// previous reply kept.
    pub async fn ask<F>(&mut self, prompt: &str, on_fragment: F) -> Result<&str, FinderError>
    where
        F: FnMut(&str),
    {
        match self.assistant.ask(prompt, on_fragment).await {
            Ok(reply) => {
                self.session.set_reply(reply);
                Ok(&self.session.reply)
            }
            Err(e) => {
                if !e.is_validation() {
                    self.session.record_error(&e);
                }
                Err(e)
            }
        }
    }

    /// Speaks the held reply, or the placeholder when there is none.
    pub async fn speak(&mut self) -> Result<Audio, FinderError> {
        let result = self.speaker.speak(self.session.reply()).await;
        match &result {
            Ok(_) => self.session.clear_error(),
            Err(e) => self.session.record_error(e),
        }
        result
    }
}
