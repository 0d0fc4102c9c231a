#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use futures::stream;
use movie_finder::{
    async_trait,
    chat::{ChatMessage, ChatProvider, ChatStream},
    error::FinderError,
    movie::{Movie, MovieCatalog},
    tts::TextToSpeechProvider,
    LLMProvider,
};

pub fn sample_catalog() -> MovieCatalog {
    MovieCatalog::new(vec![
        Movie::new("Inception", 2010, "Sci-Fi", 8.8, "Dreams within dreams"),
        Movie::new("Parasite", 2019, "Thriller", 8.5, "A family infiltrates a household"),
        Movie::new("Interstellar", 2014, "Sci-Fi", 8.6, "Space travel through a wormhole"),
        Movie::new("Joker", 2019, "Drama", 8.4, "A failed comedian"),
        Movie::new("Arrival", 2016, "Sci-Fi", 7.9, "Linguist meets aliens"),
        Movie::new("Tenet", 2020, "Thriller", 7.3, "Time inversion"),
        Movie::new("Heat", 1995, "Crime", 8.3, "Cops and robbers in LA"),
    ])
}

type Script = Vec<Result<String, String>>;

fn script(fragments: &[&str]) -> Script {
    fragments.iter().map(|f| Ok(f.to_string())).collect()
}

/// Chat provider that replays scripted fragments, one script per call.
/// The last script repeats. `Err` entries fail the stream.
#[derive(Clone, Default)]
pub struct MockChat {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    pub calls: Arc<AtomicUsize>,
    pub last_messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl MockChat {
    pub fn replying(fragments: &[&str]) -> Self {
        let mock = Self::default();
        mock.scripts.lock().unwrap().push_back(script(fragments));
        mock
    }

    pub fn failing_after(fragments: &[&str], error: &str) -> Self {
        Self::default().then_failing_after(fragments, error)
    }

    /// Queues a script whose stream fails after `fragments`.
    pub fn then_failing_after(self, fragments: &[&str], error: &str) -> Self {
        let mut failing = script(fragments);
        failing.push(Err(error.to_string()));
        self.scripts.lock().unwrap().push_back(failing);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatProvider for MockChat {
    async fn chat_stream(&self, messages: &[ChatMessage]) -> Result<ChatStream, FinderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        let current = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.len() > 1 {
                scripts.pop_front().unwrap_or_default()
            } else {
                scripts.front().cloned().unwrap_or_default()
            }
        };
        let items: Vec<Result<String, FinderError>> = current
            .into_iter()
            .map(|f| f.map_err(FinderError::HttpError))
            .collect();
        Ok(Box::pin(stream::iter(items)))
    }
}

impl TextToSpeechProvider for MockChat {}

impl LLMProvider for MockChat {}

/// Speech provider that echoes the text back as bytes.
#[derive(Clone, Default)]
pub struct MockSpeech {
    pub fail: bool,
    pub calls: Arc<AtomicUsize>,
    pub last_text: Arc<Mutex<Option<String>>>,
}

impl MockSpeech {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_text(&self) -> Option<String> {
        self.last_text.lock().unwrap().clone()
    }
}

impl ChatProvider for MockSpeech {}

#[async_trait]
impl TextToSpeechProvider for MockSpeech {
    async fn speech(&self, text: &str) -> Result<Vec<u8>, FinderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_text.lock().unwrap() = Some(text.to_string());
        if self.fail {
            return Err(FinderError::HttpError("speech service unavailable".into()));
        }
        Ok(text.as_bytes().to_vec())
    }
}

impl LLMProvider for MockSpeech {}
