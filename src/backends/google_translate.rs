//! Key-less text-to-speech through the Google Translate speech endpoint.
//!
//! The endpoint accepts at most 100 characters per request, so text is split
//! at sentence ends and word boundaries and the returned MP3 segments are
//! concatenated in order. MP3 frames are self-delimiting, so the joined bytes
//! decode as a single stream.

use crate::chat::{ChatMessage, ChatProvider, ChatStream};
use crate::error::FinderError;
use crate::tts::TextToSpeechProvider;
use crate::LLMProvider;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default endpoint of the Translate speech service.
pub const DEFAULT_BASE_URL: &str = "https://translate.google.com/translate_tts";

/// Default spoken language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Longest text accepted in a single request, in characters.
pub const MAX_CHARS: usize = 100;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Google Translate speech backend
pub struct GoogleTranslate {
    /// Speech endpoint URL
    base_url: String,
    /// Language code, e.g. "en"
    language: String,
    /// Optional timeout duration in seconds
    timeout_seconds: Option<u64>,
    /// HTTP client for making requests
    client: Client,
}

impl GoogleTranslate {
    pub fn new(
        base_url: Option<String>,
        language: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            language: language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            timeout_seconds,
            client: Client::new(),
        }
    }
}

/// Splits `text` into pieces of at most `max_chars` characters.
///
/// Sentence-ending punctuation closes a piece; otherwise words are packed
/// greedily. A single word longer than `max_chars` is cut into slices.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, pieces: &mut Vec<String>| {
        if !current.is_empty() {
            pieces.push(std::mem::take(current));
        }
    };

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            flush(&mut current, &mut pieces);
            let chars: Vec<char> = word.chars().collect();
            for slice in chars.chunks(max_chars) {
                pieces.push(slice.iter().collect());
            }
            continue;
        }

        let current_len = current.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            flush(&mut current, &mut pieces);
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);

        if word.ends_with(['.', '!', '?', ';', ':']) {
            flush(&mut current, &mut pieces);
        }
    }
    flush(&mut current, &mut pieces);
    pieces
}

#[async_trait]
impl TextToSpeechProvider for GoogleTranslate {
    async fn speech(&self, text: &str) -> Result<Vec<u8>, FinderError> {
        let pieces = split_text(text, MAX_CHARS);
        if pieces.is_empty() {
            return Err(FinderError::InvalidRequest("No text to speak".to_string()));
        }

        let total = pieces.len().to_string();
        let mut audio = Vec::new();
        for (idx, piece) in pieces.iter().enumerate() {
            let idx = idx.to_string();
            let textlen = piece.chars().count().to_string();
            let mut req = self
                .client
                .get(&self.base_url)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .header(reqwest::header::REFERER, "https://translate.google.com/")
                .query(&[
                    ("ie", "UTF-8"),
                    ("client", "tw-ob"),
                    ("tl", self.language.as_str()),
                    ("q", piece.as_str()),
                    ("total", total.as_str()),
                    ("idx", idx.as_str()),
                    ("textlen", textlen.as_str()),
                ]);

            if let Some(t) = self.timeout_seconds {
                req = req.timeout(Duration::from_secs(t));
            }

            let resp = req.send().await?;
            log::debug!(
                "Google Translate speech piece {}/{} HTTP status: {}",
                idx,
                total,
                resp.status()
            );
            if !resp.status().is_success() {
                let status = resp.status();
                let error_text = resp.text().await.unwrap_or_default();
                return Err(FinderError::from_status(
                    "Google Translate",
                    status,
                    error_text,
                ));
            }
            audio.extend_from_slice(&resp.bytes().await?);
        }
        Ok(audio)
    }
}

#[async_trait]
impl ChatProvider for GoogleTranslate {
    async fn chat_stream(&self, _messages: &[ChatMessage]) -> Result<ChatStream, FinderError> {
        Err(FinderError::ProviderError(
            "Google Translate is a speech-only backend".to_string(),
        ))
    }
}

impl LLMProvider for GoogleTranslate {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_piece() {
        assert_eq!(split_text("Try Heat", 100), vec!["Try Heat"]);
    }

    #[test]
    fn sentences_become_separate_pieces() {
        assert_eq!(
            split_text("Watch Inception. It is great!", 100),
            vec!["Watch Inception.", "It is great!"]
        );
    }

    #[test]
    fn long_text_respects_the_limit() {
        let text = "word ".repeat(60);
        let pieces = split_text(&text, 20);
        assert!(pieces.iter().all(|p| p.chars().count() <= 20));
        assert_eq!(pieces.join(" "), text.trim_end());
    }

    #[test]
    fn oversized_word_is_sliced() {
        let pieces = split_text(&"a".repeat(25), 10);
        assert_eq!(pieces, vec!["a".repeat(10), "a".repeat(10), "a".repeat(5)]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        let pieces = split_text("été été", 7);
        assert_eq!(pieces, vec!["été été"]);
    }

    #[test]
    fn whitespace_only_yields_nothing() {
        assert!(split_text(" \n\t ", 100).is_empty());
    }

    #[tokio::test]
    async fn blank_text_is_rejected_locally() {
        let tts = GoogleTranslate::new(Some("http://127.0.0.1:9/unused".into()), None, None);
        assert!(matches!(
            tts.speech("   ").await,
            Err(FinderError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn chat_is_not_supported() {
        let tts = GoogleTranslate::new(None, None, None);
        let messages = vec![ChatMessage::user().content("hi").build()];
        assert!(tts.chat_stream(&messages).await.is_err());
    }
}
