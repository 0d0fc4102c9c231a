use crate::error::FinderError;
use async_trait::async_trait;

/// Trait implemented by all text to speech backends
///
/// This trait defines the interface for text-to-speech conversion services.
/// Implementors must provide functionality to convert text into audio data.
#[async_trait]
pub trait TextToSpeechProvider: Send + Sync {
    /// Convert the given text into speech audio
    ///
    /// # Arguments
    ///
    /// * `text` - A string containing the text to convert to speech
    ///
    /// # Returns
    ///
    /// * `Result<Vec<u8>, FinderError>` - On success, returns the encoded audio as bytes.
    ///   On failure, returns a FinderError describing what went wrong.
    #[allow(unused)]
    async fn speech(&self, text: &str) -> Result<Vec<u8>, FinderError> {
        Err(FinderError::ProviderError(
            "This backend does not implement text to speech.".into(),
        ))
    }

    /// File extension matching the audio container returned by [`speech`](Self::speech).
    fn audio_extension(&self) -> &'static str {
        "mp3"
    }
}
