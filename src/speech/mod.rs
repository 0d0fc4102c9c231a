//! Speech playback of the assistant's reply.
//!
//! Every call converts the text afresh; nothing is cached.

use std::path::{Path, PathBuf};

use crate::{error::FinderError, LLMProvider};

/// Spoken when there is no reply to read out yet.
pub const PLACEHOLDER: &str = "No response yet. Ask me something first.";

/// Encoded audio returned by a speech backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Audio {
    /// Encoded audio bytes
    pub bytes: Vec<u8>,
    /// Container extension, e.g. "mp3"
    pub extension: &'static str,
}

impl Audio {
    /// Writes the audio next to `path`, swapping in the container's extension.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<PathBuf, FinderError> {
        let path = path.as_ref().with_extension(self.extension);
        std::fs::write(&path, &self.bytes)?;
        log::debug!("wrote {} bytes of audio to {}", self.bytes.len(), path.display());
        Ok(path)
    }

    /// Plays the audio on the default output device and blocks until it ends.
    #[cfg(feature = "rodio")]
    pub fn play(&self) -> Result<(), FinderError> {
        use rodio::{Decoder, OutputStream, Sink};

        let (_stream, stream_handle) =
            OutputStream::try_default().map_err(|e| FinderError::Generic(e.to_string()))?;
        let sink = Sink::try_new(&stream_handle).map_err(|e| FinderError::Generic(e.to_string()))?;
        let source = Decoder::new(std::io::Cursor::new(self.bytes.clone()))
            .map_err(|e| FinderError::Generic(format!("cannot decode audio: {e}")))?;
        sink.append(source);
        sink.sleep_until_end();
        Ok(())
    }
}

pub struct Speaker {
    provider: Box<dyn LLMProvider>,
}

impl Speaker {
    pub fn new(provider: Box<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// The text to speak: the reply, or [`PLACEHOLDER`] when there is none.
    pub fn text_for(reply: Option<&str>) -> &str {
        match reply {
            Some(text) if !text.trim().is_empty() => text,
            _ => PLACEHOLDER,
        }
    }

    /// Converts the reply (or the placeholder) to audio.
    pub async fn speak(&self, reply: Option<&str>) -> Result<Audio, FinderError> {
        let text = Self::text_for(reply);
        let bytes = self.provider.speech(text).await.map_err(|e| {
            log::warn!("speech synthesis failed: {e}");
            e
        })?;
        Ok(Audio {
            bytes,
            extension: self.provider.audio_extension(),
        })
    }
}
