#[cfg(feature = "groq")]
pub mod groq;

#[cfg(feature = "openai")]
pub mod openai;

#[cfg(feature = "google_translate")]
pub mod google_translate;
