//! Field extraction from recognized speech.
//!
//! The session layer hands a finished transcript to an [`Extractor`] and
//! gets back a partial [`IntakeRecord`]. The production implementation
//! talks to the Gemini API; tests script a mock.

mod gemini;
mod prompt;
mod response;

pub use gemini::GeminiExtractor;
pub use prompt::build_prompt;
pub use response::parse_extraction;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::IntakeRecord;

/// Turns a transcript into a partial intake record.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract whatever fields the transcript clearly mentions.
    ///
    /// Fails with [`IntakeError::EmptySpeech`](crate::error::IntakeError)
    /// when the transcript is blank, and with `Service`/`Format` errors
    /// when the extraction service misbehaves.
    async fn extract(&self, transcript: &str) -> Result<IntakeRecord>;
}

/// A scripted extractor for session tests.
#[cfg(test)]
pub struct MockExtractor {
    replies: std::sync::Mutex<std::collections::VecDeque<Result<IntakeRecord>>>,
    pub calls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockExtractor {
    pub fn new(replies: Vec<Result<IntakeRecord>>) -> Self {
        Self {
            replies: std::sync::Mutex::new(replies.into_iter().collect()),
            calls: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn returning(record: IntakeRecord) -> Self {
        Self::new(vec![Ok(record)])
    }
}

#[cfg(test)]
#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, transcript: &str) -> Result<IntakeRecord> {
        self.calls.lock().unwrap().push(transcript.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(IntakeRecord::default()))
    }
}
