//! rapidvoice - Voice-driven disaster relief intake
//!
//! Speech in, a structured intake record out: transcripts are cleaned,
//! sent to an LLM for field extraction, merged into a running record,
//! and gated on completeness before submission.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod schema;
pub mod session;

// Core seams (capture → normalize → extract → merge)
pub use capture::{CaptureSource, ChannelCaptureSource, FragmentSender, TranscriptFragment};
pub use extract::{Extractor, GeminiExtractor};
pub use normalize::normalize;

// Record and completeness
pub use schema::{
    IntakeRecord, NeedsAssessment, REQUIRED_FIELDS, field_label, missing_fields,
};

// Session
pub use session::{IntakeSession, SessionState};

// Error handling
pub use error::{IntakeError, Result};

// Config
pub use config::Config;

/// Build version string with optional git commit hash.
///
/// Returns `"0.3.1+abc1234"` when git hash is available, `"0.3.1"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
