//! Default configuration constants for rapidvoice.
//!
//! This module provides shared constants used across the intake pipeline
//! to ensure consistency and eliminate duplication.

/// Default Generative Language API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default extraction model name.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Sampling temperature for extraction requests.
///
/// Kept low so the model produces focused, deterministic field extraction
/// rather than creative paraphrase.
pub const TEMPERATURE: f64 = 0.1;

/// Top-k sampling cutoff for extraction requests. 1 = greedy decoding.
pub const TOP_K: u32 = 1;

/// Top-p (nucleus) sampling cutoff for extraction requests.
pub const TOP_P: f64 = 1.0;

/// Maximum tokens the extraction service may emit per reply.
pub const MAX_OUTPUT_TOKENS: u32 = 2048;

/// Default timeout for extraction requests, in seconds.
///
/// The service imposes its own limits; this only bounds how long the
/// session stays in Processing when the transport hangs.
pub const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Filler tokens stripped from transcripts before extraction.
///
/// Matched case-insensitively at word boundaries. "you know" is a
/// two-word phrase and must be listed before its single-word prefix
/// candidates would shadow it; the normalizer matches longest-first.
pub const FILLER_TOKENS: &[&str] = &[
    "you know",
    "yeah",
    "like",
    "oh",
    "um",
    "uh",
    "ah",
    "er",
];

/// Environment variable carrying the extraction API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Environment variable overriding the extraction model.
pub const MODEL_ENV: &str = "RAPIDVOICE_MODEL";

/// Environment variable overriding the extraction endpoint.
pub const BASE_URL_ENV: &str = "RAPIDVOICE_BASE_URL";
