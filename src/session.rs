//! The intake session state machine.
//!
//! One session covers one caller: capture rounds accumulate into a single
//! record, the operator reviews between rounds, and submission is gated
//! on completeness. State transitions are strict; an operation issued in
//! the wrong state fails without side effects, so a stale button press or
//! a double event cannot corrupt the record.

use tracing::{debug, info};

use crate::capture::CaptureSource;
use crate::error::{IntakeError, Result};
use crate::extract::Extractor;
use crate::schema::{IntakeRecord, missing_fields};

/// Where a session currently is.
///
/// ```text
/// Idle -> Recording -> Processing -> Reviewing -> Submitted
///   ^                      |             |
///   |                      v             v
///   +----(empty round)-----+        Recording (another round)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing captured yet, microphone released.
    Idle,
    /// Microphone held, fragments accumulating.
    Recording,
    /// Microphone released, extraction in flight.
    Processing,
    /// At least one round merged, operator reviewing.
    Reviewing,
    /// Record handed off; the session is finished.
    Submitted,
}

/// A single caller's intake session.
pub struct IntakeSession<C: CaptureSource, E: Extractor> {
    state: SessionState,
    capture: C,
    extractor: E,
    record: IntakeRecord,
    settled: Vec<String>,
    interim: Option<String>,
}

impl<C: CaptureSource, E: Extractor> IntakeSession<C, E> {
    pub fn new(capture: C, extractor: E) -> Self {
        Self {
            state: SessionState::Idle,
            capture,
            extractor,
            record: IntakeRecord::default(),
            settled: Vec::new(),
            interim: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The record accumulated so far.
    pub fn record(&self) -> &IntakeRecord {
        &self.record
    }

    /// The extractor this session was built with.
    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Required fields still absent, in canonical order.
    pub fn missing(&self) -> Vec<&'static str> {
        missing_fields(&self.record)
    }

    /// Begin a capture round. Allowed from `Idle` and `Reviewing` only;
    /// in particular a round cannot start while an extraction is still in
    /// flight, which is what keeps merges serialized.
    pub fn start_recording(&mut self) -> Result<()> {
        match self.state {
            SessionState::Idle | SessionState::Reviewing => {}
            other => {
                return Err(IntakeError::InvalidState {
                    message: format!("cannot start recording while {:?}", other),
                });
            }
        }

        self.settled.clear();
        self.interim = None;
        self.capture.start()?;
        self.state = SessionState::Recording;
        debug!("capture round started");
        Ok(())
    }

    /// Drain fragments that arrived since the last call. Settled text
    /// accumulates; an interim fragment replaces the previous interim.
    pub fn pump(&mut self) {
        while let Some(fragment) = self.capture.try_next_fragment() {
            if fragment.is_final {
                self.settled.push(fragment.text);
                self.interim = None;
            } else {
                self.interim = Some(fragment.text);
            }
        }
    }

    /// The transcript as it stands, including any unsettled tail. Meant
    /// for live display during a round.
    pub fn live_transcript(&mut self) -> String {
        self.pump();
        let mut parts: Vec<&str> = self.settled.iter().map(String::as_str).collect();
        if let Some(interim) = &self.interim {
            parts.push(interim);
        }
        parts.join(" ")
    }

    fn take_transcript(&mut self) -> String {
        self.pump();
        let mut parts = std::mem::take(&mut self.settled);
        // The recognizer may never settle the last fragment before stop;
        // dropping it would lose the caller's final words.
        if let Some(interim) = self.interim.take() {
            parts.push(interim);
        }
        parts.join(" ")
    }

    /// Where to land when a round produces nothing to merge.
    fn review_or_idle(&self) -> SessionState {
        if self.record.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Reviewing
        }
    }

    /// End the round: release the microphone, extract, merge.
    ///
    /// The microphone is released whatever else happens. An empty round
    /// is not an error; the session just returns to where it was. An
    /// extraction failure also returns the session to where it was, with
    /// the accumulated record untouched.
    pub async fn stop_and_extract(&mut self) -> Result<()> {
        if self.state != SessionState::Recording {
            return Err(IntakeError::InvalidState {
                message: format!("cannot stop while {:?}", self.state),
            });
        }

        self.state = SessionState::Processing;
        self.capture.stop()?;
        let transcript = self.take_transcript();

        if transcript.trim().is_empty() {
            debug!("round produced no speech, skipping extraction");
            self.state = self.review_or_idle();
            return Ok(());
        }

        match self.extractor.extract(&transcript).await {
            Ok(partial) => {
                self.record.merge(partial);
                self.state = SessionState::Reviewing;
                info!(missing = self.missing().len(), "extraction merged");
                Ok(())
            }
            Err(e) => {
                self.state = self.review_or_idle();
                Err(e)
            }
        }
    }

    /// Hand off the record. Refused until every required field is filled.
    pub fn submit(&mut self) -> Result<IntakeRecord> {
        if self.state != SessionState::Reviewing {
            return Err(IntakeError::InvalidState {
                message: format!("cannot submit while {:?}", self.state),
            });
        }

        let missing = self.missing();
        if !missing.is_empty() {
            return Err(IntakeError::IncompleteRecord {
                missing: missing.into_iter().map(String::from).collect(),
            });
        }

        self.state = SessionState::Submitted;
        info!("record submitted");
        Ok(self.record.clone())
    }

    /// Throw the session away and start over: microphone released,
    /// record and transcript cleared.
    pub fn reset(&mut self) {
        if self.capture.is_active() {
            let _ = self.capture.stop();
        }
        self.record = IntakeRecord::default();
        self.settled.clear();
        self.interim = None;
        self.state = SessionState::Idle;
        debug!("session reset");
    }
}

impl<C: CaptureSource, E: Extractor> Drop for IntakeSession<C, E> {
    fn drop(&mut self) {
        // An abandoned session must not keep holding the microphone.
        if self.capture.is_active() {
            let _ = self.capture.stop();
        }
    }
}
