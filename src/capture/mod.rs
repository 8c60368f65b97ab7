//! Speech capture sources.
//!
//! A capture source owns the microphone for the duration of one capture
//! round and hands back recognized text as fragments. The session layer
//! only sees the [`CaptureSource`] trait, so the real recognizer and the
//! test mock are interchangeable.

use crossbeam_channel::{Receiver, Sender, TryRecvError, unbounded};

use crate::error::{IntakeError, Result};

/// One piece of recognized speech from an active capture round.
///
/// Interim fragments are provisional and may be revised by a later
/// fragment; final fragments are settled text that should be appended to
/// the round's transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
}

impl TranscriptFragment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }

    pub fn settled(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }
}

/// A source of recognized speech.
///
/// Start and stop are idempotent from the session's point of view: the
/// session guarantees it never starts an already active source, and
/// always stops the source on every exit path, including abandonment.
pub trait CaptureSource: Send {
    /// Acquire the microphone and begin recognition.
    fn start(&mut self) -> Result<()>;

    /// Release the microphone. Fragments already queued remain readable.
    fn stop(&mut self) -> Result<()>;

    /// Next fragment, if one is ready. Non-blocking.
    fn try_next_fragment(&mut self) -> Option<TranscriptFragment>;

    /// Whether the source currently holds the microphone.
    fn is_active(&self) -> bool;
}

/// Sends fragments into a [`ChannelCaptureSource`] from the recognizer
/// side.
#[derive(Debug, Clone)]
pub struct FragmentSender {
    tx: Sender<TranscriptFragment>,
}

impl FragmentSender {
    /// Queue a fragment. Silently drops once the source is gone; a
    /// recognizer outliving its session has nowhere to deliver to.
    pub fn send(&self, fragment: TranscriptFragment) {
        let _ = self.tx.send(fragment);
    }
}

/// A capture source fed by an external recognizer over a channel.
///
/// The recognizer keeps a [`FragmentSender`] and pushes fragments as it
/// produces them; the session drains them between state checks.
pub struct ChannelCaptureSource {
    rx: Receiver<TranscriptFragment>,
    device: Option<String>,
    active: bool,
}

impl ChannelCaptureSource {
    /// Create a source and the sender that feeds it.
    pub fn new(device: Option<String>) -> (Self, FragmentSender) {
        let (tx, rx) = unbounded();
        (
            Self {
                rx,
                device,
                active: false,
            },
            FragmentSender { tx },
        )
    }

    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }
}

impl CaptureSource for ChannelCaptureSource {
    fn start(&mut self) -> Result<()> {
        if self.active {
            return Err(IntakeError::Capture {
                message: "capture already in progress".to_string(),
            });
        }
        self.active = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.active = false;
        Ok(())
    }

    fn try_next_fragment(&mut self) -> Option<TranscriptFragment> {
        match self.rx.try_recv() {
            Ok(fragment) => Some(fragment),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// A scripted capture source for tests. Each start delivers the next
/// round's fragments; fragments stay drainable after stop, like the
/// channel-backed source.
#[cfg(test)]
pub struct MockCaptureSource {
    rounds: std::collections::VecDeque<Vec<TranscriptFragment>>,
    current: std::collections::VecDeque<TranscriptFragment>,
    fail_start: Option<String>,
    pub starts: usize,
    pub stops: usize,
    active: bool,
}

#[cfg(test)]
impl MockCaptureSource {
    /// A source scripting a single capture round.
    pub fn new(fragments: Vec<TranscriptFragment>) -> Self {
        Self::with_rounds(vec![fragments])
    }

    /// A source scripting several rounds in order. Starts past the end
    /// of the script yield empty rounds.
    pub fn with_rounds(rounds: Vec<Vec<TranscriptFragment>>) -> Self {
        Self {
            rounds: rounds.into_iter().collect(),
            current: std::collections::VecDeque::new(),
            fail_start: None,
            starts: 0,
            stops: 0,
            active: false,
        }
    }

    /// A source whose start always fails with the given message.
    pub fn failing(message: &str) -> Self {
        let mut mock = Self::with_rounds(Vec::new());
        mock.fail_start = Some(message.to_string());
        mock
    }
}

#[cfg(test)]
impl CaptureSource for MockCaptureSource {
    fn start(&mut self) -> Result<()> {
        if let Some(message) = &self.fail_start {
            return Err(IntakeError::Capture {
                message: message.clone(),
            });
        }
        self.starts += 1;
        self.active = true;
        self.current = self.rounds.pop_front().unwrap_or_default().into();
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.stops += 1;
        self.active = false;
        Ok(())
    }

    fn try_next_fragment(&mut self) -> Option<TranscriptFragment> {
        self.current.pop_front()
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
