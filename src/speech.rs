//! Speech I/O boundary
//!
//! The recognition and synthesis engines live outside this crate (they
//! are browser- or OS-provided). This module defines the traits the
//! session runtime drives, plus the two orchestration pieces the core
//! owns:
//!
//! - **Synthesis** is single-utterance with cancel-then-speak semantics:
//!   there is no queue, a new request always preempts the in-flight one.
//!   Each request mints a token; a completion callback carrying a stale
//!   token is ignored, so a late callback from a preempted utterance
//!   cannot clear the current one.
//! - **Recognition** is continuous. The engine sometimes ends on its own;
//!   the supervisor restarts it as long as listening is still wanted. An
//!   engine error disables listening and is surfaced once, with no
//!   automatic retry.

use uuid::Uuid;

/// Fixed speaking rate, slightly below natural for clarity.
pub const SPEECH_RATE: f32 = 0.9;

/// One synthesis request.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    /// Token identifying this request in completion callbacks
    pub id: Uuid,
    /// Text to speak
    pub text: String,
    /// Speaking rate (1.0 is natural)
    pub rate: f32,
}

/// Single-utterance speech synthesis engine.
pub trait SpeechSynthesizer {
    /// Begin speaking. The coordinator has already cancelled any
    /// previously requested utterance.
    fn speak(&self, utterance: &Utterance);

    /// Cancel the in-flight utterance, if any.
    fn cancel(&self);
}

/// Continuous speech recognition engine.
pub trait SpeechRecognizer {
    /// Start continuous recognition. Results are delivered to the
    /// session as transcript events.
    fn start(&self) -> Result<(), String>;

    /// Abort recognition. No further results are delivered.
    fn abort(&self);
}

/// Cancel-then-speak orchestration over a [`SpeechSynthesizer`].
///
/// At most one utterance is pending at any time; the last request wins.
#[derive(Debug)]
pub struct SynthesisCoordinator<S> {
    engine: S,
    rate: f32,
    current: Option<Uuid>,
}

impl<S: SpeechSynthesizer> SynthesisCoordinator<S> {
    /// Creates a coordinator speaking at the default rate.
    pub fn new(engine: S) -> Self {
        Self::with_rate(engine, SPEECH_RATE)
    }

    /// Creates a coordinator with a configured speaking rate.
    pub fn with_rate(engine: S, rate: f32) -> Self {
        Self {
            engine,
            rate,
            current: None,
        }
    }

    /// Cancel any in-flight utterance, then speak `text`.
    ///
    /// Returns the token identifying the new utterance.
    pub fn speak(&mut self, text: impl Into<String>) -> Uuid {
        if self.current.take().is_some() {
            self.engine.cancel();
        }

        let utterance = Utterance {
            id: Uuid::new_v4(),
            text: text.into(),
            rate: self.rate,
        };
        self.current = Some(utterance.id);

        tracing::debug!("Speaking utterance {}: {:?}", utterance.id, utterance.text);
        self.engine.speak(&utterance);
        utterance.id
    }

    /// Engine callback: the utterance with the given token finished.
    ///
    /// A stale token (from a preempted utterance) is ignored.
    pub fn on_utterance_end(&mut self, id: Uuid) {
        if self.current == Some(id) {
            self.current = None;
        } else {
            tracing::debug!("Ignoring completion of stale utterance {}", id);
        }
    }

    /// Cancel the in-flight utterance, if any.
    pub fn cancel(&mut self) {
        if self.current.take().is_some() {
            self.engine.cancel();
        }
    }

    /// Whether an utterance is currently pending.
    pub fn is_speaking(&self) -> bool {
        self.current.is_some()
    }
}

/// Continuous-listening supervisor over a [`SpeechRecognizer`].
#[derive(Debug)]
pub struct RecognitionSupervisor<R> {
    engine: R,
    should_listen: bool,
    auto_restart: bool,
}

impl<R: SpeechRecognizer> RecognitionSupervisor<R> {
    pub fn new(engine: R) -> Self {
        Self::with_auto_restart(engine, true)
    }

    /// Creates a supervisor with the restart-on-engine-end behaviour
    /// configured.
    pub fn with_auto_restart(engine: R, auto_restart: bool) -> Self {
        Self {
            engine,
            should_listen: false,
            auto_restart,
        }
    }

    /// Start continuous recognition and keep it running across
    /// engine-initiated ends.
    pub fn start_listening(&mut self) -> Result<(), String> {
        self.should_listen = true;
        self.engine.start()
    }

    /// Deliberately stop recognition; a subsequent engine end event will
    /// not trigger a restart.
    pub fn stop_listening(&mut self) {
        self.should_listen = false;
        self.engine.abort();
    }

    /// Engine-initiated end. Restarts recognition only while listening
    /// is still wanted; returns whether a restart happened.
    pub fn on_recognition_end(&mut self) -> Result<bool, String> {
        if !self.should_listen || !self.auto_restart {
            return Ok(false);
        }
        tracing::debug!("Recognition ended while listening, restarting");
        self.engine.start()?;
        Ok(true)
    }

    /// Engine error: listening is disabled and not retried.
    pub fn on_recognition_error(&mut self, message: &str) {
        tracing::warn!("Recognition error, listening disabled: {}", message);
        self.should_listen = false;
    }

    /// Whether the supervisor wants recognition running.
    pub fn should_listen(&self) -> bool {
        self.should_listen
    }
}
