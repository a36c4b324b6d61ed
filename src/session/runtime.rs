//! Session event loop
//!
//! Serialises the asynchronous event sources (recognised transcripts,
//! direct UI actions, timer ticks, recognition lifecycle events) onto a
//! single queue with one consumer. Every controller mutation happens on
//! that consumer, so `apply` calls never interleave and the session state
//! needs no lock.
//!
//! The one-second timer schedule runs on a real thread, but its ticks are
//! marshalled back onto the queue as events and stamped with the
//! generation they were scheduled for; the controller discards stale
//! ones. The runtime restarts or stops the ticker after each event so
//! exactly one schedule exists whenever a countdown is running.

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use uuid::Uuid;

use crate::command::Action;
use crate::config::Config;
use crate::recipe::Recipe;
use crate::speech::{RecognitionSupervisor, SpeechRecognizer, SpeechSynthesizer, SynthesisCoordinator};

use super::controller::{Effect, NoticeLevel, SessionController};

/// UI-side boundary driven by session effects.
pub trait SessionBoundary {
    /// Show a toast/notice.
    fn notify(&self, message: &str, level: NoticeLevel);

    /// Ask the host to enter fullscreen.
    fn request_fullscreen(&self) -> Result<(), String>;

    /// Ask the host to leave fullscreen.
    fn exit_fullscreen(&self) -> Result<(), String>;

    /// The session is over; dismiss the cooking view.
    fn close_session(&self);
}

/// An event consumed by the session loop.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// One recognised utterance from the recognition engine.
    Transcript { text: String, confidence: f32 },
    /// A direct UI interaction, bypassing the interpreter but applied
    /// through the same path.
    Ui(Action),
    /// One second elapsed on the ticker for the given timer generation.
    TimerTick { generation: u64 },
    /// The recognition engine ended on its own.
    RecognitionEnded,
    /// The recognition engine reported an error.
    RecognitionError { message: String },
    /// The synthesis engine finished the utterance with this token.
    UtteranceEnded { id: Uuid },
    /// UI toggle: pause/resume the session.
    SetPaused(bool),
    /// UI toggle: spoken feedback on/off.
    SetSpeechEnabled(bool),
    /// UI toggle: voice control on/off.
    SetListening(bool),
    /// External teardown (e.g. the cooking view unmounted).
    Shutdown,
}

/// Cloneable handle for submitting boundary events to the session loop.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    events: Sender<SessionEvent>,
}

impl SessionHandle {
    /// Deliver one recognised transcript.
    pub fn transcript(&self, text: impl Into<String>, confidence: f32) {
        self.send(SessionEvent::Transcript {
            text: text.into(),
            confidence,
        });
    }

    /// Deliver a direct UI action.
    pub fn ui_action(&self, action: Action) {
        self.send(SessionEvent::Ui(action));
    }

    /// The recognition engine ended on its own.
    pub fn recognition_ended(&self) {
        self.send(SessionEvent::RecognitionEnded);
    }

    /// The recognition engine failed.
    pub fn recognition_error(&self, message: impl Into<String>) {
        self.send(SessionEvent::RecognitionError {
            message: message.into(),
        });
    }

    /// The synthesis engine finished an utterance.
    pub fn utterance_ended(&self, id: Uuid) {
        self.send(SessionEvent::UtteranceEnded { id });
    }

    pub fn set_paused(&self, paused: bool) {
        self.send(SessionEvent::SetPaused(paused));
    }

    pub fn set_speech_enabled(&self, enabled: bool) {
        self.send(SessionEvent::SetSpeechEnabled(enabled));
    }

    pub fn set_listening(&self, listening: bool) {
        self.send(SessionEvent::SetListening(listening));
    }

    /// Tear the session down.
    pub fn shutdown(&self) {
        self.send(SessionEvent::Shutdown);
    }

    fn send(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Session loop has exited, dropping event");
        }
    }
}

/// Recurring one-second schedule feeding tick events onto the queue.
struct Ticker {
    generation: u64,
    stop: Sender<()>,
    thread: JoinHandle<()>,
}

impl Ticker {
    fn spawn(events: Sender<SessionEvent>, generation: u64) -> Self {
        // Capacity 1 so stopping never blocks, even if the thread has
        // already exited.
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let thread = thread::spawn(move || {
            let ticks = crossbeam_channel::tick(Duration::from_secs(1));
            loop {
                select! {
                    recv(stop_rx) -> _ => break,
                    recv(ticks) -> _ => {
                        if events.send(SessionEvent::TimerTick { generation }).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        tracing::debug!("Ticker started for timer generation {}", generation);
        Self {
            generation,
            stop: stop_tx,
            thread,
        }
    }

    fn stop(self) {
        let _ = self.stop.send(());
        let _ = self.thread.join();
        tracing::debug!("Ticker stopped for timer generation {}", self.generation);
    }
}

/// Owns the controller, the speech orchestration and the event queue for
/// one cooking session.
pub struct SessionRuntime<S, R, B>
where
    S: SpeechSynthesizer,
    R: SpeechRecognizer,
    B: SessionBoundary,
{
    controller: SessionController,
    synthesis: SynthesisCoordinator<S>,
    recognition: RecognitionSupervisor<R>,
    boundary: B,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    ticker: Option<Ticker>,
}

impl<S, R, B> SessionRuntime<S, R, B>
where
    S: SpeechSynthesizer,
    R: SpeechRecognizer,
    B: SessionBoundary,
{
    /// Creates a runtime for one recipe session with default settings.
    pub fn new(recipe: Recipe, synthesizer: S, recognizer: R, boundary: B) -> Self {
        Self::with_config(recipe, &Config::default(), synthesizer, recognizer, boundary)
    }

    /// Creates a runtime configured from persisted settings.
    pub fn with_config(
        recipe: Recipe,
        config: &Config,
        synthesizer: S,
        recognizer: R,
        boundary: B,
    ) -> Self {
        let (events_tx, events_rx) = unbounded();
        Self {
            controller: SessionController::with_speech_enabled(recipe, config.speech.enabled),
            synthesis: SynthesisCoordinator::with_rate(synthesizer, config.speech.rate),
            recognition: RecognitionSupervisor::with_auto_restart(
                recognizer,
                config.recognition.auto_restart,
            ),
            boundary,
            events_tx,
            events_rx,
            ticker: None,
        }
    }

    /// Handle for submitting events from the boundary callbacks.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            events: self.events_tx.clone(),
        }
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    /// Start listening and consume events until the session closes.
    pub fn run(&mut self) {
        self.start_listening();
        // Hold only this receiver clone so events_tx stays alive for
        // handles created later.
        let events = self.events_rx.clone();
        while let Ok(event) = events.recv() {
            if self.handle_event(event) {
                break;
            }
        }
    }

    /// Process a single event. Returns true once the session has closed.
    pub fn handle_event(&mut self, event: SessionEvent) -> bool {
        let effects = match event {
            SessionEvent::Transcript { text, confidence } => {
                tracing::debug!("Transcript ({:.2}): {:?}", confidence, text);
                self.controller.handle_transcript(&text)
            }
            SessionEvent::Ui(action) => self.controller.apply(action),
            SessionEvent::TimerTick { generation } => self.controller.handle_tick(generation),
            SessionEvent::RecognitionEnded => match self.recognition.on_recognition_end() {
                Ok(restarted) => {
                    if restarted {
                        Vec::new()
                    } else {
                        self.controller.set_listening(false)
                    }
                }
                Err(message) => self.recognition_failed(&message),
            },
            SessionEvent::RecognitionError { message } => self.recognition_failed(&message),
            SessionEvent::UtteranceEnded { id } => {
                self.synthesis.on_utterance_end(id);
                Vec::new()
            }
            SessionEvent::SetPaused(paused) => self.controller.set_paused(paused),
            SessionEvent::SetSpeechEnabled(enabled) => {
                if !enabled {
                    self.synthesis.cancel();
                }
                self.controller.set_speech_enabled(enabled)
            }
            SessionEvent::SetListening(true) => {
                self.start_listening();
                Vec::new()
            }
            SessionEvent::SetListening(false) => {
                self.recognition.stop_listening();
                self.controller.set_listening(false)
            }
            SessionEvent::Shutdown => {
                self.controller.release();
                self.teardown();
                return true;
            }
        };

        let closed = self.dispatch(effects);
        if !closed {
            self.sync_ticker();
        }
        closed
    }

    /// Start continuous recognition via the supervisor.
    fn start_listening(&mut self) {
        match self.recognition.start_listening() {
            Ok(()) => {
                let _ = self.controller.set_listening(true);
            }
            Err(message) => {
                let effects = self.recognition_failed(&message);
                self.dispatch(effects);
            }
        }
    }

    fn recognition_failed(&mut self, message: &str) -> Vec<Effect> {
        self.recognition.on_recognition_error(message);
        let mut effects = self.controller.set_listening(false);
        effects.push(Effect::Notify {
            message: format!("Voice control stopped: {}", message),
            level: NoticeLevel::Error,
        });
        effects
    }

    /// Execute effects in order. Returns true if the session closed.
    fn dispatch(&mut self, effects: Vec<Effect>) -> bool {
        for effect in effects {
            match effect {
                Effect::Speak { text } => {
                    if self.controller.state().is_speech_enabled {
                        self.synthesis.speak(text);
                    } else {
                        tracing::debug!("Speech disabled, skipping utterance");
                    }
                }
                Effect::Notify { message, level } => self.boundary.notify(&message, level),
                Effect::RequestFullscreen => {
                    if let Err(error) = self.boundary.request_fullscreen() {
                        // Flag already flipped; the UI falls back to CSS fullscreen
                        tracing::warn!("Fullscreen request failed: {}", error);
                        self.boundary
                            .notify("Fullscreen is not available", NoticeLevel::Error);
                    }
                }
                Effect::ExitFullscreen => {
                    if let Err(error) = self.boundary.exit_fullscreen() {
                        tracing::warn!("Fullscreen exit failed: {}", error);
                    }
                }
                Effect::CloseSession => {
                    self.teardown();
                    return true;
                }
            }
        }
        false
    }

    /// Teardown order: ticker/timer first, then recognition, then
    /// synthesis, then the boundary close. Prevents a late tick,
    /// transcript or utterance from touching a session that no longer
    /// exists.
    fn teardown(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if self.recognition.should_listen() {
            self.recognition.stop_listening();
        }
        self.synthesis.cancel();
        self.boundary.close_session();
        tracing::info!("Session closed");
    }

    /// Keep exactly one ticker tracking the controller's current timer
    /// generation.
    fn sync_ticker(&mut self) {
        let current = self.controller.timer_generation();
        if current == self.ticker.as_ref().map(|ticker| ticker.generation) {
            return;
        }
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
        if let Some(generation) = current {
            self.ticker = Some(Ticker::spawn(self.events_tx.clone(), generation));
        }
    }
}
