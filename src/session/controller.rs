//! Session controller
//!
//! Owns the session state and the countdown timer, and applies typed
//! actions as bounded state transitions. Every transition returns the
//! ordered list of effects the boundary must execute; the state mutation
//! always happens before the effects describing it are produced.
//!
//! Boundary policy: index moves clamp at the recipe edges and produce a
//! spoken or visual notice instead of erroring. In a hands-free,
//! eyes-off interaction a misheard number must never crash or strand the
//! session.

use serde::{Deserialize, Serialize};

use crate::command::{self, Action, CommandContext, ParseOutcome};
use crate::recipe::Recipe;
use crate::timer::{self, CountdownTimer, TickOutcome, TimerState};

use super::state::{SessionState, SessionStatus};

/// Spoken when NextStep is applied on the final step.
pub const END_OF_RECIPE: &str = "You've reached the end of the recipe. Enjoy your meal!";
/// Spoken when PreviousStep is applied on the first step.
pub const AT_FIRST_STEP: &str = "You're already at the first step.";
/// Spoken when NextIngredient is applied on the final ingredient.
pub const AT_LAST_INGREDIENT: &str = "You've reached the last ingredient.";
/// Spoken when PreviousIngredient is applied on the first ingredient.
pub const AT_FIRST_INGREDIENT: &str = "You're already at the first ingredient.";
/// Spoken when the countdown completes.
pub const TIMER_COMPLETE: &str = "Timer complete!";
/// Spoken when a running countdown is stopped.
pub const TIMER_STOPPED: &str = "Timer stopped.";

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A side-effecting request emitted by the controller and executed by
/// the UI/speech boundary.
///
/// Effects from a single transition are ordered and fire-and-forget; the
/// controller never waits on their completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Speak text aloud (skipped by the boundary while speech is off)
    Speak { text: String },
    /// Show a toast/notice
    Notify { message: String, level: NoticeLevel },
    /// Ask the UI to enter fullscreen
    RequestFullscreen,
    /// Ask the UI to leave fullscreen
    ExitFullscreen,
    /// Tear the session down
    CloseSession,
}

impl Effect {
    fn speak(text: impl Into<String>) -> Self {
        Effect::Speak { text: text.into() }
    }

    fn notify(message: impl Into<String>, level: NoticeLevel) -> Self {
        Effect::Notify {
            message: message.into(),
            level,
        }
    }
}

/// State machine for one cooking session.
pub struct SessionController {
    recipe: Recipe,
    state: SessionState,
    timer: CountdownTimer,
}

impl SessionController {
    /// Creates a controller positioned at the first step of `recipe`.
    pub fn new(recipe: Recipe) -> Self {
        tracing::info!(
            "Cooking session started: {:?} ({} steps, {} ingredients)",
            recipe.title,
            recipe.step_count(),
            recipe.ingredient_count()
        );
        Self {
            recipe,
            state: SessionState::default(),
            timer: CountdownTimer::new(),
        }
    }

    /// Creates a controller with the speech axis preset from config.
    pub fn with_speech_enabled(recipe: Recipe, speech_enabled: bool) -> Self {
        let mut controller = Self::new(recipe);
        controller.state.is_speech_enabled = speech_enabled;
        controller
    }

    pub fn recipe(&self) -> &Recipe {
        &self.recipe
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Bounds context for the command interpreter.
    pub fn command_context(&self) -> CommandContext {
        CommandContext {
            total_steps: self.recipe.step_count(),
            total_ingredients: self.recipe.ingredient_count(),
        }
    }

    /// Generation of the running countdown, if any.
    pub fn timer_generation(&self) -> Option<u64> {
        self.timer.generation()
    }

    /// Parse one transcript and apply the outcome.
    pub fn handle_transcript(&mut self, transcript: &str) -> Vec<Effect> {
        let outcome = command::parse(transcript, &self.command_context());
        self.apply_outcome(outcome)
    }

    /// Apply a parse outcome.
    ///
    /// NoMatch is silently ignored; ambient noise is expected and
    /// frequent. OutOfRange produces a notice and no state change.
    pub fn apply_outcome(&mut self, outcome: ParseOutcome) -> Vec<Effect> {
        match outcome {
            ParseOutcome::Command(action) => self.apply(action),
            ParseOutcome::OutOfRange {
                kind,
                requested,
                max,
            } => {
                tracing::debug!(
                    "Rejected out-of-range {}: {} of {}",
                    kind.noun(),
                    requested,
                    max
                );
                vec![Effect::notify(
                    format!(
                        "{} {} is out of range. There are {} {}s.",
                        kind.noun(),
                        requested,
                        max,
                        kind.noun()
                    ),
                    NoticeLevel::Error,
                )]
            }
            ParseOutcome::NoMatch => Vec::new(),
        }
    }

    /// Apply one action, returning the ordered effects it produced.
    pub fn apply(&mut self, action: Action) -> Vec<Effect> {
        tracing::debug!("Applying action: {:?}", action);
        match action {
            Action::NextStep => self.next_step(),
            Action::PreviousStep => self.previous_step(),
            Action::GoToStep { step } => self.go_to_step(step),
            Action::ReadStep => self.read_step(),
            Action::NextIngredient => self.next_ingredient(),
            Action::PreviousIngredient => self.previous_ingredient(),
            Action::ListIngredients => self.list_ingredients(),
            Action::ReadIngredient { ingredient } => self.read_ingredient(ingredient),
            Action::StartTimer { minutes } => self.start_timer(minutes),
            Action::StopTimer => self.stop_timer(),
            Action::ToggleFullscreen => self.toggle_fullscreen(),
            Action::Exit => self.exit(),
        }
    }

    /// Feed one timer tick. Stale ticks produce no effects; completion
    /// produces the spoken and visual completion notices exactly once.
    pub fn handle_tick(&mut self, generation: u64) -> Vec<Effect> {
        match self.timer.tick(generation) {
            TickOutcome::Stale => Vec::new(),
            TickOutcome::Running { remaining_seconds } => {
                tracing::trace!("Timer tick: {} remaining", timer::format_clock(remaining_seconds));
                Vec::new()
            }
            TickOutcome::Completed { .. } => vec![
                Effect::speak(TIMER_COMPLETE),
                Effect::notify("Timer complete", NoticeLevel::Success),
            ],
        }
    }

    /// Pause or resume the session. Independent of navigation.
    pub fn set_paused(&mut self, paused: bool) -> Vec<Effect> {
        if self.state.is_paused == paused {
            return Vec::new();
        }
        self.state.is_paused = paused;
        let message = if paused {
            "Session paused"
        } else {
            "Session resumed"
        };
        tracing::info!("{}", message);
        vec![Effect::notify(message, NoticeLevel::Info)]
    }

    /// Record whether continuous recognition is wanted.
    pub fn set_listening(&mut self, listening: bool) -> Vec<Effect> {
        if self.state.is_listening != listening {
            self.state.is_listening = listening;
            tracing::info!(
                "Voice control {}",
                if listening { "listening" } else { "silent" }
            );
        }
        Vec::new()
    }

    /// Enable or disable spoken feedback.
    pub fn set_speech_enabled(&mut self, enabled: bool) -> Vec<Effect> {
        if self.state.is_speech_enabled != enabled {
            self.state.is_speech_enabled = enabled;
            tracing::info!("Speech {}", if enabled { "enabled" } else { "disabled" });
        }
        Vec::new()
    }

    /// Release session resources without emitting effects.
    ///
    /// Used by external teardown (unmount); the Exit action path calls
    /// this too before emitting CloseSession.
    pub fn release(&mut self) {
        self.timer.cancel();
        self.state.is_listening = false;
    }

    /// Serialisable snapshot for the UI boundary.
    pub fn status(&self) -> SessionStatus {
        let timer: Option<TimerState> = self.timer.state();
        SessionStatus {
            recipe_title: self.recipe.title.clone(),
            current_step: self.state.current_step,
            total_steps: self.recipe.step_count(),
            step_text: self
                .recipe
                .step_text(self.state.current_step)
                .unwrap_or_default()
                .to_string(),
            current_ingredient: self.state.current_ingredient,
            total_ingredients: self.recipe.ingredient_count(),
            is_paused: self.state.is_paused,
            is_listening: self.state.is_listening,
            is_speech_enabled: self.state.is_speech_enabled,
            is_fullscreen: self.state.is_fullscreen,
            show_ingredients: self.state.show_ingredients,
            timer,
            timer_display: timer.map(|t| timer::format_clock(t.remaining_seconds)),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn speak_current_step(&self) -> Effect {
        Effect::speak(
            self.recipe
                .step_text(self.state.current_step)
                .unwrap_or_default(),
        )
    }

    fn speak_current_ingredient(&self) -> Effect {
        Effect::speak(
            self.recipe
                .spoken_ingredient(self.state.current_ingredient)
                .unwrap_or_default(),
        )
    }

    fn next_step(&mut self) -> Vec<Effect> {
        let last = self.recipe.step_count().saturating_sub(1);
        if self.state.current_step < last {
            self.state.current_step += 1;
            vec![self.speak_current_step()]
        } else {
            vec![Effect::speak(END_OF_RECIPE)]
        }
    }

    fn previous_step(&mut self) -> Vec<Effect> {
        if self.state.current_step > 0 {
            self.state.current_step -= 1;
            vec![self.speak_current_step()]
        } else {
            vec![Effect::speak(AT_FIRST_STEP)]
        }
    }

    fn go_to_step(&mut self, step: usize) -> Vec<Effect> {
        // The interpreter bounds-validated the index; clamp anyway so a
        // direct UI action can never break the invariant.
        let last = self.recipe.step_count().saturating_sub(1);
        self.state.current_step = step.min(last);
        vec![self.speak_current_step()]
    }

    fn read_step(&mut self) -> Vec<Effect> {
        vec![self.speak_current_step()]
    }

    fn next_ingredient(&mut self) -> Vec<Effect> {
        self.state.show_ingredients = true;
        let last = self.recipe.ingredient_count().saturating_sub(1);
        if self.state.current_ingredient < last {
            self.state.current_ingredient += 1;
            vec![self.speak_current_ingredient()]
        } else {
            vec![Effect::speak(AT_LAST_INGREDIENT)]
        }
    }

    fn previous_ingredient(&mut self) -> Vec<Effect> {
        self.state.show_ingredients = true;
        if self.state.current_ingredient > 0 {
            self.state.current_ingredient -= 1;
            vec![self.speak_current_ingredient()]
        } else {
            vec![Effect::speak(AT_FIRST_INGREDIENT)]
        }
    }

    fn list_ingredients(&mut self) -> Vec<Effect> {
        self.state.show_ingredients = true;
        vec![Effect::speak(self.recipe.spoken_ingredient_list())]
    }

    fn read_ingredient(&mut self, ingredient: usize) -> Vec<Effect> {
        self.state.show_ingredients = true;
        let last = self.recipe.ingredient_count().saturating_sub(1);
        self.state.current_ingredient = ingredient.min(last);
        vec![self.speak_current_ingredient()]
    }

    fn start_timer(&mut self, minutes: u32) -> Vec<Effect> {
        if minutes == 0 {
            return vec![Effect::notify(
                "Timer length must be at least 1 minute.",
                NoticeLevel::Error,
            )];
        }

        let seconds = minutes.saturating_mul(60);
        self.timer.start(seconds);
        vec![
            Effect::speak(format!("Timer set for {}.", timer::spoken_duration(seconds))),
            Effect::notify(
                format!("Timer set for {}", timer::format_clock(seconds)),
                NoticeLevel::Info,
            ),
        ]
    }

    fn stop_timer(&mut self) -> Vec<Effect> {
        if self.timer.cancel() {
            vec![
                Effect::speak(TIMER_STOPPED),
                Effect::notify("Timer stopped", NoticeLevel::Info),
            ]
        } else {
            vec![Effect::notify("No timer is running.", NoticeLevel::Info)]
        }
    }

    fn toggle_fullscreen(&mut self) -> Vec<Effect> {
        // The flag flips regardless of whether the boundary request
        // succeeds; the UI falls back to a CSS-level fullscreen.
        self.state.is_fullscreen = !self.state.is_fullscreen;
        if self.state.is_fullscreen {
            vec![Effect::RequestFullscreen]
        } else {
            vec![Effect::ExitFullscreen]
        }
    }

    fn exit(&mut self) -> Vec<Effect> {
        tracing::info!("Cooking session closing: {:?}", self.recipe.title);
        self.release();
        vec![Effect::CloseSession]
    }
}
