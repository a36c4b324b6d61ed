//! Voice command grammar
//!
//! Maps a raw speech transcript to a typed session action. Matching is
//! deliberately literal: lowercased substring containment plus a handful
//! of fixed numeric patterns. No stemming, no fuzzy matching: a
//! transcript either hits a rule or it is ignored as ambient noise.
//!
//! Rules are evaluated top to bottom and the first match wins. The order
//! is load-bearing because some phrases are substrings of others
//! ("last step" must resolve to a step command before the ingredient
//! rules are consulted). Spoken numbers are 1-based and are translated to
//! 0-based indices here.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// "go to step 3" / "show step 3" / "jump to step 3"
static GO_TO_STEP_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:go to|show|jump to) step (\d+)").unwrap());

/// "read ingredient 2" / "what is ingredient 2" / "tell me about ingredient 2"
static READ_INGREDIENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:read|what is|tell me about) ingredient (\d+)").unwrap());

/// "set timer for 5 minutes" / "start timer 5"
static START_TIMER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:set|start) timer (?:for )?(\d+)(?: minutes?)?").unwrap());

/// A typed session command.
///
/// Constructed by [`parse`] from a transcript, or directly by UI button
/// events, which bypass parsing but share the same application path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    NextStep,
    PreviousStep,
    /// Jump to a step (0-based, already bounds-validated by the parser)
    GoToStep { step: usize },
    ReadStep,
    NextIngredient,
    PreviousIngredient,
    ListIngredients,
    /// Read one ingredient (0-based, already bounds-validated by the parser)
    ReadIngredient { ingredient: usize },
    /// Start a countdown for the given number of minutes
    StartTimer { minutes: u32 },
    StopTimer,
    ToggleFullscreen,
    Exit,
}

/// What a numeric capture was targeting, for out-of-range feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Step,
    Ingredient,
}

impl TargetKind {
    /// Noun used in spoken/displayed notices.
    pub fn noun(&self) -> &'static str {
        match self {
            TargetKind::Step => "step",
            TargetKind::Ingredient => "ingredient",
        }
    }
}

/// Result of interpreting one transcript.
///
/// "No rule matched" and "number out of bounds" are expected outcomes of
/// noisy speech input, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A rule matched and produced a valid action
    Command(Action),
    /// A numeric rule matched but the 1-based target exceeds the recipe
    OutOfRange {
        kind: TargetKind,
        requested: usize,
        max: usize,
    },
    /// No rule matched; the transcript is silently ignored
    NoMatch,
}

/// Recipe bounds the parser validates numeric targets against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    pub total_steps: usize,
    pub total_ingredients: usize,
}

/// True if the transcript contains any of the given phrases.
fn contains_any(transcript: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| transcript.contains(phrase))
}

/// Bounds-check a 1-based spoken target and translate it to a 0-based index.
fn resolve_target(kind: TargetKind, capture: &str, max: usize) -> ParseOutcome {
    // A capture too large for usize is indistinguishable from misheard
    // noise; treat it like any other non-matching transcript.
    let Ok(requested) = capture.parse::<usize>() else {
        return ParseOutcome::NoMatch;
    };

    if requested >= 1 && requested <= max {
        let index = requested - 1;
        match kind {
            TargetKind::Step => ParseOutcome::Command(Action::GoToStep { step: index }),
            TargetKind::Ingredient => {
                ParseOutcome::Command(Action::ReadIngredient { ingredient: index })
            }
        }
    } else {
        ParseOutcome::OutOfRange {
            kind,
            requested,
            max,
        }
    }
}

/// Interpret one transcript against the fixed grammar.
///
/// Pure function: deterministic for a given transcript and context, no
/// side effects. Input is trimmed and lowercased before matching.
pub fn parse(transcript: &str, ctx: &CommandContext) -> ParseOutcome {
    let transcript = transcript.trim().to_lowercase();
    if transcript.is_empty() {
        return ParseOutcome::NoMatch;
    }

    // Step navigation
    if contains_any(&transcript, &["next step", "go forward"]) {
        return ParseOutcome::Command(Action::NextStep);
    }
    if contains_any(&transcript, &["previous step", "go back", "last step"]) {
        return ParseOutcome::Command(Action::PreviousStep);
    }
    if let Some(captures) = GO_TO_STEP_PATTERN.captures(&transcript) {
        return resolve_target(TargetKind::Step, &captures[1], ctx.total_steps);
    }
    if contains_any(&transcript, &["read step", "repeat step", "what does it say"]) {
        return ParseOutcome::Command(Action::ReadStep);
    }

    // Ingredients
    if contains_any(&transcript, &["next ingredient", "following ingredient"]) {
        return ParseOutcome::Command(Action::NextIngredient);
    }
    if contains_any(&transcript, &["previous ingredient", "last ingredient"]) {
        return ParseOutcome::Command(Action::PreviousIngredient);
    }
    if contains_any(
        &transcript,
        &["list ingredients", "what ingredients", "show ingredients"],
    ) {
        return ParseOutcome::Command(Action::ListIngredients);
    }
    if let Some(captures) = READ_INGREDIENT_PATTERN.captures(&transcript) {
        return resolve_target(TargetKind::Ingredient, &captures[1], ctx.total_ingredients);
    }

    // Timer
    if let Some(captures) = START_TIMER_PATTERN.captures(&transcript) {
        return match captures[1].parse::<u32>() {
            Ok(minutes) => ParseOutcome::Command(Action::StartTimer { minutes }),
            Err(_) => ParseOutcome::NoMatch,
        };
    }
    if contains_any(&transcript, &["stop timer", "cancel timer", "end timer"]) {
        return ParseOutcome::Command(Action::StopTimer);
    }

    // Session
    if contains_any(&transcript, &["fullscreen", "full screen"]) {
        return ParseOutcome::Command(Action::ToggleFullscreen);
    }
    if contains_any(&transcript, &["exit", "close", "quit"]) {
        return ParseOutcome::Command(Action::Exit);
    }

    ParseOutcome::NoMatch
}
