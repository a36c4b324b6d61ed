//! Cooking session state
//!
//! Defines the mutable state of one session and the serialisable status
//! snapshot handed to the UI boundary.

use serde::{Deserialize, Serialize};

use crate::timer::TimerState;

/// Mutable state of one cooking session.
///
/// The pause, listening, speech and fullscreen axes are orthogonal: any
/// combination is valid and each is toggled independently of navigation.
///
/// Invariant: `current_step` and `current_ingredient` always index into
/// the session's recipe; boundary moves clamp instead of overflowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Current step index (0-based)
    pub current_step: usize,
    /// Current ingredient index (0-based)
    pub current_ingredient: usize,
    /// Whether the session is paused
    pub is_paused: bool,
    /// Whether continuous recognition is wanted
    pub is_listening: bool,
    /// Whether spoken feedback is produced
    pub is_speech_enabled: bool,
    /// Whether the UI is (or should be) fullscreen
    pub is_fullscreen: bool,
    /// Whether the ingredients panel is visible
    pub show_ingredients: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_step: 0,
            current_ingredient: 0,
            is_paused: false,
            is_listening: false,
            is_speech_enabled: true,
            is_fullscreen: false,
            show_ingredients: false,
        }
    }
}

/// Serialisable session snapshot for the UI boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    /// Title of the recipe being cooked
    pub recipe_title: String,
    /// Current step index (0-based)
    pub current_step: usize,
    /// Total number of steps
    pub total_steps: usize,
    /// Text of the current step
    pub step_text: String,
    /// Current ingredient index (0-based)
    pub current_ingredient: usize,
    /// Total number of ingredients
    pub total_ingredients: usize,
    pub is_paused: bool,
    pub is_listening: bool,
    pub is_speech_enabled: bool,
    pub is_fullscreen: bool,
    pub show_ingredients: bool,
    /// Active countdown, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerState>,
    /// Remaining time formatted as "M:SS", if a countdown is active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_display: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let state = SessionState::default();
        assert_eq!(state.current_step, 0);
        assert_eq!(state.current_ingredient, 0);
        assert!(!state.is_paused);
        assert!(!state.is_listening);
        assert!(state.is_speech_enabled);
        assert!(!state.is_fullscreen);
        assert!(!state.show_ingredients);
    }

    #[test]
    fn test_status_serialisation_skips_empty_timer() {
        let status = SessionStatus {
            recipe_title: "Pancakes".to_string(),
            current_step: 0,
            total_steps: 3,
            step_text: "Mix the batter.".to_string(),
            current_ingredient: 0,
            total_ingredients: 2,
            is_paused: false,
            is_listening: true,
            is_speech_enabled: true,
            is_fullscreen: false,
            show_ingredients: false,
            timer: None,
            timer_display: None,
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(!json.contains("\"timer\""));

        let deserialised: SessionStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialised.recipe_title, "Pancakes");
        assert!(deserialised.is_listening);
    }
}
