//! End-to-end session tests for souschef.
//!
//! Drives complete cooking sessions through the runtime event loop with
//! fake speech and UI boundaries, verifying the spoken feedback, the
//! clamp-at-boundary navigation policy and the teardown ordering.

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;

use souschef::command::Action;
use souschef::recipe::{Ingredient, Recipe};
use souschef::session::{NoticeLevel, SessionBoundary, SessionRuntime};
use souschef::speech::{SpeechRecognizer, SpeechSynthesizer, Utterance};

// =============================================================================
// Boundary fakes
// =============================================================================

/// Shared log of every boundary call, in order.
type CallLog = Arc<Mutex<Vec<String>>>;

struct FakeSynthesizer {
    log: CallLog,
}

impl SpeechSynthesizer for FakeSynthesizer {
    fn speak(&self, utterance: &Utterance) {
        self.log.lock().push(format!("speak:{}", utterance.text));
    }

    fn cancel(&self) {
        self.log.lock().push("synth.cancel".to_string());
    }
}

struct FakeRecognizer {
    log: CallLog,
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(&self) -> Result<(), String> {
        self.log.lock().push("recognizer.start".to_string());
        Ok(())
    }

    fn abort(&self) {
        self.log.lock().push("recognizer.abort".to_string());
    }
}

struct FakeBoundary {
    log: CallLog,
}

impl SessionBoundary for FakeBoundary {
    fn notify(&self, message: &str, level: NoticeLevel) {
        self.log.lock().push(format!("notify[{:?}]:{}", level, message));
    }

    fn request_fullscreen(&self) -> Result<(), String> {
        self.log.lock().push("fullscreen.request".to_string());
        Ok(())
    }

    fn exit_fullscreen(&self) -> Result<(), String> {
        self.log.lock().push("fullscreen.exit".to_string());
        Ok(())
    }

    fn close_session(&self) {
        self.log.lock().push("boundary.close".to_string());
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn ingredient(name: &str, quantity: &str, unit: &str) -> Ingredient {
    Ingredient {
        name: name.to_string(),
        quantity: Some(quantity.to_string()),
        unit: Some(unit.to_string()),
    }
}

fn pancake_recipe() -> Recipe {
    Recipe {
        title: "Pancakes".to_string(),
        steps: vec![
            "Mix the batter.".to_string(),
            "Heat the pan.".to_string(),
            "Cook until golden.".to_string(),
        ],
        ingredients: vec![
            ingredient("flour", "2", "cups"),
            ingredient("milk", "1", "cup"),
        ],
    }
}

fn build_runtime(
    recipe: Recipe,
) -> (
    SessionRuntime<FakeSynthesizer, FakeRecognizer, FakeBoundary>,
    CallLog,
) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let runtime = SessionRuntime::new(
        recipe,
        FakeSynthesizer {
            log: Arc::clone(&log),
        },
        FakeRecognizer {
            log: Arc::clone(&log),
        },
        FakeBoundary {
            log: Arc::clone(&log),
        },
    );
    (runtime, log)
}

/// Run a scripted session: start the loop, feed transcripts in order,
/// close with an Exit UI action, and return the full boundary log.
fn run_scripted(recipe: Recipe, transcripts: &[&str]) -> Vec<String> {
    let (mut runtime, log) = build_runtime(recipe);
    let handle = runtime.handle();

    for transcript in transcripts {
        handle.transcript(*transcript, 0.9);
    }
    handle.ui_action(Action::Exit);

    let worker = thread::spawn(move || runtime.run());
    worker.join().expect("session loop panicked");

    let log = log.lock().clone();
    log
}

fn spoken(log: &[String]) -> Vec<&str> {
    log.iter()
        .filter_map(|call| call.strip_prefix("speak:"))
        .collect()
}

// =============================================================================
// Scripted sessions
// =============================================================================

#[test]
fn test_three_nexts_clamp_then_read_speaks_final_step() {
    // Three steps: visiting 1, 2, then clamped at 2; read speaks step 3
    let log = run_scripted(
        pancake_recipe(),
        &["next step", "next step", "next step", "read step"],
    );

    assert_eq!(
        spoken(&log),
        vec![
            "Heat the pan.",
            "Cook until golden.",
            "You've reached the end of the recipe. Enjoy your meal!",
            "Cook until golden.",
        ]
    );
}

#[test]
fn test_previous_step_at_floor_is_idempotent() {
    let log = run_scripted(pancake_recipe(), &["previous step", "go back"]);

    assert_eq!(
        spoken(&log),
        vec![
            "You're already at the first step.",
            "You're already at the first step.",
        ]
    );
}

#[test]
fn test_go_to_step_and_out_of_range_notice() {
    let log = run_scripted(pancake_recipe(), &["go to step 3", "go to step 9"]);

    assert_eq!(spoken(&log), vec!["Cook until golden."]);
    assert!(log
        .iter()
        .any(|call| call == "notify[Error]:step 9 is out of range. There are 3 steps."));
}

#[test]
fn test_ingredient_walkthrough() {
    let log = run_scripted(
        pancake_recipe(),
        &[
            "list ingredients",
            "next ingredient",
            "next ingredient",
            "previous ingredient",
        ],
    );

    assert_eq!(
        spoken(&log),
        vec![
            "Ingredient 1: flour, 2 cups. Ingredient 2: milk, 1 cup.",
            "Ingredient 2: milk, 1 cup",
            "You've reached the last ingredient.",
            "Ingredient 1: flour, 2 cups",
        ]
    );
}

#[test]
fn test_noise_between_commands_is_ignored() {
    let log = run_scripted(
        pancake_recipe(),
        &[
            "next step",
            "hey did you preheat the oven",
            "",
            "read step",
        ],
    );

    assert_eq!(spoken(&log), vec!["Heat the pan.", "Heat the pan."]);
}

#[test]
fn test_timer_set_and_stop_via_voice() {
    let log = run_scripted(
        pancake_recipe(),
        &["set timer for 5 minutes", "stop timer"],
    );

    assert_eq!(
        spoken(&log),
        vec!["Timer set for 5 minutes and 0 seconds.", "Timer stopped."]
    );
    assert!(log.iter().any(|call| call == "notify[Info]:Timer set for 5:00"));
    assert!(log.iter().any(|call| call == "notify[Info]:Timer stopped"));
}

#[test]
fn test_fullscreen_round_trip() {
    let log = run_scripted(pancake_recipe(), &["fullscreen", "full screen please"]);

    let requests: Vec<&str> = log
        .iter()
        .filter(|call| call.starts_with("fullscreen."))
        .map(String::as_str)
        .collect();
    assert_eq!(requests, vec!["fullscreen.request", "fullscreen.exit"]);
}

// =============================================================================
// Lifecycle and teardown
// =============================================================================

#[test]
fn test_session_starts_listening_and_closes_once() {
    let log = run_scripted(pancake_recipe(), &[]);

    assert_eq!(log.first().map(String::as_str), Some("recognizer.start"));
    let closes = log.iter().filter(|call| *call == "boundary.close").count();
    assert_eq!(closes, 1);
}

#[test]
fn test_exit_transcript_closes_the_session() {
    let log = run_scripted(pancake_recipe(), &["exit cooking mode"]);

    assert_eq!(log.last().map(String::as_str), Some("boundary.close"));
}

#[test]
fn test_teardown_aborts_recognition_before_close() {
    let log = run_scripted(pancake_recipe(), &["read step"]);

    let abort = log
        .iter()
        .position(|call| call == "recognizer.abort")
        .expect("recognition must be aborted on close");
    let close = log
        .iter()
        .position(|call| call == "boundary.close")
        .expect("boundary must be closed");
    assert!(abort < close);

    // The in-flight "read step" utterance is cancelled between the two
    let cancel = log
        .iter()
        .position(|call| call == "synth.cancel")
        .expect("in-flight speech must be cancelled on close");
    assert!(abort < cancel && cancel < close);
}

#[test]
fn test_recognition_end_restarts_until_error() {
    let (mut runtime, log) = build_runtime(pancake_recipe());
    let handle = runtime.handle();

    handle.set_listening(true);
    handle.recognition_ended();
    handle.recognition_error("microphone lost");
    handle.recognition_ended();
    handle.shutdown();

    let worker = thread::spawn(move || runtime.run());
    worker.join().expect("session loop panicked");

    // run() starts once, the explicit toggle restarts, the engine end
    // restarts again; after the error no further start happens
    let starts = log
        .lock()
        .iter()
        .filter(|call| *call == "recognizer.start")
        .count();
    assert_eq!(starts, 3);
    assert!(log
        .lock()
        .iter()
        .any(|call| call.contains("Voice control stopped: microphone lost")));
}

#[test]
fn test_speech_toggle_mutes_and_unmutes() {
    let (mut runtime, log) = build_runtime(pancake_recipe());
    let handle = runtime.handle();

    handle.set_speech_enabled(false);
    handle.transcript("read step", 0.95);
    handle.set_speech_enabled(true);
    handle.transcript("read step", 0.95);
    handle.shutdown();

    let worker = thread::spawn(move || runtime.run());
    worker.join().expect("session loop panicked");

    assert_eq!(spoken(&log.lock()), vec!["Mix the batter."]);
}
