//! Hands-free cooking session
//!
//! A session is the live cooking-mode interaction over one recipe. The
//! user narrates commands while their hands are busy; the session
//! advances through steps and ingredients, manages a countdown timer,
//! and speaks feedback aloud.
//!
//! ## State axes
//!
//! Session state is a set of orthogonal axes rather than a single mode:
//!
//! - **Active / Paused**: toggled independently of navigation
//! - **Listening / Silent**: whether continuous recognition is wanted
//! - **Speech on / off**: whether feedback is spoken
//! - plus the countdown timer sub-state (idle or running)
//!
//! There is no terminal "completed" state: advancing past the last step
//! is a no-op that triggers a congratulatory spoken notice.
//!
//! ## Event flow
//!
//! ```text
//! transcript ──► command::parse ──► ParseOutcome ─┐
//! UI action ─────────────────────────────────────┤
//! timer tick ────────────────────────────────────┼──► SessionController::apply
//! recognition end/error ─────────────────────────┘          │
//!                                                           ▼
//!                                       ordered Effects (speak / notify /
//!                                       fullscreen / close), executed by
//!                                       the UI and speech boundary
//! ```
//!
//! All event sources are serialised onto one queue consumed by
//! [`runtime::SessionRuntime`], so applications of actions never
//! interleave.

pub mod controller;
pub mod runtime;
pub mod state;

pub use controller::{Effect, NoticeLevel, SessionController};
pub use runtime::{SessionBoundary, SessionEvent, SessionHandle, SessionRuntime};
pub use state::{SessionState, SessionStatus};
