//! Scripted chat assistant
//!
//! - `intent` - ordered regex rules mapping text to an [`Intent`]
//! - `knowledge` - canned response pools with injectable random picks
//! - `engine` - reply pacing state machine (thinking delay, follow-ups)

pub mod engine;
pub mod intent;
pub mod knowledge;

pub use engine::{ChatEngine, ChatPhase, Reply, Scheduled, Submission, Ticket};
pub use intent::{Intent, IntentClassifier};
pub use knowledge::KnowledgeBase;
