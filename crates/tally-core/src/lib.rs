//! Tally Core Library
//!
//! Budget planner and scripted chat assistant:
//! - Currency formatting and input sanitization
//! - Budget aggregation and savings goal progress
//! - Expense analysis against a recommended allocation
//! - Rule-based intent classification with canned responses
//! - Chat pacing state machine
//! - Snapshot persistence over pluggable key-value backends
//! - Session wiring the above to a presenter

pub mod analysis;
pub mod budget;
pub mod chat;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod models;
pub mod random;
pub mod savings;
pub mod session;
pub mod store;

/// Test utilities including a recording presenter
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use analysis::{analyze, AllocationStatus, Analysis, AnalysisReport, Guidance, SavingsVerdict};
pub use budget::{aggregate, chart_slices, BalanceStatus, BudgetSummary};
pub use chat::{ChatEngine, ChatPhase, Intent, IntentClassifier, KnowledgeBase, Reply, Submission, Ticket};
pub use config::{ChatSettings, Settings, StorageSettings};
pub use error::{Error, Result};
pub use format::{format_currency, format_percent, format_whole};
pub use input::{input_feedback, parse_amount, sanitize, FeedbackLevel, FieldKind, InputFeedback, Sanitized};
pub use models::{BudgetInput, Category, ChatMessage, Expenses, Sender, Severity, Theme};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
pub use savings::{evaluate, SavingsProgress, SavingsTier};
pub use session::{Calculation, ChatWindow, NullPresenter, Presenter, Session};
pub use store::{BudgetStore, FileStore, KeyValueStore, MemoryStore, PersistedState};
