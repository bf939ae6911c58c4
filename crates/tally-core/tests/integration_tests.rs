//! Integration tests for tally-core
//!
//! These tests drive a whole session: edits → recompute → persist → restore,
//! plus the chat pipeline against a file-backed store.

use std::collections::BTreeMap;
use std::fs;

use tally_core::{
    chat::{Intent, KnowledgeBase, Submission},
    models::{Category, ExpenseFields, Sender, Theme},
    random::{ScriptedRandom, SeededRandom},
    store::{BudgetStore, FileStore, KeyValueStore, MemoryStore},
    BudgetSummary, NullPresenter, Presenter, SavingsProgress, Session, Settings, Severity,
};

/// Minimal presenter that remembers the last summary and all notices
#[derive(Default)]
struct Recorder {
    summaries: Vec<BudgetSummary>,
    notices: Vec<String>,
    lines: Vec<String>,
}

impl Presenter for Recorder {
    fn render_summary(&mut self, summary: &BudgetSummary) {
        self.summaries.push(*summary);
    }

    fn render_savings(&mut self, _progress: &SavingsProgress) {}

    fn render_chart(&mut self, _slices: &[(Category, f64)]) {}

    fn notify(&mut self, message: &str, _severity: Severity) {
        self.notices.push(message.to_string());
    }

    fn append_to_transcript(&mut self, message: &tally_core::ChatMessage) {
        self.lines.push(message.text.clone());
    }
}

fn quiet_settings() -> Settings {
    let mut settings = Settings::default();
    settings.chat.follow_up_chance = 0;
    settings
}

fn knowledge() -> KnowledgeBase {
    KnowledgeBase::embedded().expect("embedded responses")
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let store = FileStore::open(&path).unwrap();
        let mut session = Session::new(
            quiet_settings(),
            knowledge(),
            store,
            ScriptedRandom::always(0),
            NullPresenter,
        );
        session.start();
        session.post_welcome();
        session.edit_income("4,000.00");
        session.edit_expense(Category::Rent, "1600");
        session.edit_expense(Category::Food, "");
        session.edit_savings_target("1200");
        session.toggle_theme();
        session.shutdown();
    }

    let store = FileStore::open(&path).unwrap();
    let mut session = Session::new(
        quiet_settings(),
        knowledge(),
        store,
        ScriptedRandom::always(0),
        Recorder::default(),
    );
    assert_eq!(session.start(), None);

    assert_eq!(session.state().income, "4000.00");
    assert_eq!(session.state().expenses.get(Category::Rent), "1600");
    assert_eq!(session.state().expenses.get(Category::Food), "");
    assert_eq!(session.state().savings_target, "1200");
    assert_eq!(session.theme(), Theme::Dark);
    assert_eq!(session.transcript().len(), 1);

    let summary = *session.presenter().summaries.last().unwrap();
    assert_eq!(summary.remaining_balance, 2400.0);
    assert_eq!(session.savings().percentage, 100.0);
}

#[test]
fn test_sixty_sends_keep_fifty_most_recent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let store = FileStore::open(&path).unwrap();
    let mut session = Session::new(
        quiet_settings(),
        knowledge(),
        store,
        ScriptedRandom::always(0),
        NullPresenter,
    );
    for i in 0..60 {
        let ticket = match session.send(&format!("message {}", i)) {
            Submission::Accepted { reply, .. } => reply.ticket,
            other => panic!("send {} not accepted: {:?}", i, other),
        };
        session.deliver_response(ticket).unwrap();
    }
    let sent: Vec<String> = session.transcript().iter().map(|m| m.text.clone()).collect();
    drop(session);

    let reopened = BudgetStore::new(
        FileStore::open(&path).unwrap(),
        &Settings::default().storage,
        50,
    );
    let history = reopened.load().chat_history;
    assert_eq!(history.len(), 50);

    // 120 lines written; the last 50 start at user message 35
    assert_eq!(history[0].text, "message 35");
    assert_eq!(history[0].sender, Sender::User);
    assert_eq!(history[49].sender, Sender::Bot);
    let persisted: Vec<String> = history.iter().map(|m| m.text.clone()).collect();
    assert_eq!(persisted, sent);
}

#[test]
fn test_corrupt_field_isolation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut raw = BTreeMap::new();
    raw.insert("budgetPlanner_income", "3000".to_string());
    raw.insert("budgetPlanner_expenses", "{not json".to_string());
    raw.insert("budgetPlanner_savingsTarget", "500".to_string());
    raw.insert("budgetPlanner_theme", "purple".to_string());
    raw.insert("budgetPlanner_chatHistory", "[]".to_string());
    fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();

    let mut session = Session::new(
        quiet_settings(),
        knowledge(),
        FileStore::open(&path).unwrap(),
        ScriptedRandom::always(0),
        NullPresenter,
    );
    session.start();

    assert_eq!(session.state().income, "3000");
    assert_eq!(session.state().savings_target, "500");
    assert_eq!(session.state().expenses, ExpenseFields::default());
    assert_eq!(session.theme(), Theme::Light);
    assert_eq!(session.summary().remaining_balance, 3000.0);
}

#[test]
fn test_corrupt_snapshot_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("state.json");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "garbage").unwrap();

    let mut store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("budgetPlanner_income").unwrap(), None);

    store.set("budgetPlanner_income", "10").unwrap();
    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("budgetPlanner_income").unwrap().as_deref(),
        Some("10")
    );
}

// =============================================================================
// Computation
// =============================================================================

#[test]
fn test_realtime_and_calculate_agree() {
    let mut session = Session::new(
        quiet_settings(),
        knowledge(),
        MemoryStore::new(),
        ScriptedRandom::always(0),
        Recorder::default(),
    );
    session.edit_income("3200.75");
    for (category, value) in [
        (Category::Rent, "1100"),
        (Category::Food, "420.30"),
        (Category::Transportation, "12abc"),
        (Category::Utilities, "1.2.3"),
        (Category::Entertainment, "-50"),
        (Category::Others, "99.99"),
    ] {
        session.edit_expense(category, value);
    }
    let realtime = *session.presenter().summaries.last().unwrap();

    let calculation = session.calculate();
    assert_eq!(calculation.summary, realtime);
    assert!((realtime.total_expenses - (1100.0 + 420.30 + 12.0 + 1.23 + 50.0 + 99.99)).abs() < 1e-9);
    assert_eq!(
        realtime.remaining_balance,
        realtime.total_income - realtime.total_expenses
    );
}

#[test]
fn test_limit_exceeded_is_a_warning_not_an_error() {
    let mut session = Session::new(
        quiet_settings(),
        knowledge(),
        MemoryStore::new(),
        ScriptedRandom::always(0),
        Recorder::default(),
    );
    session.edit_expense(Category::Rent, "12345678");
    assert_eq!(session.state().expenses.get(Category::Rent), "999999");
    assert_eq!(
        session.presenter().notices,
        vec!["Value exceeded maximum limit".to_string()]
    );
}

// =============================================================================
// Chat
// =============================================================================

#[test]
fn test_expense_analysis_scenario() {
    let mut session = Session::new(
        quiet_settings(),
        knowledge(),
        MemoryStore::new(),
        ScriptedRandom::always(0),
        Recorder::default(),
    );
    session.edit_income("4000");
    session.edit_expense(Category::Rent, "1600");
    session.edit_expense(Category::Food, "400");

    let reply = session.ask("Where does my money go?").unwrap();
    assert_eq!(reply.intent, Intent::ExpenseAnalysis);
    let text = &reply.message.text;
    assert!(text.contains("Rent: 40.0% of income"));
    assert!(text.contains("Food: 10.0% of income"));
    assert!(text.contains("50.0%"));

    session.reset();
    let reply = session.ask("Where does my money go?").unwrap();
    assert!(reply.message.text.starts_with("I need to know your income first"));
}

#[test]
fn test_seeded_sessions_reply_identically() {
    let run = || {
        let mut session = Session::new(
            Settings::default(),
            knowledge(),
            MemoryStore::new(),
            SeededRandom::new(42),
            NullPresenter,
        );
        for text in ["hi", "budget tips", "how to invest", "thanks", "bye"] {
            session.ask(text);
        }
        session
            .transcript()
            .iter()
            .map(|m| (m.sender, m.text.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(run(), run());
}
