//! Session state and data flow
//!
//! A [`Session`] owns everything the widget keeps in memory: the raw form
//! fields, theme, chat window, transcript and chat engine. Each mutation
//! recomputes what changed, pushes it to the [`Presenter`] and saves the
//! snapshot. Nothing here returns an error to the presenter: store
//! failures are logged and the session carries on with its in-memory
//! state.

use std::time::Duration;

use tracing::{debug, warn};

use crate::budget::{aggregate, chart_slices, BudgetSummary};
use crate::chat::{ChatEngine, ChatPhase, KnowledgeBase, Reply, Submission, Ticket};
use crate::config::Settings;
use crate::input::{
    input_feedback, parse_amount_with_limit, sanitize_with_limit, FieldKind, InputFeedback,
    Sanitized,
};
use crate::models::{BudgetInput, Category, ChatMessage, Expenses, Severity, Theme};
use crate::random::RandomSource;
use crate::savings::{evaluate, SavingsProgress};
use crate::store::{BudgetStore, KeyValueStore, PersistedState};

const LIMIT_WARNING: &str = "Value exceeded maximum limit";
const WELCOME_NOTICE: &str = "Welcome to Budget Planner!";

/// Distance the chat window keeps from the right and bottom edges
const WINDOW_MARGIN: i32 = 100;

/// Outbound rendering collaborator
///
/// Every call is fire-and-forget. Hosts implement the parts they show;
/// theme and typing indicator default to no-ops.
pub trait Presenter {
    fn render_summary(&mut self, summary: &BudgetSummary);

    fn render_savings(&mut self, progress: &SavingsProgress);

    /// Strictly positive categories only; empty means "show a placeholder"
    fn render_chart(&mut self, slices: &[(Category, f64)]);

    fn notify(&mut self, message: &str, severity: Severity);

    fn append_to_transcript(&mut self, message: &ChatMessage);

    fn apply_theme(&mut self, _theme: Theme) {}

    fn set_typing(&mut self, _typing: bool) {}
}

/// Presenter that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn render_summary(&mut self, _summary: &BudgetSummary) {}

    fn render_savings(&mut self, _progress: &SavingsProgress) {}

    fn render_chart(&mut self, _slices: &[(Category, f64)]) {}

    fn notify(&mut self, _message: &str, _severity: Severity) {}

    fn append_to_transcript(&mut self, _message: &ChatMessage) {}
}

/// Chat window state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChatWindow {
    pub open: bool,
    pub minimized: bool,
    /// Top-left corner in pixels
    pub position: (i32, i32),
}

/// Result of an explicit "calculate"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calculation {
    pub summary: BudgetSummary,
    pub savings: SavingsProgress,
    /// No income entered (the UI shakes the income field)
    pub income_missing: bool,
    /// Income entered and nothing overspent
    pub balanced: bool,
}

/// One user's budget planner session
pub struct Session<B: KeyValueStore, R: RandomSource, P: Presenter = NullPresenter> {
    settings: Settings,
    store: BudgetStore<B>,
    engine: ChatEngine,
    rng: R,
    presenter: P,
    state: PersistedState,
    window: ChatWindow,
}

impl<B: KeyValueStore, R: RandomSource, P: Presenter> Session<B, R, P> {
    pub fn new(
        settings: Settings,
        knowledge: KnowledgeBase,
        backend: B,
        rng: R,
        presenter: P,
    ) -> Self {
        let store = BudgetStore::new(backend, &settings.storage, settings.chat.history_cap);
        let engine = ChatEngine::new(knowledge, settings.chat.clone());
        Self {
            settings,
            store,
            engine,
            rng,
            presenter,
            state: PersistedState::default(),
            window: ChatWindow::default(),
        }
    }

    /// Load the snapshot and render it
    ///
    /// Replays the most recent transcript lines. Returns the delay after
    /// which the host should call [`Session::post_welcome`] when there is
    /// no transcript yet.
    pub fn start(&mut self) -> Option<Duration> {
        self.state = self.store.load();
        debug!(
            "Session started ({} chat messages restored)",
            self.state.chat_history.len()
        );

        self.presenter.apply_theme(self.state.theme);
        self.refresh();

        let skip = self
            .state
            .chat_history
            .len()
            .saturating_sub(self.settings.chat.rendered_history);
        for message in &self.state.chat_history[skip..] {
            self.presenter.append_to_transcript(message);
        }
        self.presenter.notify(WELCOME_NOTICE, Severity::Info);

        if self.state.chat_history.is_empty() {
            Some(self.settings.chat.welcome_delay)
        } else {
            None
        }
    }

    /// Greet a first-time user
    ///
    /// Does nothing once the transcript has any line in it.
    pub fn post_welcome(&mut self) -> Option<ChatMessage> {
        if !self.state.chat_history.is_empty() {
            return None;
        }
        let message = ChatMessage::bot(self.engine.knowledge().welcome());
        self.record(message.clone());
        self.persist();
        Some(message)
    }

    pub fn edit_income(&mut self, raw: &str) -> Sanitized {
        let sanitized = self.sanitize(raw);
        self.state.income = sanitized.value.clone();
        self.after_edit();
        sanitized
    }

    pub fn edit_expense(&mut self, category: Category, raw: &str) -> Sanitized {
        let sanitized = self.sanitize(raw);
        self.state.expenses.set(category, sanitized.value.clone());
        self.after_edit();
        sanitized
    }

    pub fn edit_savings_target(&mut self, raw: &str) -> Sanitized {
        let sanitized = self.sanitize(raw);
        self.state.savings_target = sanitized.value.clone();
        self.after_edit();
        sanitized
    }

    /// Explicit calculate: same numbers as the keystroke path, chart
    /// and savings always rendered
    pub fn calculate(&mut self) -> Calculation {
        let input = self.budget_input();
        let summary = aggregate(input.income, &input.expenses);
        let savings = evaluate(self.savings_target(), summary.remaining_balance);

        self.presenter.render_summary(&summary);
        self.presenter.render_chart(&chart_slices(&input.expenses));
        self.presenter.render_savings(&savings);

        Calculation {
            summary,
            savings,
            income_missing: input.income == 0.0,
            balanced: input.income > 0.0 && summary.remaining_balance >= 0.0,
        }
    }

    /// Clear every budget field
    ///
    /// Theme and transcript are kept.
    pub fn reset(&mut self) {
        self.state.income.clear();
        self.state.expenses = Default::default();
        self.state.savings_target.clear();

        self.presenter.render_summary(&BudgetSummary::zero());
        self.presenter.render_savings(&SavingsProgress::empty());
        self.presenter.render_chart(&[]);
        self.persist();
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.state.theme.toggled();
        self.state.theme = theme;
        self.presenter.apply_theme(theme);
        self.persist();
        self.presenter
            .notify(&format!("Switched to {} theme", theme), Severity::Info);
        theme
    }

    /// Submit a chat message
    ///
    /// On acceptance the host waits for the returned delay and then calls
    /// [`Session::deliver_response`] with the ticket.
    pub fn send(&mut self, text: &str) -> Submission {
        let submission = self.engine.submit(text, &mut self.rng);
        if let Submission::Accepted { message, .. } = &submission {
            self.record(message.clone());
            self.persist();
            self.presenter.set_typing(true);
        }
        submission
    }

    /// Deliver the reply for a ticket returned by [`Session::send`]
    pub fn deliver_response(&mut self, ticket: Ticket) -> Option<Reply> {
        let budget = self.budget_input();
        let reply = self.engine.respond(ticket, &budget, &mut self.rng)?;
        self.presenter.set_typing(false);
        self.record(reply.message.clone());
        self.persist();
        if reply.follow_up.is_some() {
            self.presenter.set_typing(true);
        }
        Some(reply)
    }

    pub fn deliver_follow_up(&mut self, ticket: Ticket) -> Option<ChatMessage> {
        let message = self.engine.follow_up(ticket, &mut self.rng)?;
        self.presenter.set_typing(false);
        self.record(message.clone());
        self.persist();
        Some(message)
    }

    /// Answer a message right away, skipping the pacing delays
    pub fn ask(&mut self, text: &str) -> Option<Reply> {
        match self.send(text) {
            Submission::Accepted { reply, .. } => {
                let response = self.deliver_response(reply.ticket)?;
                if let Some(follow_up) = response.follow_up {
                    self.deliver_follow_up(follow_up.ticket);
                }
                Some(response)
            }
            Submission::Busy | Submission::Ignored => None,
        }
    }

    pub fn toggle_chat(&mut self) -> bool {
        self.window.open = !self.window.open;
        if self.window.open {
            self.window.minimized = false;
        }
        self.window.open
    }

    pub fn minimize_chat(&mut self) -> bool {
        self.window.minimized = !self.window.minimized;
        self.window.minimized
    }

    pub fn close_chat(&mut self) {
        self.window.open = false;
    }

    /// Move the chat window, keeping it inside the viewport
    pub fn move_chat(&mut self, x: i32, y: i32, viewport: (i32, i32)) -> (i32, i32) {
        let clamp = |value: i32, extent: i32| value.min(extent - WINDOW_MARGIN).max(0);
        self.window.position = (clamp(x, viewport.0), clamp(y, viewport.1));
        self.window.position
    }

    /// Final save before the host exits
    pub fn shutdown(&mut self) {
        self.engine.cancel();
        self.persist();
        debug!("Session shut down");
    }

    /// Numeric view of the form
    pub fn budget_input(&self) -> BudgetInput {
        let max = self.settings.max_amount;
        let expenses: Expenses = Category::all()
            .iter()
            .map(|c| {
                (
                    *c,
                    parse_amount_with_limit(self.state.expenses.get(*c), max),
                )
            })
            .collect();
        BudgetInput {
            income: parse_amount_with_limit(&self.state.income, max),
            expenses,
        }
    }

    pub fn summary(&self) -> BudgetSummary {
        self.budget_input().summary()
    }

    pub fn savings_target(&self) -> f64 {
        parse_amount_with_limit(&self.state.savings_target, self.settings.max_amount)
    }

    pub fn savings(&self) -> SavingsProgress {
        evaluate(self.savings_target(), self.summary().remaining_balance)
    }

    pub fn income_feedback(&self) -> InputFeedback {
        let income = self.budget_input().income;
        input_feedback(FieldKind::Income, income, income)
    }

    pub fn expense_feedback(&self, category: Category) -> InputFeedback {
        let input = self.budget_input();
        input_feedback(
            FieldKind::Expense,
            input.expenses.get(category),
            input.income,
        )
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    /// Full in-memory transcript, oldest first
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.state.chat_history
    }

    pub fn chat_phase(&self) -> ChatPhase {
        self.engine.phase()
    }

    pub fn window(&self) -> ChatWindow {
        self.window
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &BudgetStore<B> {
        &self.store
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    fn sanitize(&mut self, raw: &str) -> Sanitized {
        let sanitized = sanitize_with_limit(raw, self.settings.max_amount);
        if sanitized.limit_exceeded {
            self.presenter.notify(LIMIT_WARNING, Severity::Warning);
        }
        sanitized
    }

    fn after_edit(&mut self) {
        self.refresh();
        self.persist();
    }

    /// Keystroke-path recompute
    fn refresh(&mut self) {
        let input = self.budget_input();
        let summary = aggregate(input.income, &input.expenses);
        self.presenter.render_summary(&summary);

        if !self.state.savings_target.is_empty() {
            let savings = evaluate(self.savings_target(), summary.remaining_balance);
            self.presenter.render_savings(&savings);
        }
        if summary.total_expenses > 0.0 {
            self.presenter.render_chart(&chart_slices(&input.expenses));
        }
    }

    fn record(&mut self, message: ChatMessage) {
        self.presenter.append_to_transcript(&message);
        self.state.chat_history.push(message);
        let excess = self
            .state
            .chat_history
            .len()
            .saturating_sub(self.settings.chat.history_cap);
        self.state.chat_history.drain(..excess);
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            warn!("Failed to save session: {}", e);
        }
    }
}
