//! Test utilities for tally-core
//!
//! A [`Presenter`] that records every call so tests can assert on what a
//! session rendered without a terminal.

use crate::budget::BudgetSummary;
use crate::models::{Category, ChatMessage, Severity, Theme};
use crate::savings::SavingsProgress;
use crate::session::Presenter;

/// One recorded presenter call
#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Summary(BudgetSummary),
    Savings(SavingsProgress),
    Chart(Vec<(Category, f64)>),
    Notify(String, Severity),
    Transcript(ChatMessage),
    Theme(Theme),
    Typing(bool),
}

/// Presenter that keeps a log of everything it was asked to show
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub events: Vec<PresenterEvent>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn summaries(&self) -> Vec<BudgetSummary> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Summary(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn last_summary(&self) -> Option<BudgetSummary> {
        self.summaries().last().copied()
    }

    pub fn savings(&self) -> Vec<SavingsProgress> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Savings(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub fn charts(&self) -> Vec<Vec<(Category, f64)>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Chart(slices) => Some(slices.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Notify(message, severity) => Some((message.clone(), *severity)),
                _ => None,
            })
            .collect()
    }

    /// Text of every transcript line, in order
    pub fn transcript(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(|e| match e {
                PresenterEvent::Transcript(message) => Some(message.text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn render_summary(&mut self, summary: &BudgetSummary) {
        self.events.push(PresenterEvent::Summary(*summary));
    }

    fn render_savings(&mut self, progress: &SavingsProgress) {
        self.events.push(PresenterEvent::Savings(*progress));
    }

    fn render_chart(&mut self, slices: &[(Category, f64)]) {
        self.events.push(PresenterEvent::Chart(slices.to_vec()));
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.events
            .push(PresenterEvent::Notify(message.to_string(), severity));
    }

    fn append_to_transcript(&mut self, message: &ChatMessage) {
        self.events.push(PresenterEvent::Transcript(message.clone()));
    }

    fn apply_theme(&mut self, theme: Theme) {
        self.events.push(PresenterEvent::Theme(theme));
    }

    fn set_typing(&mut self, typing: bool) {
        self.events.push(PresenterEvent::Typing(typing));
    }
}
