//! Terminal rendering of session updates

use tally_core::format::{format_currency, format_percent, format_whole};
use tally_core::{
    BalanceStatus, BudgetSummary, Category, ChatMessage, Presenter, SavingsProgress, Sender,
    Severity,
};

const BAR_WIDTH: usize = 20;

/// Where rendered lines go
#[derive(Debug, Clone)]
enum Output {
    Terminal,
    /// Kept in memory (tests)
    #[allow(dead_code)]
    Captured(Vec<String>),
}

/// Prints session updates to stdout
///
/// Starts muted so loading a session doesn't replay everything; commands
/// unmute it once the snapshot is in.
#[derive(Debug, Clone)]
pub struct TerminalPresenter {
    muted: bool,
    /// Print the user's own lines (off while the user is typing them)
    echo_user: bool,
    show_typing: bool,
    output: Output,
}

impl TerminalPresenter {
    pub fn muted() -> Self {
        Self {
            muted: true,
            echo_user: true,
            show_typing: false,
            output: Output::Terminal,
        }
    }

    /// Muted presenter that records lines instead of printing them
    #[cfg(test)]
    pub fn capturing() -> Self {
        Self {
            output: Output::Captured(Vec::new()),
            ..Self::muted()
        }
    }

    /// Lines recorded by a [`TerminalPresenter::capturing`] presenter
    #[cfg(test)]
    pub fn captured(&self) -> &[String] {
        match &self.output {
            Output::Captured(lines) => lines,
            Output::Terminal => &[],
        }
    }

    pub fn unmute(&mut self) {
        self.muted = false;
    }

    /// Interactive chat: the terminal already shows what the user typed
    pub fn interactive(&mut self) {
        self.echo_user = false;
        self.show_typing = true;
    }

    pub fn quiet_user(&mut self) {
        self.echo_user = false;
    }

    fn line(&mut self, text: String) {
        match &mut self.output {
            Output::Terminal => println!("{}", text),
            Output::Captured(lines) => lines.push(text),
        }
    }

    fn warn_line(&mut self, text: String) {
        match &mut self.output {
            Output::Terminal => eprintln!("{}", text),
            Output::Captured(lines) => lines.push(text),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn render_summary(&mut self, summary: &BudgetSummary) {
        if self.muted {
            return;
        }
        let marker = match summary.balance_status() {
            BalanceStatus::Deficit => "🔴 over budget",
            BalanceStatus::Even => "🟡 break-even",
            BalanceStatus::Surplus => "🟢",
        };
        self.line(String::new());
        self.line(format!("   Income:     {:>14}", format_currency(summary.total_income)));
        self.line(format!("   Expenses:   {:>14}", format_currency(summary.total_expenses)));
        self.line(format!(
            "   Remaining:  {:>14}  {}",
            format_currency(summary.remaining_balance),
            marker
        ));
    }

    fn render_savings(&mut self, progress: &SavingsProgress) {
        if self.muted {
            return;
        }
        self.line(String::new());
        self.line(format!(
            "   Savings goal: {} of {}  {} ({})",
            format_percent(progress.percentage),
            format_whole(progress.target),
            bar(progress.percentage, BAR_WIDTH),
            progress.tier
        ));
    }

    fn render_chart(&mut self, slices: &[(Category, f64)]) {
        if self.muted {
            return;
        }
        self.line(String::new());
        if slices.is_empty() {
            self.line("   (no expenses entered yet)".to_string());
            return;
        }
        let total: f64 = slices.iter().map(|(_, amount)| amount).sum();
        for (category, amount) in slices {
            let share = amount / total * 100.0;
            self.line(format!(
                "   {:<14} {:>12} {:>5} {}",
                category.label(),
                format_currency(*amount),
                format_percent(share),
                bar(share, BAR_WIDTH)
            ));
        }
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        if self.muted {
            return;
        }
        match severity {
            Severity::Info => self.line(format!("ℹ️  {}", message)),
            Severity::Warning => self.warn_line(format!("⚠️  {}", message)),
        }
    }

    fn append_to_transcript(&mut self, message: &ChatMessage) {
        if self.muted {
            return;
        }
        match message.sender {
            Sender::User if self.echo_user => self.line(format!("You: {}", message.text)),
            Sender::User => {}
            Sender::Bot => self.line(format!("🤖 {}", message.text)),
        }
    }

    fn set_typing(&mut self, typing: bool) {
        if !self.muted && self.show_typing && typing {
            self.line("   ...".to_string());
        }
    }
}

/// Horizontal bar for a percentage in `[0, 100]`
pub fn bar(percent: f64, width: usize) -> String {
    let percent = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        0.0
    };
    let filled = ((percent / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}
