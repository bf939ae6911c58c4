//! Chat pacing state machine
//!
//! Replies are delivered after a simulated "thinking" delay, sometimes
//! followed by a follow-up question. The engine never sleeps itself: it
//! hands the host a [`Ticket`] and a delay, and the host calls back when
//! the timer fires. Tickets go stale when the state moves on, so a late
//! timer is ignored instead of interleaving lines.
//!
//! ```text
//!            submit                 respond (no follow-up)
//!   Idle ─────────────▶ AwaitingResponse ─────────────────▶ Idle
//!    ▲                        │ respond (follow-up rolled)
//!    │ follow_up              ▼
//!    └──────────────── AwaitingFollowUp ── submit ──▶ AwaitingResponse
//! ```
//!
//! At most one reply is in flight: `submit` while awaiting a reply is
//! refused with [`Submission::Busy`]. Submitting while a follow-up is
//! pending cancels the follow-up.

use std::time::Duration;

use tracing::debug;

use crate::analysis::analyze;
use crate::config::ChatSettings;
use crate::models::{BudgetInput, ChatMessage};
use crate::random::{chance, RandomSource};

use super::intent::{Intent, IntentClassifier};
use super::knowledge::KnowledgeBase;

/// Handle for a scheduled chat action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// A timer the host should start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub ticket: Ticket,
    pub delay: Duration,
}

/// Where the conversation stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatPhase {
    Idle,
    AwaitingResponse,
    AwaitingFollowUp,
}

/// Outcome of submitting a user message
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Empty or whitespace-only text
    Ignored,
    /// A reply is still pending
    Busy,
    /// Message accepted; deliver the reply when the timer fires
    Accepted {
        message: ChatMessage,
        reply: Scheduled,
    },
}

/// A delivered bot reply
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub intent: Intent,
    pub message: ChatMessage,
    /// Set when a follow-up question was rolled
    pub follow_up: Option<Scheduled>,
}

#[derive(Debug, Clone)]
struct Pending {
    ticket: Ticket,
    text: String,
}

/// Scripted chat assistant with pacing
#[derive(Debug, Clone)]
pub struct ChatEngine {
    classifier: IntentClassifier,
    knowledge: KnowledgeBase,
    settings: ChatSettings,
    phase: ChatPhase,
    pending: Option<Pending>,
    next_ticket: u64,
}

impl ChatEngine {
    pub fn new(knowledge: KnowledgeBase, settings: ChatSettings) -> Self {
        Self {
            classifier: IntentClassifier::new(),
            knowledge,
            settings,
            phase: ChatPhase::Idle,
            pending: None,
            next_ticket: 0,
        }
    }

    pub fn phase(&self) -> ChatPhase {
        self.phase
    }

    /// True while a reply is pending (the UI shows a typing indicator)
    pub fn is_busy(&self) -> bool {
        self.phase == ChatPhase::AwaitingResponse
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    pub fn settings(&self) -> &ChatSettings {
        &self.settings
    }

    /// Accept a user message and schedule the reply
    pub fn submit(&mut self, text: &str, rng: &mut dyn RandomSource) -> Submission {
        let text = text.trim();
        if text.is_empty() {
            return Submission::Ignored;
        }
        if self.phase == ChatPhase::AwaitingResponse {
            debug!("Chat busy, refusing new message");
            return Submission::Busy;
        }
        if self.phase == ChatPhase::AwaitingFollowUp {
            debug!("New message cancels pending follow-up");
        }

        let ticket = self.issue_ticket();
        let delay = self.thinking_time(rng);
        self.pending = Some(Pending {
            ticket,
            text: text.to_string(),
        });
        self.phase = ChatPhase::AwaitingResponse;

        Submission::Accepted {
            message: ChatMessage::user(text),
            reply: Scheduled { ticket, delay },
        }
    }

    /// Deliver the reply for `ticket`
    ///
    /// Returns `None` when the ticket is stale.
    pub fn respond(
        &mut self,
        ticket: Ticket,
        budget: &BudgetInput,
        rng: &mut dyn RandomSource,
    ) -> Option<Reply> {
        if self.phase != ChatPhase::AwaitingResponse {
            return None;
        }
        let pending = self.take_pending(ticket)?;

        let (intent, text) = self.answer(&pending.text, budget, rng);
        debug!(intent = %intent, "Delivering chat reply");

        let follow_up = if chance(rng, self.settings.follow_up_chance) {
            let ticket = self.issue_ticket();
            let delay = self.settings.follow_up_lead + self.thinking_time(rng);
            self.pending = Some(Pending {
                ticket,
                text: String::new(),
            });
            self.phase = ChatPhase::AwaitingFollowUp;
            Some(Scheduled { ticket, delay })
        } else {
            self.phase = ChatPhase::Idle;
            None
        };

        Some(Reply {
            intent,
            message: ChatMessage::bot(text),
            follow_up,
        })
    }

    /// Deliver the follow-up question for `ticket`
    ///
    /// Returns `None` when the ticket is stale (e.g. the user spoke first).
    pub fn follow_up(&mut self, ticket: Ticket, rng: &mut dyn RandomSource) -> Option<ChatMessage> {
        if self.phase != ChatPhase::AwaitingFollowUp {
            return None;
        }
        self.take_pending(ticket)?;
        self.phase = ChatPhase::Idle;
        Some(ChatMessage::bot(self.knowledge.follow_up(rng)))
    }

    /// Drop any pending action and return to idle
    pub fn cancel(&mut self) {
        self.pending = None;
        self.phase = ChatPhase::Idle;
    }

    /// Classify and answer a message immediately, without pacing
    pub fn answer(
        &self,
        text: &str,
        budget: &BudgetInput,
        rng: &mut dyn RandomSource,
    ) -> (Intent, String) {
        let intent = self.classifier.classify(text);
        let reply = match self.knowledge.respond(intent, rng) {
            Some(canned) => canned.to_string(),
            None => analyze(budget.income, &budget.expenses).render(),
        };
        (intent, reply)
    }

    fn take_pending(&mut self, ticket: Ticket) -> Option<Pending> {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            self.pending.take()
        } else {
            None
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn thinking_time(&self, rng: &mut dyn RandomSource) -> Duration {
        let jitter_ms = self.settings.thinking_jitter.as_millis() as usize;
        let jitter = if jitter_ms > 0 {
            Duration::from_millis(rng.pick(jitter_ms) as u64)
        } else {
            Duration::ZERO
        };
        self.settings.thinking_delay + jitter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Expenses, Sender};
    use crate::random::ScriptedRandom;

    fn engine(follow_up_chance: u32) -> ChatEngine {
        let settings = ChatSettings {
            follow_up_chance,
            ..Default::default()
        };
        ChatEngine::new(KnowledgeBase::embedded().unwrap(), settings)
    }

    fn accepted(submission: Submission) -> (ChatMessage, Scheduled) {
        match submission {
            Submission::Accepted { message, reply } => (message, reply),
            other => panic!("expected accepted, got {:?}", other),
        }
    }

    #[test]
    fn test_submit_and_respond() {
        let mut engine = engine(0);
        let mut rng = ScriptedRandom::always(0);

        let (message, reply) = accepted(engine.submit("  Hello  ", &mut rng));
        assert_eq!(message.sender, Sender::User);
        assert_eq!(message.text, "Hello");
        assert_eq!(reply.delay, Duration::from_millis(1000));
        assert_eq!(engine.phase(), ChatPhase::AwaitingResponse);
        assert!(engine.is_busy());

        let reply = engine
            .respond(reply.ticket, &BudgetInput::default(), &mut rng)
            .unwrap();
        assert_eq!(reply.intent, Intent::Greeting);
        assert_eq!(reply.message.sender, Sender::Bot);
        assert!(reply.follow_up.is_none());
        assert_eq!(engine.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_thinking_delay_jitter() {
        let mut engine = engine(0);
        let (_, reply) = accepted(engine.submit("hi", &mut ScriptedRandom::always(750)));
        assert_eq!(reply.delay, Duration::from_millis(1750));
    }

    #[test]
    fn test_empty_message_ignored() {
        let mut engine = engine(0);
        assert_eq!(
            engine.submit("   ", &mut ScriptedRandom::default()),
            Submission::Ignored
        );
        assert_eq!(engine.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_busy_while_awaiting_response() {
        let mut engine = engine(0);
        let mut rng = ScriptedRandom::always(0);
        let (_, first) = accepted(engine.submit("hi", &mut rng));

        assert_eq!(engine.submit("hello again", &mut rng), Submission::Busy);

        // First message still answered
        let reply = engine
            .respond(first.ticket, &BudgetInput::default(), &mut rng)
            .unwrap();
        assert_eq!(reply.intent, Intent::Greeting);
    }

    #[test]
    fn test_stale_ticket_ignored() {
        let mut engine = engine(0);
        let mut rng = ScriptedRandom::always(0);
        let (_, first) = accepted(engine.submit("hi", &mut rng));
        engine
            .respond(first.ticket, &BudgetInput::default(), &mut rng)
            .unwrap();

        // Firing the same timer twice does nothing
        assert!(engine
            .respond(first.ticket, &BudgetInput::default(), &mut rng)
            .is_none());
    }

    #[test]
    fn test_follow_up_scheduled_and_delivered() {
        let mut engine = engine(100);
        let mut rng = ScriptedRandom::always(0);
        let (_, first) = accepted(engine.submit("thanks", &mut rng));

        let reply = engine
            .respond(first.ticket, &BudgetInput::default(), &mut rng)
            .unwrap();
        let follow_up = reply.follow_up.unwrap();
        assert_eq!(follow_up.delay, Duration::from_millis(2000));
        assert_eq!(engine.phase(), ChatPhase::AwaitingFollowUp);
        assert!(!engine.is_busy());

        let message = engine.follow_up(follow_up.ticket, &mut rng).unwrap();
        assert_eq!(message.sender, Sender::Bot);
        assert_eq!(
            message.text,
            "Is there anything specific about budgeting you'd like to know more about?"
        );
        assert_eq!(engine.phase(), ChatPhase::Idle);
    }

    #[test]
    fn test_new_message_cancels_follow_up() {
        let mut engine = engine(100);
        let mut rng = ScriptedRandom::always(0);
        let (_, first) = accepted(engine.submit("hi", &mut rng));
        let reply = engine
            .respond(first.ticket, &BudgetInput::default(), &mut rng)
            .unwrap();
        let follow_up = reply.follow_up.unwrap();

        let (_, second) = accepted(engine.submit("bye", &mut rng));
        assert!(engine.follow_up(follow_up.ticket, &mut rng).is_none());
        assert_eq!(engine.phase(), ChatPhase::AwaitingResponse);

        let reply = engine
            .respond(second.ticket, &BudgetInput::default(), &mut rng)
            .unwrap();
        assert_eq!(reply.intent, Intent::Farewell);
    }

    #[test]
    fn test_follow_up_chance_roll() {
        // Rolls below 30 trigger a follow-up, 30 and above don't
        let mut engine = engine(30);
        let (_, first) = accepted(engine.submit("hi", &mut ScriptedRandom::always(0)));
        let reply = engine
            .respond(
                first.ticket,
                &BudgetInput::default(),
                &mut ScriptedRandom::new(vec![0, 30]),
            )
            .unwrap();
        assert!(reply.follow_up.is_none());

        let (_, second) = accepted(engine.submit("hi", &mut ScriptedRandom::always(0)));
        let reply = engine
            .respond(
                second.ticket,
                &BudgetInput::default(),
                &mut ScriptedRandom::new(vec![0, 29, 0]),
            )
            .unwrap();
        assert!(reply.follow_up.is_some());
    }

    #[test]
    fn test_expense_analysis_uses_budget() {
        let engine = engine(0);
        let budget = BudgetInput {
            income: 4000.0,
            expenses: Expenses::new()
                .with(Category::Rent, 1600.0)
                .with(Category::Food, 400.0),
        };
        let (intent, text) =
            engine.answer("Explain my expenses", &budget, &mut ScriptedRandom::default());
        assert_eq!(intent, Intent::ExpenseAnalysis);
        assert!(text.contains("Rent: 40.0% of income"));

        let (_, text) = engine.answer(
            "analyze my expenses",
            &BudgetInput::default(),
            &mut ScriptedRandom::default(),
        );
        assert!(text.starts_with("I need to know your income first"));
    }

    #[test]
    fn test_cancel() {
        let mut engine = engine(0);
        let mut rng = ScriptedRandom::always(0);
        let (_, first) = accepted(engine.submit("hi", &mut rng));
        engine.cancel();
        assert_eq!(engine.phase(), ChatPhase::Idle);
        assert!(engine
            .respond(first.ticket, &BudgetInput::default(), &mut rng)
            .is_none());
    }
}
