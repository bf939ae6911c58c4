//! Rule-based intent classification for chat messages
//!
//! Rules are evaluated in order and the first match wins. Greeting,
//! farewell and thanks rules are anchored to the start of the message;
//! topic rules match anywhere. Reordering the rules changes the outcome
//! for messages that match several of them ("hi, any budget tips?" is a
//! greeting).

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Closed set of things a user can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Intent {
    Greeting,
    Farewell,
    Thanks,
    SavingMoney,
    BudgetTips,
    ExpenseAnalysis,
    IncomeSuggestions,
    InvestmentBasics,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::Thanks => "thanks",
            Self::SavingMoney => "savingMoney",
            Self::BudgetTips => "budgetTips",
            Self::ExpenseAnalysis => "expenseAnalysis",
            Self::IncomeSuggestions => "incomeSuggestions",
            Self::InvestmentBasics => "investmentBasics",
            Self::Unknown => "unknown",
        }
    }

    /// Intents answered from a canned response pool
    ///
    /// Expense analysis is generated from the user's numbers instead.
    pub fn is_canned(&self) -> bool {
        !matches!(self, Self::ExpenseAnalysis)
    }

    pub fn all() -> &'static [Intent] {
        &[
            Self::Greeting,
            Self::Farewell,
            Self::Thanks,
            Self::SavingMoney,
            Self::BudgetTips,
            Self::ExpenseAnalysis,
            Self::IncomeSuggestions,
            Self::InvestmentBasics,
            Self::Unknown,
        ]
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ordered (pattern, intent) rules
const RULES: &[(&str, Intent)] = &[
    (r"^(hi|hello|hey|greetings|howdy|hola)", Intent::Greeting),
    (r"^(bye|goodbye|see you|farewell|cya)", Intent::Farewell),
    (r"^(thanks|thank you|thx|ty)", Intent::Thanks),
    (
        r"how (can|do) (i|we|you) save money|saving money|save more|tips for saving",
        Intent::SavingMoney,
    ),
    (
        r"budget tips|budgeting tips|how to budget|budget advice|budgeting help",
        Intent::BudgetTips,
    ),
    (
        r"explain my expenses|analyze (my )?expenses|expense (breakdown|analysis)|where (is|does) my money (go|going)",
        Intent::ExpenseAnalysis,
    ),
    (
        r"how to (make|earn) more money|increase (my )?income|earn extra|side hustle|more income",
        Intent::IncomeSuggestions,
    ),
    (
        r"how (to|should i) invest|investment (advice|tips)|investing basics|start investing",
        Intent::InvestmentBasics,
    ),
];

/// Compiled classifier
///
/// Pure: no learning, no state. The same text always yields the same intent.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    rules: Vec<(Regex, Intent)>,
}

impl IntentClassifier {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(pattern, intent)| {
                let re = Regex::new(&format!("(?i){}", pattern)).expect("valid regex");
                (re, *intent)
            })
            .collect();
        Self { rules }
    }

    /// Classify a message; surrounding whitespace and case are ignored
    pub fn classify(&self, text: &str) -> Intent {
        let normalized = text.trim().to_lowercase();
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(&normalized))
            .map(|(_, intent)| *intent)
            .unwrap_or(Intent::Unknown)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}
