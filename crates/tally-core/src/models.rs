//! Domain models for Tally

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest amount any budget field may hold
pub const MAX_AMOUNT: f64 = 999_999.0;

/// Fixed expense buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Rent,
    Food,
    Transportation,
    Utilities,
    Entertainment,
    Others,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rent => "rent",
            Self::Food => "food",
            Self::Transportation => "transportation",
            Self::Utilities => "utilities",
            Self::Entertainment => "entertainment",
            Self::Others => "others",
        }
    }

    /// Display label ("Rent", "Transportation", ...)
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rent => "Rent",
            Self::Food => "Food",
            Self::Transportation => "Transportation",
            Self::Utilities => "Utilities",
            Self::Entertainment => "Entertainment",
            Self::Others => "Others",
        }
    }

    /// Recommended share of income, in percent
    pub fn recommended_percentage(&self) -> f64 {
        match self {
            Self::Rent => 30.0,
            Self::Food => 15.0,
            Self::Transportation => 10.0,
            Self::Utilities => 10.0,
            Self::Entertainment => 5.0,
            Self::Others => 10.0,
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [Category] {
        &[
            Self::Rent,
            Self::Food,
            Self::Transportation,
            Self::Utilities,
            Self::Entertainment,
            Self::Others,
        ]
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rent" => Ok(Self::Rent),
            "food" => Ok(Self::Food),
            "transportation" | "transport" => Ok(Self::Transportation),
            "utilities" => Ok(Self::Utilities),
            "entertainment" => Ok(Self::Entertainment),
            "others" | "other" => Ok(Self::Others),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric expense amounts per category
///
/// Missing categories read as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Expenses {
    amounts: BTreeMap<Category, f64>,
}

impl Expenses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Amount for a category (0 when unset or not a number)
    pub fn get(&self, category: Category) -> f64 {
        match self.amounts.get(&category) {
            Some(v) if v.is_finite() => *v,
            _ => 0.0,
        }
    }

    pub fn set(&mut self, category: Category, amount: f64) {
        self.amounts.insert(category, amount);
    }

    pub fn with(mut self, category: Category, amount: f64) -> Self {
        self.set(category, amount);
        self
    }

    /// Every category with its amount, in display order
    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        Category::all().iter().map(move |c| (*c, self.get(*c)))
    }

    pub fn total(&self) -> f64 {
        self.iter().map(|(_, amount)| amount).sum()
    }
}

impl FromIterator<(Category, f64)> for Expenses {
    fn from_iter<I: IntoIterator<Item = (Category, f64)>>(iter: I) -> Self {
        Self {
            amounts: iter.into_iter().collect(),
        }
    }
}

/// Numeric budget inputs as read from the form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BudgetInput {
    pub income: f64,
    pub expenses: Expenses,
}

/// Raw expense field contents as typed by the user
///
/// Stored verbatim so an empty field stays empty across sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseFields {
    pub rent: String,
    pub food: String,
    pub transportation: String,
    pub utilities: String,
    pub entertainment: String,
    pub others: String,
}

impl ExpenseFields {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Rent => &self.rent,
            Category::Food => &self.food,
            Category::Transportation => &self.transportation,
            Category::Utilities => &self.utilities,
            Category::Entertainment => &self.entertainment,
            Category::Others => &self.others,
        }
    }

    pub fn set(&mut self, category: Category, value: impl Into<String>) {
        let value = value.into();
        match category {
            Category::Rent => self.rent = value,
            Category::Food => self.food = value,
            Category::Transportation => self.transportation = value,
            Category::Utilities => self.utilities = value,
            Category::Entertainment => self.entertainment = value,
            Category::Others => self.others = value,
        }
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            _ => Err(format!("Unknown theme: {}", s)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Who wrote a chat line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single line of the chat transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time
    pub fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }
}

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::all() {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), *category);
        }
        assert_eq!("Other".parse::<Category>().unwrap(), Category::Others);
        assert!("groceries".parse::<Category>().is_err());
    }

    #[test]
    fn test_recommended_percentages() {
        let total: f64 = Category::all()
            .iter()
            .map(|c| c.recommended_percentage())
            .sum();
        assert_eq!(total, 80.0);
        assert_eq!(Category::Rent.recommended_percentage(), 30.0);
        assert_eq!(Category::Entertainment.recommended_percentage(), 5.0);
    }

    #[test]
    fn test_expenses_missing_and_nan_read_as_zero() {
        let expenses = Expenses::new()
            .with(Category::Rent, 1200.0)
            .with(Category::Food, f64::NAN);

        assert_eq!(expenses.get(Category::Rent), 1200.0);
        assert_eq!(expenses.get(Category::Food), 0.0);
        assert_eq!(expenses.get(Category::Others), 0.0);
        assert_eq!(expenses.total(), 1200.0);
        assert_eq!(expenses.iter().count(), 6);
    }

    #[test]
    fn test_expense_fields_serialize_all_categories() {
        let mut fields = ExpenseFields::default();
        fields.set(Category::Rent, "1500");

        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["rent"], "1500");
        assert_eq!(json["others"], "");

        let partial: ExpenseFields = serde_json::from_str(r#"{"food":"200"}"#).unwrap();
        assert_eq!(partial.get(Category::Food), "200");
        assert_eq!(partial.get(Category::Rent), "");
    }

    #[test]
    fn test_theme_toggle() {
        assert_eq!(Theme::default(), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert!("sepia".parse::<Theme>().is_err());
    }
}
