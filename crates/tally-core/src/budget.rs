//! Budget aggregation
//!
//! Pure functions that turn the form inputs into totals. Both the
//! keystroke path and the explicit "calculate" path go through
//! [`aggregate`], so their numbers are identical by construction.

use serde::Serialize;

use crate::models::{BudgetInput, Category, Expenses};

/// Totals derived from the current inputs (never persisted)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// `total_income - total_expenses`, negative when overspending
    pub remaining_balance: f64,
}

impl BudgetSummary {
    pub fn zero() -> Self {
        Self {
            total_income: 0.0,
            total_expenses: 0.0,
            remaining_balance: 0.0,
        }
    }

    pub fn balance_status(&self) -> BalanceStatus {
        BalanceStatus::of(self.remaining_balance)
    }
}

/// Sign of the remaining balance, used for coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BalanceStatus {
    Deficit,
    Even,
    Surplus,
}

impl BalanceStatus {
    pub fn of(balance: f64) -> Self {
        if balance < 0.0 {
            Self::Deficit
        } else if balance == 0.0 {
            Self::Even
        } else {
            Self::Surplus
        }
    }
}

/// Combine income and expenses into totals
pub fn aggregate(income: f64, expenses: &Expenses) -> BudgetSummary {
    let total_income = if income.is_finite() { income } else { 0.0 };
    let total_expenses = expenses.total();
    BudgetSummary {
        total_income,
        total_expenses,
        remaining_balance: total_income - total_expenses,
    }
}

impl BudgetInput {
    pub fn summary(&self) -> BudgetSummary {
        aggregate(self.income, &self.expenses)
    }
}

/// Share of income taken by one amount
///
/// With no income the amount is divided by 1 instead, so the ratio stays
/// defined (and is usually > 1).
pub fn category_ratio(amount: f64, income: f64) -> f64 {
    let base = if income > 0.0 { income } else { 1.0 };
    amount / base
}

/// Ratios for every category, in display order
pub fn category_ratios(income: f64, expenses: &Expenses) -> Vec<(Category, f64)> {
    expenses
        .iter()
        .map(|(category, amount)| (category, category_ratio(amount, income)))
        .collect()
}

/// Categories with a strictly positive amount, for the breakdown chart
///
/// An empty result means the chart shows its empty-state placeholder.
pub fn chart_slices(expenses: &Expenses) -> Vec<(Category, f64)> {
    expenses
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .collect()
}
