//! Expense analysis against recommended allocations
//!
//! Compares each category's share of income with a reference percentage
//! and summarizes the overall savings rate. The result is structured data;
//! [`AnalysisReport::render`] turns it into the chat reply.
//!
//! A category is flagged when it drifts more than 20% (relative) from its
//! recommended share:
//!
//! - `high`   : share > recommended × 1.2
//! - `low`    : share < recommended × 0.8
//! - `normal` : anything in between
//!
//! Reports are computed fresh on every call; inputs change between messages.

use serde::Serialize;

use crate::models::{Category, Expenses};

/// Relative tolerance around the recommended share
const HIGH_FACTOR: f64 = 1.2;
const LOW_FACTOR: f64 = 0.8;

/// Savings rate above which the verdict is "excellent"
const HEALTHY_SAVINGS_RATE: f64 = 20.0;

/// How a category compares with its recommended share
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    High,
    Normal,
    Low,
}

impl AllocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Classify a share of income against a recommended share (both percent)
    pub fn classify(percentage: f64, recommended: f64) -> Self {
        if percentage > recommended * HIGH_FACTOR {
            Self::High
        } else if percentage < recommended * LOW_FACTOR {
            Self::Low
        } else {
            Self::Normal
        }
    }
}

impl std::fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Overall verdict on the savings rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsVerdict {
    /// More than 20% of income left over
    Excellent,
    /// Positive but at most 20%; should increase
    Adequate,
    /// Spending at or above income
    Overspending,
}

impl SavingsVerdict {
    pub fn for_rate(savings_rate: f64) -> Self {
        if savings_rate > HEALTHY_SAVINGS_RATE {
            Self::Excellent
        } else if savings_rate > 0.0 {
            Self::Adequate
        } else {
            Self::Overspending
        }
    }
}

/// One analyzed category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryAnalysis {
    pub category: Category,
    pub amount: f64,
    /// Share of income, in percent
    pub percentage: f64,
    /// Recommended share of income, in percent
    pub recommended: f64,
    pub status: AllocationStatus,
}

/// Full analysis of a budget with income and at least one expense
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub income: f64,
    pub total_expenses: f64,
    /// Categories with a positive amount, in display order
    pub categories: Vec<CategoryAnalysis>,
    /// Total expenses as a percentage of income
    pub expense_ratio: f64,
    /// `(income - total) / income * 100`
    pub savings_rate: f64,
    pub verdict: SavingsVerdict,
}

/// Why no report could be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Guidance {
    MissingIncome,
    MissingExpenses,
}

impl Guidance {
    pub fn message(&self) -> &'static str {
        match self {
            Self::MissingIncome => {
                "I need to know your income first to analyze your expenses. \
                 Please enter your income in the Budget Planner."
            }
            Self::MissingExpenses => {
                "I don't see any expenses entered yet. \
                 Please add your expenses in the Budget Planner for me to analyze them."
            }
        }
    }
}

/// Outcome of an analysis request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    Guidance { guidance: Guidance },
    Report(AnalysisReport),
}

impl Analysis {
    /// Chat-ready text for either outcome
    pub fn render(&self) -> String {
        match self {
            Self::Guidance { guidance } => guidance.message().to_string(),
            Self::Report(report) => report.render(),
        }
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            Self::Report(report) => Some(report),
            Self::Guidance { .. } => None,
        }
    }
}

/// Analyze expenses against the recommended allocation
pub fn analyze(income: f64, expenses: &Expenses) -> Analysis {
    if !income.is_finite() || income <= 0.0 {
        return Analysis::Guidance {
            guidance: Guidance::MissingIncome,
        };
    }

    let total_expenses = expenses.total();
    if total_expenses <= 0.0 {
        return Analysis::Guidance {
            guidance: Guidance::MissingExpenses,
        };
    }

    let categories = expenses
        .iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(category, amount)| {
            let percentage = amount / income * 100.0;
            let recommended = category.recommended_percentage();
            CategoryAnalysis {
                category,
                amount,
                percentage,
                recommended,
                status: AllocationStatus::classify(percentage, recommended),
            }
        })
        .collect();

    let savings_rate = (income - total_expenses) / income * 100.0;

    Analysis::Report(AnalysisReport {
        income,
        total_expenses,
        categories,
        expense_ratio: total_expenses / income * 100.0,
        savings_rate,
        verdict: SavingsVerdict::for_rate(savings_rate),
    })
}

impl AnalysisReport {
    /// True when at least one category is above its recommended range
    pub fn needs_attention(&self) -> bool {
        self.categories
            .iter()
            .any(|c| c.status == AllocationStatus::High)
    }

    pub fn category(&self, category: Category) -> Option<&CategoryAnalysis> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// Render as the multi-line chat reply
    pub fn render(&self) -> String {
        let mut out = String::from("Here's my analysis of your expenses:\n\n");

        for item in &self.categories {
            out.push_str(&format!(
                "• {}: {:.1}% of income",
                item.category.label(),
                item.percentage
            ));
            out.push_str(&match item.status {
                AllocationStatus::High => {
                    format!(" (Higher than the recommended {:.0}%)\n", item.recommended)
                }
                AllocationStatus::Low => format!(
                    " (Lower than the typical {:.0}%, which is great!)\n",
                    item.recommended
                ),
                AllocationStatus::Normal => {
                    format!(" (Within the typical range of {:.0}%)\n", item.recommended)
                }
            });
        }

        out.push_str(&format!(
            "\nYour total expenses are {:.1}% of your income, ",
            self.expense_ratio
        ));

        match self.verdict {
            SavingsVerdict::Excellent => out.push_str(&format!(
                "leaving a savings rate of {:.1}%, which is excellent! \
                 Financial experts recommend saving at least 20% of your income.",
                self.savings_rate
            )),
            SavingsVerdict::Adequate => out.push_str(&format!(
                "giving you a savings rate of {:.1}%. \
                 Aim to increase this to at least 20% for long-term financial health.",
                self.savings_rate
            )),
            SavingsVerdict::Overspending => out.push_str(
                "which means you're spending more than you earn. \
                 This is unsustainable and needs immediate attention.",
            ),
        }

        if self.needs_attention() {
            out.push_str(
                "\n\nWould you like specific tips on how to reduce your expenses in certain categories?",
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(analysis: Analysis) -> AnalysisReport {
        match analysis {
            Analysis::Report(report) => report,
            Analysis::Guidance { guidance } => panic!("expected report, got {:?}", guidance),
        }
    }

    #[test]
    fn test_rent_high_food_normal_excellent_savings() {
        let expenses = Expenses::new()
            .with(Category::Rent, 1600.0)
            .with(Category::Food, 400.0);
        let report = report(analyze(4000.0, &expenses));

        assert_eq!(report.categories.len(), 2);

        let rent = report.category(Category::Rent).unwrap();
        assert_eq!(rent.percentage, 40.0);
        assert_eq!(rent.recommended, 30.0);
        assert_eq!(rent.status, AllocationStatus::High);

        let food = report.category(Category::Food).unwrap();
        assert_eq!(food.percentage, 10.0);
        assert_eq!(food.status, AllocationStatus::Normal);

        assert_eq!(report.savings_rate, 50.0);
        assert_eq!(report.expense_ratio, 50.0);
        assert_eq!(report.verdict, SavingsVerdict::Excellent);
        assert!(report.needs_attention());
    }

    #[test]
    fn test_zero_income_guard() {
        let expenses = Expenses::new().with(Category::Rent, 1600.0);
        assert_eq!(
            analyze(0.0, &expenses),
            Analysis::Guidance {
                guidance: Guidance::MissingIncome
            }
        );
        assert_eq!(
            analyze(0.0, &Expenses::new()),
            Analysis::Guidance {
                guidance: Guidance::MissingIncome
            }
        );
    }

    #[test]
    fn test_no_expenses_guard() {
        let analysis = analyze(4000.0, &Expenses::new());
        assert_eq!(
            analysis,
            Analysis::Guidance {
                guidance: Guidance::MissingExpenses
            }
        );
        assert!(analysis.render().contains("don't see any expenses"));
    }

    #[test]
    fn test_classification_bounds() {
        // Rent 30%: high above 36, low below 24
        assert_eq!(AllocationStatus::classify(36.0, 30.0), AllocationStatus::Normal);
        assert_eq!(AllocationStatus::classify(36.5, 30.0), AllocationStatus::High);
        assert_eq!(AllocationStatus::classify(24.0, 30.0), AllocationStatus::Normal);
        assert_eq!(AllocationStatus::classify(23.9, 30.0), AllocationStatus::Low);
    }

    #[test]
    fn test_classification_uses_unrounded_percentage() {
        // 36.04% renders as "36.0%" but is still above the 36% cutoff
        let expenses = Expenses::new().with(Category::Rent, 360.4);
        let analysis = analyze(1000.0, &expenses);
        let rent = analysis.report().unwrap().category(Category::Rent).unwrap();
        assert_eq!(rent.status, AllocationStatus::High);
        assert!(analysis
            .render()
            .contains("• Rent: 36.0% of income (Higher than the recommended 30%)"));

        let expenses = Expenses::new().with(Category::Rent, 360.0);
        let report = report(analyze(1000.0, &expenses));
        assert_eq!(
            report.category(Category::Rent).unwrap().status,
            AllocationStatus::Normal
        );
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(SavingsVerdict::for_rate(20.1), SavingsVerdict::Excellent);
        assert_eq!(SavingsVerdict::for_rate(20.0), SavingsVerdict::Adequate);
        assert_eq!(SavingsVerdict::for_rate(0.5), SavingsVerdict::Adequate);
        assert_eq!(SavingsVerdict::for_rate(0.0), SavingsVerdict::Overspending);
        assert_eq!(SavingsVerdict::for_rate(-35.0), SavingsVerdict::Overspending);
    }

    #[test]
    fn test_render_report_text() {
        let expenses = Expenses::new()
            .with(Category::Rent, 1600.0)
            .with(Category::Food, 400.0);
        let text = analyze(4000.0, &expenses).render();

        assert!(text.starts_with("Here's my analysis of your expenses:\n\n"));
        assert!(text.contains("• Rent: 40.0% of income (Higher than the recommended 30%)\n"));
        assert!(text.contains("• Food: 10.0% of income (Within the typical range of 15%)\n"));
        assert!(text.contains("Your total expenses are 50.0% of your income"));
        assert!(text.contains("savings rate of 50.0%, which is excellent!"));
        assert!(text.ends_with("in certain categories?"));
    }

    #[test]
    fn test_render_overspending_text() {
        let expenses = Expenses::new()
            .with(Category::Food, 100.0)
            .with(Category::Others, 2000.0);
        let analysis = analyze(2000.0, &expenses);
        let report = analysis.report().unwrap();

        assert_eq!(report.verdict, SavingsVerdict::Overspending);
        assert_eq!(
            report.category(Category::Food).unwrap().status,
            AllocationStatus::Low
        );

        let text = analysis.render();
        assert!(text.contains("• Food: 5.0% of income (Lower than the typical 15%, which is great!)"));
        assert!(text.contains("spending more than you earn"));
        // Others is 100% of income, so the reduction question is asked
        assert!(text.ends_with("in certain categories?"));
    }

    #[test]
    fn test_adequate_rate_text() {
        let expenses = Expenses::new()
            .with(Category::Rent, 300.0)
            .with(Category::Food, 150.0)
            .with(Category::Transportation, 100.0)
            .with(Category::Utilities, 100.0)
            .with(Category::Entertainment, 50.0)
            .with(Category::Others, 200.0);
        let analysis = analyze(1000.0, &expenses);
        let report = analysis.report().unwrap();

        assert_eq!(report.verdict, SavingsVerdict::Adequate);
        assert_eq!(
            report.category(Category::Rent).unwrap().status,
            AllocationStatus::Normal
        );
        assert_eq!(
            report.category(Category::Others).unwrap().status,
            AllocationStatus::High
        );
        assert!(report.needs_attention());
        assert!(analysis
            .render()
            .contains("giving you a savings rate of 10.0%. Aim to increase"));
    }
}
