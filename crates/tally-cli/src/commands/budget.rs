//! Budget command implementations (show, set, target, theme, reset, analyze)

use std::path::Path;

use anyhow::Result;
use tally_core::analyze;
use tally_core::format::format_percent;
use tally_core::input::FeedbackLevel;
use tally_core::Category;

use super::{open_session, start_session, Field};

pub fn cmd_show(data_dir: Option<&Path>) -> Result<()> {
    let mut session = open_session(data_dir)?;
    start_session(&mut session);

    println!();
    println!("💰 Tally Budget");
    println!("   ─────────────────────────────────────────────────────────────");

    let calculation = session.calculate();

    let warnings: Vec<String> = Category::all()
        .iter()
        .filter_map(|category| {
            let feedback = session.expense_feedback(*category);
            match feedback.level {
                FeedbackLevel::Danger => Some(format!(
                    "{} takes {} of income",
                    category.label(),
                    format_percent(feedback.fill)
                )),
                _ => None,
            }
        })
        .collect();

    println!();
    if calculation.income_missing {
        println!("   Enter your income first: tally set income <amount>");
    } else if calculation.balanced {
        println!("   🎉 Your budget is balanced!");
    }
    for warning in warnings {
        println!("   ⚠️  {}", warning);
    }
    println!("   Theme: {}", session.theme());
    println!();

    session.shutdown();
    Ok(())
}

pub fn cmd_set(data_dir: Option<&Path>, field: &str, value: &str) -> Result<()> {
    let field: Field = field.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let mut session = open_session(data_dir)?;
    start_session(&mut session);

    let sanitized = match field {
        Field::Income => session.edit_income(value),
        Field::Expense(category) => session.edit_expense(category, value),
    };

    let label = match field {
        Field::Income => "Income".to_string(),
        Field::Expense(category) => category.label().to_string(),
    };
    println!();
    if sanitized.value.is_empty() {
        println!("✅ {} cleared", label);
    } else {
        println!("✅ {} set to {}", label, sanitized.value);
    }

    session.shutdown();
    Ok(())
}

pub fn cmd_target(data_dir: Option<&Path>, value: &str) -> Result<()> {
    let mut session = open_session(data_dir)?;
    start_session(&mut session);

    let sanitized = session.edit_savings_target(value);
    if sanitized.value.is_empty() {
        println!("✅ Savings target cleared");
    } else {
        println!("✅ Savings target set to {}", sanitized.value);
    }

    session.shutdown();
    Ok(())
}

pub fn cmd_theme(data_dir: Option<&Path>) -> Result<()> {
    let mut session = open_session(data_dir)?;
    start_session(&mut session);
    session.toggle_theme();
    session.shutdown();
    Ok(())
}

pub fn cmd_reset(data_dir: Option<&Path>) -> Result<()> {
    let mut session = open_session(data_dir)?;
    start_session(&mut session);
    session.reset();
    println!();
    println!("✅ Budget cleared");
    session.shutdown();
    Ok(())
}

pub fn cmd_analyze(data_dir: Option<&Path>) -> Result<()> {
    let mut session = open_session(data_dir)?;
    session.start();

    let input = session.budget_input();
    let analysis = analyze(input.income, &input.expenses);

    println!();
    println!("{}", analysis.render());
    println!();
    Ok(())
}
