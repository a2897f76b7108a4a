use crate::model::{BudgetEntry, Transaction, TransactionType};
use crate::report::{BudgetProgress, Report};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::fmt::Write;

/// Width of a progress bar in characters.
const BAR_CHARS: usize = 20;

/// The `YYYY-MM` month containing `now`.
pub fn current_month(now: DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

/// A rendered snapshot of one month.
#[derive(Debug, Clone)]
pub struct Dashboard {
    report: Report,
    currency: String,
}

impl Dashboard {
    pub fn new(
        transactions: &[Transaction],
        budgets: &[BudgetEntry],
        month: &str,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            report: Report::new(transactions, budgets, month),
            currency: currency.into(),
        }
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = self.write_to(&mut out);
        out
    }

    fn write_to(&self, out: &mut String) -> std::fmt::Result {
        let c = &self.currency;
        let report = &self.report;
        writeln!(out, "Dashboard ({})", report.month())?;
        writeln!(out)?;
        writeln!(out, "  Income   {c}{}", report.total_income().fixed(2))?;
        writeln!(out, "  Expense  {c}{}", report.total_expense().fixed(2))?;
        writeln!(out)?;

        writeln!(out, "Monthly Budgets")?;
        if report.groups().is_empty() {
            writeln!(out, "  No budgets defined.")?;
        }
        for group in report.groups() {
            writeln!(out, "  {}", group.category().to_uppercase())?;
            for line in group.lines() {
                self.write_progress(out, line)?;
            }
        }
        writeln!(out)?;

        writeln!(out, "Transactions ({})", report.month())?;
        if report.transactions().is_empty() {
            writeln!(out, "  No transactions in this month.")?;
        }
        for t in report.transactions().iter().rev() {
            writeln!(out, "  {}", self.transaction_line(t))?;
        }
        Ok(())
    }

    fn write_progress(&self, out: &mut String, line: &BudgetProgress) -> std::fmt::Result {
        let c = &self.currency;
        writeln!(
            out,
            "    {:<16} {c}{} / {c}{}",
            line.sub_category(),
            line.spent(),
            line.budget().normalize()
        )?;
        let marker = if line.is_over_budget() { " OVER" } else { "" };
        writeln!(
            out,
            "    {}{marker}  {}% used  Remaining: {c}{}",
            bar(line),
            line.percent_used().fixed(0),
            line.remaining().fixed(0)
        )
    }

    fn transaction_line(&self, t: &Transaction) -> String {
        let description = if t.description().is_empty() {
            "Expense"
        } else {
            t.description()
        };
        let sign = if t.transaction_type() == Some(TransactionType::Credit) {
            '+'
        } else {
            '-'
        };
        let mut tags = t.category().to_string();
        if !t.sub_category().is_empty() {
            tags.push_str(" / ");
            tags.push_str(t.sub_category());
        }
        format!(
            "{}  {:<24} {:<24} {sign}{}{}",
            t.date(),
            description,
            tags,
            self.currency,
            t.amount()
        )
    }
}

/// Draws `[####....]` filled to the clamped bar width. A `NaN` width draws an empty bar.
fn bar(line: &BudgetProgress) -> String {
    let filled = line
        .bar_width()
        .value()
        .and_then(|w| (w * Decimal::from(BAR_CHARS) / Decimal::ONE_HUNDRED).round().to_usize())
        .unwrap_or(0)
        .min(BAR_CHARS);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_CHARS - filled))
}
