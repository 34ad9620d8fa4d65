use serde::Serialize;

use crate::domain::{
    CategoryTotal, Transaction, Totals, TypeTotal, YearMonth, category_breakdown, compute_totals,
    type_breakdown,
};

/// How many of a month's newest transactions the summary lists.
pub const RECENT_LIMIT: usize = 5;

/// Everything the month view shows.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: YearMonth,
    pub totals: Totals,
    pub categories: Vec<CategoryTotal>,
    pub types: [TypeTotal; 2],
    pub recent: Vec<Transaction>,
    pub transaction_count: usize,
}

impl MonthlyReport {
    /// Build the report from the month's transactions (newest first).
    pub fn build(month: YearMonth, transactions: &[Transaction]) -> Self {
        Self {
            month,
            totals: compute_totals(transactions),
            categories: category_breakdown(transactions),
            types: type_breakdown(transactions),
            recent: transactions.iter().take(RECENT_LIMIT).cloned().collect(),
            transaction_count: transactions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Share of the largest category, in percent, for drawing bars.
    pub fn category_share(&self, total: &CategoryTotal) -> f64 {
        let max = self.categories.first().map(|c| c.amount).unwrap_or(0);
        if max > 0 {
            total.amount as f64 / max as f64 * 100.0
        } else {
            0.0
        }
    }
}
