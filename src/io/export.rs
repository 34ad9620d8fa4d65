use anyhow::Result;
use std::io::Write;

use crate::domain::{Ledger, Transaction, format_cents};

/// Date format used in CSV exports, e.g. "Jan 5, 2024".
pub const EXPORT_DATE_FORMAT: &str = "%b %-d, %Y";

pub const CSV_HEADER: [&str; 5] = ["Date", "Name", "Category", "Type", "Amount"];

/// Exporter for writing the full ledger in various formats.
/// Every export covers all transactions in ledger order, regardless of month.
pub struct Exporter<'a> {
    ledger: &'a Ledger,
}

impl<'a> Exporter<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self { ledger }
    }

    /// Export transactions to CSV: `Date,Name,Category,Type,Amount`.
    /// Text fields are quoted, so names and the comma in the date stay intact.
    pub fn export_csv<W: Write>(&self, mut writer: W) -> Result<usize> {
        writeln!(writer, "{}", CSV_HEADER.join(","))?;
        let mut csv_writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::NonNumeric)
            .from_writer(writer);

        let mut count = 0;
        for transaction in self.ledger.transactions() {
            csv_writer.write_record(csv_row(transaction))?;
            count += 1;
        }

        csv_writer.flush()?;
        Ok(count)
    }

    /// Export transactions as the same JSON array that is persisted.
    pub fn export_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        serde_json::to_writer_pretty(&mut writer, self.ledger)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(self.ledger.len())
    }
}

fn csv_row(transaction: &Transaction) -> [String; 5] {
    [
        transaction.date.format(EXPORT_DATE_FORMAT).to_string(),
        transaction.name.clone(),
        transaction.category.label(),
        transaction.transaction_type.as_str().to_string(),
        format_cents(transaction.amount),
    ]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::{Category, TransactionType};

    fn sample_ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.add(Transaction::new(
            "Salary",
            500000,
            Category::Salary,
            TransactionType::Income,
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        ));
        ledger.add(Transaction::new(
            "Groceries, weekly",
            15050,
            Category::Food,
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 2, 16).unwrap(),
        ));
        ledger
    }

    #[test]
    fn test_export_csv() {
        let ledger = sample_ledger();
        let mut out = Vec::new();

        let count = Exporter::new(&ledger).export_csv(&mut out).unwrap();

        assert_eq!(count, 2);
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Name,Category,Type,Amount",
                r#""Feb 16, 2024","Groceries, weekly","Food","expense",150.50"#,
                r#""Jan 5, 2024","Salary","Salary","income",5000.00"#,
            ]
        );
    }

    #[test]
    fn test_export_csv_escapes_quotes() {
        let mut ledger = Ledger::new();
        ledger.add(Transaction::new(
            r#"The "big" shop"#,
            100,
            Category::Shopping,
            TransactionType::Expense,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        ));
        let mut out = Vec::new();

        Exporter::new(&ledger).export_csv(&mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(r#""The ""big"" shop""#));
    }

    #[test]
    fn test_export_json_matches_ledger() {
        let ledger = sample_ledger();
        let mut out = Vec::new();

        let count = Exporter::new(&ledger).export_json(&mut out).unwrap();

        assert_eq!(count, 2);
        let restored: Ledger = serde_json::from_slice(&out).unwrap();
        assert_eq!(restored, ledger);
    }
}
