use chrono::NaiveDate;

use crate::domain::{
    Category, MAX_AMOUNT, Transaction, TransactionType, format_amount, parse_cents,
};

use super::AppError;

/// Raw, unvalidated fields for a new transaction, as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct TransactionInput {
    pub name: String,
    pub amount: String,
    pub category: String,
    pub transaction_type: String,
    /// YYYY-MM-DD
    pub date: String,
}

impl TransactionInput {
    /// Check every field and build a transaction with a fresh id.
    ///
    /// Fields are checked in order (date, name, amount, category, type) and
    /// the first failure is returned.
    pub fn validate(&self) -> Result<Transaction, AppError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| AppError::InvalidDate(format!("'{}': {}", self.date, e)))?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::EmptyName);
        }

        let amount = parse_cents(&self.amount)?;
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "'{}' is not positive",
                self.amount.trim()
            )));
        }
        if amount > MAX_AMOUNT {
            return Err(AppError::InvalidAmount(format!(
                "'{}' is larger than the maximum of {}",
                self.amount.trim(),
                format_amount(MAX_AMOUNT)
            )));
        }

        if self.category.trim().is_empty() {
            return Err(AppError::MissingCategory);
        }
        let category: Category = self
            .category
            .parse()
            .map_err(|_| AppError::UnknownCategory(self.category.trim().to_string()))?;

        let transaction_type: TransactionType = self
            .transaction_type
            .parse()
            .map_err(|_| AppError::UnknownTransactionType(self.transaction_type.clone()))?;

        if !category.is_valid_for(transaction_type) {
            return Err(AppError::CategoryMismatch {
                category,
                transaction_type,
            });
        }

        Ok(Transaction::new(
            name,
            amount,
            category,
            transaction_type,
            date,
        ))
    }
}
