use thiserror::Error;

use crate::domain::{Category, ParseCentsError, TransactionType};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please enter a valid date (YYYY-MM-DD): {0}")]
    InvalidDate(String),

    #[error("Please enter a transaction name")]
    EmptyName,

    #[error("Please enter a valid amount greater than 0: {0}")]
    InvalidAmount(String),

    #[error("Please select a category")]
    MissingCategory,

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unknown transaction type: {0} (expected income or expense)")]
    UnknownTransactionType(String),

    #[error("Category '{category}' is not valid for {transaction_type} transactions")]
    CategoryMismatch {
        category: Category,
        transaction_type: TransactionType,
    },

    #[error("No transactions to export")]
    NothingToExport,

    // Display renders the whole anyhow chain, so no source is exposed.
    #[error("Export failed: {0:#}")]
    Export(anyhow::Error),

    #[error("Storage error: {0:#}")]
    Persistence(anyhow::Error),
}

impl AppError {
    /// True for errors caused by bad user input, as opposed to storage problems.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            AppError::NothingToExport | AppError::Export(_) | AppError::Persistence(_)
        )
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Persistence(err)
    }
}

impl From<ParseCentsError> for AppError {
    fn from(err: ParseCentsError) -> Self {
        AppError::InvalidAmount(err.to_string())
    }
}
