// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use pocketbook::Config;
use pocketbook::application::{LedgerService, TransactionInput};
use pocketbook::domain::{Transaction, YearMonth};
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = LedgerService::open(&test_config(&temp_dir)).await?;
    Ok((service, temp_dir))
}

/// Config pointing at `test.db` inside `temp_dir`, without a storage quota
pub fn test_config(temp_dir: &TempDir) -> Config {
    Config::new(db_path(temp_dir)).with_storage_quota(None)
}

pub fn db_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("test.db")
}

pub fn month(year: i32, month: u32) -> YearMonth {
    YearMonth::new(year, month).unwrap()
}

/// Build raw input the way the CLI would
pub fn input(name: &str, amount: &str, category: &str, kind: &str, date: &str) -> TransactionInput {
    TransactionInput {
        name: name.to_string(),
        amount: amount.to_string(),
        category: category.to_string(),
        transaction_type: kind.to_string(),
        date: date.to_string(),
    }
}

/// Add a transaction that must validate and save
pub async fn add(
    service: &mut LedgerService,
    name: &str,
    amount: &str,
    category: &str,
    kind: &str,
    date: &str,
) -> Result<Transaction> {
    let result = service
        .add_transaction(&input(name, amount, category, kind, date))
        .await?;
    assert!(result.is_saved(), "unexpected save error: {:?}", result.save_error);
    Ok(result.value)
}

/// The salary + groceries scenario used across tests
pub async fn january_scenario(service: &mut LedgerService) -> Result<(Transaction, Transaction)> {
    let salary = add(service, "Salary", "5000", "salary", "income", "2024-01-05").await?;
    let groceries = add(service, "Groceries", "150", "food", "expense", "2024-01-06").await?;
    Ok((salary, groceries))
}
