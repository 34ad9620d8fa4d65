use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Cents;

pub type TransactionId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money coming in
    Income,
    /// Money going out
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Income, TransactionType::Expense];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }

    /// Categories a transaction of this type may be filed under.
    pub fn categories(&self) -> &'static [Category] {
        match self {
            TransactionType::Income => &Category::INCOME,
            TransactionType::Expense => &Category::EXPENSE,
        }
    }
}

impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Salary,
    Freelance,
    Investment,
    Food,
    Transport,
    Entertainment,
    Shopping,
    Bills,
    Healthcare,
    Education,
    /// Shared by both income and expense transactions
    Other,
}

impl Category {
    pub const INCOME: [Category; 4] = [
        Category::Salary,
        Category::Freelance,
        Category::Investment,
        Category::Other,
    ];

    pub const EXPENSE: [Category; 8] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Shopping,
        Category::Bills,
        Category::Healthcare,
        Category::Education,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Salary => "salary",
            Category::Freelance => "freelance",
            Category::Investment => "investment",
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Entertainment => "entertainment",
            Category::Shopping => "shopping",
            Category::Bills => "bills",
            Category::Healthcare => "healthcare",
            Category::Education => "education",
            Category::Other => "other",
        }
    }

    /// Capitalized name used in listings and exports ("Food", "Salary").
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn is_valid_for(&self, transaction_type: TransactionType) -> bool {
        transaction_type.categories().contains(self)
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Category::INCOME
            .iter()
            .chain(Category::EXPENSE.iter())
            .find(|c| c.as_str() == normalized)
            .copied()
            .ok_or(UnknownVariant(normalized))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Returned when a category or transaction type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

/// A single recorded income or expense.
/// Transactions are never edited in place; a correction is a delete plus a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub name: String,
    /// Amount in cents (always positive, the sign comes from `transaction_type`)
    pub amount: Cents,
    pub category: Category,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Calendar day the transaction happened on
    pub date: NaiveDate,
}

impl Transaction {
    /// Create a new transaction with a fresh id.
    pub fn new(
        name: impl Into<String>,
        amount: Cents,
        category: Category,
        transaction_type: TransactionType,
        date: NaiveDate,
    ) -> Self {
        assert!(amount > 0, "Transaction amount must be positive");
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount,
            category,
            transaction_type,
            date,
        }
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    /// Amount with the sign applied: positive for income, negative for expenses.
    pub fn signed_amount(&self) -> Cents {
        match self.transaction_type {
            TransactionType::Income => self.amount,
            TransactionType::Expense => -self.amount,
        }
    }
}
