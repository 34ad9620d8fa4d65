use std::io::Write;

use crate::config::Config;
use crate::domain::{
    Ledger, Transaction, TransactionFilter, TransactionId, YearMonth, filter_transactions,
};
use crate::io::Exporter;
use crate::storage::Repository;

use super::{AppError, MonthlyReport, TransactionInput};

/// Result of a ledger mutation.
///
/// The in-memory change has always been applied. `save_error` is set when the
/// snapshot could not be written afterwards; the change is kept regardless.
#[derive(Debug)]
pub struct Mutation<T> {
    pub value: T,
    pub save_error: Option<AppError>,
}

impl<T> Mutation<T> {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }
}

/// Application service owning the ledger and its storage.
/// This is the primary interface for any client (CLI, TUI, etc.).
pub struct LedgerService {
    ledger: Ledger,
    repo: Repository,
}

impl LedgerService {
    /// Create a service from an already loaded ledger and a repository.
    pub fn new(ledger: Ledger, repo: Repository) -> Self {
        Self { ledger, repo }
    }

    /// Open (creating if needed) the database described by `config` and load the ledger.
    ///
    /// A stored snapshot that cannot be read is logged and replaced by an empty ledger.
    pub async fn open(config: &Config) -> Result<Self, AppError> {
        let repo = Repository::init(&config.database_url())
            .await?
            .with_quota(config.storage_quota);

        let ledger = match repo.load_transactions().await {
            Ok(transactions) => Ledger::from_transactions(transactions),
            Err(e) => {
                tracing::error!(
                    error = %format!("{:#}", e),
                    database = %config.database.display(),
                    "could not load transactions, starting with an empty ledger"
                );
                Ledger::new()
            }
        };

        tracing::info!(count = ledger.len(), "ledger opened");
        Ok(Self::new(ledger, repo))
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    // ========================
    // Mutations
    // ========================

    /// Validate `input` and record it as the newest transaction.
    /// Invalid input is rejected without touching the ledger.
    pub async fn add_transaction(
        &mut self,
        input: &TransactionInput,
    ) -> Result<Mutation<Transaction>, AppError> {
        let transaction = input.validate()?;
        self.ledger.add(transaction.clone());
        tracing::info!(
            id = %transaction.id,
            amount = transaction.amount,
            category = %transaction.category,
            "transaction added"
        );

        let save_error = self.persist().await;
        Ok(Mutation {
            value: transaction,
            save_error,
        })
    }

    /// Remove a transaction by id. Unknown ids change nothing and are not saved.
    pub async fn remove_transaction(
        &mut self,
        id: TransactionId,
    ) -> Mutation<Option<Transaction>> {
        let removed = self.ledger.remove(id);
        let save_error = match &removed {
            Some(_) => {
                tracing::info!(%id, "transaction removed");
                self.persist().await
            }
            None => {
                tracing::debug!(%id, "no transaction to remove");
                None
            }
        };

        Mutation {
            value: removed,
            save_error,
        }
    }

    /// Remove every transaction.
    pub async fn clear(&mut self) -> Mutation<usize> {
        let count = self.ledger.clear();
        tracing::info!(count, "ledger cleared");

        let save_error = self.persist().await;
        Mutation {
            value: count,
            save_error,
        }
    }

    async fn persist(&self) -> Option<AppError> {
        match self.repo.save_transactions(self.ledger.transactions()).await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "failed to save transactions");
                Some(AppError::Persistence(e))
            }
        }
    }

    // ========================
    // Queries
    // ========================

    pub fn month_transactions(&self, month: YearMonth) -> Vec<Transaction> {
        self.ledger.transactions_in_month(month)
    }

    /// Month transactions matching `filter`, newest first.
    pub fn filtered_transactions(
        &self,
        month: YearMonth,
        filter: &TransactionFilter,
    ) -> Vec<Transaction> {
        filter_transactions(&self.month_transactions(month), filter)
    }

    /// Totals, breakdowns and recent entries for `month`. Not affected by filters.
    pub fn monthly_report(&self, month: YearMonth) -> MonthlyReport {
        MonthlyReport::build(month, &self.month_transactions(month))
    }

    // ========================
    // Export
    // ========================

    /// Write every transaction as CSV. Returns the number of rows.
    pub fn export_csv<W: Write>(&self, writer: W) -> Result<usize, AppError> {
        self.ensure_exportable()?;
        Exporter::new(&self.ledger)
            .export_csv(writer)
            .map_err(AppError::Export)
    }

    /// Write every transaction as a JSON array. Returns the number of entries.
    pub fn export_json<W: Write>(&self, writer: W) -> Result<usize, AppError> {
        self.ensure_exportable()?;
        Exporter::new(&self.ledger)
            .export_json(writer)
            .map_err(AppError::Export)
    }

    /// Fails with `NothingToExport` on an empty ledger.
    /// Callers check this before opening an output file.
    pub fn ensure_exportable(&self) -> Result<(), AppError> {
        if self.ledger.is_empty() {
            return Err(AppError::NothingToExport);
        }
        Ok(())
    }
}
