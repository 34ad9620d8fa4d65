use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::{LedgerService, MonthlyReport, Mutation, TransactionInput};
use crate::config::{Config, DEFAULT_DATABASE, DEFAULT_STORAGE_QUOTA};
use crate::domain::{
    Category, Transaction, TransactionFilter, TransactionType, YearMonth, format_amount,
};

/// Pocketbook - Income & Expense Tracker
#[derive(Parser)]
#[command(name = "pocketbook")]
#[command(about = "A local-first tracker for income and expenses")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "POCKETBOOK_DB", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// Largest stored snapshot in bytes (0 disables the limit)
    #[arg(long, env = "POCKETBOOK_STORAGE_QUOTA", default_value_t = DEFAULT_STORAGE_QUOTA)]
    pub storage_quota: usize,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database if needed and show how many transactions it holds
    Init,

    /// Record a new income or expense
    Add {
        /// Short description (e.g., "Groceries")
        name: String,

        /// Amount (e.g., "50.00" or "50")
        amount: String,

        /// Category (see `pocketbook categories`)
        #[arg(short, long)]
        category: String,

        /// Transaction type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        transaction_type: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Remove {
        /// Transaction ID
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every transaction
    Clear {
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// List a month's transactions
    List {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Move this many months forwards or backwards from --month
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,

        /// Only names containing this text (case-insensitive)
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only this type: income or expense
        #[arg(short = 't', long = "type")]
        transaction_type: Option<String>,
    },

    /// Show totals and breakdowns for a month
    Summary {
        /// Month to show (YYYY-MM, defaults to the current month)
        #[arg(short, long)]
        month: Option<String>,

        /// Move this many months forwards or backwards from --month
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        offset: i32,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// List the categories available for each type
    Categories,

    /// Export all transactions
    Export {
        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Settings for opening the ledger.
    pub fn config(&self) -> Config {
        let quota = (self.storage_quota > 0).then_some(self.storage_quota);
        Config::new(self.database.clone()).with_storage_quota(quota)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.config();
        let mut service = LedgerService::open(&config)
            .await
            .with_context(|| format!("Could not open {}", config.database.display()))?;

        match self.command {
            Commands::Init => {
                println!(
                    "Database ready: {} ({} transaction{})",
                    config.database.display(),
                    service.ledger().len(),
                    plural(service.ledger().len())
                );
            }

            Commands::Add {
                name,
                amount,
                category,
                transaction_type,
                date,
            } => {
                let input = TransactionInput {
                    name,
                    amount,
                    category,
                    transaction_type,
                    date: date.unwrap_or_else(|| Local::now().date_naive().to_string()),
                };

                let result = service.add_transaction(&input).await?;
                let tx = &result.value;
                println!(
                    "Added {}: {} {} ({})",
                    tx.transaction_type,
                    tx.name,
                    format_signed(tx),
                    tx.id
                );
                report_save_error(&result);
                print_month_line(&service.monthly_report(YearMonth::of(tx.date)));
            }

            Commands::Remove { id, yes } => {
                let id =
                    Uuid::parse_str(&id).context("Invalid transaction ID format (expected UUID)")?;

                let Some(existing) = service.ledger().get(id).cloned() else {
                    println!("No transaction with ID {}", id);
                    return Ok(());
                };
                if !yes
                    && !confirm(&format!(
                        "Delete '{}' ({})?",
                        existing.name,
                        format_signed(&existing)
                    ))?
                {
                    println!("Cancelled.");
                    return Ok(());
                }

                let result = service.remove_transaction(id).await;
                if let Some(removed) = &result.value {
                    println!("Removed: {} ({})", removed.name, removed.id);
                }
                report_save_error(&result);
                print_month_line(&service.monthly_report(YearMonth::of(existing.date)));
            }

            Commands::Clear { yes } => {
                if !yes && !confirm("Delete ALL transactions? This cannot be undone.")? {
                    println!("Cancelled.");
                    return Ok(());
                }

                let result = service.clear().await;
                println!(
                    "Cleared {} transaction{}",
                    result.value,
                    plural(result.value)
                );
                report_save_error(&result);
            }

            Commands::List {
                month,
                offset,
                search,
                category,
                transaction_type,
            } => {
                let month = resolve_month(month.as_deref(), offset)?;
                let filter = TransactionFilter {
                    search,
                    category: category
                        .as_deref()
                        .map(str::parse::<Category>)
                        .transpose()
                        .context("Invalid category filter")?,
                    transaction_type: transaction_type
                        .as_deref()
                        .map(str::parse::<TransactionType>)
                        .transpose()
                        .context("Invalid type filter")?,
                };
                run_list_command(&service, month, &filter);
            }

            Commands::Summary {
                month,
                offset,
                format,
            } => {
                let month = resolve_month(month.as_deref(), offset)?;
                let report = service.monthly_report(month);
                match format.as_str() {
                    "table" => print_report(&report),
                    "json" => println!("{}", serde_json::to_string_pretty(&report)?),
                    other => bail!("Unknown format '{}'. Use table or json", other),
                }
            }

            Commands::Export { format, output } => {
                run_export_command(&service, &format, output)?;
            }

            Commands::Categories => print_categories(),
        }

        Ok(())
    }
}

fn run_list_command(service: &LedgerService, month: YearMonth, filter: &TransactionFilter) {
    let transactions = service.filtered_transactions(month, filter);

    println!(
        "{} - {} transaction{}",
        month.label(),
        transactions.len(),
        plural(transactions.len())
    );
    if transactions.is_empty() {
        println!("No transactions found.");
        return;
    }

    println!();
    print_transaction_table(&transactions);
}

fn run_export_command(
    service: &LedgerService,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    // Refuse before File::create truncates an existing file
    service.ensure_exportable()?;

    let writer: Box<dyn Write> = match &output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };

    let count = match format {
        "csv" => service.export_csv(writer)?,
        "json" => service.export_json(writer)?,
        other => bail!("Unknown export format '{}'. Use csv or json", other),
    };

    if let Some(path) = output {
        eprintln!(
            "Exported {} transaction{} to {}",
            count,
            plural(count),
            path.display()
        );
    }
    Ok(())
}

fn resolve_month(month: Option<&str>, offset: i32) -> Result<YearMonth> {
    let base = match month {
        Some(s) => s.parse::<YearMonth>()?,
        None => YearMonth::current(),
    };
    base.shift(offset)
        .with_context(|| format!("Month {} shifted by {} is out of range", base, offset))
}

fn print_categories() {
    for transaction_type in TransactionType::ALL {
        let names: Vec<&str> = transaction_type
            .categories()
            .iter()
            .map(|c| c.as_str())
            .collect();
        println!("{:<8} {}", transaction_type.as_str(), names.join(", "));
    }
}

fn print_transaction_table(transactions: &[Transaction]) {
    println!(
        "{:<12} {:<24} {:<14} {:>14}  ID",
        "DATE", "NAME", "CATEGORY", "AMOUNT"
    );
    println!("{}", "-".repeat(104));
    for tx in transactions {
        println!(
            "{:<12} {:<24} {:<14} {:>14}  {}",
            tx.date.format("%Y-%m-%d"),
            truncate(&tx.name, 24),
            tx.category.label(),
            format_signed(tx),
            tx.id
        );
    }
}

fn print_month_line(report: &MonthlyReport) {
    println!(
        "{}: income {} | expenses {} | balance {} ({} transaction{})",
        report.month.label(),
        format_amount(report.totals.income),
        format_amount(report.totals.expenses),
        format_amount(report.totals.balance),
        report.transaction_count,
        plural(report.transaction_count)
    );
}

fn print_report(report: &MonthlyReport) {
    const BAR_WIDTH: f64 = 20.0;

    println!("{}", report.month.label());
    println!("{}", "=".repeat(40));
    println!("Income:   {:>15}", format_amount(report.totals.income));
    println!("Expenses: {:>15}", format_amount(report.totals.expenses));
    println!("{}", "-".repeat(25));
    println!("Balance:  {:>15}", format_amount(report.totals.balance));

    if report.is_empty() {
        println!();
        println!("No transactions this month.");
        return;
    }

    println!();
    println!("By category:");
    for total in &report.categories {
        let width = (report.category_share(total) / 100.0 * BAR_WIDTH).round() as usize;
        println!(
            "  {:<14} {:<20} {:>14}",
            total.category.label(),
            "#".repeat(width.max(1)),
            format_amount(total.amount)
        );
    }

    println!();
    println!("By type:");
    for total in &report.types {
        println!(
            "  {:<14} {:>14}",
            total.transaction_type.as_str(),
            format_amount(total.amount)
        );
    }

    println!();
    println!("Recent:");
    print_transaction_table(&report.recent);
}

fn report_save_error<T>(result: &Mutation<T>) {
    if let Some(err) = &result.save_error {
        eprintln!("Warning: the change was applied but not saved: {}", err);
    }
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn format_signed(tx: &Transaction) -> String {
    let prefix = if tx.is_income() { "+" } else { "-" };
    format!("{}{}", prefix, format_amount(tx.amount))
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "" } else { "s" }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
