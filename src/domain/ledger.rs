use serde::{Deserialize, Serialize};

use super::{Category, Cents, Transaction, TransactionId, TransactionType, YearMonth};

/// The in-memory list of every recorded transaction, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ledger {
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already ordered (newest first) list, e.g. one loaded from storage.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Prepend a transaction. The caller is responsible for validating it.
    pub fn add(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }

    /// Remove the transaction with the given id. Unknown ids are a no-op.
    pub fn remove(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id == id)?;
        Some(self.transactions.remove(index))
    }

    /// Drop every transaction, returning how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.transactions.len();
        self.transactions.clear();
        count
    }

    /// Transactions dated within `month`, in ledger order.
    pub fn transactions_in_month(&self, month: YearMonth) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|t| month.contains(t.date))
            .cloned()
            .collect()
    }
}

/// Search and filter criteria. Empty or absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Case-insensitive substring of the transaction name
    pub search: String,
    pub category: Option<Category>,
    pub transaction_type: Option<TransactionType>,
}

impl TransactionFilter {
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.category.is_none() && self.transaction_type.is_none()
    }

    pub fn matches(&self, transaction: &Transaction) -> bool {
        let matches_search = self.search.is_empty()
            || transaction
                .name
                .to_lowercase()
                .contains(&self.search.to_lowercase());
        let matches_category = self.category.is_none_or(|c| transaction.category == c);
        let matches_type = self
            .transaction_type
            .is_none_or(|t| transaction.transaction_type == t);

        matches_search && matches_category && matches_type
    }
}

/// Apply `filter` to a list of transactions, preserving order.
pub fn filter_transactions(
    transactions: &[Transaction],
    filter: &TransactionFilter,
) -> Vec<Transaction> {
    transactions
        .iter()
        .filter(|t| filter.matches(t))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub income: Cents,
    pub expenses: Cents,
    pub balance: Cents,
}

/// Sum income and expenses. Balance = income - expenses.
/// Sums saturate at the bounds of `Cents` instead of overflowing.
pub fn compute_totals(transactions: &[Transaction]) -> Totals {
    let (income, expenses) =
        transactions
            .iter()
            .fold((0 as Cents, 0 as Cents), |(income, expenses), t| match t.transaction_type {
                TransactionType::Income => (income.saturating_add(t.amount), expenses),
                TransactionType::Expense => (income, expenses.saturating_add(t.amount)),
            });

    Totals {
        income,
        expenses,
        balance: income.saturating_sub(expenses),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: Category,
    pub amount: Cents,
}

/// Total per category, largest first.
/// Categories with equal totals keep the order in which they first appear in `transactions`.
pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for transaction in transactions {
        match totals.iter_mut().find(|t| t.category == transaction.category) {
            Some(entry) => entry.amount = entry.amount.saturating_add(transaction.amount),
            None => totals.push(CategoryTotal {
                category: transaction.category,
                amount: transaction.amount,
            }),
        }
    }

    // sort_by is stable, which gives the first-seen tie-break
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTotal {
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Cents,
}

/// Income and expense totals, always in that order.
pub fn type_breakdown(transactions: &[Transaction]) -> [TypeTotal; 2] {
    let totals = compute_totals(transactions);
    [
        TypeTotal {
            transaction_type: TransactionType::Income,
            amount: totals.income,
        },
        TypeTotal {
            transaction_type: TransactionType::Expense,
            amount: totals.expenses,
        },
    ]
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn income(name: &str, amount: Cents, category: Category, on: NaiveDate) -> Transaction {
        Transaction::new(name, amount, category, TransactionType::Income, on)
    }

    fn expense(name: &str, amount: Cents, category: Category, on: NaiveDate) -> Transaction {
        Transaction::new(name, amount, category, TransactionType::Expense, on)
    }

    fn january() -> YearMonth {
        YearMonth::new(2024, 1).unwrap()
    }

    #[test]
    fn test_add_prepends() {
        let mut ledger = Ledger::new();
        let first = income("Salary", 500000, Category::Salary, date(2024, 1, 5));
        let second = expense("Groceries", 15000, Category::Food, date(2024, 1, 6));

        ledger.add(first.clone());
        ledger.add(second.clone());

        assert_eq!(ledger.transactions(), &[second, first]);
    }

    #[test]
    fn test_remove_existing() {
        let mut ledger = Ledger::new();
        let keep = expense("Bus", 250, Category::Transport, date(2024, 1, 2));
        let drop = expense("Cinema", 1200, Category::Entertainment, date(2024, 1, 3));
        ledger.add(keep.clone());
        ledger.add(drop.clone());

        let removed = ledger.remove(drop.id);

        assert_eq!(removed, Some(drop.clone()));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.get(drop.id).is_none());
        assert!(ledger.get(keep.id).is_some());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut ledger = Ledger::new();
        ledger.add(expense("Bus", 250, Category::Transport, date(2024, 1, 2)));
        let before = ledger.clone();

        assert_eq!(ledger.remove(uuid::Uuid::new_v4()), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_clear() {
        let mut ledger = Ledger::new();
        assert_eq!(ledger.clear(), 0);

        ledger.add(expense("Bus", 250, Category::Transport, date(2024, 1, 2)));
        ledger.add(expense("Taxi", 1800, Category::Transport, date(2024, 1, 3)));

        assert_eq!(ledger.clear(), 2);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_transactions_in_month() {
        let mut ledger = Ledger::new();
        let dec = expense("Gifts", 9000, Category::Shopping, date(2023, 12, 24));
        let jan_a = income("Salary", 500000, Category::Salary, date(2024, 1, 5));
        let feb = expense("Rent", 120000, Category::Bills, date(2024, 2, 1));
        let jan_b = expense("Groceries", 15000, Category::Food, date(2024, 1, 31));
        for t in [&dec, &jan_a, &feb, &jan_b] {
            ledger.add(t.clone());
        }

        let month = ledger.transactions_in_month(january());

        assert_eq!(month, vec![jan_b, jan_a]);
        assert!(
            ledger
                .transactions_in_month(YearMonth::new(2023, 1).unwrap())
                .is_empty()
        );
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let transactions = vec![
            expense("Coffee", 400, Category::Food, date(2024, 1, 2)),
            income("Invoice #12", 80000, Category::Freelance, date(2024, 1, 3)),
        ];

        let filter = TransactionFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_transactions(&transactions, &filter), transactions);
    }

    #[test]
    fn test_filter_search_is_case_insensitive() {
        let coffee = expense("Morning COFFEE", 400, Category::Food, date(2024, 1, 2));
        let transactions = vec![
            coffee.clone(),
            expense("Lunch", 1500, Category::Food, date(2024, 1, 2)),
        ];

        let filter = TransactionFilter {
            search: "coffee".to_string(),
            ..Default::default()
        };

        assert_eq!(filter_transactions(&transactions, &filter), vec![coffee]);
    }

    #[test]
    fn test_filter_predicates_are_anded() {
        let gift_in = income("Gift", 5000, Category::Other, date(2024, 1, 2));
        let gift_out = expense("Gift", 3000, Category::Other, date(2024, 1, 3));
        let book = expense("Gift book", 2000, Category::Education, date(2024, 1, 4));
        let transactions = vec![gift_in.clone(), gift_out.clone(), book.clone()];

        let by_category = TransactionFilter {
            search: "gift".to_string(),
            category: Some(Category::Other),
            transaction_type: None,
        };
        assert_eq!(
            filter_transactions(&transactions, &by_category),
            vec![gift_in.clone(), gift_out.clone()]
        );

        let by_all = TransactionFilter {
            transaction_type: Some(TransactionType::Expense),
            ..by_category
        };
        assert_eq!(filter_transactions(&transactions, &by_all), vec![gift_out]);
    }

    #[test]
    fn test_totals_empty() {
        assert_eq!(compute_totals(&[]), Totals::default());
    }

    #[test]
    fn test_totals_balance() {
        let transactions = vec![
            income("Salary", 500000, Category::Salary, date(2024, 1, 5)),
            expense("Groceries", 15000, Category::Food, date(2024, 1, 6)),
            expense("Rent", 600000, Category::Bills, date(2024, 1, 7)),
        ];

        let totals = compute_totals(&transactions);

        assert_eq!(totals.income, 500000);
        assert_eq!(totals.expenses, 615000);
        assert_eq!(totals.balance, totals.income - totals.expenses);
        assert_eq!(totals.balance, -115000);
    }

    #[test]
    fn test_huge_amounts_saturate() {
        // Loaded snapshots skip validation, so amounts can exceed MAX_AMOUNT
        let huge = Cents::MAX / 2 + 1;
        let transactions = vec![
            income("Lottery", huge, Category::Investment, date(2024, 1, 5)),
            income("Lottery again", huge, Category::Investment, date(2024, 1, 6)),
            expense("Yacht", huge, Category::Shopping, date(2024, 1, 7)),
            expense("Another yacht", huge, Category::Shopping, date(2024, 1, 8)),
        ];

        let totals = compute_totals(&transactions);
        assert_eq!(totals.income, Cents::MAX);
        assert_eq!(totals.expenses, Cents::MAX);
        assert_eq!(totals.balance, 0);

        let breakdown = category_breakdown(&transactions);
        assert_eq!(breakdown[0].amount, Cents::MAX);
        assert_eq!(breakdown[1].amount, Cents::MAX);
    }

    #[test]
    fn test_category_breakdown_sorted_descending() {
        let transactions = vec![
            expense("Groceries", 15000, Category::Food, date(2024, 1, 6)),
            income("Salary", 500000, Category::Salary, date(2024, 1, 5)),
            expense("Dinner", 6000, Category::Food, date(2024, 1, 8)),
        ];

        let breakdown = category_breakdown(&transactions);

        assert_eq!(
            breakdown,
            vec![
                CategoryTotal {
                    category: Category::Salary,
                    amount: 500000
                },
                CategoryTotal {
                    category: Category::Food,
                    amount: 21000
                },
            ]
        );
    }

    #[test]
    fn test_category_breakdown_ties_keep_first_seen_order() {
        let transactions = vec![
            expense("Bus", 1000, Category::Transport, date(2024, 1, 1)),
            expense("Book", 1000, Category::Education, date(2024, 1, 2)),
            expense("Cinema", 1000, Category::Entertainment, date(2024, 1, 3)),
            expense("Doctor", 5000, Category::Healthcare, date(2024, 1, 4)),
        ];

        let order: Vec<Category> = category_breakdown(&transactions)
            .into_iter()
            .map(|c| c.category)
            .collect();

        assert_eq!(
            order,
            vec![
                Category::Healthcare,
                Category::Transport,
                Category::Education,
                Category::Entertainment,
            ]
        );
    }

    #[test]
    fn test_type_breakdown() {
        let transactions = vec![
            income("Salary", 500000, Category::Salary, date(2024, 1, 5)),
            expense("Groceries", 15000, Category::Food, date(2024, 1, 6)),
        ];

        let [income_total, expense_total] = type_breakdown(&transactions);

        assert_eq!(income_total.transaction_type, TransactionType::Income);
        assert_eq!(income_total.amount, 500000);
        assert_eq!(expense_total.transaction_type, TransactionType::Expense);
        assert_eq!(expense_total.amount, 15000);
    }

    #[test]
    fn test_ledger_serializes_as_array() {
        let mut ledger = Ledger::new();
        ledger.add(income("Salary", 500000, Category::Salary, date(2024, 1, 5)));
        ledger.add(expense("Groceries", 15000, Category::Food, date(2024, 1, 6)));

        let json = serde_json::to_string(&ledger).unwrap();
        assert!(json.starts_with('['));

        let restored: Ledger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
