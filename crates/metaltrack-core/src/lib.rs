//! Core ledger processing and business logic
//!
//! `MetalTrack` owns the in-memory transaction snapshot, recomputes every
//! view from it on demand and routes writes through the repository.

pub mod error;
pub mod types;
pub mod models;
pub mod engine;
pub mod form;
pub mod options;
pub mod state;
pub mod notify;
pub mod session;
pub mod repository;

use metaltrack_config::Config;
use metaltrack_parser::LedgerRow;
use metaltrack_utils::format_weight;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

pub use error::{CoreError, CoreResult, ErrorCode, ErrorContext, ErrorLogger, ErrorSeverity};
pub use form::{EntryForm, NewEntry};
pub use models::{
    MetalBalance, PartyLedgerEntry, PartyStatement, SummaryTotals, Transaction, User,
};
pub use notify::{Notice, Notifier, NoticeVariant};
pub use options::MasterOptions;
pub use repository::{Repository, RepositoryRef, SheetsRepository};
pub use session::{Authenticator, Credentials, FileSessionStore, MemorySessionStore, SessionStoreRef};
pub use state::{LoadState, RequestTracker};
pub use types::{BalanceView, Metal, MetalType, Role, StockStatus, VoucherType};

use error::DefaultErrorLogger;

/// Number of parties shown on the dashboard
pub const TOP_PARTIES: usize = 5;

/// Outcome of a fetch that may have been overtaken by a newer one
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Applied(T),
    /// A newer request started before this one finished; its result was dropped
    Superseded,
}

/// Ledger sheet rows for the selected metal
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSheet {
    pub metal: String,
    pub rows: Vec<LedgerRow>,
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Application service
pub struct MetalTrack {
    config: Arc<Config>,
    repository: RepositoryRef,
    transactions: RwLock<LoadState<Vec<Transaction>>>,
    refreshes: RequestTracker,
    ledger: RwLock<Option<LedgerSheet>>,
    ledger_requests: RequestTracker,
    authenticator: Authenticator,
    notifier: Arc<Notifier>,
    error_logger: Box<dyn ErrorLogger>,
}

impl MetalTrack {
    /// Create a service with config, repository and session store
    pub fn new(config: Arc<Config>, repository: RepositoryRef, sessions: SessionStoreRef) -> Self {
        let notifier = Notifier::new(
            config.notifications.capacity,
            Duration::from_secs(config.notifications.ttl_secs),
        );
        Self {
            config,
            repository,
            transactions: RwLock::new(LoadState::Loading),
            refreshes: RequestTracker::new(),
            ledger: RwLock::new(None),
            ledger_requests: RequestTracker::new(),
            authenticator: Authenticator::new(sessions),
            notifier: Arc::new(notifier),
            error_logger: Box::new(DefaultErrorLogger),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn notifier(&self) -> &Arc<Notifier> {
        &self.notifier
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Balance above which a metal counts as well stocked
    pub fn good_threshold(&self) -> Decimal {
        Decimal::from(self.config.stock.good_threshold)
    }

    /// Replace the logger that receives failures and discarded fetches
    pub fn with_error_logger(mut self, error_logger: Box<dyn ErrorLogger>) -> Self {
        self.error_logger = error_logger;
        self
    }

    fn context(&self, operation: &str) -> ErrorContext {
        let context = ErrorContext::new(operation);
        match self.authenticator.current() {
            Ok(Some(user)) => context.with_username(user.username),
            _ => context,
        }
    }

    fn report(&self, error: &CoreError, operation: &str) {
        self.error_logger.log_error(error, &self.context(operation));
    }

    fn warn(&self, message: &str, operation: &str) {
        self.error_logger.log_warning(message, &self.context(operation));
    }

    // ==================== Loading ====================

    /// Current load state of the transaction snapshot
    pub fn load_state(&self) -> LoadState<Vec<Transaction>> {
        read(&self.transactions).clone()
    }

    /// Fetch the Entries sheet and replace the snapshot.
    ///
    /// A response that arrives after a newer refresh started is discarded.
    pub async fn refresh(&self) -> CoreResult<Fetched<usize>> {
        let ticket = self.refreshes.begin();
        let result = self.repository.fetch_entries().await;

        if !self.refreshes.is_current(ticket) {
            self.warn("Discarding superseded transaction fetch", "refresh");
            return Ok(Fetched::Superseded);
        }

        match result {
            Ok(rows) => {
                let transactions: Vec<Transaction> = rows.into_iter().map(Transaction::from).collect();
                let count = transactions.len();
                *write(&self.transactions) = LoadState::Ready(transactions);
                log::info!("Loaded {} transactions", count);
                Ok(Fetched::Applied(count))
            }
            Err(error) => {
                self.report(&error, "refresh");
                *write(&self.transactions) = LoadState::Failed(error.to_string());
                self.notifier.error("Error", "Failed to fetch data");
                Err(error)
            }
        }
    }

    /// Run `f` over the loaded snapshot
    fn with_transactions<R>(&self, f: impl FnOnce(&[Transaction]) -> R) -> CoreResult<R> {
        match &*read(&self.transactions) {
            LoadState::Ready(transactions) => Ok(f(transactions)),
            _ => Err(CoreError::NotLoaded),
        }
    }

    // ==================== Views ====================

    /// History, optionally narrowed by a search term
    pub fn transactions(&self, search: Option<&str>) -> CoreResult<Vec<Transaction>> {
        self.with_transactions(|all| match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => engine::search_transactions(all, term),
            None => all.to_vec(),
        })
    }

    pub fn transaction(&self, position: usize) -> CoreResult<Transaction> {
        self.with_transactions(|all| all.iter().find(|t| t.position == position).cloned())?
            .ok_or(CoreError::TransactionNotFound { position })
    }

    pub fn metal_balances(&self, view: BalanceView, search: Option<&str>) -> CoreResult<Vec<MetalBalance>> {
        self.with_transactions(|all| {
            let balances = engine::metal_balances(all, view);
            match search.map(str::trim).filter(|s| !s.is_empty()) {
                Some(term) => engine::search_metal_balances(&balances, term),
                None => balances,
            }
        })
    }

    pub fn party_balances(&self) -> CoreResult<Vec<PartyLedgerEntry>> {
        self.with_transactions(engine::party_balances)
    }

    pub fn top_parties(&self) -> CoreResult<Vec<PartyLedgerEntry>> {
        self.with_transactions(|all| engine::top_parties(&engine::party_balances(all), TOP_PARTIES))
    }

    pub fn party_statement(&self, party: &str) -> CoreResult<PartyStatement> {
        self.with_transactions(|all| engine::party_statement(all, party))?
            .ok_or_else(|| CoreError::PartyNotFound { name: party.to_string() })
    }

    pub fn summary(&self) -> CoreResult<SummaryTotals> {
        self.with_transactions(engine::summary_totals)
    }

    // ==================== Writes ====================

    /// Validate and append a new entry, then refresh the snapshot
    pub async fn record(&self, form: &EntryForm) -> CoreResult<NewEntry> {
        let entry = match form.validate(chrono::Local::now().date_naive()) {
            Ok(entry) => entry,
            Err(error) => {
                self.notifier.error("Error", error.to_string());
                return Err(error);
            }
        };

        if let Err(error) = self.repository.append_entry(entry.to_row()).await {
            self.report(&error, "record");
            self.notifier.error("Error", "Failed to add entry");
            return Err(error);
        }

        log::info!(
            "Recorded {} {}g of {} from {} to {}",
            entry.voucher_type,
            format_weight(entry.weight),
            entry.metal_type,
            entry.from,
            entry.to
        );
        self.notifier.info("Success", "Entry added successfully");

        // The entry is already written; a failed reload is reported on its own
        let _ = self.refresh().await;
        Ok(entry)
    }

    /// Delete the entry at `position`; the local snapshot changes only after
    /// the remote delete is confirmed.
    ///
    /// Refreshes started before the delete are discarded. One that lands while
    /// the delete is in flight may already show the sheet without the row, so
    /// the local removal matches the exact record rather than the position.
    pub async fn delete(&self, position: usize) -> CoreResult<Transaction> {
        let transaction = self.transaction(position)?;
        self.refreshes.begin();

        if let Err(error) = self.repository.delete_entry(position).await {
            self.report(&error, "delete");
            self.notifier.error("Error", "Failed to delete entry");
            return Err(error);
        }

        if let Some(all) = write(&self.transactions).ready_mut() {
            if let Some(index) = all.iter().position(|t| *t == transaction) {
                all.remove(index);
                // Rows below the deleted one shift up by one on the sheet
                for t in all.iter_mut().filter(|t| t.position > position) {
                    t.position -= 1;
                }
            }
        }
        log::info!("Deleted transaction at row {}", position);
        self.notifier.info("Deleted", "Transaction deleted successfully");
        Ok(transaction)
    }

    // ==================== Master sheet ====================

    /// Dropdown options; falls back to the known metals when unavailable
    pub async fn options(&self) -> MasterOptions {
        match self.repository.fetch_master().await {
            Ok(rows) => MasterOptions::from_rows(&rows),
            Err(error) => {
                self.report(&error, "options");
                MasterOptions::default()
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> CoreResult<User> {
        let rows = match self.repository.fetch_master().await {
            Ok(rows) => rows,
            Err(error) => {
                self.report(&error, "login");
                return Err(error);
            }
        };
        self.authenticator.login(credentials, &rows)
    }

    pub fn logout(&self) -> CoreResult<()> {
        self.authenticator.logout()
    }

    // ==================== Ledger sheet ====================

    /// Last applied ledger selection
    pub fn ledger_sheet(&self) -> Option<LedgerSheet> {
        read(&self.ledger).clone()
    }

    /// Point the Ledger sheet at `metal` (or the default metal), then fetch
    /// its rows for that metal.
    pub async fn select_ledger_metal(
        &self,
        metal: Option<&str>,
        search: Option<&str>,
    ) -> CoreResult<Fetched<LedgerSheet>> {
        let metal = match metal.map(str::trim).filter(|m| !m.is_empty()) {
            Some(metal) => metal.to_string(),
            None => self
                .options()
                .await
                .default_ledger_metal()
                .unwrap_or(Metal::Gold.as_str())
                .to_string(),
        };

        let ticket = self.ledger_requests.begin();
        let sheet = &self.config.sheet;
        let result = async {
            self.repository
                .update_cell(&sheet.ledger_sheet, sheet.ledger_metal_row, sheet.ledger_metal_column, &metal)
                .await?;
            self.repository.fetch_ledger().await
        }
        .await;

        if !self.ledger_requests.is_current(ticket) {
            let message = format!("Discarding superseded ledger fetch for {}", metal);
            self.warn(&message, "select_ledger_metal");
            return Ok(Fetched::Superseded);
        }

        let rows = match result {
            Ok(rows) => rows,
            Err(error) => {
                self.report(&error, "select_ledger_metal");
                self.notifier.error("Error", "Failed to fetch ledger");
                return Err(error);
            }
        };

        let selected = LedgerSheet {
            rows: options::filter_ledger(rows, &metal, None),
            metal,
        };
        *write(&self.ledger) = Some(selected.clone());

        let rows = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(_) => options::filter_ledger(selected.rows, &selected.metal, search),
            None => selected.rows,
        };
        Ok(Fetched::Applied(LedgerSheet { metal: selected.metal, rows }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use metaltrack_parser::{EntryRow, MasterRow};
    use std::str::FromStr;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn entry(position: usize, from: &str, to: &str, kind: &str, metal: &str, weight: &str) -> EntryRow {
        EntryRow {
            position,
            date: NaiveDate::from_ymd_opt(2023, 4, position as u32),
            from: from.to_string(),
            to: to.to_string(),
            voucher_type: kind.to_string(),
            voucher_no: format!("V-{}", position),
            metal_type: metal.to_string(),
            weight: Decimal::from_str(weight).ok(),
        }
    }

    fn ledger_row(name: &str, metal: &str) -> LedgerRow {
        LedgerRow {
            name: name.to_string(),
            metal_type: metal.to_string(),
            dr: Decimal::ONE,
            cr: Decimal::ZERO,
            balance: Decimal::NEGATIVE_ONE,
        }
    }

    /// In-memory repository standing in for the spreadsheet
    #[derive(Default)]
    struct FakeRepository {
        entries: Mutex<Vec<EntryRow>>,
        master: Vec<MasterRow>,
        ledger: Vec<LedgerRow>,
        fail_reads: AtomicBool,
        fail_writes: AtomicBool,
        /// First entries fetch sleeps this long
        slow_first_fetch: Option<Duration>,
        fetches: AtomicUsize,
        /// First ledger fetch sleeps this long
        slow_first_ledger: Option<Duration>,
        ledger_fetches: AtomicUsize,
        /// Delay between removing a row and confirming the delete
        delete_delay: Option<Duration>,
        cells: Mutex<Vec<(String, u32, u32, String)>>,
        deleted: Mutex<Vec<usize>>,
    }

    impl FakeRepository {
        fn with_entries(entries: Vec<EntryRow>) -> Self {
            Self { entries: Mutex::new(entries), ..Default::default() }
        }

        fn transport() -> CoreError {
            CoreError::Transport { message: "offline".to_string() }
        }
    }

    #[async_trait]
    impl Repository for FakeRepository {
        async fn fetch_entries(&self) -> CoreResult<Vec<EntryRow>> {
            let call = self.fetches.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(delay) = self.slow_first_fetch {
                    tokio::time::sleep(delay).await;
                    return Ok(vec![entry(2, "Stale", "Stale", "Issue", "Gold", "1")]);
                }
            }
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(Self::transport());
            }
            Ok(self.entries.lock().unwrap().clone())
        }

        async fn fetch_master(&self) -> CoreResult<Vec<MasterRow>> {
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(Self::transport());
            }
            Ok(self.master.clone())
        }

        async fn fetch_ledger(&self) -> CoreResult<Vec<LedgerRow>> {
            let call = self.ledger_fetches.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                if let Some(delay) = self.slow_first_ledger {
                    tokio::time::sleep(delay).await;
                }
            }
            Ok(self.ledger.clone())
        }

        async fn append_entry(&self, row: Vec<String>) -> CoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Self::transport());
            }
            let mut entries = self.entries.lock().unwrap();
            let position = entries.len() + 2;
            entries.push(EntryRow {
                position,
                date: None,
                from: row[1].clone(),
                to: row[2].clone(),
                voucher_type: row[3].clone(),
                voucher_no: row[4].clone(),
                metal_type: row[5].clone(),
                weight: Decimal::from_str(&row[6]).ok(),
            });
            Ok(())
        }

        async fn update_cell(&self, sheet: &str, row: u32, column: u32, value: &str) -> CoreResult<()> {
            self.cells
                .lock()
                .unwrap()
                .push((sheet.to_string(), row, column, value.to_string()));
            Ok(())
        }

        async fn delete_entry(&self, position: usize) -> CoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(Self::transport());
            }
            self.deleted.lock().unwrap().push(position);
            {
                let mut entries = self.entries.lock().unwrap();
                entries.retain(|e| e.position != position);
                for e in entries.iter_mut().filter(|e| e.position > position) {
                    e.position -= 1;
                }
            }
            if let Some(delay) = self.delete_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(())
        }
    }

    /// Keeps every warning passed to the logger
    #[derive(Default, Clone)]
    struct RecordingLogger {
        warnings: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ErrorLogger for RecordingLogger {
        fn log_error(&self, _error: &CoreError, _context: &ErrorContext) {}

        fn log_warning(&self, message: &str, context: &ErrorContext) {
            self.warnings
                .lock()
                .unwrap()
                .push((context.operation.clone(), message.to_string()));
        }
    }

    fn sample_entries() -> Vec<EntryRow> {
        vec![
            entry(2, "A", "B", "Issue", "Gold", "10"),
            entry(3, "B", "C", "Issue", "Gold", "2"),
            entry(4, "C", "A", "Receipt", "Gold", "4"),
        ]
    }

    fn service(repository: FakeRepository) -> (MetalTrack, Arc<FakeRepository>) {
        let repository = Arc::new(repository);
        let track = MetalTrack::new(
            Arc::new(Config::default()),
            repository.clone(),
            Arc::new(MemorySessionStore::default()),
        );
        (track, repository)
    }

    #[tokio::test]
    async fn test_views_require_loaded_snapshot() {
        let (track, _) = service(FakeRepository::with_entries(sample_entries()));
        assert!(track.load_state().is_loading());
        assert!(matches!(track.summary(), Err(CoreError::NotLoaded)));

        assert_eq!(track.refresh().await.unwrap(), Fetched::Applied(3));
        let summary = track.summary().unwrap();
        assert_eq!(summary.total_issued, Decimal::from(12));
        assert_eq!(summary.total_received, Decimal::from(4));
    }

    #[tokio::test]
    async fn test_end_to_end_party_balances() {
        let (track, _) = service(FakeRepository::with_entries(sample_entries()));
        track.refresh().await.unwrap();

        let parties = track.party_balances().unwrap();
        let gold: Vec<(String, Decimal)> = parties
            .iter()
            .map(|p| (p.party.clone(), p.balance(Metal::Gold)))
            .collect();
        assert_eq!(
            gold,
            vec![
                ("A".to_string(), Decimal::from(-6)),
                ("B".to_string(), Decimal::from(8)),
                ("C".to_string(), Decimal::from(2)),
            ]
        );

        let ledger = track.metal_balances(BalanceView::Ledger, None).unwrap();
        assert_eq!(ledger[0].balance_qty, Decimal::from(8));
        let stock = track.metal_balances(BalanceView::Stock, Some("GOLD")).unwrap();
        assert_eq!(stock[0].balance_qty, Decimal::from(-8));
        assert!(track.metal_balances(BalanceView::Stock, Some("silver")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_sheet_is_ready_not_loading() {
        let (track, _) = service(FakeRepository::default());
        track.refresh().await.unwrap();
        assert_eq!(track.load_state(), LoadState::Ready(vec![]));
        assert!(track.party_balances().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_sets_failed_and_notifies() {
        let (track, repository) = service(FakeRepository::with_entries(sample_entries()));
        repository.fail_reads.store(true, Ordering::SeqCst);
        assert!(matches!(track.refresh().await, Err(CoreError::Transport { .. })));
        assert!(matches!(track.load_state(), LoadState::Failed(_)));
        let notices = track.notifier().snapshot();
        assert_eq!(notices[0].variant, NoticeVariant::Destructive);
        assert_eq!(notices[0].description, "Failed to fetch data");
    }

    #[tokio::test]
    async fn test_superseded_refresh_is_discarded() {
        let repository = FakeRepository {
            slow_first_fetch: Some(Duration::from_millis(50)),
            ..FakeRepository::with_entries(sample_entries())
        };
        let (track, _) = service(repository);

        let (first, second) = tokio::join!(track.refresh(), track.refresh());
        assert_eq!(first.unwrap(), Fetched::Superseded);
        assert_eq!(second.unwrap(), Fetched::Applied(3));
        let loaded = track.transactions(None).unwrap();
        assert!(loaded.iter().all(|t| t.from != "Stale"));
    }

    #[tokio::test]
    async fn test_record_appends_and_reloads() {
        let (track, _) = service(FakeRepository::with_entries(sample_entries()));
        track.refresh().await.unwrap();

        let form = EntryForm {
            from: "B".to_string(),
            to: form::NEW_PARTY.to_string(),
            new_to: "D".to_string(),
            voucher_no: "ISS-9".to_string(),
            weight: "1.5".to_string(),
            ..Default::default()
        };
        let recorded = track.record(&form).await.unwrap();
        assert_eq!(recorded.to, "D");
        assert_eq!(track.transactions(None).unwrap().len(), 4);
        assert_eq!(track.party_statement("D").unwrap().ledger.balance(Metal::Gold), Decimal::new(15, 1));
        assert!(track
            .notifier()
            .snapshot()
            .iter()
            .any(|n| n.description == "Entry added successfully"));
    }

    #[tokio::test]
    async fn test_record_rejects_invalid_form_before_writing() {
        let (track, repository) = service(FakeRepository::with_entries(sample_entries()));
        track.refresh().await.unwrap();
        let result = track.record(&EntryForm::default()).await;
        assert!(matches!(result, Err(CoreError::Validation { .. })));
        assert_eq!(repository.entries.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_delete_removes_after_confirmation() {
        let (track, repository) = service(FakeRepository::with_entries(sample_entries()));
        track.refresh().await.unwrap();

        repository.fail_writes.store(true, Ordering::SeqCst);
        assert!(track.delete(3).await.is_err());
        assert_eq!(track.transactions(None).unwrap().len(), 3);

        repository.fail_writes.store(false, Ordering::SeqCst);
        let removed = track.delete(3).await.unwrap();
        assert_eq!(removed.from, "B");
        assert_eq!(*repository.deleted.lock().unwrap(), vec![3]);

        let positions: Vec<usize> = track.transactions(None).unwrap().iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![2, 3]);
        assert!(matches!(track.delete(9).await, Err(CoreError::TransactionNotFound { position: 9 })));
    }

    #[tokio::test]
    async fn test_delete_during_refresh_keeps_rows_aligned() {
        let repository = FakeRepository {
            delete_delay: Some(Duration::from_millis(50)),
            ..FakeRepository::with_entries(vec![
                entry(2, "A", "X", "Issue", "Gold", "1"),
                entry(3, "B", "X", "Issue", "Gold", "1"),
                entry(4, "C", "X", "Issue", "Gold", "1"),
                entry(5, "D", "X", "Issue", "Gold", "1"),
            ])
        };
        let (track, repository) = service(repository);
        track.refresh().await.unwrap();

        let (removed, reloaded) = tokio::join!(track.delete(3), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            track.refresh().await
        });
        assert_eq!(removed.unwrap().from, "B");
        assert_eq!(reloaded.unwrap(), Fetched::Applied(3));

        let local: Vec<(usize, String)> = track
            .transactions(None)
            .unwrap()
            .into_iter()
            .map(|t| (t.position, t.from))
            .collect();
        let sheet: Vec<(usize, String)> = repository
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| (e.position, e.from.clone()))
            .collect();
        assert_eq!(local, sheet);
        assert_eq!(local, vec![(2, "A".to_string()), (3, "C".to_string()), (4, "D".to_string())]);
    }

    #[tokio::test]
    async fn test_party_lookup() {
        let (track, _) = service(FakeRepository::with_entries(sample_entries()));
        track.refresh().await.unwrap();
        let statement = track.party_statement("A").unwrap();
        assert_eq!(statement.lines.len(), 2);
        assert!(matches!(track.party_statement("Z"), Err(CoreError::PartyNotFound { .. })));
        assert_eq!(track.top_parties().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_options_fall_back_when_master_unavailable() {
        let (track, repository) = service(FakeRepository::default());
        repository.fail_reads.store(true, Ordering::SeqCst);
        let options = track.options().await;
        assert_eq!(options.metal_types, vec!["Gold", "Diamond", "Silver", "Platinum"]);
    }

    #[tokio::test]
    async fn test_login_through_master_sheet() {
        let repository = FakeRepository {
            master: vec![MasterRow {
                from_option: "Vikas".to_string(),
                to_option: String::new(),
                metal_option: "Gold".to_string(),
                username: "vikas".to_string(),
                password: "secret".to_string(),
                role: "admin".to_string(),
            }],
            ..Default::default()
        };
        let (track, _) = service(repository);
        let user = track
            .login(&Credentials { username: "vikas".into(), password: "secret".into() })
            .await
            .unwrap();
        assert!(user.role.is_admin());
        assert!(track.authenticator().require_admin().is_ok());
        track.logout().unwrap();
        assert!(track.authenticator().current().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_select_ledger_metal() {
        let repository = FakeRepository {
            ledger: vec![
                ledger_row("Workshop A", "Gold"),
                ledger_row("Nitesh", "gold"),
                ledger_row("Workshop A", "Silver"),
            ],
            ..Default::default()
        };
        let (track, repository) = service(repository);

        let sheet = match track.select_ledger_metal(None, None).await.unwrap() {
            Fetched::Applied(sheet) => sheet,
            Fetched::Superseded => panic!("single request cannot be superseded"),
        };
        assert_eq!(sheet.metal, "Gold");
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(
            repository.cells.lock().unwrap()[0],
            ("Ledger".to_string(), 1, 2, "Gold".to_string())
        );

        let searched = track.select_ledger_metal(Some("Gold"), Some("nit")).await.unwrap();
        match searched {
            Fetched::Applied(sheet) => assert_eq!(sheet.rows.len(), 1),
            Fetched::Superseded => panic!("single request cannot be superseded"),
        }
        assert_eq!(track.ledger_sheet().unwrap().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_ledger_switch_is_discarded() {
        let repository = FakeRepository {
            ledger: vec![
                ledger_row("Workshop A", "Gold"),
                ledger_row("Workshop B", "Silver"),
                ledger_row("Nitesh", "Silver"),
            ],
            slow_first_ledger: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let logger = RecordingLogger::default();
        let (track, _) = service(repository);
        let track = track.with_error_logger(Box::new(logger.clone()));

        let (first, second) = tokio::join!(
            track.select_ledger_metal(Some("Gold"), None),
            track.select_ledger_metal(Some("Silver"), None)
        );
        assert_eq!(first.unwrap(), Fetched::Superseded);
        assert!(matches!(second.unwrap(), Fetched::Applied(ref sheet) if sheet.metal == "Silver"));

        let selected = track.ledger_sheet().unwrap();
        assert_eq!(selected.metal, "Silver");
        assert_eq!(selected.rows.len(), 2);
        assert!(selected.rows.iter().all(|r| r.metal_type == "Silver"));

        let warnings = logger.warnings.lock().unwrap();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].0, "select_ledger_metal");
        assert!(warnings[0].1.contains("Gold"));
    }
}
