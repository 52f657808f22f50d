//! In-memory port adapters
//!
//! Test doubles implementing every store port over mutex-guarded maps. The
//! conditional transitions hold the lock across the status test and the
//! write, honouring the same atomicity contract the Postgres adapters
//! implement with conditional UPDATEs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use core_kernel::{
    BillId, ClientId, DomainPort, InstallmentId, PortError, ProductId, TransactionId, UserId,
};
use domain_access::{PasswordHasher, User, UserStore};
use domain_audit::{ActivityEntry, ActivityQuery, AuditLog};
use domain_billing::{
    Bill, BillStore, Installment, InstallmentStatus, LedgerStore, PaymentMethod, PendingFilter,
    PendingInstallmentRow, ReportRenderer, Sale, SaleStore, Transaction, TransactionFilter,
    TransactionSummary,
};
use domain_registry::{Client, ClientStore, Product, ProductStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("test store lock poisoned")
}

/// In-memory audit log
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded entries; used by audit-completeness assertions
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all entries in insertion order
    pub fn entries(&self) -> Vec<ActivityEntry> {
        lock(&self.entries).clone()
    }
}

impl DomainPort for MemoryAuditLog {}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record(&self, entry: ActivityEntry) -> Result<(), PortError> {
        lock(&self.entries).push(entry);
        Ok(())
    }

    async fn find(&self, query: &ActivityQuery) -> Result<Vec<ActivityEntry>, PortError> {
        let mut hits: Vec<ActivityEntry> = lock(&self.entries)
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(hits)
    }
}

/// In-memory user store
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<UserId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for MemoryUserStore {}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get(&self, id: UserId) -> Result<Option<User>, PortError> {
        Ok(lock(&self.users).get(&id).cloned())
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>, PortError> {
        Ok(lock(&self.users)
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>, PortError> {
        let mut users: Vec<User> = lock(&self.users).values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<(), PortError> {
        let mut users = lock(&self.users);
        if users
            .values()
            .any(|u| u.username.eq_ignore_ascii_case(&user.username))
        {
            return Err(PortError::conflict(format!(
                "username already taken: {}",
                user.username
            )));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), PortError> {
        let mut users = lock(&self.users);
        if !users.contains_key(&user.id) {
            return Err(PortError::not_found("user", user.id));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<bool, PortError> {
        Ok(lock(&self.users).remove(&id).is_some())
    }
}

/// Plaintext password "hasher" for tests
///
/// Produces recognizable fake hashes so tests never spend time on Argon2.
#[derive(Debug, Default)]
pub struct PlainTextHasher;

impl PasswordHasher for PlainTextHasher {
    fn hash(&self, password: &str) -> Result<String, PortError> {
        Ok(format!("plain${password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, PortError> {
        Ok(hash == format!("plain${password}"))
    }
}

/// In-memory product store
#[derive(Debug, Default)]
pub struct MemoryProductStore {
    products: Mutex<HashMap<ProductId, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_sync(&self, id: ProductId) -> Option<Product> {
        lock(&self.products).get(&id).cloned()
    }

    /// Current stock of a product, for test assertions
    pub fn stock_of(&self, id: ProductId) -> Option<Option<i64>> {
        lock(&self.products).get(&id).map(|p| p.stock)
    }
}

impl DomainPort for MemoryProductStore {}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn get(&self, id: ProductId) -> Result<Option<Product>, PortError> {
        Ok(self.get_sync(id))
    }

    async fn list_active(&self) -> Result<Vec<Product>, PortError> {
        let mut products: Vec<Product> = lock(&self.products)
            .values()
            .filter(|p| p.active)
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Product>, PortError> {
        Ok(lock(&self.products)
            .values()
            .find(|p| p.active && p.code == code)
            .cloned())
    }

    async fn find_active_by_name(&self, name: &str) -> Result<Option<Product>, PortError> {
        Ok(lock(&self.products)
            .values()
            .find(|p| p.active && p.name == name)
            .cloned())
    }

    async fn insert(&self, product: &Product) -> Result<(), PortError> {
        lock(&self.products).insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), PortError> {
        let mut products = lock(&self.products);
        if !products.contains_key(&product.id) {
            return Err(PortError::not_found("product", product.id));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn try_draw_stock(
        &self,
        id: ProductId,
        quantity: i64,
    ) -> Result<Option<Product>, PortError> {
        let mut products = lock(&self.products);
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };
        if !product.active {
            return Ok(None);
        }
        match product.stock {
            None => Ok(Some(product.clone())),
            Some(available) if available >= quantity => {
                product.stock = Some(available - quantity);
                product.updated_at = Utc::now();
                Ok(Some(product.clone()))
            }
            Some(_) => Ok(None),
        }
    }
}

/// In-memory client store
#[derive(Debug, Default)]
pub struct MemoryClientStore {
    clients: Mutex<HashMap<ClientId, Client>>,
}

impl MemoryClientStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_sync(&self, id: ClientId) -> Option<Client> {
        lock(&self.clients).get(&id).cloned()
    }
}

impl DomainPort for MemoryClientStore {}

#[async_trait]
impl ClientStore for MemoryClientStore {
    async fn get(&self, id: ClientId) -> Result<Option<Client>, PortError> {
        Ok(self.get_sync(id))
    }

    async fn list(&self) -> Result<Vec<Client>, PortError> {
        let mut clients: Vec<Client> = lock(&self.clients).values().cloned().collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Client>, PortError> {
        Ok(lock(&self.clients)
            .values()
            .find(|c| c.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<Client>, PortError> {
        Ok(lock(&self.clients).values().find(|c| c.cpf == cpf).cloned())
    }

    async fn insert(&self, client: &Client) -> Result<(), PortError> {
        lock(&self.clients).insert(client.id, client.clone());
        Ok(())
    }

    async fn update(&self, client: &Client) -> Result<(), PortError> {
        let mut clients = lock(&self.clients);
        if !clients.contains_key(&client.id) {
            return Err(PortError::not_found("client", client.id));
        }
        clients.insert(client.id, client.clone());
        Ok(())
    }
}

/// In-memory bill/installment store
///
/// Holds references to the client and product stores to enrich the pending
/// query the way the SQL adapter does with joins.
#[derive(Debug, Default)]
pub struct MemoryBillStore {
    bills: Mutex<HashMap<BillId, Bill>>,
    installments: Mutex<HashMap<InstallmentId, Installment>>,
    clients: std::sync::Arc<MemoryClientStore>,
    products: std::sync::Arc<MemoryProductStore>,
}

impl MemoryBillStore {
    pub fn new(
        clients: std::sync::Arc<MemoryClientStore>,
        products: std::sync::Arc<MemoryProductStore>,
    ) -> Self {
        Self {
            bills: Mutex::default(),
            installments: Mutex::default(),
            clients,
            products,
        }
    }
}

impl DomainPort for MemoryBillStore {}

#[async_trait]
impl BillStore for MemoryBillStore {
    async fn insert_bill(
        &self,
        bill: &Bill,
        installments: &[Installment],
    ) -> Result<(), PortError> {
        // Both maps are filled under the bills lock so no reader can see a
        // bill without its schedule.
        let mut bills = lock(&self.bills);
        let mut rows = lock(&self.installments);
        bills.insert(bill.id, bill.clone());
        for installment in installments {
            rows.insert(installment.id, installment.clone());
        }
        Ok(())
    }

    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, PortError> {
        Ok(lock(&self.bills).get(&id).cloned())
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, PortError> {
        let mut bills: Vec<Bill> = lock(&self.bills).values().cloned().collect();
        bills.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bills)
    }

    async fn get_installment(&self, id: InstallmentId) -> Result<Option<Installment>, PortError> {
        Ok(lock(&self.installments).get(&id).cloned())
    }

    async fn installments_for_bill(
        &self,
        bill_id: BillId,
    ) -> Result<Vec<Installment>, PortError> {
        let mut rows: Vec<Installment> = lock(&self.installments)
            .values()
            .filter(|i| i.bill_id == bill_id)
            .cloned()
            .collect();
        rows.sort_by_key(|i| i.number);
        Ok(rows)
    }

    async fn find_pending(
        &self,
        filter: &PendingFilter,
    ) -> Result<Vec<PendingInstallmentRow>, PortError> {
        let now = Utc::now();
        let bills = lock(&self.bills);
        let installments = lock(&self.installments);

        let mut rows = Vec::new();
        for installment in installments.values() {
            if installment.status != InstallmentStatus::Pending {
                continue;
            }
            let Some(bill) = bills.get(&installment.bill_id) else {
                continue;
            };
            if bill.cancelled {
                continue;
            }
            let client_name = self
                .clients
                .get_sync(bill.client_id)
                .map(|c| c.name)
                .unwrap_or_default();
            let product_name = bill
                .product_id
                .and_then(|id| self.products.get_sync(id))
                .map(|p| p.name);
            let row = PendingInstallmentRow {
                installment: installment.clone(),
                bill: bill.clone(),
                client_name,
                product_name,
            };
            if filter.matches(&row, now) {
                rows.push(row);
            }
        }

        rows.sort_by(|a, b| a.installment.due_date.cmp(&b.installment.due_date));
        Ok(rows)
    }

    async fn try_mark_installment_paid(
        &self,
        id: InstallmentId,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Installment>, PortError> {
        let mut installments = lock(&self.installments);
        let Some(installment) = installments.get_mut(&id) else {
            return Ok(None);
        };
        if installment.mark_paid(by, method, at).is_err() {
            return Ok(None);
        }
        Ok(Some(installment.clone()))
    }

    async fn try_revert_installment(
        &self,
        id: InstallmentId,
    ) -> Result<Option<Installment>, PortError> {
        let mut installments = lock(&self.installments);
        let Some(installment) = installments.get_mut(&id) else {
            return Ok(None);
        };
        if installment.revert_to_pending().is_err() {
            return Ok(None);
        }
        Ok(Some(installment.clone()))
    }

    async fn try_cancel_bill(
        &self,
        id: BillId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<(Bill, Vec<Installment>)>, PortError> {
        let mut bills = lock(&self.bills);
        let mut installments = lock(&self.installments);

        let Some(bill) = bills.get_mut(&id) else {
            return Ok(None);
        };
        if bill.cancel(by, at).is_err() {
            return Ok(None);
        }

        let mut cancelled = Vec::new();
        for installment in installments.values_mut() {
            if installment.bill_id == id {
                installment.cancel(by, at);
                cancelled.push(installment.clone());
            }
        }
        cancelled.sort_by_key(|i| i.number);
        Ok(Some((bill.clone(), cancelled)))
    }

    async fn try_pay_all(
        &self,
        bill_id: BillId,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Installment>>, PortError> {
        let bills = lock(&self.bills);
        let mut installments = lock(&self.installments);

        let Some(bill) = bills.get(&bill_id) else {
            return Ok(None);
        };
        if bill.cancelled {
            return Ok(None);
        }

        let mut paid = Vec::new();
        for installment in installments.values_mut() {
            if installment.bill_id == bill_id && installment.mark_paid(by, method, at).is_ok() {
                paid.push(installment.clone());
            }
        }
        paid.sort_by_key(|i| i.number);
        Ok(Some(paid))
    }
}

/// In-memory ledger store
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    transactions: Mutex<HashMap<TransactionId, Transaction>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for MemoryLedgerStore {}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), PortError> {
        lock(&self.transactions).insert(transaction.id, transaction.clone());
        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, PortError> {
        Ok(lock(&self.transactions).get(&id).cloned())
    }

    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, PortError> {
        let mut hits: Vec<Transaction> = lock(&self.transactions)
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(hits)
    }

    async fn try_cancel(
        &self,
        id: TransactionId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, PortError> {
        let mut transactions = lock(&self.transactions);
        let Some(transaction) = transactions.get_mut(&id) else {
            return Ok(None);
        };
        if transaction.cancel(by, at).is_err() {
            return Ok(None);
        }
        Ok(Some(transaction.clone()))
    }
}

/// In-memory sale store
#[derive(Debug, Default)]
pub struct MemorySaleStore {
    sales: Mutex<Vec<Sale>>,
}

impl MemorySaleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DomainPort for MemorySaleStore {}

#[async_trait]
impl SaleStore for MemorySaleStore {
    async fn insert(&self, sale: &Sale) -> Result<(), PortError> {
        lock(&self.sales).push(sale.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Sale>, PortError> {
        let mut sales = lock(&self.sales).clone();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sales)
    }

    async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Sale>, PortError> {
        let mut sales: Vec<Sale> = lock(&self.sales)
            .iter()
            .filter(|s| s.seller_id == seller_id)
            .cloned()
            .collect();
        sales.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(sales)
    }
}

/// Plain-text report renderer test double
#[derive(Debug, Default)]
pub struct PlainReportRenderer;

impl ReportRenderer for PlainReportRenderer {
    fn content_type(&self) -> &'static str {
        "text/plain"
    }

    fn render(
        &self,
        summary: &TransactionSummary,
        rows: &[Transaction],
    ) -> Result<Vec<u8>, PortError> {
        let body = format!(
            "entradas={} saidas={} saldo={} count={} rows={}",
            summary.total_entrada,
            summary.total_saida,
            summary.saldo,
            summary.count,
            rows.len()
        );
        Ok(body.into_bytes())
    }
}
