//! Fully wired back office over in-memory adapters
//!
//! One constructor call gives a test every service with shared stores, the
//! way the server binary wires the Postgres adapters. Tests reach the raw
//! stores (e.g. to count audit entries) through the public fields.

use std::sync::Arc;

use domain_access::AccessService;
use domain_billing::{BillingService, LedgerService, SaleService};
use domain_registry::{BrIdentityValidator, ClientService, ProductService};

use crate::memory::{
    MemoryAuditLog, MemoryBillStore, MemoryClientStore, MemoryLedgerStore, MemoryProductStore,
    MemorySaleStore, MemoryUserStore, PlainReportRenderer, PlainTextHasher,
};

/// Every service of the system wired over shared in-memory stores
pub struct TestBackOffice {
    pub audit: Arc<MemoryAuditLog>,
    pub users: Arc<MemoryUserStore>,
    pub products_store: Arc<MemoryProductStore>,
    pub clients_store: Arc<MemoryClientStore>,
    pub bills_store: Arc<MemoryBillStore>,
    pub ledger_store: Arc<MemoryLedgerStore>,
    pub sales_store: Arc<MemorySaleStore>,

    pub access: AccessService,
    pub products: ProductService,
    pub clients: ClientService,
    pub billing: BillingService,
    pub ledger: LedgerService,
    pub sales: SaleService,
}

impl TestBackOffice {
    pub fn new() -> Self {
        let audit = Arc::new(MemoryAuditLog::new());
        let users = Arc::new(MemoryUserStore::new());
        let products_store = Arc::new(MemoryProductStore::new());
        let clients_store = Arc::new(MemoryClientStore::new());
        let bills_store = Arc::new(MemoryBillStore::new(
            clients_store.clone(),
            products_store.clone(),
        ));
        let ledger_store = Arc::new(MemoryLedgerStore::new());
        let sales_store = Arc::new(MemorySaleStore::new());

        let access = AccessService::new(
            users.clone(),
            Arc::new(PlainTextHasher),
            audit.clone(),
        );
        let products = ProductService::new(products_store.clone(), audit.clone());
        let clients = ClientService::new(
            clients_store.clone(),
            Arc::new(BrIdentityValidator::new()),
            audit.clone(),
        );
        let billing = BillingService::new(
            bills_store.clone(),
            products_store.clone(),
            clients_store.clone(),
            audit.clone(),
        );
        let ledger = LedgerService::new(
            ledger_store.clone(),
            bills_store.clone(),
            clients_store.clone(),
            products_store.clone(),
            audit.clone(),
            Arc::new(PlainReportRenderer),
        );
        let sales = SaleService::new(sales_store.clone(), products_store.clone(), audit.clone());

        Self {
            audit,
            users,
            products_store,
            clients_store,
            bills_store,
            ledger_store,
            sales_store,
            access,
            products,
            clients,
            billing,
            ledger,
            sales,
        }
    }
}

impl Default for TestBackOffice {
    fn default() -> Self {
        Self::new()
    }
}
