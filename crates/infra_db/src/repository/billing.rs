//! PostgreSQL adapters for bills, installments, the ledger and sales
//!
//! Status transitions are conditional UPDATEs (`WHERE status = 'pending'`
//! and friends) so the precondition test and the write are one atomic
//! statement; bill creation inserts the bill and its installments in one
//! transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use core_kernel::{
    BillId, ClientId, DomainPort, InstallmentId, PortError, ProductId, SaleId, TransactionId,
    UserId,
};
use domain_billing::{
    Bill, BillStore, Installment, LedgerStore, PaymentMethod, PendingFilter,
    PendingInstallmentRow, Sale, SaleStore, Transaction, TransactionFilter,
};

use crate::error::DatabaseError;
use crate::repository::parse_money;

const SELECT_INSTALLMENT: &str = r#"
    SELECT installment_id, bill_id, number, amount, currency, due_date,
           status, paid_at, paid_by, paid_method, cancelled_at, cancelled_by
    FROM installments
"#;

const RETURNING_INSTALLMENT: &str = r#"
    RETURNING installment_id, bill_id, number, amount, currency, due_date,
              status, paid_at, paid_by, paid_method, cancelled_at, cancelled_by
"#;

const SELECT_BILL: &str = r#"
    SELECT bill_id, client_id, product_id, description, total, currency,
           installment_count, cancelled, cancelled_by, cancelled_at,
           created_by, created_at
    FROM bills
"#;

/// Database row for a bill
#[derive(Debug, sqlx::FromRow)]
struct BillRow {
    bill_id: Uuid,
    client_id: Uuid,
    product_id: Option<Uuid>,
    description: String,
    total: Decimal,
    currency: String,
    installment_count: i32,
    cancelled: bool,
    cancelled_by: Option<Uuid>,
    cancelled_at: Option<DateTime<Utc>>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl BillRow {
    fn into_bill(self) -> Result<Bill, DatabaseError> {
        Ok(Bill {
            id: BillId::from(self.bill_id),
            client_id: ClientId::from(self.client_id),
            product_id: self.product_id.map(ProductId::from),
            description: self.description,
            total: parse_money(self.total, &self.currency)?,
            installment_count: self.installment_count as u32,
            cancelled: self.cancelled,
            cancelled_by: self.cancelled_by.map(UserId::from),
            cancelled_at: self.cancelled_at,
            created_by: UserId::from(self.created_by),
            created_at: self.created_at,
        })
    }
}

/// Database row for an installment
#[derive(Debug, sqlx::FromRow)]
struct InstallmentRow {
    installment_id: Uuid,
    bill_id: Uuid,
    number: i32,
    amount: Decimal,
    currency: String,
    due_date: DateTime<Utc>,
    status: String,
    paid_at: Option<DateTime<Utc>>,
    paid_by: Option<Uuid>,
    paid_method: Option<String>,
    cancelled_at: Option<DateTime<Utc>>,
    cancelled_by: Option<Uuid>,
}

impl InstallmentRow {
    fn into_installment(self) -> Result<Installment, DatabaseError> {
        let status = self.status.parse().map_err(DatabaseError::decode)?;
        let paid_method = self
            .paid_method
            .map(|m| m.parse::<PaymentMethod>().map_err(DatabaseError::decode))
            .transpose()?;

        Ok(Installment {
            id: InstallmentId::from(self.installment_id),
            bill_id: BillId::from(self.bill_id),
            number: self.number as u32,
            amount: parse_money(self.amount, &self.currency)?,
            due_date: self.due_date,
            status,
            paid_at: self.paid_at,
            paid_by: self.paid_by.map(UserId::from),
            paid_method,
            cancelled_at: self.cancelled_at,
            cancelled_by: self.cancelled_by.map(UserId::from),
        })
    }
}

/// Joined row for the cross-bill pending query
#[derive(Debug, sqlx::FromRow)]
struct PendingRow {
    installment_id: Uuid,
    bill_id: Uuid,
    number: i32,
    amount: Decimal,
    currency: String,
    due_date: DateTime<Utc>,
    status: String,
    paid_at: Option<DateTime<Utc>>,
    paid_by: Option<Uuid>,
    paid_method: Option<String>,
    i_cancelled_at: Option<DateTime<Utc>>,
    i_cancelled_by: Option<Uuid>,
    client_id: Uuid,
    product_id: Option<Uuid>,
    description: String,
    total: Decimal,
    bill_currency: String,
    installment_count: i32,
    cancelled: bool,
    b_cancelled_by: Option<Uuid>,
    b_cancelled_at: Option<DateTime<Utc>>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    client_name: String,
    product_name: Option<String>,
}

impl PendingRow {
    fn into_row(self) -> Result<PendingInstallmentRow, DatabaseError> {
        let installment = InstallmentRow {
            installment_id: self.installment_id,
            bill_id: self.bill_id,
            number: self.number,
            amount: self.amount,
            currency: self.currency,
            due_date: self.due_date,
            status: self.status,
            paid_at: self.paid_at,
            paid_by: self.paid_by,
            paid_method: self.paid_method,
            cancelled_at: self.i_cancelled_at,
            cancelled_by: self.i_cancelled_by,
        }
        .into_installment()?;

        let bill = BillRow {
            bill_id: self.bill_id,
            client_id: self.client_id,
            product_id: self.product_id,
            description: self.description,
            total: self.total,
            currency: self.bill_currency,
            installment_count: self.installment_count,
            cancelled: self.cancelled,
            cancelled_by: self.b_cancelled_by,
            cancelled_at: self.b_cancelled_at,
            created_by: self.created_by,
            created_at: self.created_at,
        }
        .into_bill()?;

        Ok(PendingInstallmentRow {
            installment,
            bill,
            client_name: self.client_name,
            product_name: self.product_name,
        })
    }
}

/// PostgreSQL-backed implementation of [`BillStore`]
#[derive(Debug, Clone)]
pub struct PgBillStore {
    pool: PgPool,
}

impl PgBillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgBillStore {}

#[async_trait]
impl BillStore for PgBillStore {
    async fn insert_bill(
        &self,
        bill: &Bill,
        installments: &[Installment],
    ) -> Result<(), PortError> {
        // One transaction: the bill never exists without its schedule.
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        sqlx::query(
            r#"
            INSERT INTO bills (
                bill_id, client_id, product_id, description, total, currency,
                installment_count, cancelled, created_by, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, $8, $9)
            "#,
        )
        .bind(bill.id.as_uuid())
        .bind(bill.client_id.as_uuid())
        .bind(bill.product_id.map(Uuid::from))
        .bind(&bill.description)
        .bind(bill.total.amount())
        .bind(bill.total.currency().code())
        .bind(bill.installment_count as i32)
        .bind(bill.created_by.as_uuid())
        .bind(bill.created_at)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        for installment in installments {
            sqlx::query(
                r#"
                INSERT INTO installments (
                    installment_id, bill_id, number, amount, currency,
                    due_date, status
                ) VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(installment.id.as_uuid())
            .bind(installment.bill_id.as_uuid())
            .bind(installment.number as i32)
            .bind(installment.amount.amount())
            .bind(installment.amount.currency().code())
            .bind(installment.due_date)
            .bind(installment.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::from)?;
        }

        tx.commit().await.map_err(DatabaseError::from)?;
        Ok(())
    }

    async fn get_bill(&self, id: BillId) -> Result<Option<Bill>, PortError> {
        let row = sqlx::query_as::<_, BillRow>(&format!("{SELECT_BILL} WHERE bill_id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        row.map(|r| r.into_bill().map_err(PortError::from)).transpose()
    }

    async fn list_bills(&self) -> Result<Vec<Bill>, PortError> {
        let rows = sqlx::query_as::<_, BillRow>(&format!(
            "{SELECT_BILL} ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_bill().map_err(PortError::from))
            .collect()
    }

    async fn get_installment(&self, id: InstallmentId) -> Result<Option<Installment>, PortError> {
        let row = sqlx::query_as::<_, InstallmentRow>(&format!(
            "{SELECT_INSTALLMENT} WHERE installment_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_installment().map_err(PortError::from))
            .transpose()
    }

    async fn installments_for_bill(
        &self,
        bill_id: BillId,
    ) -> Result<Vec<Installment>, PortError> {
        let rows = sqlx::query_as::<_, InstallmentRow>(&format!(
            "{SELECT_INSTALLMENT} WHERE bill_id = $1 ORDER BY number"
        ))
        .bind(bill_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_installment().map_err(PortError::from))
            .collect()
    }

    async fn find_pending(
        &self,
        filter: &PendingFilter,
    ) -> Result<Vec<PendingInstallmentRow>, PortError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT i.installment_id, i.bill_id, i.number, i.amount, i.currency,
                   i.due_date, i.status, i.paid_at, i.paid_by, i.paid_method,
                   i.cancelled_at AS i_cancelled_at, i.cancelled_by AS i_cancelled_by,
                   b.client_id, b.product_id, b.description, b.total,
                   b.currency AS bill_currency, b.installment_count, b.cancelled,
                   b.cancelled_by AS b_cancelled_by, b.cancelled_at AS b_cancelled_at,
                   b.created_by, b.created_at,
                   c.name AS client_name, p.name AS product_name
            FROM installments i
            JOIN bills b ON b.bill_id = i.bill_id
            JOIN clients c ON c.client_id = b.client_id
            LEFT JOIN products p ON p.product_id = b.product_id
            WHERE i.status = 'pending' AND NOT b.cancelled
            "#,
        );

        if let Some(client_id) = filter.client_id {
            query.push(" AND b.client_id = ");
            query.push_bind(Uuid::from(client_id));
        }
        if let Some(product_id) = filter.product_id {
            query.push(" AND b.product_id = ");
            query.push_bind(Uuid::from(product_id));
        }
        if filter.overdue_only {
            query.push(" AND i.due_date < NOW()");
        }
        if let Some(month) = filter.month {
            query.push(" AND EXTRACT(MONTH FROM i.due_date) = ");
            query.push_bind(month as i32);
        }
        if let Some(year) = filter.year {
            query.push(" AND EXTRACT(YEAR FROM i.due_date) = ");
            query.push_bind(year);
        }
        if let Some(ref client_name) = filter.client_name {
            query.push(" AND c.name ILIKE ");
            query.push_bind(format!("%{client_name}%"));
        }
        query.push(" ORDER BY i.due_date ASC");

        let rows: Vec<PendingRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_row().map_err(PortError::from))
            .collect()
    }

    async fn try_mark_installment_paid(
        &self,
        id: InstallmentId,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Installment>, PortError> {
        let row = sqlx::query_as::<_, InstallmentRow>(&format!(
            r#"
            UPDATE installments
            SET status = 'paid', paid_at = $2, paid_by = $3, paid_method = $4
            WHERE installment_id = $1 AND status = 'pending'
            {RETURNING_INSTALLMENT}
            "#
        ))
        .bind(id.as_uuid())
        .bind(at)
        .bind(by.as_uuid())
        .bind(method.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_installment().map_err(PortError::from))
            .transpose()
    }

    async fn try_revert_installment(
        &self,
        id: InstallmentId,
    ) -> Result<Option<Installment>, PortError> {
        let row = sqlx::query_as::<_, InstallmentRow>(&format!(
            r#"
            UPDATE installments
            SET status = 'pending', paid_at = NULL, paid_by = NULL,
                paid_method = NULL
            WHERE installment_id = $1 AND status = 'paid'
            {RETURNING_INSTALLMENT}
            "#
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_installment().map_err(PortError::from))
            .transpose()
    }

    async fn try_cancel_bill(
        &self,
        id: BillId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<(Bill, Vec<Installment>)>, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        let bill_row = sqlx::query_as::<_, BillRow>(
            r#"
            UPDATE bills
            SET cancelled = TRUE, cancelled_by = $2, cancelled_at = $3
            WHERE bill_id = $1 AND NOT cancelled
            RETURNING bill_id, client_id, product_id, description, total,
                      currency, installment_count, cancelled, cancelled_by,
                      cancelled_at, created_by, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(by.as_uuid())
        .bind(at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        let Some(bill_row) = bill_row else {
            tx.rollback().await.map_err(DatabaseError::from)?;
            return Ok(None);
        };

        // Cascade to every installment regardless of status.
        let installment_rows = sqlx::query_as::<_, InstallmentRow>(&format!(
            r#"
            UPDATE installments
            SET status = 'cancelled', cancelled_at = $2, cancelled_by = $3
            WHERE bill_id = $1
            {RETURNING_INSTALLMENT}
            "#
        ))
        .bind(id.as_uuid())
        .bind(at)
        .bind(by.as_uuid())
        .fetch_all(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        let bill = bill_row.into_bill().map_err(PortError::from)?;
        let mut installments = installment_rows
            .into_iter()
            .map(|r| r.into_installment().map_err(PortError::from))
            .collect::<Result<Vec<_>, _>>()?;
        installments.sort_by_key(|i| i.number);

        Ok(Some((bill, installments)))
    }

    async fn try_pay_all(
        &self,
        bill_id: BillId,
        by: UserId,
        method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Option<Vec<Installment>>, PortError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        // Lock the bill row so a concurrent cancel cannot slip between the
        // check and the batch update.
        let bill: Option<(bool,)> =
            sqlx::query_as("SELECT cancelled FROM bills WHERE bill_id = $1 FOR UPDATE")
                .bind(bill_id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(DatabaseError::from)?;

        match bill {
            None | Some((true,)) => {
                tx.rollback().await.map_err(DatabaseError::from)?;
                return Ok(None);
            }
            Some((false,)) => {}
        }

        let rows = sqlx::query_as::<_, InstallmentRow>(&format!(
            r#"
            UPDATE installments
            SET status = 'paid', paid_at = $2, paid_by = $3, paid_method = $4
            WHERE bill_id = $1 AND status = 'pending'
            {RETURNING_INSTALLMENT}
            "#
        ))
        .bind(bill_id.as_uuid())
        .bind(at)
        .bind(by.as_uuid())
        .bind(method.as_str())
        .fetch_all(&mut *tx)
        .await
        .map_err(DatabaseError::from)?;

        tx.commit().await.map_err(DatabaseError::from)?;

        let mut installments = rows
            .into_iter()
            .map(|r| r.into_installment().map_err(PortError::from))
            .collect::<Result<Vec<_>, _>>()?;
        installments.sort_by_key(|i| i.number);

        Ok(Some(installments))
    }
}

const SELECT_TRANSACTION: &str = r#"
    SELECT transaction_id, kind, amount, currency, description, method,
           product_id, client_id, installment_id, recorded_by, cancelled,
           cancelled_by, cancelled_at, created_at
    FROM transactions
"#;

/// Database row for a ledger transaction
#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    transaction_id: Uuid,
    kind: String,
    amount: Decimal,
    currency: String,
    description: String,
    method: String,
    product_id: Option<Uuid>,
    client_id: Option<Uuid>,
    installment_id: Option<Uuid>,
    recorded_by: Uuid,
    cancelled: bool,
    cancelled_by: Option<Uuid>,
    cancelled_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TransactionRow {
    fn into_transaction(self) -> Result<Transaction, DatabaseError> {
        Ok(Transaction {
            id: TransactionId::from(self.transaction_id),
            kind: self.kind.parse().map_err(DatabaseError::decode)?,
            amount: parse_money(self.amount, &self.currency)?,
            description: self.description,
            method: self.method.parse().map_err(DatabaseError::decode)?,
            product_id: self.product_id.map(ProductId::from),
            client_id: self.client_id.map(ClientId::from),
            installment_id: self.installment_id.map(InstallmentId::from),
            recorded_by: UserId::from(self.recorded_by),
            cancelled: self.cancelled,
            cancelled_by: self.cancelled_by.map(UserId::from),
            cancelled_at: self.cancelled_at,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL-backed implementation of [`LedgerStore`]
#[derive(Debug, Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgLedgerStore {}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn insert(&self, transaction: &Transaction) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_id, kind, amount, currency, description, method,
                product_id, client_id, installment_id, recorded_by,
                cancelled, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE, $11)
            "#,
        )
        .bind(transaction.id.as_uuid())
        .bind(transaction.kind.as_str())
        .bind(transaction.amount.amount())
        .bind(transaction.amount.currency().code())
        .bind(&transaction.description)
        .bind(transaction.method.as_str())
        .bind(transaction.product_id.map(Uuid::from))
        .bind(transaction.client_id.map(Uuid::from))
        .bind(transaction.installment_id.map(Uuid::from))
        .bind(transaction.recorded_by.as_uuid())
        .bind(transaction.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn get(&self, id: TransactionId) -> Result<Option<Transaction>, PortError> {
        let row = sqlx::query_as::<_, TransactionRow>(&format!(
            "{SELECT_TRANSACTION} WHERE transaction_id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_transaction().map_err(PortError::from))
            .transpose()
    }

    async fn list(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>, PortError> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("{SELECT_TRANSACTION} WHERE TRUE"));

        if let Some(kind) = filter.kind {
            query.push(" AND kind = ");
            query.push_bind(kind.as_str());
        }
        if let Some(method) = filter.method {
            query.push(" AND method = ");
            query.push_bind(method.as_str());
        }
        if let Some(start) = filter.start_date {
            query.push(" AND created_at >= ");
            query.push_bind(start);
        }
        if let Some(end) = filter.end_date {
            query.push(" AND created_at <= ");
            query.push_bind(end);
        }
        if let Some(client_id) = filter.client_id {
            query.push(" AND client_id = ");
            query.push_bind(Uuid::from(client_id));
        }
        query.push(" ORDER BY created_at DESC");

        let rows: Vec<TransactionRow> = query
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_transaction().map_err(PortError::from))
            .collect()
    }

    async fn try_cancel(
        &self,
        id: TransactionId,
        by: UserId,
        at: DateTime<Utc>,
    ) -> Result<Option<Transaction>, PortError> {
        let row = sqlx::query_as::<_, TransactionRow>(
            r#"
            UPDATE transactions
            SET cancelled = TRUE, cancelled_by = $2, cancelled_at = $3
            WHERE transaction_id = $1 AND NOT cancelled
            RETURNING transaction_id, kind, amount, currency, description,
                      method, product_id, client_id, installment_id,
                      recorded_by, cancelled, cancelled_by, cancelled_at,
                      created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(by.as_uuid())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        row.map(|r| r.into_transaction().map_err(PortError::from))
            .transpose()
    }
}

const SELECT_SALE: &str = r#"
    SELECT sale_id, seller_id, seller_name, product_id, product_name,
           client_id, quantity, unit_price, total, currency, method,
           created_at
    FROM sales
"#;

/// Database row for a sale
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    sale_id: Uuid,
    seller_id: Uuid,
    seller_name: String,
    product_id: Uuid,
    product_name: String,
    client_id: Option<Uuid>,
    quantity: i32,
    unit_price: Decimal,
    total: Decimal,
    currency: String,
    method: String,
    created_at: DateTime<Utc>,
}

impl SaleRow {
    fn into_sale(self) -> Result<Sale, DatabaseError> {
        Ok(Sale {
            id: SaleId::from(self.sale_id),
            seller_id: UserId::from(self.seller_id),
            seller_name: self.seller_name,
            product_id: ProductId::from(self.product_id),
            product_name: self.product_name,
            client_id: self.client_id.map(ClientId::from),
            quantity: self.quantity as u32,
            unit_price: parse_money(self.unit_price, &self.currency)?,
            total: parse_money(self.total, &self.currency)?,
            method: self.method.parse().map_err(DatabaseError::decode)?,
            created_at: self.created_at,
        })
    }
}

/// PostgreSQL-backed implementation of [`SaleStore`]
#[derive(Debug, Clone)]
pub struct PgSaleStore {
    pool: PgPool,
}

impl PgSaleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl DomainPort for PgSaleStore {}

#[async_trait]
impl SaleStore for PgSaleStore {
    async fn insert(&self, sale: &Sale) -> Result<(), PortError> {
        sqlx::query(
            r#"
            INSERT INTO sales (
                sale_id, seller_id, seller_name, product_id, product_name,
                client_id, quantity, unit_price, total, currency, method,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(sale.id.as_uuid())
        .bind(sale.seller_id.as_uuid())
        .bind(&sale.seller_name)
        .bind(sale.product_id.as_uuid())
        .bind(&sale.product_name)
        .bind(sale.client_id.map(Uuid::from))
        .bind(sale.quantity as i32)
        .bind(sale.unit_price.amount())
        .bind(sale.total.amount())
        .bind(sale.total.currency().code())
        .bind(sale.method.as_str())
        .bind(sale.created_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Sale>, PortError> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "{SELECT_SALE} ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_sale().map_err(PortError::from))
            .collect()
    }

    async fn list_by_seller(&self, seller_id: UserId) -> Result<Vec<Sale>, PortError> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "{SELECT_SALE} WHERE seller_id = $1 ORDER BY created_at DESC"
        ))
        .bind(seller_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|r| r.into_sale().map_err(PortError::from))
            .collect()
    }
}
