//! Postgres store implementations (behind the `storage-postgres` feature).
//!
//! Queries are bound at runtime so the crate builds without a live
//! database. Statuses are stored as text and parsed back through the
//! closed status sets; a row holding an unknown status is a backend error.

use super::{OrderStore, PaymentStore, StoreError};
use crate::entities::{Order, OrderLineItem, OrderStatus, PaymentRecord, PaymentStatus};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use time::OffsetDateTime;
use uuid::Uuid;

pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn parse_status<T: std::str::FromStr>(raw: &str) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e: T::Err| StoreError::Backend(format!("corrupt status column: {e}")))
}

fn order_from_row(row: &PgRow, items: Vec<OrderLineItem>) -> Result<Order, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(Order {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        total_amount: row.try_get("total_amount")?,
        status: parse_status::<OrderStatus>(&status)?,
        queue_number: row.try_get("queue_number")?,
        special_instructions: row.try_get("special_instructions")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        items,
    })
}

async fn fetch_items(pool: &PgPool, order_id: Uuid) -> Result<Vec<OrderLineItem>, StoreError> {
    let rows = sqlx::query(
        "SELECT menu_item_id, item_name, quantity, price, special_instructions \
         FROM order_items WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let quantity: i32 = row.try_get("quantity")?;
            Ok(OrderLineItem {
                menu_item_id: row.try_get("menu_item_id")?,
                item_name: row.try_get("item_name")?,
                quantity: quantity.max(0) as u32,
                price: row.try_get("price")?,
                special_instructions: row.try_get("special_instructions")?,
            })
        })
        .collect()
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert(&self, order: Order) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders \
             (id, user_id, total_amount, status, queue_number, special_instructions, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(order.queue_number)
        .bind(&order.special_instructions)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items \
                 (order_id, menu_item_id, item_name, quantity, price, special_instructions) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order.id)
            .bind(&item.menu_item_id)
            .bind(&item.item_name)
            .bind(item.quantity as i32)
            .bind(item.price)
            .bind(&item.special_instructions)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, order_id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query("SELECT * FROM orders WHERE id = $1")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = fetch_items(&self.pool, order_id).await?;
                Ok(Some(order_from_row(&row, items)?))
            }
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query(
            "UPDATE orders SET status = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(order_id)
        .bind(status.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = fetch_items(&self.pool, order_id).await?;
                Ok(Some(order_from_row(&row, items)?))
            }
            None => Ok(None),
        }
    }
}

pub struct PgPaymentStore {
    pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn payment_from_row(row: &PgRow) -> Result<PaymentRecord, StoreError> {
    let status: String = row.try_get("status")?;
    Ok(PaymentRecord {
        payment_id: row.try_get("payment_id")?,
        order_id: row.try_get("order_id")?,
        user_id: row.try_get("user_id")?,
        amount: row.try_get("amount")?,
        status: parse_status::<PaymentStatus>(&status)?,
        payment_method: row.try_get("payment_method")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    async fn insert(&self, payment: PaymentRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO payments \
             (payment_id, order_id, user_id, amount, status, payment_method, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&payment.payment_id)
        .bind(payment.order_id)
        .bind(payment.user_id)
        .bind(payment.amount)
        .bind(payment.status.as_str())
        .bind(&payment.payment_method)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, payment_id: &str) -> Result<Option<PaymentRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM payments WHERE payment_id = $1")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(payment_from_row).transpose()
    }

    async fn latest_for_order(
        &self,
        order_id: Uuid,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(payment_from_row).transpose()
    }

    async fn update_status(
        &self,
        payment_id: &str,
        status: PaymentStatus,
        updated_at: OffsetDateTime,
    ) -> Result<Option<PaymentRecord>, StoreError> {
        let row = sqlx::query(
            "UPDATE payments SET status = $2, updated_at = $3 WHERE payment_id = $1 RETURNING *",
        )
        .bind(payment_id)
        .bind(status.as_str())
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(payment_from_row).transpose()
    }
}
