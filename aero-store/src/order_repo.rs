use aero_core::booking::{Order, OrderStatus, Passenger, PassengerType};
use aero_core::catalog::CabinClass;
use aero_core::repository::OrderRepository;
use aero_core::{CoreError, CoreResult};
use aero_shared::PageRequest;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::debug;

use crate::error::DbResultExt;

pub struct StoreOrderRepository {
    pool: PgPool,
}

impl StoreOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal structs for type-safe querying
#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    schedule_id: String,
    flight_date: NaiveDate,
    cabin_class: String,
    total_passenger: i32,
    total_amount: f64,
    status: String,
    contact_name: String,
    contact_email: String,
    contact_phone: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct PassengerRow {
    id: String,
    order_id: String,
    title: String,
    full_name: String,
    passenger_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PassengerRow> for Passenger {
    type Error = CoreError;

    fn try_from(row: PassengerRow) -> Result<Self, Self::Error> {
        let passenger_type: PassengerType = row.passenger_type.parse().map_err(|e| {
            CoreError::InternalError(format!("passenger {} is corrupt: {}", row.id, e))
        })?;

        Ok(Passenger {
            id: row.id,
            order_id: row.order_id,
            title: row.title,
            full_name: row.full_name,
            passenger_type,
            created_at: row.created_at,
        })
    }
}

impl OrderRow {
    fn into_order(self, passengers: Vec<Passenger>) -> CoreResult<Order> {
        let status: OrderStatus = self
            .status
            .parse()
            .map_err(|e| CoreError::InternalError(format!("order {} is corrupt: {}", self.id, e)))?;

        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            schedule_id: self.schedule_id,
            flight_date: self.flight_date,
            cabin_class: CabinClass::parse_or_economy(&self.cabin_class),
            total_passenger: self.total_passenger,
            total_amount: self.total_amount,
            status,
            contact_name: self.contact_name,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            passengers,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const SELECT_ORDER: &str = r#"
    SELECT id, user_id, schedule_id, flight_date, cabin_class, total_passenger, total_amount,
           status, contact_name, contact_email, contact_phone, created_at, updated_at
    FROM orders
"#;

const SELECT_PASSENGER: &str =
    "SELECT id, order_id, title, full_name, passenger_type, created_at FROM passengers";

impl StoreOrderRepository {
    /// Loads the passengers of every row in one query and assembles the orders.
    async fn with_passengers(&self, rows: Vec<OrderRow>) -> CoreResult<Vec<Order>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let passenger_rows = sqlx::query_as::<_, PassengerRow>(&format!(
            "{} WHERE order_id = ANY($1) ORDER BY created_at ASC, id ASC",
            SELECT_PASSENGER
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .or_core("passenger")?;

        let mut by_order: HashMap<String, Vec<Passenger>> = HashMap::new();
        for row in passenger_rows {
            let passenger = Passenger::try_from(row)?;
            by_order.entry(passenger.order_id.clone()).or_default().push(passenger);
        }

        rows.into_iter()
            .map(|row| {
                let passengers = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(passengers)
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for StoreOrderRepository {
    async fn create(&self, order: &Order) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.or_core("order")?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, schedule_id, flight_date, cabin_class, total_passenger, total_amount,
                status, contact_name, contact_email, contact_phone, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(&order.id)
        .bind(&order.user_id)
        .bind(&order.schedule_id)
        .bind(order.flight_date)
        .bind(order.cabin_class.as_str())
        .bind(order.total_passenger)
        .bind(order.total_amount)
        .bind(order.status.as_str())
        .bind(&order.contact_name)
        .bind(&order.contact_email)
        .bind(&order.contact_phone)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .or_core("order")?;

        for passenger in &order.passengers {
            sqlx::query(
                r#"
                INSERT INTO passengers (id, order_id, title, full_name, passenger_type, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(&passenger.id)
            .bind(&order.id)
            .bind(&passenger.title)
            .bind(&passenger.full_name)
            .bind(passenger.passenger_type.as_str())
            .bind(passenger.created_at)
            .execute(&mut *tx)
            .await
            .or_core("passenger")?;
        }

        tx.commit().await.or_core("order")?;
        debug!(order_id = %order.id, passengers = order.passengers.len(), "order persisted");

        Ok(())
    }

    async fn update(&self, order: &Order) -> CoreResult<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, contact_name = $3, contact_email = $4, contact_phone = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(&order.id)
        .bind(order.status.as_str())
        .bind(&order.contact_name)
        .bind(&order.contact_email)
        .bind(&order.contact_phone)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await
        .or_core("order")?;

        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> CoreResult<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!("{} WHERE id = $1", SELECT_ORDER))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .or_core("order")?;

        match row {
            Some(row) => Ok(self.with_passengers(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, page: PageRequest) -> CoreResult<(Vec<Order>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await
            .or_core("order")?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            SELECT_ORDER
        ))
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("order")?;

        Ok((self.with_passengers(rows).await?, total))
    }

    async fn list_by_user(&self, user_id: &str, page: PageRequest) -> CoreResult<(Vec<Order>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .or_core("order")?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "{} WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            SELECT_ORDER
        ))
        .bind(user_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .or_core("order")?;

        Ok((self.with_passengers(rows).await?, total))
    }
}
