use aero_catalog::PricingEngine;
use aero_core::account::Actor;
use aero_core::booking::{Order, OrderStatus, Passenger};
use aero_core::catalog::{new_id, CabinClass, ScheduleDetail};
use aero_core::repository::{OrderRepository, ScheduleRepository};
use aero_core::{CoreError, CoreResult, DataSource, Sources};
use aero_search::AccessPolicy;
use aero_shared::{Page, PageRequest};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;

use crate::models::{contact_email, parse_flight_date, required, validate_passengers, CreateOrder, UpdateOrder};

/// Manages order lifecycle: placement, lookup, cancellation and admin edits.
pub struct OrderManager {
    orders: Arc<dyn OrderRepository>,
    schedules: Sources<dyn ScheduleRepository>,
    pricing: PricingEngine,
}

impl OrderManager {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        schedules: Sources<dyn ScheduleRepository>,
        pricing: PricingEngine,
    ) -> Self {
        Self {
            orders,
            schedules,
            pricing,
        }
    }

    /// Places a pending order. The schedule is priced from the source the
    /// caller's policy assigns to its airline, the same copy search shows.
    pub async fn create_order(&self, actor: &Actor, policy: &AccessPolicy, input: CreateOrder) -> CoreResult<Order> {
        self.create_order_on(actor, policy, input, Utc::now().date_naive()).await
    }

    async fn create_order_on(
        &self,
        actor: &Actor,
        policy: &AccessPolicy,
        input: CreateOrder,
        today: NaiveDate,
    ) -> CoreResult<Order> {
        let schedule_id = required("schedule_id", &input.schedule_id)?;
        let flight_date = parse_flight_date(&input.flight_date, today)?;
        let drafts = validate_passengers(&input.passengers)?;
        let contact_name = required("contact_name", &input.contact_name)?;
        let contact_email = contact_email(&input.contact_email)?;
        let contact_phone = required("contact_phone", &input.contact_phone)?;

        let (detail, source) = self.find_schedule(policy, &schedule_id).await?;

        let cabin_class = CabinClass::parse_or_economy(&input.cabin_class);
        let types: Vec<_> = drafts.iter().map(|d| d.passenger_type).collect();
        let quote = self.pricing.quote(&detail.schedule, cabin_class, &types);

        let order_id = new_id();
        let passengers: Vec<Passenger> = drafts
            .into_iter()
            .map(|d| Passenger::new(&order_id, d.title, d.full_name, d.passenger_type))
            .collect();
        let now = Utc::now();
        let order = Order {
            id: order_id,
            user_id: actor.user_id.clone(),
            schedule_id,
            flight_date,
            cabin_class,
            total_passenger: passengers.len() as i32,
            total_amount: quote.total_amount,
            status: OrderStatus::Pending,
            contact_name,
            contact_email,
            contact_phone,
            passengers,
            created_at: now,
            updated_at: now,
        };

        self.orders.create(&order).await?;
        info!(
            order_id = %order.id,
            user_id = %order.user_id,
            %source,
            total_amount = order.total_amount,
            "order placed"
        );
        Ok(order)
    }

    /// Resolves `schedule_id` in the source `policy` gives its airline.
    ///
    /// Staging is the main catalog. Production is consulted only for airlines
    /// the caller is enabled for, so a production-only schedule of another
    /// airline stays invisible.
    async fn find_schedule(&self, policy: &AccessPolicy, schedule_id: &str) -> CoreResult<(ScheduleDetail, DataSource)> {
        if let Some(detail) = self.schedules.staging().find_by_id(schedule_id).await? {
            if policy.source_for_airline(&detail.schedule.airline_id) == DataSource::Staging {
                return Ok((detail, DataSource::Staging));
            }
        }

        if policy.source() == DataSource::Production {
            if let Some(detail) = self.schedules.production().find_by_id(schedule_id).await? {
                if policy.source_for_airline(&detail.schedule.airline_id) == DataSource::Production {
                    return Ok((detail, DataSource::Production));
                }
            }
        }

        Err(CoreError::not_found("schedule"))
    }

    async fn load(&self, order_id: &str) -> CoreResult<Order> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| CoreError::not_found("order"))
    }

    async fn load_for(&self, actor: &Actor, order_id: &str) -> CoreResult<Order> {
        let order = self.load(order_id).await?;
        if !actor.is_admin() && !order.is_owned_by(&actor.user_id) {
            return Err(CoreError::AuthorizationError(
                "you do not have access to this order".to_string(),
            ));
        }
        Ok(order)
    }

    /// Owner or admin only.
    pub async fn get_order(&self, actor: &Actor, order_id: &str) -> CoreResult<Order> {
        self.load_for(actor, order_id).await
    }

    pub async fn cancel_order(&self, actor: &Actor, order_id: &str) -> CoreResult<Order> {
        let mut order = self.load_for(actor, order_id).await?;
        order.cancel()?;
        self.orders.update(&order).await?;
        info!(order_id = %order.id, by = %actor.user_id, "order cancelled");
        Ok(order)
    }

    pub async fn admin_get(&self, order_id: &str) -> CoreResult<Order> {
        self.load(order_id).await
    }

    pub async fn admin_update(&self, order_id: &str, input: UpdateOrder) -> CoreResult<Order> {
        let mut order = self.load(order_id).await?;

        if let Some(raw) = input.status.as_deref() {
            let status: OrderStatus = raw.parse()?;
            order.update_status(status);
        }
        if let Some(raw) = input.contact_name.as_deref() {
            order.contact_name = required("contact_name", raw)?;
        }
        if let Some(raw) = input.contact_email.as_deref() {
            order.contact_email = contact_email(raw)?;
        }
        if let Some(raw) = input.contact_phone.as_deref() {
            order.contact_phone = required("contact_phone", raw)?;
        }
        order.updated_at = Utc::now();

        self.orders.update(&order).await?;
        info!(order_id = %order.id, status = order.status.as_str(), "order updated by admin");
        Ok(order)
    }

    pub async fn list_orders(&self, page: PageRequest) -> CoreResult<Page<Order>> {
        let (orders, total) = self.orders.list(page).await?;
        Ok(Page::new(orders, page, total))
    }

    pub async fn list_user_orders(&self, actor: &Actor, page: PageRequest) -> CoreResult<Page<Order>> {
        let (orders, total) = self.orders.list_by_user(&actor.user_id, page).await?;
        Ok(Page::new(orders, page, total))
    }
}
