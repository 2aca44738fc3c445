use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::catalog::{new_id, CabinClass};
use crate::CoreError;

/// Order status in the lifecycle
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Completed => "completed",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "confirmed" => Ok(OrderStatus::Confirmed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "completed" => Ok(OrderStatus::Completed),
            other => Err(CoreError::ValidationError(format!(
                "invalid order status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
}

impl PassengerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerType::Adult => "adult",
            PassengerType::Child => "child",
            PassengerType::Infant => "infant",
        }
    }
}

impl FromStr for PassengerType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "adult" => Ok(PassengerType::Adult),
            "child" => Ok(PassengerType::Child),
            "infant" => Ok(PassengerType::Infant),
            other => Err(CoreError::ValidationError(format!(
                "invalid passenger type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Passenger {
    pub id: String,
    pub order_id: String,
    /// Mr, Mrs, Ms
    pub title: String,
    pub full_name: String,
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
    pub created_at: DateTime<Utc>,
}

impl Passenger {
    pub fn new(order_id: &str, title: String, full_name: String, passenger_type: PassengerType) -> Self {
        Self {
            id: new_id(),
            order_id: order_id.to_string(),
            title,
            full_name,
            passenger_type,
            created_at: Utc::now(),
        }
    }
}

/// A booking of one schedule on one date. Owns its passengers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub schedule_id: String,
    pub flight_date: NaiveDate,
    pub cabin_class: CabinClass,
    pub total_passenger: i32,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub contact_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub passengers: Vec<Passenger>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Update order status
    pub fn update_status(&mut self, new_status: OrderStatus) {
        self.status = new_status;
        self.updated_at = Utc::now();
    }

    pub fn cancel(&mut self) -> Result<(), CoreError> {
        if self.status == OrderStatus::Completed {
            return Err(CoreError::ValidationError(
                "a completed order cannot be cancelled".to_string(),
            ));
        }
        self.update_status(OrderStatus::Cancelled);
        Ok(())
    }
}
