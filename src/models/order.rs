use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::menu::MenuItem;
use super::user::User;
use crate::error::{ApiError, Result};

/// Order status as the backend encodes it: `0` in progress, `1` delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OrderStatus {
    InProgress,
    Delivered,
}

impl TryFrom<u8> for OrderStatus {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(OrderStatus::InProgress),
            1 => Ok(OrderStatus::Delivered),
            other => Err(format!("unknown order status {}", other)),
        }
    }
}

impl From<OrderStatus> for u8 {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::InProgress => 0,
            OrderStatus::Delivered => 1,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::InProgress => write!(f, "in progress"),
            OrderStatus::Delivered => write!(f, "delivered"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub menuitem: MenuItem,
    pub quantity: u32,
    pub unit_price: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    pub status: OrderStatus,
    pub total: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub delivery_crew: Option<User>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: String,
}

/// Body of `PATCH /api/orders/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_crew_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl OrderUpdate {
    pub fn validate(&self) -> Result<()> {
        if self.delivery_crew_id.is_none() && self.status.is_none() {
            return Err(ApiError::Validation(
                "order update needs a delivery crew id or a status".to_string(),
            ));
        }
        Ok(())
    }
}
