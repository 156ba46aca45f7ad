use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// Minimal user representation (delivery crew, order owner)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Profile of the authenticated user, from `GET /api/me`.
/// Role flags are asserted by the server; missing flags read as false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Me {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_manager: bool,
    #[serde(default)]
    pub is_delivery: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl Me {
    pub fn require_manager(&self) -> Result<()> {
        if self.is_manager {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "{} does not have the manager role",
                self.username
            )))
        }
    }

    /// Short role label for display
    pub fn role(&self) -> &'static str {
        if self.is_manager {
            "manager"
        } else if self.is_delivery {
            "delivery crew"
        } else {
            "customer"
        }
    }
}
