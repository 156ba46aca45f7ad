use serde::{Deserialize, Serialize};

use super::menu::MenuItem;
use crate::error::{ApiError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: u64,
    pub quantity: u32,
    pub unit_price: String,
    pub price: String,
    pub menuitem: MenuItem,
}

/// Body of `POST /api/cart/menu-items`.
///
/// The backend accepts the item id as `menuitem_id` or `menuitem`; only
/// `menuitem_id` is ever sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddToCart {
    pub menuitem_id: u64,
    pub quantity: u32,
}

impl AddToCart {
    pub fn new(menuitem_id: u64, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(ApiError::Validation(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            menuitem_id,
            quantity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_to_cart_payload_shape() {
        let body = AddToCart::new(7, 2).unwrap();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"menuitem_id": 7, "quantity": 2})
        );
    }

    #[test]
    fn test_zero_quantity_rejected() {
        assert!(matches!(AddToCart::new(7, 0), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_cart_item_decodes_nested_menu_item() {
        let item: CartItem = serde_json::from_str(
            r#"{"id": 1, "quantity": 2, "unit_price": "7.99", "price": "15.98", "user": 5,
                "menuitem": {"id": 3, "title": "Bruschetta", "price": "7.99", "featured": false,
                             "category": {"id": 2, "title": "Starters"}}}"#,
        )
        .unwrap();
        assert_eq!(item.menuitem.title, "Bruschetta");
        assert_eq!(item.price, "15.98");
    }
}
