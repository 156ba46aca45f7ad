use super::{keys, LemonApi};
use crate::error::Result;
use crate::models::{AddToCart, CartItem, ListResponse};
use crate::request::ApiRequest;

const CART_PATH: &str = "/api/cart/menu-items";

impl LemonApi {
    pub async fn cart(&self) -> Result<Vec<CartItem>> {
        let list: ListResponse<CartItem> = self
            .query(keys::CART, None, ApiRequest::get(CART_PATH))
            .await?;
        Ok(list.into_vec())
    }

    /// Add `quantity` of a menu item. A 400 is returned as-is; there is no
    /// second attempt with another payload shape.
    pub async fn add_to_cart(&self, menuitem_id: u64, quantity: u32) -> Result<CartItem> {
        let request = ApiRequest::post(CART_PATH).json(&AddToCart::new(menuitem_id, quantity)?)?;
        self.mutate(request, &[keys::CART]).await
    }

    /// Remove everything from the cart
    pub async fn clear_cart(&self) -> Result<()> {
        self.mutate_empty(ApiRequest::delete(CART_PATH), &[keys::CART])
            .await
    }
}
