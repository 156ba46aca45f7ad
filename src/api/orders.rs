use super::{keys, LemonApi};
use crate::error::Result;
use crate::models::{ListResponse, Order, OrderUpdate, User};
use crate::request::ApiRequest;

const ORDERS_PATH: &str = "/api/orders";
const DELIVERY_CREW_PATH: &str = "/api/groups/delivery-crew/users";

impl LemonApi {
    /// Orders visible to the caller: all for managers, assigned ones for
    /// delivery crew, own orders for customers
    pub async fn orders(&self) -> Result<Vec<Order>> {
        let list: ListResponse<Order> = self
            .query(keys::ORDERS, None, ApiRequest::get(ORDERS_PATH))
            .await?;
        Ok(list.into_vec())
    }

    pub async fn order(&self, id: u64) -> Result<Order> {
        let key = format!("{}:{}", keys::ORDERS, id);
        self.query(&key, None, ApiRequest::get(format!("{}/{}", ORDERS_PATH, id)))
            .await
    }

    /// Turn the current cart into an order; the backend empties the cart
    pub async fn place_order(&self) -> Result<Order> {
        self.mutate(ApiRequest::post(ORDERS_PATH), &[keys::CART, keys::ORDERS])
            .await
    }

    /// Assign a courier and/or change the status of an order
    pub async fn update_order(&self, id: u64, update: &OrderUpdate) -> Result<Order> {
        update.validate()?;
        let request = ApiRequest::patch(format!("{}/{}", ORDERS_PATH, id)).json(update)?;
        self.mutate(request, &[keys::ORDERS]).await
    }

    pub async fn delivery_crew(&self) -> Result<Vec<User>> {
        let list: ListResponse<User> = self
            .query(keys::DELIVERY_CREW, None, ApiRequest::get(DELIVERY_CREW_PATH))
            .await?;
        Ok(list.into_vec())
    }
}
