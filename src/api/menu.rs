use super::{keys, LemonApi};
use crate::error::{ApiError, Result};
use crate::models::{Category, ListResponse, MenuItem, NewCategory, NewMenuItem};
use crate::request::ApiRequest;

const CATEGORIES_PATH: &str = "/api/categories";
const MENU_ITEMS_PATH: &str = "/api/menu-items";

impl LemonApi {
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let list: ListResponse<Category> = self
            .query(keys::CATEGORIES, None, ApiRequest::get(CATEGORIES_PATH))
            .await?;
        Ok(list.into_vec())
    }

    pub async fn create_category(&self, title: &str) -> Result<Category> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::Validation("category title is required".to_string()));
        }

        let request = ApiRequest::post(CATEGORIES_PATH).json(&NewCategory {
            title: title.to_string(),
        })?;
        self.mutate(request, &[keys::CATEGORIES]).await
    }

    /// Menu, newest first
    pub async fn menu_items(&self) -> Result<Vec<MenuItem>> {
        let request = ApiRequest::get(MENU_ITEMS_PATH).query("ordering", "-id");
        let list: ListResponse<MenuItem> = self.query(keys::MENU_ITEMS, None, request).await?;
        Ok(list.into_vec())
    }

    /// Multipart upload of a new menu item, image included
    pub async fn create_menu_item(&self, item: &NewMenuItem) -> Result<MenuItem> {
        let request = item.to_request(MENU_ITEMS_PATH)?;
        self.mutate(request, &[keys::MENU_ITEMS]).await
    }
}
