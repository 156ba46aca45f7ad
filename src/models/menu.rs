use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};
use crate::request::ApiRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

/// Menu items reference their category either nested or by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Id(u64),
    Full(Category),
}

impl CategoryRef {
    pub fn id(&self) -> u64 {
        match self {
            CategoryRef::Id(id) => *id,
            CategoryRef::Full(category) => category.id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            CategoryRef::Id(_) => None,
            CategoryRef::Full(category) => Some(&category.title),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: u64,
    pub title: String,
    /// Decimal as sent by the backend, e.g. `"12.50"`
    pub price: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub inventory: Option<u32>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCategory {
    pub title: String,
}

/// Image attached to a new menu item
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Bytes,
}

impl ImageUpload {
    /// Guess the MIME type from the file extension
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).map(str::to_string);
        Self {
            file_name,
            mime,
            bytes: bytes.into(),
        }
    }
}

fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Fields of the manager "add menu item" form
#[derive(Debug, Clone)]
pub struct NewMenuItem {
    pub title: String,
    pub price: String,
    pub featured: bool,
    pub category_id: Option<u64>,
    pub image: Option<ImageUpload>,
}

impl NewMenuItem {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ApiError::Validation("title is required".to_string()));
        }
        if !is_decimal_price(&self.price) {
            return Err(ApiError::Validation(format!(
                "price must be a decimal with at most two places, got {:?}",
                self.price
            )));
        }
        Ok(())
    }

    /// Multipart request for `POST /api/menu-items`.
    /// The backend reads the category from `category_id`.
    pub fn to_request(&self, path: &str) -> Result<ApiRequest> {
        self.validate()?;

        let mut request = ApiRequest::post(path)
            .text_field("title", self.title.trim())
            .text_field("price", self.price.trim())
            .text_field("featured", self.featured.to_string());

        if let Some(category_id) = self.category_id {
            request = request.text_field("category_id", category_id.to_string());
        }
        if let Some(image) = &self.image {
            request = request.file_field(
                "image",
                image.file_name.clone(),
                image.mime.clone(),
                image.bytes.clone(),
            );
        }
        Ok(request)
    }
}

fn is_decimal_price(price: &str) -> bool {
    let price = price.trim();
    let (whole, frac) = match price.split_once('.') {
        Some((whole, frac)) => (whole, Some(frac)),
        None => (price, None),
    };

    let digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    digits(whole) && frac.map_or(true, |f| digits(f) && f.len() <= 2)
}
