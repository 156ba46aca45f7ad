// Data models for the Little Lemon API

pub mod cart;
pub mod menu;
pub mod order;
pub mod user;

pub use cart::{AddToCart, CartItem};
pub use menu::{Category, CategoryRef, ImageUpload, MenuItem, NewCategory, NewMenuItem};
pub use order::{Order, OrderItem, OrderStatus, OrderUpdate};
pub use user::{Me, User};

use serde::Deserialize;

/// List endpoints answer with either a bare array or a paginated
/// `{"results": [...]}` object, depending on backend pagination settings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListResponse<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListResponse<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Paged { results } => results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_plain_and_paged_lists() {
        let plain: ListResponse<Category> =
            serde_json::from_str(r#"[{"id": 1, "title": "Mains"}]"#).unwrap();
        assert_eq!(plain.into_vec().len(), 1);

        let paged: ListResponse<Category> = serde_json::from_str(
            r#"{"count": 2, "next": null, "previous": null,
                "results": [{"id": 1, "title": "Mains"}, {"id": 2, "title": "Desserts"}]}"#,
        )
        .unwrap();
        let items = paged.into_vec();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].title, "Desserts");
    }

    #[test]
    fn test_unrelated_object_is_rejected() {
        let parsed = serde_json::from_str::<ListResponse<Category>>(r#"{"detail": "Not found"}"#);
        assert!(parsed.is_err());
    }

    proptest! {
        #[test]
        fn prop_both_list_shapes_agree(ids in proptest::collection::vec(1u64..10_000, 0..20)) {
            let items: Vec<serde_json::Value> = ids
                .iter()
                .map(|id| serde_json::json!({"id": id, "title": format!("c{}", id)}))
                .collect();

            let plain: ListResponse<Category> =
                serde_json::from_value(serde_json::Value::Array(items.clone())).unwrap();
            let paged: ListResponse<Category> =
                serde_json::from_value(serde_json::json!({"results": items})).unwrap();

            let plain_ids: Vec<u64> = plain.into_vec().iter().map(|c| c.id).collect();
            let paged_ids: Vec<u64> = paged.into_vec().iter().map(|c| c.id).collect();
            prop_assert_eq!(&plain_ids, &ids);
            prop_assert_eq!(&paged_ids, &ids);
        }
    }
}
