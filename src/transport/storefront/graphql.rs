//! Read-only GraphQL surface over the catalog.

use crate::app::ProductStore;
use crate::domain::Product;
use async_graphql::http::GraphiQLSource;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject};
use axum::response::{Html, IntoResponse};
use std::sync::Arc;

pub type CatalogSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// Storefront view of a product. `category` is always a list.
///
/// `title` and `price` are null for records stored without a usable value.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct ProductView {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub category: Vec<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            price: product.price.as_ref().and_then(|p| p.as_f64()),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            category: product
                .category
                .as_ref()
                .map(|c| c.labels())
                .unwrap_or_default(),
        }
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Products in catalog order, optionally only those in `category`.
    async fn products(
        &self,
        ctx: &Context<'_>,
        category: Option<String>,
    ) -> async_graphql::Result<Vec<ProductView>> {
        let store = ctx.data::<Arc<ProductStore>>()?;
        let products = match category {
            Some(label) => store.get_by_category(&label).await?,
            None => store.list().await?,
        };
        Ok(products.iter().map(ProductView::from).collect())
    }
}

pub fn build_schema(store: Arc<ProductStore>) -> CatalogSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(store)
        .finish()
}

pub async fn graphiql() -> impl IntoResponse {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{LockStrategy, MemoryBackend};
    use serde_json::json;

    fn store() -> Arc<ProductStore> {
        let doc = json!([
            {"id": 1, "title": "Hammer", "price": 12, "category": "tools"},
            {"id": 2, "title": "Tent", "price": 99.5, "description": "Dome",
             "category": ["tools", "outdoor"], "imageUrl": "t.png"}
        ]);
        Arc::new(ProductStore::new(
            Arc::new(MemoryBackend::with_document(serde_json::to_vec(&doc).unwrap())),
            LockStrategy::ProcessLocal,
        ))
    }

    #[tokio::test]
    async fn products_query_normalizes_category_to_list() {
        let schema = build_schema(store());
        let res = schema
            .execute("{ products { title price description imageUrl category } }")
            .await;
        assert!(res.errors.is_empty(), "{:?}", res.errors);
        let data = res.data.into_json().unwrap();
        assert_eq!(
            data,
            json!({"products": [
                {"title": "Hammer", "price": 12.0, "description": null, "imageUrl": null, "category": ["tools"]},
                {"title": "Tent", "price": 99.5, "description": "Dome", "imageUrl": "t.png", "category": ["tools", "outdoor"]}
            ]})
        );
    }

    #[tokio::test]
    async fn products_query_filters_by_category() {
        let schema = build_schema(store());
        let res = schema
            .execute(r#"{ products(category: "outdoor") { title } }"#)
            .await;
        let data = res.data.into_json().unwrap();
        assert_eq!(data, json!({"products": [{"title": "Tent"}]}));
    }

    #[tokio::test]
    async fn store_failure_is_a_graphql_error() {
        let store = Arc::new(ProductStore::new(
            Arc::new(MemoryBackend::with_document(&b"not json"[..])),
            LockStrategy::ProcessLocal,
        ));
        let res = build_schema(store).execute("{ products { title } }").await;
        assert_eq!(res.errors.len(), 1);
    }
}
