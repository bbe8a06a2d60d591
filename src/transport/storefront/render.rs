//! `/mainmarket`: the storefront page with one card per product.

use crate::domain::Product;
use crate::transport::storefront::StorefrontState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt::Write;
use tracing::error;

pub const PRODUCTS_PLACEHOLDER: &str = "<!-- PRODUCTS_HERE -->";

pub async fn mainmarket_handler(State(state): State<StorefrontState>) -> Response {
    let template = match tokio::fs::read_to_string(&state.template_path).await {
        Ok(t) => t,
        Err(e) => {
            error!(template = %state.template_path.display(), "failed to read template: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Error loading storefront page").into_response();
        }
    };
    match state.store.list().await {
        Ok(products) => Html(render_page(&template, &products)).into_response(),
        Err(e) => {
            error!("failed to load products: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Error loading products").into_response()
        }
    }
}

pub fn render_page(template: &str, products: &[Product]) -> String {
    template.replace(PRODUCTS_PLACEHOLDER, &render_cards(products))
}

pub fn render_cards(products: &[Product]) -> String {
    let mut out = String::new();
    for product in products {
        let title = escape_html(product.title.as_deref().unwrap_or(""));
        let categories = product
            .category
            .as_ref()
            .map(|c| c.labels().join(", "))
            .unwrap_or_default();
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            r#"
        <div class="product-card">
          <img src="{image}" alt="{title}" width="150">
          <h3>{title}</h3>
          <p>Price: ${price}</p>
          <p>{description}</p>
          <p>Category: {categories}</p>
        </div>
"#,
            image = escape_html(product.image_url.as_deref().unwrap_or("")),
            title = title,
            price = product
                .price
                .as_ref()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            description = escape_html(product.description.as_deref().unwrap_or("")),
            categories = escape_html(&categories),
        );
    }
    out
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
