use crate::transport::http::handlers::common::{reply, store_error_reply};
use crate::transport::http::types::{
    json_400, path_400, ApiResponse, ApiResult, AppState, NewProductDoc,
};
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::Value as JsonValue;

#[utoipa::path(
    get,
    path = "/products",
    responses(
        (status = 200, description = "All products in stored order; `data` is an array of Product", body = ApiResponse),
        (status = 500, description = "Catalog document unreadable or malformed", body = ApiResponse)
    )
)]
pub async fn list_products_handler(State(state): State<AppState>) -> ApiResult {
    let products = state.store.list().await.map_err(store_error_reply)?;
    Ok(reply(StatusCode::OK, &products))
}

#[utoipa::path(
    post,
    path = "/products",
    request_body(content = NewProductDoc, description = "One product object or an array of product objects"),
    responses(
        (status = 201, description = "Product(s) added; `data` holds them with assigned ids", body = ApiResponse),
        (status = 400, description = "Invalid input", body = ApiResponse),
        (status = 500, description = "Catalog document could not be read or written", body = ApiResponse)
    )
)]
pub async fn create_products_handler(
    State(state): State<AppState>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> ApiResult {
    let Json(body) = body.map_err(|e| json_400(e, "a product object or an array of products"))?;
    let drafts = match body {
        JsonValue::Array(items) => items,
        obj @ JsonValue::Object(_) => vec![obj],
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::failure(
                    "Body must be a product object or an array of products",
                )),
            ))
        }
    };

    let created = state
        .store
        .insert_many(drafts)
        .await
        .map_err(store_error_reply)?;
    for product in &created {
        state
            .notifications
            .publish(format!("product {} created", product.id));
    }
    Ok(reply(StatusCode::CREATED, &created))
}

#[utoipa::path(
    get,
    path = "/products/{id}",
    params(("id" = u64, Path, description = "ID of the product to retrieve")),
    responses(
        (status = 200, description = "The requested product", body = ApiResponse),
        (status = 400, description = "Invalid product id", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse)
    )
)]
pub async fn get_product_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult {
    let Path(id) = id.map_err(path_400)?;
    let product = state.store.get_by_id(id).await.map_err(store_error_reply)?;
    Ok(reply(StatusCode::OK, &product))
}

#[utoipa::path(
    get,
    path = "/products/category/{category}",
    params(("category" = String, Path, description = "Category label to match")),
    responses(
        (status = 200, description = "Products whose category is, or contains, the label", body = ApiResponse),
        (status = 404, description = "No products found in this category", body = ApiResponse)
    )
)]
pub async fn products_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult {
    let products = state
        .store
        .get_by_category(&category)
        .await
        .map_err(store_error_reply)?;
    if products.is_empty() {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ApiResponse::failure(format!(
                "No products found in category '{}'",
                category
            ))),
        ));
    }
    Ok(reply(StatusCode::OK, &products))
}

#[utoipa::path(
    put,
    path = "/products/{id}",
    params(("id" = u64, Path, description = "ID of the product to update")),
    request_body(content = NewProductDoc, description = "Any subset of product fields to merge; `id` is ignored"),
    responses(
        (status = 200, description = "Product updated; `data` is the merged product", body = ApiResponse),
        (status = 400, description = "Invalid input", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse)
    )
)]
pub async fn update_product_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<JsonValue>, JsonRejection>,
) -> ApiResult {
    let Path(id) = id.map_err(path_400)?;
    let Json(patch) = body.map_err(|e| json_400(e, "an object of fields to update"))?;
    let updated = state
        .store
        .update(id, &patch)
        .await
        .map_err(store_error_reply)?;
    state
        .notifications
        .publish(format!("product {} updated", updated.id));
    Ok(reply(StatusCode::OK, &updated))
}

#[utoipa::path(
    delete,
    path = "/products/{id}",
    params(("id" = u64, Path, description = "ID of the product to delete")),
    responses(
        (status = 200, description = "Product deleted; `data` is the removed product", body = ApiResponse),
        (status = 400, description = "Invalid product id", body = ApiResponse),
        (status = 404, description = "Product not found", body = ApiResponse)
    )
)]
pub async fn delete_product_handler(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> ApiResult {
    let Path(id) = id.map_err(path_400)?;
    let removed = state.store.delete(id).await.map_err(store_error_reply)?;
    state
        .notifications
        .publish(format!("product {} deleted", removed.id));
    Ok(reply(StatusCode::OK, &removed))
}
