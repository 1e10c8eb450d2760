//! Product, attribute and variant handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, AppError};
use shared::models::{
    AttributeCreate, AttributeValuesAdd, AttributeValuesDelete, AttributesBulkUpdate,
    AttributesDelete, MutationResult, Product, ProductCreate, VariantsBulkUpdate, VariantsDelete,
};

use crate::state::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

// ── Products ──

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<ProductCreate>,
) -> ApiResult<Product> {
    let product = state.products.create(payload).await?;
    Ok(Json(ApiResponse::success(product)))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Product> {
    let product = state.products.get(id).await?;
    Ok(Json(ApiResponse::success(product)))
}

// ── Attributes ──

pub async fn add_attribute(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AttributeCreate>,
) -> ApiResult<MutationResult> {
    let result = state.mutations.add_attribute(id, payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn add_attribute_values(
    State(state): State<AppState>,
    Path((id, attr_id)): Path<(i64, i64)>,
    Json(payload): Json<AttributeValuesAdd>,
) -> ApiResult<MutationResult> {
    let result = state
        .mutations
        .add_attribute_values(id, attr_id, payload)
        .await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn update_attributes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AttributesBulkUpdate>,
) -> ApiResult<MutationResult> {
    let result = state.mutations.update_attributes(id, payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn delete_attributes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AttributesDelete>,
) -> ApiResult<MutationResult> {
    let result = state.mutations.delete_attributes(id, payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn delete_attribute_values(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AttributeValuesDelete>,
) -> ApiResult<MutationResult> {
    let result = state.mutations.delete_attribute_values(id, payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

// ── Variants ──

pub async fn update_variants(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VariantsBulkUpdate>,
) -> ApiResult<MutationResult> {
    let result = state.mutations.update_variants(id, payload).await?;
    Ok(Json(ApiResponse::success(result)))
}

pub async fn delete_variants(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<VariantsDelete>,
) -> ApiResult<MutationResult> {
    let result = state.mutations.delete_variants(id, payload).await?;
    Ok(Json(ApiResponse::success(result)))
}
