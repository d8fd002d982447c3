use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

use crate::error::ApiError;
use crate::extractors::ApiJson;
use crate::middleware::AuthUser;
use crate::models::NewTicket;
use crate::services::booking;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/orders", get(list_orders).post(create_order))
}

/* ---------- LIST ---------- */

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

// GET /api/orders - только свои заказы, новые сверху
async fn list_orders(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<OrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 20);
    let offset = i64::from(page - 1) * i64::from(page_size);

    let orders = state
        .store
        .list_orders(user.user_id, i64::from(page_size), offset)
        .await?;
    Ok(Json(orders))
}

/* ---------- CREATE ---------- */

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    // пустой список отсекает booking::validate_tickets
    #[validate(nested)]
    pub tickets: Vec<NewTicket>,
}

// POST /api/orders
async fn create_order(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    booking::validate_tickets(state.store.as_ref(), &req.tickets).await?;

    let order = state.store.create_order(user.user_id, &req.tickets).await?;

    tracing::info!(
        "order {} with {} tickets created for user {}",
        order.id,
        order.tickets.len(),
        user.user_id
    );
    Ok((StatusCode::CREATED, Json(order)))
}
