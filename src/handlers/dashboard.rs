// src/handlers/dashboard.rs

use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures_util::{Stream, StreamExt};

use crate::{
    common::error::ApiError,
    config::AppState,
    handlers::sse::snapshot_event,
    middleware::i18n::Locale,
    models::dashboard::{DashboardSnapshot, DashboardSummary, MonthlyRevenueEntry, StatusDistributionEntry},
    services::realtime::{snapshot_updates, Collection},
};

// GET /api/dashboard/summary
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards do topo", body = DashboardSummary)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state.dashboard_service
        .get_summary(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/dashboard/monthly-revenue
#[utoipa::path(
    get,
    path = "/api/dashboard/monthly-revenue",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Receita paga por mês (Jan..Dez)", body = Vec<MonthlyRevenueEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_monthly_revenue(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let chart = app_state.dashboard_service
        .get_monthly_revenue(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(chart)))
}

// GET /api/dashboard/status-distribution
#[utoipa::path(
    get,
    path = "/api/dashboard/status-distribution",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Parcelas por status", body = Vec<StatusDistributionEntry>)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_status_distribution(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let distribution = app_state.dashboard_service
        .get_status_distribution(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(distribution)))
}

// GET /api/dashboard/snapshot
#[utoipa::path(
    get,
    path = "/api/dashboard/snapshot",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Cards e gráficos calculados sobre a mesma leitura", body = DashboardSnapshot)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_snapshot(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let snapshot = app_state.dashboard_service
        .get_snapshot(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(snapshot)))
}

// GET /api/dashboard/stream
#[utoipa::path(
    get,
    path = "/api/dashboard/stream",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Stream SSE: evento `snapshot` recalculado a cada mudança")
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_dashboard(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let service = app_state.dashboard_service.clone();
    let pool = app_state.db_pool.clone();
    let store = app_state.i18n_store.clone();

    let updates = snapshot_updates(
        app_state.feed.subscribe(),
        &[Collection::Clients, Collection::Installments],
        move || {
            let service = service.clone();
            let pool = pool.clone();
            async move { service.get_snapshot(&pool).await }
        },
    );

    Sse::new(updates.map(move |item| snapshot_event(item, &locale, &store)))
        .keep_alive(KeepAlive::default())
}
