// src/handlers/ai.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::ai::{GenerateReportInput, GenerateReportOutput, RevenueForecastInput, RevenueForecastOutput},
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ForecastQuery {
    /// Código da moeda (padrão: DEFAULT_CURRENCY)
    #[param(example = "BRL")]
    pub currency: Option<String>,
}

// POST /api/ai/report
#[utoipa::path(
    post,
    path = "/api/ai/report",
    tag = "AI",
    request_body = GenerateReportInput,
    responses(
        (status = 200, description = "Relatório gerado", body = GenerateReportOutput),
        (status = 400, description = "Pergunta vazia"),
        (status = 502, description = "Falha no modelo de IA")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_report(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<GenerateReportInput>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let output = app_state.ai_service
        .generate_report(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(output)))
}

// POST /api/ai/forecast
#[utoipa::path(
    post,
    path = "/api/ai/forecast",
    tag = "AI",
    request_body = RevenueForecastInput,
    responses(
        (status = 200, description = "Previsão a partir dos valores informados", body = RevenueForecastOutput),
        (status = 400, description = "São necessários exatamente três meses"),
        (status = 502, description = "Falha no modelo de IA")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_revenue_forecast(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RevenueForecastInput>,
) -> Result<impl IntoResponse, ApiError> {
    let output = app_state.ai_service
        .generate_revenue_forecast(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(output)))
}

// GET /api/ai/forecast
#[utoipa::path(
    get,
    path = "/api/ai/forecast",
    tag = "AI",
    params(ForecastQuery),
    responses(
        (status = 200, description = "Previsão com a receita paga dos três últimos meses", body = RevenueForecastOutput),
        (status = 502, description = "Falha no modelo de IA")
    ),
    security(("api_jwt" = []))
)]
pub async fn forecast_from_ledger(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<ForecastQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = query
        .currency
        .unwrap_or_else(|| app_state.config.default_currency.clone());

    let output = app_state.ai_service
        .forecast_from_ledger(&app_state.db_pool, &currency, Utc::now().date_naive())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(output)))
}
