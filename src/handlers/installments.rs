// src/handlers/installments.rs

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use chrono::NaiveDate;
use futures_util::{Stream, StreamExt};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::{field_error, ApiError, AppError},
    config::AppState,
    handlers::sse::snapshot_event,
    middleware::i18n::Locale,
    models::installments::{
        Installment, InstallmentFilter, InstallmentStatus, SelectionRequest, SelectionState,
    },
    services::realtime::{snapshot_updates, Collection},
};

fn default_status() -> InstallmentStatus {
    InstallmentStatus::Pending
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstallmentPayload {
    pub client_id: Uuid,

    #[schema(example = 100.0)]
    pub value: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-08-10")]
    pub due_date: NaiveDate,

    #[serde(default = "default_status")]
    pub status: InstallmentStatus,
}

impl InstallmentPayload {
    // O valor é gravado em centavos: vale o valor já arredondado
    fn check(&self) -> Result<(), AppError> {
        if self.value.round_dp(2) <= Decimal::ZERO {
            return Err(field_error("value", "must_be_positive"));
        }
        Ok(())
    }
}

// GET /api/installments
#[utoipa::path(
    get,
    path = "/api/installments",
    tag = "Installments",
    params(InstallmentFilter),
    responses(
        (status = 200, description = "Parcelas por data de vencimento", body = Vec<Installment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_installments(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<InstallmentFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let installments = app_state.installment_service
        .list_installments(&app_state.db_pool, &filter)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(installments)))
}

// POST /api/installments
#[utoipa::path(
    post,
    path = "/api/installments",
    tag = "Installments",
    request_body = InstallmentPayload,
    responses(
        (status = 201, description = "Parcela criada", body = Installment),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_installment(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<InstallmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.check()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let installment = app_state.installment_service
        .add_installment(
            &app_state.db_pool,
            payload.client_id,
            payload.value,
            payload.due_date,
            payload.status,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(installment)))
}

// PUT /api/installments/{id}
#[utoipa::path(
    put,
    path = "/api/installments/{id}",
    tag = "Installments",
    request_body = InstallmentPayload,
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 200, description = "Parcela atualizada", body = Installment),
        (status = 404, description = "Parcela ou cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_installment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<InstallmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.check()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let installment = app_state.installment_service
        .edit_installment(
            &app_state.db_pool,
            id,
            payload.client_id,
            payload.value,
            payload.due_date,
            payload.status,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(installment)))
}

// DELETE /api/installments/{id}
#[utoipa::path(
    delete,
    path = "/api/installments/{id}",
    tag = "Installments",
    params(("id" = Uuid, Path, description = "ID da parcela")),
    responses(
        (status = 204, description = "Parcela removida"),
        (status = 404, description = "Parcela não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_installment(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.installment_service
        .delete_installment(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/installments/selection
#[utoipa::path(
    post,
    path = "/api/installments/selection",
    tag = "Installments",
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Nova seleção sobre a lista filtrada", body = SelectionState)
    ),
    security(("api_jwt" = []))
)]
pub async fn update_selection(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(request): Json<SelectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let state = app_state.installment_service
        .update_selection(&app_state.db_pool, &request.filter, &request.selected, &request.action)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(state)))
}

// GET /api/installments/stream
#[utoipa::path(
    get,
    path = "/api/installments/stream",
    tag = "Installments",
    params(InstallmentFilter),
    responses(
        (status = 200, description = "Stream SSE: evento `snapshot` com a lista filtrada a cada mudança")
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_installments(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(filter): Query<InstallmentFilter>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let service = app_state.installment_service.clone();
    let pool = app_state.db_pool.clone();
    let store = app_state.i18n_store.clone();

    // O nome do cliente vem do JOIN, então mudanças em clientes também contam
    let updates = snapshot_updates(
        app_state.feed.subscribe(),
        &[Collection::Installments, Collection::Clients],
        move || {
            let service = service.clone();
            let pool = pool.clone();
            let filter = filter.clone();
            async move { service.list_installments(&pool, &filter).await }
        },
    );

    Sse::new(updates.map(move |item| snapshot_event(item, &locale, &store)))
        .keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::installments::SelectionAction;
    use serde_json::json;

    #[test]
    fn status_defaults_to_pending() {
        let payload: InstallmentPayload = serde_json::from_value(json!({
            "clientId": Uuid::new_v4(),
            "value": 100.0,
            "dueDate": "2024-08-10"
        }))
        .unwrap();

        assert_eq!(payload.status, InstallmentStatus::Pending);
        assert!(payload.check().is_ok());
    }

    #[test]
    fn status_accepts_portuguese_labels() {
        let payload: InstallmentPayload = serde_json::from_value(json!({
            "clientId": Uuid::new_v4(),
            "value": 50,
            "dueDate": "2024-09-10",
            "status": "Não Pago"
        }))
        .unwrap();

        assert_eq!(payload.status, InstallmentStatus::Unpaid);
    }

    #[test]
    fn non_positive_value_is_rejected() {
        let payload: InstallmentPayload = serde_json::from_value(json!({
            "clientId": Uuid::new_v4(),
            "value": 0,
            "dueDate": "2024-08-10"
        }))
        .unwrap();

        assert!(matches!(payload.check(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn sub_cent_value_is_rejected() {
        let payload: InstallmentPayload = serde_json::from_value(json!({
            "clientId": Uuid::new_v4(),
            "value": 0.004,
            "dueDate": "2024-08-10"
        }))
        .unwrap();

        assert!(payload.value > Decimal::ZERO);
        assert!(matches!(payload.check(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn missing_client_id_fails_to_parse() {
        let result = serde_json::from_value::<InstallmentPayload>(json!({
            "value": 10,
            "dueDate": "2024-08-10"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn selection_request_reads_filter_and_action() {
        let client_id = Uuid::new_v4();
        let row = Uuid::new_v4();
        let request: SelectionRequest = serde_json::from_value(json!({
            "clientId": client_id,
            "selected": [],
            "action": { "type": "toggle", "id": row }
        }))
        .unwrap();

        assert_eq!(request.filter.client_id, Some(client_id));
        assert!(matches!(request.action, SelectionAction::Toggle { id } if id == row));

        let request: SelectionRequest = serde_json::from_value(json!({
            "action": { "type": "selectAll" }
        }))
        .unwrap();
        assert!(request.filter.client_id.is_none());
        assert!(matches!(request.action, SelectionAction::SelectAll));
    }
}
