// src/handlers/clients.rs

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures_util::{Stream, StreamExt};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{field_error, ApiError, AppError},
    config::AppState,
    handlers::sse::snapshot_event,
    middleware::i18n::Locale,
    models::clients::{Client, ClientFields, ClientStatus, DeletedClient, SaleDetails},
    services::realtime::{snapshot_updates, Collection},
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Ana Costa")]
    pub name: String,

    #[validate(length(equal = 14, message = "invalid_cpf"))]
    #[schema(example = "456.789.012-33")]
    pub cpf: String,

    #[validate(length(min = 10, message = "invalid_phone"))]
    #[schema(example = "(41) 98765-8765")]
    pub phone: String,

    #[validate(length(min = 5, message = "address_too_short"))]
    #[schema(example = "Rua 24 Horas")]
    pub address: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "101")]
    pub number: String,

    #[validate(length(min = 3, message = "neighborhood_too_short"))]
    #[schema(example = "Batel")]
    pub neighborhood: String,

    #[validate(length(equal = 9, message = "invalid_zip"))]
    #[schema(example = "45678-901")]
    pub zip: String,

    pub reference: Option<String>,

    // Venda opcional: os dois campos vêm juntos ou nenhum
    #[schema(example = 300.0)]
    pub total_value: Option<Decimal>,

    #[validate(range(min = 1, max = 12, message = "invalid_installment_count"))]
    #[schema(example = 3)]
    pub number_of_installments: Option<u32>,
}

impl CreateClientPayload {
    // O tamanho mínimo vale para o nome sem espaços nas pontas
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn fields(&self) -> ClientFields {
        ClientFields {
            name: self.name.clone(),
            cpf: self.cpf.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            number: self.number.clone(),
            neighborhood: self.neighborhood.clone(),
            zip: self.zip.clone(),
            reference: normalize_reference(self.reference.as_deref()),
        }
    }

    fn sale(&self) -> Result<Option<SaleDetails>, AppError> {
        match (self.total_value, self.number_of_installments) {
            (None, None) => Ok(None),
            (Some(total_value), Some(number_of_installments)) => {
                if total_value <= Decimal::ZERO {
                    return Err(field_error("totalValue", "must_be_positive"));
                }
                Ok(Some(SaleDetails { total_value, number_of_installments }))
            }
            (None, Some(_)) => Err(field_error("totalValue", "required")),
            (Some(_), None) => Err(field_error("numberOfInstallments", "required")),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientPayload {
    #[validate(length(min = 2, message = "name_too_short"))]
    #[schema(example = "Ana Costa")]
    pub name: String,

    #[validate(length(equal = 14, message = "invalid_cpf"))]
    pub cpf: String,

    #[validate(length(min = 10, message = "invalid_phone"))]
    pub phone: String,

    #[validate(length(min = 5, message = "address_too_short"))]
    pub address: String,

    #[validate(length(min = 1, message = "required"))]
    pub number: String,

    #[validate(length(min = 3, message = "neighborhood_too_short"))]
    pub neighborhood: String,

    #[validate(length(equal = 9, message = "invalid_zip"))]
    pub zip: String,

    pub reference: Option<String>,

    pub status: ClientStatus,

    #[validate(range(min = 0, message = "must_not_be_negative"))]
    #[schema(example = 3)]
    pub total_installments: i32,

    #[schema(example = 300.0)]
    pub total_value: Decimal,
}

impl UpdateClientPayload {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
    }

    fn fields(&self) -> ClientFields {
        ClientFields {
            name: self.name.clone(),
            cpf: self.cpf.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            number: self.number.clone(),
            neighborhood: self.neighborhood.clone(),
            zip: self.zip.clone(),
            reference: normalize_reference(self.reference.as_deref()),
        }
    }
}

// Referência em branco é o mesmo que nenhuma
fn normalize_reference(reference: Option<&str>) -> Option<String> {
    reference
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(String::from)
}

// =============================================================================
//  HANDLERS
// =============================================================================

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clients",
    responses(
        (status = 200, description = "Clientes em ordem alfabética", body = Vec<Client>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state.client_service
        .list_clients(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let client = app_state.client_service
        .get_client(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(client)))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clients",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado (com parcelas, se houver venda)", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(mut payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.normalize();
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let sale = payload.sale()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let client = app_state.client_service
        .add_client(&app_state.db_pool, payload.fields(), sale)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clients",
    request_body = UpdateClientPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.normalize();
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    if payload.total_value < Decimal::ZERO {
        return Err(field_error("totalValue", "must_not_be_negative")
            .to_api_error(&locale, &app_state.i18n_store));
    }

    let client = app_state.client_service
        .edit_client(
            &app_state.db_pool,
            id,
            payload.fields(),
            payload.status,
            payload.total_installments,
            payload.total_value,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(client)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clients",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente e parcelas removidos", body = DeletedClient),
        (status = 404, description = "Cliente não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = app_state.client_service
        .delete_client(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(deleted)))
}

// GET /api/clients/stream
#[utoipa::path(
    get,
    path = "/api/clients/stream",
    tag = "Clients",
    responses(
        (status = 200, description = "Stream SSE: evento `snapshot` com a lista completa a cada mudança")
    ),
    security(("api_jwt" = []))
)]
pub async fn stream_clients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let service = app_state.client_service.clone();
    let pool = app_state.db_pool.clone();
    let store = app_state.i18n_store.clone();

    let updates = snapshot_updates(app_state.feed.subscribe(), &[Collection::Clients], move || {
        let service = service.clone();
        let pool = pool.clone();
        async move { service.list_clients(&pool).await }
    });

    Sse::new(updates.map(move |item| snapshot_event(item, &locale, &store)))
        .keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ana_costa() -> serde_json::Value {
        json!({
            "name": "Ana Costa",
            "cpf": "456.789.012-33",
            "phone": "(41) 98765-8765",
            "address": "Rua 24 Horas",
            "number": "101",
            "neighborhood": "Batel",
            "zip": "45678-901",
            "totalValue": 300.0,
            "numberOfInstallments": 3
        })
    }

    #[test]
    fn ana_costa_form_is_valid_with_sale() {
        let payload: CreateClientPayload = serde_json::from_value(ana_costa()).unwrap();
        assert!(payload.validate().is_ok());

        let sale = payload.sale().unwrap().unwrap();
        assert_eq!(sale.total_value, Decimal::new(300, 0));
        assert_eq!(sale.number_of_installments, 3);
        assert_eq!(payload.fields().reference, None);
    }

    #[test]
    fn malformed_fields_are_reported() {
        let mut body = ana_costa();
        body["cpf"] = json!("123");
        body["zip"] = json!("123");
        body["name"] = json!("A");
        body["numberOfInstallments"] = json!(13);

        let payload: CreateClientPayload = serde_json::from_value(body).unwrap();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields.len(), 4);
        for field in ["cpf", "zip", "name"] {
            assert!(fields.contains_key(field), "faltou {}", field);
        }
    }

    #[test]
    fn blank_name_is_rejected_after_trim() {
        let mut body = ana_costa();
        body["name"] = json!("   ");

        let mut payload: CreateClientPayload = serde_json::from_value(body).unwrap();
        payload.normalize();
        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));

        let mut body = ana_costa();
        body["name"] = json!("  Ana Costa  ");
        let mut payload: CreateClientPayload = serde_json::from_value(body).unwrap();
        payload.normalize();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.fields().name, "Ana Costa");
    }

    #[test]
    fn sale_fields_come_in_pairs() {
        let mut body = ana_costa();
        body.as_object_mut().unwrap().remove("numberOfInstallments");
        let payload: CreateClientPayload = serde_json::from_value(body).unwrap();
        assert!(matches!(payload.sale(), Err(AppError::ValidationError(_))));

        let mut body = ana_costa();
        body.as_object_mut().unwrap().remove("numberOfInstallments");
        body.as_object_mut().unwrap().remove("totalValue");
        let payload: CreateClientPayload = serde_json::from_value(body).unwrap();
        assert!(payload.sale().unwrap().is_none());
    }

    #[test]
    fn zero_total_is_rejected() {
        let mut body = ana_costa();
        body["totalValue"] = json!(0);
        let payload: CreateClientPayload = serde_json::from_value(body).unwrap();
        assert!(payload.sale().is_err());
    }

    #[test]
    fn update_payload_takes_status_label() {
        let mut body = ana_costa();
        let obj = body.as_object_mut().unwrap();
        obj.remove("numberOfInstallments");
        obj.insert("status".into(), json!("Inativo"));
        obj.insert("totalInstallments".into(), json!(3));
        obj.insert("reference".into(), json!("   "));

        let payload: UpdateClientPayload = serde_json::from_value(body).unwrap();
        assert!(payload.validate().is_ok());
        assert_eq!(payload.status, ClientStatus::Inactive);
        assert_eq!(payload.fields().reference, None);
    }
}
