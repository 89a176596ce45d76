// src/handlers/users.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{OwnerOnly, RequireRole},
    },
    models::users::{User, UserRole},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(length(min = 3, message = "name_too_short"))]
    #[schema(example = "Maria Oliveira")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria.oliveira@example.com")]
    pub email: String,

    #[validate(length(min = 6, message = "password_too_short"))]
    #[schema(example = "segredo123")]
    pub password: String,

    #[schema(example = "Vendedor")]
    pub role: UserRole,
}

impl CreateUserPayload {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    #[validate(length(min = 3, message = "name_too_short"))]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    pub email: String,

    pub role: UserRole,
}

impl UpdateUserPayload {
    fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_string();
    }
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    responses(
        (status = 200, description = "Diretório de usuários", body = Vec<User>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state.user_service
        .list_users(&app_state.db_pool)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(users)))
}

// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    tag = "Users",
    request_body = CreateUserPayload,
    responses(
        (status = 201, description = "Usuário criado com conta de acesso", body = User),
        (status = 400, description = "Dados inválidos ou cargo de Dono"),
        (status = 403, description = "Apenas o Dono"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_user(
    _guard: RequireRole<OwnerOnly>,
    State(app_state): State<AppState>,
    locale: Locale,
    Json(mut payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.normalize();
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state.user_service
        .add_user(&payload.name, &payload.email, &payload.password, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(user)))
}

// PUT /api/users/{id}
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    tag = "Users",
    request_body = UpdateUserPayload,
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário atualizado", body = User),
        (status = 403, description = "Apenas o Dono, e o Dono não pode ser editado"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    _guard: RequireRole<OwnerOnly>,
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload.normalize();
    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let user = app_state.user_service
        .edit_user(id, &payload.name, &payload.email, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(user)))
}

// DELETE /api/users/{id}
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 204, description = "Usuário e conta removidos"),
        (status = 403, description = "Apenas o Dono, e o Dono não pode ser removido"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    _guard: RequireRole<OwnerOnly>,
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state.user_service
        .delete_user(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_labels_are_portuguese() {
        let payload: CreateUserPayload = serde_json::from_value(json!({
            "name": "Maria Oliveira",
            "email": "maria@foxdash.com",
            "password": "segredo123",
            "role": "Funcionário"
        }))
        .unwrap();

        assert_eq!(payload.role, UserRole::Employee);
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = serde_json::from_value::<UpdateUserPayload>(json!({
            "name": "Maria Oliveira",
            "email": "maria@foxdash.com",
            "role": "Gerente"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn whitespace_name_fails_validation() {
        let mut payload: UpdateUserPayload = serde_json::from_value(json!({
            "name": "  ab   ",
            "email": " maria@foxdash.com ",
            "role": "Vendedor"
        }))
        .unwrap();

        payload.normalize();
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(!fields.contains_key("email"));
    }

    #[test]
    fn short_password_fails_validation() {
        let payload: CreateUserPayload = serde_json::from_value(json!({
            "name": "Maria Oliveira",
            "email": "maria@foxdash.com",
            "password": "123",
            "role": "Vendedor"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }
}
