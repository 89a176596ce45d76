// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Os handlers convertem para `ApiError`
// com a mensagem no idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Parcela não encontrada")]
    InstallmentNotFound,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    // O registro do Dono não pode ser alterado nem removido
    #[error("O Dono é protegido")]
    OwnerProtected,

    #[error("O cargo de Dono não pode ser atribuído")]
    OwnerRoleReserved,

    #[error("Falha na chamada ao modelo de IA: {0}")]
    AiRequestFailed(String),

    #[error("Resposta inválida do modelo de IA: {0}")]
    AiInvalidOutput(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Chave usada para buscar a mensagem traduzida no `I18nStore`.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation_error",
            AppError::ClientNotFound => "client_not_found",
            AppError::InstallmentNotFound => "installment_not_found",
            AppError::UserNotFound => "user_not_found",
            AppError::EmailAlreadyExists => "email_already_exists",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::InvalidToken => "invalid_token",
            AppError::Forbidden => "forbidden",
            AppError::OwnerProtected => "owner_protected",
            AppError::OwnerRoleReserved => "owner_role_reserved",
            AppError::AiRequestFailed(_) | AppError::AiInvalidOutput(_) => "ai_unavailable",
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::OwnerRoleReserved => StatusCode::BAD_REQUEST,
            AppError::ClientNotFound | AppError::InstallmentNotFound | AppError::UserNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::EmailAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden | AppError::OwnerProtected => StatusCode::FORBIDDEN,
            AppError::AiRequestFailed(_) | AppError::AiInvalidOutput(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Converte o erro de domínio na resposta HTTP, já traduzida.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();
        let error = store.message(&locale.0, self.code());

        if status.is_server_error() {
            tracing::error!("🔥 {}", self);
        }

        let details = match self {
            // Devolve os códigos de cada campo inválido
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let codes: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e
                                .message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string());
                            Value::String(code)
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(codes));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError { status, error, details }
    }
}

/// Cria um `ValidationErrors` com um único campo inválido.
pub fn field_error(field: &'static str, code: &'static str) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    let mut error = validator::ValidationError::new(code);
    error.message = Some(code.into());
    errors.add(field, error);
    AppError::ValidationError(errors)
}

// O erro que efetivamente vai para o cliente
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn not_found_errors_map_to_404() {
        let store = I18nStore::new();
        for err in [AppError::ClientNotFound, AppError::InstallmentNotFound, AppError::UserNotFound] {
            assert_eq!(err.to_api_error(&pt(), &store).status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn owner_protection_is_forbidden() {
        let store = I18nStore::new();
        let api = AppError::OwnerProtected.to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::FORBIDDEN);
        assert_eq!(api.error, "O Dono não pode ser alterado ou removido.");
    }

    #[test]
    fn ai_failures_are_bad_gateway_with_generic_message() {
        let store = I18nStore::new();
        let api = AppError::AiRequestFailed("timeout".into()).to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::BAD_GATEWAY);
        assert!(!api.error.contains("timeout"));
    }

    #[test]
    fn database_errors_hide_details() {
        let store = I18nStore::new();
        let api = AppError::DatabaseError(sqlx::Error::RowNotFound).to_api_error(&pt(), &store);
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api.error, "Ocorreu um erro inesperado.");
        assert!(api.details.is_none());
    }

    #[test]
    fn validation_errors_carry_field_codes() {
        let store = I18nStore::new();
        let api = field_error("cpf", "invalid_cpf").to_api_error(&Locale("en".into()), &store);
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.error, "One or more fields are invalid.");
        assert_eq!(api.details, Some(json!({ "cpf": ["invalid_cpf"] })));
    }
}
