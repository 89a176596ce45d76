// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::users::UserRole,
};

/// Define quais cargos podem passar pelo guardião.
pub trait RoleDef: Send + Sync + 'static {
    fn slug() -> &'static str;
    fn allows(role: UserRole) -> bool;
}

/// O Extractor (Guardião)
pub struct RequireRole<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let locale = Locale::from_headers(&parts.headers);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::InvalidToken.to_api_error(&locale, &app_state.i18n_store))?;

        if !T::allows(user.0.role) {
            tracing::warn!(
                "⛔ Usuário {} sem o cargo '{}' necessário.",
                user.0.id,
                T::slug()
            );
            return Err(AppError::Forbidden.to_api_error(&locale, &app_state.i18n_store));
        }

        Ok(RequireRole(PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS CARGOS (TIPOS)
// ---

pub struct OwnerOnly;
impl RoleDef for OwnerOnly {
    fn slug() -> &'static str { "owner" }
    fn allows(role: UserRole) -> bool {
        role == UserRole::Owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_owner_passes_owner_guard() {
        assert!(OwnerOnly::allows(UserRole::Owner));
        for role in [UserRole::Employee, UserRole::Salesperson, UserRole::User] {
            assert!(!OwnerOnly::allows(role));
        }
    }
}
