// src/models/users.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Os rótulos JSON seguem os nomes usados na interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[serde(rename = "Dono")]
    Owner,
    #[serde(rename = "Funcionário")]
    Employee,
    #[serde(rename = "Vendedor")]
    Salesperson,
    #[serde(rename = "Usuário")]
    User,
}

/// Linha do diretório de usuários da aplicação.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    // Conta de identidade vinculada (o Dono semeado pode não ter uma)
    pub account_id: Option<Uuid>,

    #[schema(example = "Maria Oliveira")]
    pub name: String,

    #[schema(example = "maria.oliveira@example.com")]
    pub email: String,

    pub role: UserRole,

    #[schema(example = "42")]
    pub avatar: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
