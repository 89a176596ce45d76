// src/models/clients.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "client_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientStatus {
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
    #[serde(rename = "Pendente")]
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,

    #[schema(example = "Ana Costa")]
    pub name: String,

    // Derivado do nome na criação
    #[schema(example = "ana.costa@example.com")]
    pub email: String,

    pub status: ClientStatus,

    #[schema(example = "456.789.012-33")]
    pub cpf: String,
    #[schema(example = "(41) 98765-8765")]
    pub phone: String,

    // Endereço
    #[schema(example = "Rua 24 Horas")]
    pub address: String,
    #[schema(example = "101")]
    pub number: String,
    #[schema(example = "Batel")]
    pub neighborhood: String,
    #[schema(example = "45678-901")]
    pub zip: String,
    pub reference: Option<String>,

    // Venda
    #[schema(example = 3)]
    pub total_installments: i32,
    #[schema(example = "300.00")]
    pub total_value: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Campos comuns de cadastro, já validados, repassados ao repositório.
#[derive(Debug, Clone)]
pub struct ClientFields {
    pub name: String,
    pub cpf: String,
    pub phone: String,
    pub address: String,
    pub number: String,
    pub neighborhood: String,
    pub zip: String,
    pub reference: Option<String>,
}

/// Resultado da exclusão em cascata.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedClient {
    pub id: Uuid,
    pub name: String,
    pub removed_installments: u64,
}

/// Dados opcionais da venda informados no cadastro.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleDetails {
    pub total_value: Decimal,
    pub number_of_installments: u32,
}
