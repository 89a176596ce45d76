// src/models/installments.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "installment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    #[serde(rename = "Pago")]
    Paid,
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Não Pago")]
    Unpaid,
}

impl InstallmentStatus {
    /// A legenda fixa do gráfico de status, na ordem de exibição.
    pub const LEGEND: [InstallmentStatus; 3] = [
        InstallmentStatus::Paid,
        InstallmentStatus::Pending,
        InstallmentStatus::Unpaid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InstallmentStatus::Paid => "Pago",
            InstallmentStatus::Pending => "Pendente",
            InstallmentStatus::Unpaid => "Não Pago",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Installment {
    pub id: Uuid,

    pub client_id: Uuid,

    // Nome do cliente, resolvido por JOIN na leitura
    #[serde(rename = "client")]
    #[schema(example = "Ana Costa")]
    pub client_name: String,

    #[schema(example = "100.00")]
    pub value: Decimal,

    #[schema(value_type = String, format = Date, example = "2024-08-10")]
    pub due_date: NaiveDate,

    pub status: InstallmentStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Uma parcela calculada pelo parcelamento, ainda não persistida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstallment {
    pub value: Decimal,
    pub due_date: NaiveDate,
}

// Filtro da listagem: por ID do cliente ou pelo nome exato
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct InstallmentFilter {
    pub client_id: Option<Uuid>,
    pub client: Option<String>,
}

// --- SELEÇÃO DE LINHAS ---

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SelectionAction {
    Toggle { id: Uuid },
    SelectAll,
    Clear,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    #[serde(flatten)]
    #[schema(inline)]
    pub filter: InstallmentFilter,

    #[serde(default)]
    pub selected: Vec<Uuid>,

    pub action: SelectionAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    pub selected: Vec<Uuid>,
    pub all_selected: bool,
    pub some_selected: bool,
}
