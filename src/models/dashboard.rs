// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::models::installments::InstallmentStatus;

// 1. Os Cards do Topo
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_revenue: Decimal,  // Soma do valor total dos clientes
    pub total_clients: i64,
    pub active_clients: i64,
    pub total_sales: i64,        // Parcelas pagas
}

// 2. Gráfico de Receita Mensal (12 meses fixos)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyRevenueEntry {
    #[schema(example = "Jan")]
    pub name: String,
    pub total: Decimal,
}

// 3. Distribuição por Status (legenda fixa de 3 categorias)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusDistributionEntry {
    #[schema(example = "Pago")]
    pub name: String,
    pub status: InstallmentStatus,
    pub value: i64,
}

// Tudo junto, calculado sobre o mesmo snapshot
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub summary: DashboardSummary,
    pub monthly_revenue: Vec<MonthlyRevenueEntry>,
    pub status_distribution: Vec<StatusDistributionEntry>,
}
