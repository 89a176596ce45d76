// src/models/ai.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct GenerateReportInput {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Quais clientes concentram mais parcelas em atraso?")]
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerateReportOutput {
    pub report: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueForecastInput {
    // Receita dos últimos três meses, em ordem cronológica
    #[validate(length(equal = 3, message = "exactly_three_months"))]
    #[schema(example = json!([1200.0, 1350.5, 1500.0]))]
    pub monthly_revenue: Vec<f64>,

    #[validate(length(equal = 3, message = "invalid_currency"))]
    #[schema(example = "BRL")]
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevenueForecastOutput {
    pub forecast: String,
}
