// src/services/ai_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use sqlx::{Postgres, Executor};
use validator::Validate;

use crate::{
    common::error::AppError,
    models::ai::{GenerateReportInput, GenerateReportOutput, RevenueForecastInput, RevenueForecastOutput},
    services::{ai_client::TextGenerator, dashboard_service::DashboardService},
};

pub fn report_prompt(input: &GenerateReportInput) -> String {
    format!(
        "You are an AI assistant specialized in generating custom business reports.\n\
         Based on the user's query, analyze the available data and provide a concise and informative report.\n\
         Query: {}",
        input.query
    )
}

pub fn forecast_prompt(input: &RevenueForecastInput) -> String {
    let months: String = input
        .monthly_revenue
        .iter()
        .enumerate()
        .map(|(i, value)| format!("- Month {}: {}\n", i + 1, value))
        .collect();

    format!(
        "You are a financial analyst providing revenue forecasts.\n\n\
         Analyze the monthly revenue data for the last three months and provide a forecast of how these trends might impact future revenue.\n\n\
         Monthly Revenue ({}):\n{}\n\
         Consider factors like growth rate, seasonality, and any noticeable trends.\n\
         The forecast should be a concise paragraph.",
        input.currency, months
    )
}

fn string_field_schema(field: &str) -> Value {
    json!({
        "type": "object",
        "properties": { field: { "type": "string" } },
        "required": [field],
    })
}

// O texto do modelo precisa ser exatamente o objeto de saída
fn parse_output<T: DeserializeOwned>(text: &str) -> Result<T, AppError> {
    serde_json::from_str(text.trim()).map_err(|e| AppError::AiInvalidOutput(e.to_string()))
}

#[derive(Clone)]
pub struct AiService {
    generator: Arc<dyn TextGenerator>,
    dashboard_service: DashboardService,
}

impl AiService {
    pub fn new(generator: Arc<dyn TextGenerator>, dashboard_service: DashboardService) -> Self {
        Self { generator, dashboard_service }
    }

    pub async fn generate_report(&self, input: &GenerateReportInput) -> Result<GenerateReportOutput, AppError> {
        let text = self.generator
            .generate(&report_prompt(input), string_field_schema("report"))
            .await?;

        let output = parse_output::<GenerateReportOutput>(&text)?;
        tracing::info!("🤖 Relatório gerado ({} caracteres)", output.report.len());
        Ok(output)
    }

    pub async fn generate_revenue_forecast(
        &self,
        input: &RevenueForecastInput,
    ) -> Result<RevenueForecastOutput, AppError> {
        input.validate()?;

        let text = self.generator
            .generate(&forecast_prompt(input), string_field_schema("forecast"))
            .await?;

        let output = parse_output::<RevenueForecastOutput>(&text)?;
        tracing::info!("📈 Previsão de receita gerada em {}", input.currency);
        Ok(output)
    }

    /// Previsão a partir da receita paga real dos três últimos meses fechados.
    pub async fn forecast_from_ledger<'e, E>(
        &self,
        executor: E,
        currency: &str,
        today: NaiveDate,
    ) -> Result<RevenueForecastOutput, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let recent = self.dashboard_service.get_recent_revenue(executor, today).await?;

        let input = RevenueForecastInput {
            monthly_revenue: recent.iter().map(decimal_to_f64).collect(),
            currency: currency.trim().to_uppercase(),
        };

        self.generate_revenue_forecast(&input).await
    }
}

fn decimal_to_f64(value: &Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
