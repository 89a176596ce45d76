// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::users::list_users,
        handlers::users::create_user,
        handlers::users::update_user,
        handlers::users::delete_user,

        // --- Clients ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,
        handlers::clients::stream_clients,

        // --- Installments ---
        handlers::installments::list_installments,
        handlers::installments::create_installment,
        handlers::installments::update_installment,
        handlers::installments::delete_installment,
        handlers::installments::update_selection,
        handlers::installments::stream_installments,

        // --- Dashboard ---
        handlers::dashboard::get_summary,
        handlers::dashboard::get_monthly_revenue,
        handlers::dashboard::get_status_distribution,
        handlers::dashboard::get_snapshot,
        handlers::dashboard::stream_dashboard,

        // --- AI ---
        handlers::ai::generate_report,
        handlers::ai::generate_revenue_forecast,
        handlers::ai::forecast_from_ledger,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Users ---
            models::users::UserRole,
            models::users::User,
            handlers::users::CreateUserPayload,
            handlers::users::UpdateUserPayload,

            // --- Clients ---
            models::clients::ClientStatus,
            models::clients::Client,
            models::clients::DeletedClient,
            handlers::clients::CreateClientPayload,
            handlers::clients::UpdateClientPayload,

            // --- Installments ---
            models::installments::InstallmentStatus,
            models::installments::Installment,
            models::installments::InstallmentFilter,
            models::installments::SelectionAction,
            models::installments::SelectionRequest,
            models::installments::SelectionState,
            handlers::installments::InstallmentPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::MonthlyRevenueEntry,
            models::dashboard::StatusDistributionEntry,
            models::dashboard::DashboardSnapshot,

            // --- AI ---
            models::ai::GenerateReportInput,
            models::ai::GenerateReportOutput,
            models::ai::RevenueForecastInput,
            models::ai::RevenueForecastOutput,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Diretório de Usuários"),
        (name = "Clients", description = "Cadastro de Clientes"),
        (name = "Installments", description = "Controle de Parcelas"),
        (name = "Dashboard", description = "Indicadores e Gráficos Gerenciais"),
        (name = "AI", description = "Relatórios e Previsões com IA")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
