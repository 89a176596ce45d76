// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::i18n::I18nStore,
    db::{AccountRepository, ClientRepository, InstallmentRepository, UserRepository},
    services::{
        AiService, AuthService, ChangeFeed, ClientService, DashboardService, GeminiClient,
        InstallmentService, TextGenerator, UserService,
    },
};

pub const DEFAULT_AI_API_URL: &str = "https://generativelanguage.googleapis.com";

// Configuração lida das variáveis de ambiente (.env em desenvolvimento)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub ai_api_url: String,
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub owner_email: String,
    pub owner_name: String,
    pub owner_password: Option<String>,
    pub default_currency: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta a configuração a partir de uma função de busca. Valores vazios
    /// contam como ausentes.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let db_max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => v
                .parse()
                .with_context(|| format!("DB_MAX_CONNECTIONS inválido: {}", v))?,
            None => 5,
        };

        Ok(Self {
            database_url: get("DATABASE_URL").context("DATABASE_URL deve ser definida")?,
            jwt_secret: get("JWT_SECRET").context("JWT_SECRET deve ser definido")?,
            bind_addr: or("BIND_ADDR", "0.0.0.0:3000"),
            db_max_connections,
            ai_api_url: or("AI_API_URL", DEFAULT_AI_API_URL),
            ai_api_key: get("AI_API_KEY"),
            ai_model: or("AI_MODEL", "gemini-2.0-flash"),
            owner_email: or("OWNER_EMAIL", "dono@foxdash.com"),
            owner_name: or("OWNER_NAME", "Dono"),
            owner_password: get("OWNER_PASSWORD"),
            default_currency: or("DEFAULT_CURRENCY", "BRL").to_uppercase(),
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub feed: ChangeFeed,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub client_service: ClientService,
    pub installment_service: InstallmentService,
    pub dashboard_service: DashboardService,
    pub ai_service: AiService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar no banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        let generator = GeminiClient::new(
            &config.ai_api_url,
            config.ai_api_key.clone(),
            &config.ai_model,
            reqwest::Client::new(),
        );
        if config.ai_api_key.is_none() {
            tracing::warn!("⚠️ AI_API_KEY não definida: as rotas de IA vão responder com erro.");
        }

        Ok(Self::build(config, db_pool, Arc::new(generator)))
    }

    // --- Monta o gráfico de dependências ---
    pub fn build(config: Config, db_pool: PgPool, generator: Arc<dyn TextGenerator>) -> Self {
        let feed = ChangeFeed::default();

        let account_repo = AccountRepository::new(db_pool.clone());
        let user_repo = UserRepository::new();
        let client_repo = ClientRepository::new();
        let installment_repo = InstallmentRepository::new();

        let auth_service = AuthService::new(
            account_repo.clone(),
            user_repo.clone(),
            config.jwt_secret.clone(),
            db_pool.clone(),
            feed.clone(),
        );
        let user_service = UserService::new(user_repo, account_repo, db_pool.clone(), feed.clone());
        let client_service = ClientService::new(client_repo.clone(), installment_repo.clone(), feed.clone());
        let installment_service =
            InstallmentService::new(installment_repo.clone(), client_repo.clone(), feed.clone());
        let dashboard_service = DashboardService::new(client_repo, installment_repo);
        let ai_service = AiService::new(generator, dashboard_service.clone());

        Self {
            db_pool,
            config: Arc::new(config),
            i18n_store: Arc::new(I18nStore::new()),
            feed,
            auth_service,
            user_service,
            client_service,
            installment_service,
            dashboard_service,
            ai_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/foxdash"),
            ("JWT_SECRET", "segredo"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.ai_api_url, DEFAULT_AI_API_URL);
        assert_eq!(config.ai_model, "gemini-2.0-flash");
        assert_eq!(config.owner_email, "dono@foxdash.com");
        assert_eq!(config.default_currency, "BRL");
        assert!(config.ai_api_key.is_none());
        assert!(config.owner_password.is_none());
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let result = Config::from_lookup(lookup(&[("JWT_SECRET", "segredo")]));
        assert!(result.unwrap_err().to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/foxdash"),
            ("JWT_SECRET", "segredo"),
            ("AI_API_KEY", "  "),
        ]))
        .unwrap();
        assert!(config.ai_api_key.is_none());
    }

    #[test]
    fn invalid_pool_size_is_rejected() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/foxdash"),
            ("JWT_SECRET", "segredo"),
            ("DB_MAX_CONNECTIONS", "muitas"),
        ]));
        assert!(result.is_err());
    }
}
