pub mod ai_client;
pub mod ai_service;
pub mod auth;
pub mod client_service;
pub mod dashboard_service;
pub mod installment_service;
pub mod realtime;
pub mod user_service;

pub use ai_client::{GeminiClient, TextGenerator};
pub use ai_service::AiService;
pub use auth::AuthService;
pub use client_service::ClientService;
pub use dashboard_service::DashboardService;
pub use installment_service::InstallmentService;
pub use realtime::ChangeFeed;
pub use user_service::UserService;
