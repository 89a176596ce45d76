pub mod ai;
pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod installments;
pub mod users;
