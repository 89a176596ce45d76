pub mod account_repo;
pub use account_repo::AccountRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod installment_repo;
pub use installment_repo::InstallmentRepository;
