// src/db/account_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::Account};

// Responsável por todas as interações com a tabela 'accounts'
#[derive(Clone)]
pub struct AccountRepository {
    pool: PgPool,
}

impl AccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca uma conta pelo seu e-mail
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let maybe_account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_account)
    }

    // Cria uma nova conta.
    // Com tratamento de erro específico para e-mails duplicados.
    pub async fn create_account<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<Account, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, created_at, updated_at
            "#,
        )
            .bind(email)
            .bind(password_hash)
            .fetch_one(executor)
            .await
            .map_err(map_unique_email)?;

        Ok(account)
    }

    pub async fn delete_account<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Converte violação de chave única em `EmailAlreadyExists`.
pub(crate) fn map_unique_email(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
    }
    e.into()
}
