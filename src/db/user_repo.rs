// src/db/user_repo.rs

use sqlx::{Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::account_repo::map_unique_email,
    models::users::{User, UserRole},
};

const USER_COLUMNS: &str =
    "id, account_id, name, email, role, avatar, created_at, updated_at";

// O diretório de usuários (tabela 'users')
#[derive(Clone, Default)]
pub struct UserRepository;

impl UserRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_users<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY name ASC"
        ))
            .fetch_all(executor)
            .await?;

        Ok(users)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    // O usuário do diretório vinculado à conta autenticada
    pub async fn find_by_account_id<'e, E>(
        &self,
        executor: E,
        account_id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE account_id = $1"
        ))
            .bind(account_id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
            .bind(email)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    // Liga uma linha do diretório (ainda sem acesso) a uma conta de identidade
    pub async fn link_account<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        account_id: Uuid,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET account_id = $2, updated_at = NOW()
            WHERE id = $1 AND account_id IS NULL
            RETURNING {USER_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(account_id)
            .fetch_optional(executor)
            .await?;

        Ok(user)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        account_id: Option<Uuid>,
        name: &str,
        email: &str,
        role: UserRole,
        avatar: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (account_id, name, email, role, avatar)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
            .bind(account_id)
            .bind(name)
            .bind(email)
            .bind(role)
            .bind(avatar)
            .fetch_one(executor)
            .await
            .map_err(map_unique_email)?;

        Ok(user)
    }

    // Sobrescreve apenas a linha do diretório; o ID nunca muda
    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $2, email = $3, role = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(role)
            .fetch_optional(executor)
            .await
            .map_err(map_unique_email)?;

        Ok(user)
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
