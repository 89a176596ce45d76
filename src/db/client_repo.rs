// src/db/client_repo.rs

use rust_decimal::Decimal;
use sqlx::{Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::clients::{Client, ClientFields, ClientStatus},
};

const CLIENT_COLUMNS: &str = r#"
    id, name, email, status, cpf, phone,
    address, number, neighborhood, zip, reference,
    total_installments, total_value,
    created_at, updated_at
"#;

#[derive(Clone, Default)]
pub struct ClientRepository;

impl ClientRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lista todos os clientes, ordenados pelo nome
    pub async fn list_clients<'e, E>(&self, executor: E) -> Result<Vec<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name ASC, created_at ASC"
        ))
            .fetch_all(executor)
            .await?;

        Ok(clients)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = $1"
        ))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    /// Cria um cliente já com os totais da venda (zerados quando não há venda)
    pub async fn create_client<'e, E>(
        &self,
        executor: E,
        fields: &ClientFields,
        email: &str,
        status: ClientStatus,
        total_installments: i32,
        total_value: Decimal,
    ) -> Result<Client, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO clients (
                name, email, status, cpf, phone,
                address, number, neighborhood, zip, reference,
                total_installments, total_value
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
            .bind(&fields.name)
            .bind(email)
            .bind(status)
            .bind(&fields.cpf)
            .bind(&fields.phone)
            .bind(&fields.address)
            .bind(&fields.number)
            .bind(&fields.neighborhood)
            .bind(&fields.zip)
            .bind(fields.reference.as_deref())
            .bind(total_installments)
            .bind(total_value)
            .fetch_one(executor)
            .await?;

        Ok(client)
    }

    /// Sobrescreve o documento inteiro. O ID vem do caminho e nunca muda.
    pub async fn update_client<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        fields: &ClientFields,
        status: ClientStatus,
        total_installments: i32,
        total_value: Decimal,
    ) -> Result<Option<Client>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE clients
            SET name = $2, status = $3, cpf = $4, phone = $5,
                address = $6, number = $7, neighborhood = $8, zip = $9, reference = $10,
                total_installments = $11, total_value = $12,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CLIENT_COLUMNS}
            "#
        ))
            .bind(id)
            .bind(&fields.name)
            .bind(status)
            .bind(&fields.cpf)
            .bind(&fields.phone)
            .bind(&fields.address)
            .bind(&fields.number)
            .bind(&fields.neighborhood)
            .bind(&fields.zip)
            .bind(fields.reference.as_deref())
            .bind(total_installments)
            .bind(total_value)
            .fetch_optional(executor)
            .await?;

        Ok(client)
    }

    pub async fn delete_client<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
