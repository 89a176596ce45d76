// src/db/installment_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::installments::{Installment, InstallmentFilter, InstallmentStatus, ScheduledInstallment},
};

// Sempre devolvemos o nome do cliente via JOIN
const INSTALLMENT_SELECT: &str = r#"
    SELECT
        i.id, i.client_id, c.name AS client_name,
        i.value, i.due_date, i.status,
        i.created_at, i.updated_at
    FROM installments i
    JOIN clients c ON c.id = i.client_id
"#;

#[derive(Clone, Default)]
pub struct InstallmentRepository;

impl InstallmentRepository {
    pub fn new() -> Self {
        Self
    }

    /// Lista as parcelas, opcionalmente filtradas pelo ID ou pelo nome do cliente
    pub async fn list_installments<'e, E>(
        &self,
        executor: E,
        filter: &InstallmentFilter,
    ) -> Result<Vec<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = sqlx::query_as::<_, Installment>(&format!(
            r#"
            {INSTALLMENT_SELECT}
            WHERE ($1::uuid IS NULL OR i.client_id = $1)
              AND ($2::text IS NULL OR c.name = $2)
            ORDER BY i.due_date ASC, i.created_at ASC
            "#
        ))
            .bind(filter.client_id)
            .bind(filter.client.as_deref())
            .fetch_all(executor)
            .await?;

        Ok(installments)
    }

    pub async fn create_installment<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        value: Decimal,
        due_date: NaiveDate,
        status: InstallmentStatus,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, Installment>(
            r#"
            WITH inserted AS (
                INSERT INTO installments (client_id, value, due_date, status)
                VALUES ($1, $2, $3, $4)
                RETURNING *
            )
            SELECT
                inserted.id, inserted.client_id, c.name AS client_name,
                inserted.value, inserted.due_date, inserted.status,
                inserted.created_at, inserted.updated_at
            FROM inserted
            JOIN clients c ON c.id = inserted.client_id
            "#,
        )
            .bind(client_id)
            .bind(value)
            .bind(due_date)
            .bind(status)
            .fetch_one(executor)
            .await?;

        Ok(installment)
    }

    /// Inserção em massa do parcelamento usando UNNEST
    pub async fn create_schedule<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        schedule: &[ScheduledInstallment],
    ) -> Result<Vec<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let values: Vec<Decimal> = schedule.iter().map(|s| s.value).collect();
        let due_dates: Vec<NaiveDate> = schedule.iter().map(|s| s.due_date).collect();

        let installments = sqlx::query_as::<_, Installment>(
            r#"
            WITH inserted AS (
                INSERT INTO installments (client_id, value, due_date, status)
                SELECT $1, t.value, t.due_date, $4
                FROM UNNEST($2::numeric[], $3::date[]) AS t(value, due_date)
                RETURNING *
            )
            SELECT
                inserted.id, inserted.client_id, c.name AS client_name,
                inserted.value, inserted.due_date, inserted.status,
                inserted.created_at, inserted.updated_at
            FROM inserted
            JOIN clients c ON c.id = inserted.client_id
            ORDER BY inserted.due_date ASC
            "#,
        )
            .bind(client_id)
            .bind(values)
            .bind(due_dates)
            .bind(InstallmentStatus::Pending)
            .fetch_all(executor)
            .await?;

        Ok(installments)
    }

    /// Sobrescreve a parcela inteira pelo ID
    pub async fn update_installment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        client_id: Uuid,
        value: Decimal,
        due_date: NaiveDate,
        status: InstallmentStatus,
    ) -> Result<Option<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installment = sqlx::query_as::<_, Installment>(
            r#"
            WITH updated AS (
                UPDATE installments
                SET client_id = $2, value = $3, due_date = $4, status = $5, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT
                updated.id, updated.client_id, c.name AS client_name,
                updated.value, updated.due_date, updated.status,
                updated.created_at, updated.updated_at
            FROM updated
            JOIN clients c ON c.id = updated.client_id
            "#,
        )
            .bind(id)
            .bind(client_id)
            .bind(value)
            .bind(due_date)
            .bind(status)
            .fetch_optional(executor)
            .await?;

        Ok(installment)
    }

    pub async fn delete_installment<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM installments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    /// Remove todas as parcelas de um cliente (parte da exclusão em cascata)
    pub async fn delete_by_client<'e, E>(&self, executor: E, client_id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM installments WHERE client_id = $1")
            .bind(client_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
