// src/services/installment_service.rs

use std::collections::HashSet;

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Postgres, Executor, Acquire};
use uuid::Uuid;

use crate::{
    common::error::{field_error, AppError},
    db::{ClientRepository, InstallmentRepository},
    models::installments::{
        Installment, InstallmentFilter, InstallmentStatus, ScheduledInstallment, SelectionAction,
        SelectionState,
    },
    services::realtime::{ChangeFeed, ChangeKind, Collection},
};

pub const MAX_INSTALLMENTS: u32 = 12;

/// Divide `total` em `count` parcelas mensais, a primeira vencendo um mês
/// depois de `start`. O resto do arredondamento vai para a última parcela,
/// então a soma é sempre exatamente `total`.
pub fn build_schedule(
    total: Decimal,
    count: u32,
    start: NaiveDate,
) -> Result<Vec<ScheduledInstallment>, AppError> {
    if count == 0 || count > MAX_INSTALLMENTS {
        return Err(field_error("numberOfInstallments", "invalid_installment_count"));
    }

    let total = total.round_dp(2);
    let cents = Decimal::new(1, 2);
    // Cada parcela precisa de pelo menos um centavo
    if total < cents * Decimal::from(count) {
        return Err(field_error("totalValue", "total_too_small"));
    }

    let share = (total / Decimal::from(count)).round_dp(2);
    let last = total - share * Decimal::from(count - 1);

    (1..=count)
        .map(|i| {
            let due_date = start
                .checked_add_months(Months::new(i))
                .ok_or_else(|| anyhow::anyhow!("Data de vencimento fora do intervalo: {} + {} meses", start, i))?;
            let value = if i == count { last } else { share };
            Ok::<_, AppError>(ScheduledInstallment { value, due_date })
        })
        .collect()
}

/// Aplica uma ação de seleção sobre as linhas visíveis. IDs que não estão
/// na lista são descartados e repetidos aparecem uma vez só, na ordem
/// em que chegaram.
pub fn apply_selection(visible: &[Uuid], selected: &[Uuid], action: &SelectionAction) -> SelectionState {
    let mut seen = HashSet::new();
    let mut next: Vec<Uuid> = selected
        .iter()
        .copied()
        .filter(|id| visible.contains(id) && seen.insert(*id))
        .collect();

    match action {
        SelectionAction::Toggle { id } => {
            if next.contains(id) {
                next.retain(|s| s != id);
            } else if visible.contains(id) {
                next.push(*id);
            }
        }
        SelectionAction::SelectAll => next = visible.to_vec(),
        SelectionAction::Clear => next.clear(),
    }

    let all_selected = !visible.is_empty() && visible.iter().all(|v| next.contains(v));
    let some_selected = !next.is_empty() && !all_selected;

    SelectionState { selected: next, all_selected, some_selected }
}

#[derive(Clone)]
pub struct InstallmentService {
    repo: InstallmentRepository,
    client_repo: ClientRepository,
    feed: ChangeFeed,
}

impl InstallmentService {
    pub fn new(repo: InstallmentRepository, client_repo: ClientRepository, feed: ChangeFeed) -> Self {
        Self { repo, client_repo, feed }
    }

    pub async fn list_installments<'e, E>(
        &self,
        executor: E,
        filter: &InstallmentFilter,
    ) -> Result<Vec<Installment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_installments(executor, filter).await
    }

    pub async fn add_installment<'e, E>(
        &self,
        executor: E,
        client_id: Uuid,
        value: Decimal,
        due_date: NaiveDate,
        status: InstallmentStatus,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.client_repo
            .find_by_id(&mut *tx, client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let installment = self.repo
            .create_installment(&mut *tx, client_id, value.round_dp(2), due_date, status)
            .await?;

        tx.commit().await?;

        tracing::info!("💰 Parcela {} adicionada para {}", installment.id, installment.client_name);
        self.feed.publish(Collection::Installments, ChangeKind::Created);

        Ok(installment)
    }

    pub async fn edit_installment<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        client_id: Uuid,
        value: Decimal,
        due_date: NaiveDate,
        status: InstallmentStatus,
    ) -> Result<Installment, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        self.client_repo
            .find_by_id(&mut *tx, client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;

        let installment = self.repo
            .update_installment(&mut *tx, id, client_id, value.round_dp(2), due_date, status)
            .await?
            .ok_or(AppError::InstallmentNotFound)?;

        tx.commit().await?;

        tracing::info!("✏️ Parcela {} atualizada", installment.id);
        self.feed.publish(Collection::Installments, ChangeKind::Updated);

        Ok(installment)
    }

    pub async fn delete_installment<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let removed = self.repo.delete_installment(executor, id).await?;
        if removed == 0 {
            return Err(AppError::InstallmentNotFound);
        }

        tracing::info!("🗑️ Parcela {} removida", id);
        self.feed.publish(Collection::Installments, ChangeKind::Deleted);

        Ok(())
    }

    pub async fn update_selection<'e, E>(
        &self,
        executor: E,
        filter: &InstallmentFilter,
        selected: &[Uuid],
        action: &SelectionAction,
    ) -> Result<SelectionState, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let visible: Vec<Uuid> = self.repo
            .list_installments(executor, filter)
            .await?
            .into_iter()
            .map(|i| i.id)
            .collect();

        Ok(apply_selection(&visible, selected, action))
    }
}
