// src/services/dashboard_service.rs

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use sqlx::{Postgres, Executor, Acquire};

use crate::{
    common::error::AppError,
    db::{ClientRepository, InstallmentRepository},
    models::{
        clients::{Client, ClientStatus},
        dashboard::{DashboardSnapshot, DashboardSummary, MonthlyRevenueEntry, StatusDistributionEntry},
        installments::{Installment, InstallmentFilter, InstallmentStatus},
    },
};

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

pub fn summarize(clients: &[Client], installments: &[Installment]) -> DashboardSummary {
    DashboardSummary {
        total_revenue: clients.iter().map(|c| c.total_value).sum(),
        total_clients: clients.len() as i64,
        active_clients: clients.iter().filter(|c| c.status == ClientStatus::Active).count() as i64,
        total_sales: installments.iter().filter(|i| i.status == InstallmentStatus::Paid).count() as i64,
    }
}

/// Receita paga por mês do vencimento. Os anos se misturam no mesmo balde.
pub fn monthly_revenue(installments: &[Installment]) -> Vec<MonthlyRevenueEntry> {
    let mut totals = [Decimal::ZERO; 12];
    for installment in installments.iter().filter(|i| i.status == InstallmentStatus::Paid) {
        totals[installment.due_date.month0() as usize] += installment.value;
    }

    MONTH_LABELS
        .iter()
        .zip(totals)
        .map(|(name, total)| MonthlyRevenueEntry { name: name.to_string(), total })
        .collect()
}

pub fn status_distribution(installments: &[Installment]) -> Vec<StatusDistributionEntry> {
    InstallmentStatus::LEGEND
        .iter()
        .map(|&status| StatusDistributionEntry {
            name: status.label().to_string(),
            status,
            value: installments.iter().filter(|i| i.status == status).count() as i64,
        })
        .collect()
}

pub fn compute_snapshot(clients: &[Client], installments: &[Installment]) -> DashboardSnapshot {
    DashboardSnapshot {
        summary: summarize(clients, installments),
        monthly_revenue: monthly_revenue(installments),
        status_distribution: status_distribution(installments),
    }
}

/// Receita paga dos três meses anteriores ao mês de `today`, em ordem
/// cronológica. Aqui o ano conta.
pub fn recent_monthly_revenue(installments: &[Installment], today: NaiveDate) -> [Decimal; 3] {
    let current_month = today.with_day(1).unwrap_or(today);
    let mut totals = [Decimal::ZERO; 3];

    for (slot, back) in (1..=3u32).rev().enumerate() {
        let Some(month) = current_month.checked_sub_months(Months::new(back)) else {
            continue;
        };
        totals[slot] = installments
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .filter(|i| i.due_date.year() == month.year() && i.due_date.month() == month.month())
            .map(|i| i.value)
            .sum();
    }

    totals
}

#[derive(Clone)]
pub struct DashboardService {
    client_repo: ClientRepository,
    installment_repo: InstallmentRepository,
}

impl DashboardService {
    pub fn new(client_repo: ClientRepository, installment_repo: InstallmentRepository) -> Self {
        Self { client_repo, installment_repo }
    }

    /// Lê as duas coleções no mesmo snapshot do banco
    async fn load<'e, E>(&self, executor: E) -> Result<(Vec<Client>, Vec<Installment>), AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await?;

        let clients = self.client_repo.list_clients(&mut *tx).await?;
        let installments = self.installment_repo
            .list_installments(&mut *tx, &InstallmentFilter::default())
            .await?;

        tx.commit().await?;

        Ok((clients, installments))
    }

    pub async fn get_snapshot<'e, E>(&self, executor: E) -> Result<DashboardSnapshot, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (clients, installments) = self.load(executor).await?;
        Ok(compute_snapshot(&clients, &installments))
    }

    pub async fn get_summary<'e, E>(&self, executor: E) -> Result<DashboardSummary, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let (clients, installments) = self.load(executor).await?;
        Ok(summarize(&clients, &installments))
    }

    pub async fn get_monthly_revenue<'e, E>(&self, executor: E) -> Result<Vec<MonthlyRevenueEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = self.installment_repo
            .list_installments(executor, &InstallmentFilter::default())
            .await?;
        Ok(monthly_revenue(&installments))
    }

    pub async fn get_status_distribution<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<StatusDistributionEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = self.installment_repo
            .list_installments(executor, &InstallmentFilter::default())
            .await?;
        Ok(status_distribution(&installments))
    }

    pub async fn get_recent_revenue<'e, E>(&self, executor: E, today: NaiveDate) -> Result<[Decimal; 3], AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let installments = self.installment_repo
            .list_installments(executor, &InstallmentFilter::default())
            .await?;
        Ok(recent_monthly_revenue(&installments, today))
    }
}
