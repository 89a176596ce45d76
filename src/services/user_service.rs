// src/services/user_service.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountRepository, UserRepository},
    models::users::{User, UserRole},
    services::{
        auth::{hash_password, random_avatar},
        realtime::{ChangeFeed, ChangeKind, Collection},
    },
};

/// O Dono é fixo: não se cria, promove, edita nem remove pela API.
pub fn ensure_assignable(role: UserRole) -> Result<(), AppError> {
    if role == UserRole::Owner {
        return Err(AppError::OwnerRoleReserved);
    }
    Ok(())
}

pub fn ensure_not_owner(user: &User) -> Result<(), AppError> {
    if user.role == UserRole::Owner {
        return Err(AppError::OwnerProtected);
    }
    Ok(())
}

#[derive(Clone)]
pub struct UserService {
    repo: UserRepository,
    account_repo: AccountRepository,
    pool: PgPool,
    feed: ChangeFeed,
}

impl UserService {
    pub fn new(repo: UserRepository, account_repo: AccountRepository, pool: PgPool, feed: ChangeFeed) -> Self {
        Self { repo, account_repo, pool, feed }
    }

    pub async fn list_users<'e, E>(&self, executor: E) -> Result<Vec<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_users(executor).await
    }

    /// Cria a conta de identidade e a linha do diretório numa única transação.
    pub async fn add_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        ensure_assignable(role)?;

        let email = email.trim().to_lowercase();
        let hashed_password = hash_password(password).await?;

        let mut tx = self.pool.begin().await?;

        let account = self.account_repo
            .create_account(&mut *tx, &email, &hashed_password)
            .await?;

        let user = self.repo
            .create_user(&mut *tx, Some(account.id), name.trim(), &email, role, &random_avatar())
            .await?;

        tx.commit().await?;

        tracing::info!("👥 Usuário '{}' adicionado como {:?}", user.name, user.role);
        self.feed.publish(Collection::Users, ChangeKind::Created);

        Ok(user)
    }

    /// Sobrescreve nome, e-mail e cargo da linha do diretório.
    pub async fn edit_user(
        &self,
        id: Uuid,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, AppError> {
        ensure_assignable(role)?;

        let mut tx = self.pool.begin().await?;

        let current = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_not_owner(&current)?;

        let user = self.repo
            .update_user(&mut *tx, id, name.trim(), &email.trim().to_lowercase(), role)
            .await?
            .ok_or(AppError::UserNotFound)?;

        tx.commit().await?;

        tracing::info!("✏️ Usuário '{}' atualizado", user.name);
        self.feed.publish(Collection::Users, ChangeKind::Updated);

        Ok(user)
    }

    /// Remove a linha do diretório e a conta vinculada, tudo ou nada.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let user = self.repo
            .find_by_id(&mut *tx, id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        ensure_not_owner(&user)?;

        self.repo.delete_user(&mut *tx, id).await?;

        if let Some(account_id) = user.account_id {
            self.account_repo.delete_account(&mut *tx, account_id).await?;
        }

        tx.commit().await?;

        tracing::info!("🗑️ Usuário '{}' removido", user.name);
        self.feed.publish(Collection::Users, ChangeKind::Deleted);

        Ok(())
    }

    /// Garante que o Dono exista, procurando pelo e-mail fixo. Roda na
    /// inicialização e pode ser repetido. Se o Dono foi criado sem senha e
    /// agora há uma configurada, a conta de acesso é criada e vinculada.
    pub async fn seed_owner(
        &self,
        email: &str,
        name: &str,
        password: Option<&str>,
    ) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();

        if let Some(owner) = self.repo.find_by_email(&self.pool, &email).await? {
            if owner.role != UserRole::Owner {
                tracing::warn!("⚠️ O e-mail do Dono ({}) pertence a um usuário com cargo {:?}", email, owner.role);
            }

            let (None, Some(password)) = (owner.account_id, password) else {
                tracing::info!("👑 Dono já cadastrado: {}", owner.email);
                return Ok(owner);
            };

            let account_id = self.owner_account(&email, password).await?;
            let owner = self.repo
                .link_account(&self.pool, owner.id, account_id)
                .await?
                .ok_or(AppError::UserNotFound)?;

            tracing::info!("🔑 Conta de acesso vinculada ao Dono {}", owner.email);
            self.feed.publish(Collection::Users, ChangeKind::Updated);
            return Ok(owner);
        }

        // Sem senha configurada, o Dono fica só no diretório
        let account_id = match password {
            Some(password) => Some(self.owner_account(&email, password).await?),
            None => None,
        };

        let owner = self.repo
            .create_user(&self.pool, account_id, name, &email, UserRole::Owner, &random_avatar())
            .await?;

        tracing::info!("👑 Dono '{}' criado ({})", owner.name, owner.email);
        self.feed.publish(Collection::Users, ChangeKind::Created);

        Ok(owner)
    }

    // Reaproveita a conta do e-mail, se já existir
    async fn owner_account(&self, email: &str, password: &str) -> Result<Uuid, AppError> {
        if let Some(account) = self.account_repo.find_by_email(email).await? {
            return Ok(account.id);
        }

        let hashed_password = hash_password(password).await?;
        let account = self.account_repo
            .create_account(&self.pool, email, &hashed_password)
            .await?;

        Ok(account.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth::verify_password;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            account_id: None,
            name: "Maria Oliveira".into(),
            email: "maria@example.com".into(),
            role,
            avatar: "7".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_role_cannot_be_assigned() {
        assert!(matches!(ensure_assignable(UserRole::Owner), Err(AppError::OwnerRoleReserved)));
        for role in [UserRole::Employee, UserRole::Salesperson, UserRole::User] {
            assert!(ensure_assignable(role).is_ok());
        }
    }

    #[test]
    fn owner_row_is_protected() {
        assert!(matches!(ensure_not_owner(&user(UserRole::Owner)), Err(AppError::OwnerProtected)));
        assert!(ensure_not_owner(&user(UserRole::Salesperson)).is_ok());
    }

    fn service(pool: &PgPool) -> UserService {
        UserService::new(
            UserRepository::new(),
            AccountRepository::new(pool.clone()),
            pool.clone(),
            ChangeFeed::new(16),
        )
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn seeding_twice_keeps_a_single_owner(pool: PgPool) {
        let service = service(&pool);

        let first = service.seed_owner("Dono@FoxDash.com", "Dono", Some("segredo123")).await.unwrap();
        let second = service.seed_owner("dono@foxdash.com", "Dono", Some("segredo123")).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.role, UserRole::Owner);
        assert_eq!(first.email, "dono@foxdash.com");
        assert!(first.account_id.is_some());
        assert_eq!(service.list_users(&pool).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn password_set_later_links_an_account_to_the_owner(pool: PgPool) {
        let service = service(&pool);

        let owner = service.seed_owner("dono@foxdash.com", "Dono", None).await.unwrap();
        assert!(owner.account_id.is_none());

        let linked = service.seed_owner("dono@foxdash.com", "Dono", Some("segredo123")).await.unwrap();
        assert_eq!(linked.id, owner.id);
        let account_id = linked.account_id.unwrap();

        let account = AccountRepository::new(pool.clone())
            .find_by_email("dono@foxdash.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(account.id, account_id);
        assert!(verify_password("segredo123", &account.password_hash).await.unwrap());

        // Uma terceira rodada não troca a conta
        let again = service.seed_owner("dono@foxdash.com", "Dono", Some("outra-senha")).await.unwrap();
        assert_eq!(again.account_id, Some(account_id));
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn deleting_a_user_removes_the_account(pool: PgPool) {
        let service = service(&pool);

        let maria = service
            .add_user("Maria Oliveira", "maria@foxdash.com", "segredo123", UserRole::Salesperson)
            .await
            .unwrap();
        service.delete_user(maria.id).await.unwrap();

        let account = AccountRepository::new(pool.clone())
            .find_by_email("maria@foxdash.com")
            .await
            .unwrap();
        assert!(account.is_none());
        assert!(matches!(service.delete_user(maria.id).await, Err(AppError::UserNotFound)));
    }
}
