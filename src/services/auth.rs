// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AccountRepository, UserRepository},
    models::{auth::Claims, users::{User, UserRole}},
    services::realtime::{ChangeFeed, ChangeKind, Collection},
};

const TOKEN_TTL_DAYS: i64 = 7;

// O bcrypt é caro: roda fora do executor async
pub(crate) async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub(crate) async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

/// Avatar aleatório entre 1 e 100, guardado como texto.
pub(crate) fn random_avatar() -> String {
    rand::thread_rng().gen_range(1..=100).to_string()
}

pub fn issue_token(secret: &str, account_id: Uuid) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

    let claims = Claims {
        sub: account_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::InvalidToken)?;

    Ok(token_data.claims)
}

#[derive(Clone)]
pub struct AuthService {
    account_repo: AccountRepository,
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
    feed: ChangeFeed,
}

impl AuthService {
    pub fn new(
        account_repo: AccountRepository,
        user_repo: UserRepository,
        jwt_secret: String,
        pool: PgPool,
        feed: ChangeFeed,
    ) -> Self {
        Self { account_repo, user_repo, jwt_secret, pool, feed }
    }

    /// Cria a conta e a linha do diretório (cargo Usuário) e devolve o token.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String, AppError> {
        let email = email.trim().to_lowercase();
        let hashed_password = hash_password(password).await?;

        // Conta + diretório: se um falhar, o rollback desfaz o outro
        let mut tx = self.pool.begin().await?;

        let account = self.account_repo
            .create_account(&mut *tx, &email, &hashed_password)
            .await?;

        let user = self.user_repo
            .create_user(&mut *tx, Some(account.id), name.trim(), &email, UserRole::User, &random_avatar())
            .await?;

        tx.commit().await?;

        tracing::info!("🆕 Conta registrada para {} ({})", user.email, user.id);
        self.feed.publish(Collection::Users, ChangeKind::Created);

        issue_token(&self.jwt_secret, account.id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let account = self.account_repo
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &account.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        issue_token(&self.jwt_secret, account.id)
    }

    /// Decodifica o token e resolve o usuário do diretório ligado à conta.
    /// Token de usuário já removido vale como token inválido.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(&self.jwt_secret, token)?;

        self.user_repo
            .find_by_account_id(&self.pool, claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn token_round_trip_keeps_account_id() {
        let account_id = Uuid::new_v4();
        let token = issue_token(SECRET, account_id).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, account_id);
        assert_eq!(claims.exp - claims.iat, (TOKEN_TTL_DAYS * 24 * 60 * 60) as usize);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token("outro-segredo", Uuid::new_v4()).unwrap();
        assert!(matches!(decode_token(SECRET, &token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(decode_token(SECRET, "nao.e.jwt"), Err(AppError::InvalidToken)));
    }

    #[test]
    fn avatar_is_between_one_and_one_hundred() {
        for _ in 0..200 {
            let n: u32 = random_avatar().parse().unwrap();
            assert!((1..=100).contains(&n));
        }
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("segredo123").await.unwrap();
        assert!(verify_password("segredo123", &hashed).await.unwrap());
        assert!(!verify_password("errada", &hashed).await.unwrap());
    }

    #[sqlx::test]
    #[ignore = "requer DATABASE_URL apontando para um Postgres"]
    async fn token_of_removed_user_is_invalid(pool: PgPool) {
        let service = AuthService::new(
            AccountRepository::new(pool.clone()),
            UserRepository::new(),
            SECRET.into(),
            pool.clone(),
            ChangeFeed::new(16),
        );

        let token = service.register("Ana Costa", "ana@foxdash.com", "segredo123").await.unwrap();
        let user = service.validate_token(&token).await.unwrap();
        assert_eq!(user.role, UserRole::User);

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(service.validate_token(&token).await, Err(AppError::InvalidToken)));
    }
}
