use super::helpers::{fetch_user_for_update, update_user};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::AuthAPI,
    auth::{hash_password, verify_password, AuthUser, Role},
    entities::{Profile, ProfileUpdate, Registration, User},
    error::{invalid_credentials_error, validation_error, Error},
};

#[async_trait]
impl AuthAPI for Engine {
    // credentials in the params, keep them out of the trace
    #[tracing::instrument(skip_all)]
    async fn register(&self, params: Registration) -> Result<(Profile, String), Error> {
        if params.password.len() < 6 {
            return Err(validation_error("password must be at least 6 characters"));
        }

        let email = params.email.trim().to_lowercase();

        let mut conn = self.pool.acquire().await?;

        let existing = conn
            .fetch_optional(sqlx::query("SELECT id FROM users WHERE email = $1").bind(&email))
            .await?;

        if existing.is_some() {
            return Err(validation_error("email already registered"));
        }

        let password_hash = hash_password(&params.password)?;
        let user = User::new(&params, password_hash)?;

        conn.execute(
            sqlx::query("INSERT INTO users (id, email, role, data) VALUES ($1, $2, $3, $4)")
                .bind(&user.id)
                .bind(&user.email)
                .bind(user.role.name())
                .bind(Json(&user)),
        )
        .await?;

        let token = self.tokens.issue(user.id, &user.email, user.role)?;

        tracing::info!(user = %user.id, role = user.role.name(), "user registered");

        Ok((user.profile(), token))
    }

    #[tracing::instrument(skip_all)]
    async fn login(
        &self,
        email: String,
        password: String,
        role: Role,
    ) -> Result<(Profile, String), Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(
                sqlx::query("SELECT data FROM users WHERE email = $1 AND role = $2")
                    .bind(email.trim().to_lowercase())
                    .bind(role.name()),
            )
            .await?;

        let result = maybe_result.ok_or_else(invalid_credentials_error)?;
        let Json(user): Json<User> = result.try_get("data")?;

        if !verify_password(&password, &user.password_hash) {
            return Err(invalid_credentials_error());
        }

        let token = self.tokens.issue(user.id, &user.email, user.role)?;

        tracing::info!(user = %user.id, "login successful");

        Ok((user.profile(), token))
    }

    #[tracing::instrument(skip(self, changes))]
    async fn update_profile(
        &self,
        user: AuthUser,
        id: Uuid,
        changes: ProfileUpdate,
    ) -> Result<Profile, Error> {
        user.require_self(id)?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut account = fetch_user_for_update(&mut tx, &id).await?;

        account.apply_update(&changes);

        update_user(&mut tx, &account).await?;

        tx.commit().await?;

        Ok(account.profile())
    }
}
