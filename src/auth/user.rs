use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Tokens;
use crate::error::{forbidden_error, unauthenticated_error, unexpected_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Shipper,
    Driver,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Shipper => "shipper",
            Self::Driver => "driver",
        }
    }
}

/// The authenticated caller, decoded from the bearer token.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    pub fn require_role(&self, role: Role) -> Result<(), Error> {
        self.require_any_of(&[role])
    }

    pub fn require_any_of(&self, roles: &[Role]) -> Result<(), Error> {
        if roles.contains(&self.role) {
            return Ok(());
        }

        Err(forbidden_error())
    }

    pub fn require_self(&self, id: Uuid) -> Result<(), Error> {
        if self.id == id {
            return Ok(());
        }

        Err(forbidden_error())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tokens = parts
            .extensions
            .get::<Tokens>()
            .ok_or_else(unexpected_error)?;

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(unauthenticated_error)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(unauthenticated_error)?;

        tokens.verify(token)
    }
}

#[test]
fn role_checks() {
    let user = AuthUser {
        id: Uuid::new_v4(),
        email: "a@b.c".into(),
        role: Role::Driver,
    };

    assert!(user.require_role(Role::Driver).is_ok());
    assert!(user.require_role(Role::Shipper).is_err());
    assert!(user.require_any_of(&[Role::Shipper, Role::Driver]).is_ok());
    assert!(user.require_any_of(&[]).is_err());

    assert!(user.require_self(user.id).is_ok());
    assert!(user.require_self(Uuid::new_v4()).is_err());
}
