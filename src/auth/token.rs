use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use uuid::Uuid;

use crate::auth::{AuthUser, Role};
use crate::error::Error;

const DEFAULT_SECRET: &str = "carrus-dev-secret-change-in-production";
const DEFAULT_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct Tokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Tokens {
    pub fn new(secret: &str, ttl_days: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::days(ttl_days),
        }
    }

    pub fn from_env() -> Self {
        let secret = env::var("TOKEN_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.into());
        let ttl_days = env::var("TOKEN_TTL_DAYS")
            .ok()
            .and_then(|days| days.parse().ok())
            .unwrap_or(DEFAULT_TTL_DAYS);

        Self::new(&secret, ttl_days)
    }

    pub fn issue(&self, id: Uuid, email: &str, role: Role) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: id,
            email: email.into(),
            role,
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };

        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<AuthUser, Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;

        Ok(AuthUser {
            id: data.claims.sub,
            email: data.claims.email,
            role: data.claims.role,
        })
    }
}

#[test]
fn issue_and_verify_round_trip() {
    let tokens = Tokens::new("test-secret", 7);
    let id = Uuid::new_v4();

    let token = tokens.issue(id, "driver@example.com", Role::Driver).unwrap();
    let user = tokens.verify(&token).unwrap();

    assert_eq!(user.id, id);
    assert_eq!(user.email, "driver@example.com");
    assert_eq!(user.role, Role::Driver);
}

#[test]
fn verify_rejects_foreign_secret() {
    let tokens = Tokens::new("test-secret", 7);
    let other = Tokens::new("other-secret", 7);

    let token = tokens
        .issue(Uuid::new_v4(), "shipper@example.com", Role::Shipper)
        .unwrap();

    assert!(other.verify(&token).is_err());
    assert!(tokens.verify("not-a-token").is_err());
}
