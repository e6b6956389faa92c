use std::env;

use chrono_tz::Tz;

use crate::auth::{AuthContext, Role};
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub log_level: String,
    pub default_tz: Tz,
    pub slot_lead_minutes: u32,
    pub admin_token: String,
    pub executive_token: String,
    pub staff_token: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();

        let default_tz = env::var("DEFAULT_TZ")
            .unwrap_or_else(|_| "America/New_York".to_string())
            .parse::<Tz>()
            .map_err(|err| AppError::Internal(format!("invalid DEFAULT_TZ: {err}")))?;

        Ok(Self {
            http_port: parse_or_default("HTTP_PORT", 3000)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            default_tz,
            slot_lead_minutes: parse_or_default("SLOT_LEAD_MINUTES", 30)?,
            admin_token: env::var("ADMIN_TOKEN").unwrap_or_else(|_| "admin-dev-token".to_string()),
            executive_token: env::var("EXECUTIVE_TOKEN")
                .unwrap_or_else(|_| "executive-dev-token".to_string()),
            staff_token: env::var("STAFF_TOKEN").unwrap_or_else(|_| "staff-dev-token".to_string()),
        })
    }

    pub fn auth_context_for(&self, token: &str) -> Option<AuthContext> {
        if token == self.admin_token {
            Some(AuthContext::new("admin", Role::Admin))
        } else if token == self.executive_token {
            Some(AuthContext::new("executive", Role::Executive))
        } else if token == self.staff_token {
            Some(AuthContext::new("staff", Role::Staff))
        } else {
            None
        }
    }
}

fn parse_or_default<T>(key: &str, default: T) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        Err(_) => Ok(default),
    }
}
