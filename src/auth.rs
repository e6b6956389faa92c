use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Executive,
    Staff,
}

#[derive(Debug, Clone)]
pub struct AuthContext {
    pub subject: String,
    pub role: Role,
}

impl AuthContext {
    pub fn new(subject: impl Into<String>, role: Role) -> Self {
        Self {
            subject: subject.into(),
            role,
        }
    }

    pub fn require_dispatch(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Executive => Ok(()),
            Role::Staff => Err(AppError::Forbidden(
                "dispatch requires an executive or admin role".to_string(),
            )),
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "this action requires an admin role".to_string(),
            ))
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                AppError::Unauthenticated("missing authorization header".to_string())
            })?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Unauthenticated("expected 'Bearer <token>'".to_string())
        })?;

        let context = state
            .config
            .auth_context_for(token)
            .ok_or_else(|| AppError::Unauthenticated("unknown token".to_string()))?;

        debug!(subject = %context.subject, role = ?context.role, "authenticated request");
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_and_executive_may_dispatch() {
        assert!(AuthContext::new("a", Role::Admin).require_dispatch().is_ok());
        assert!(AuthContext::new("e", Role::Executive)
            .require_dispatch()
            .is_ok());
    }

    #[test]
    fn staff_may_not_dispatch() {
        let err = AuthContext::new("s", Role::Staff)
            .require_dispatch()
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn only_admin_may_administer() {
        assert!(AuthContext::new("a", Role::Admin).require_admin().is_ok());
        assert!(AuthContext::new("e", Role::Executive)
            .require_admin()
            .is_err());
        assert!(AuthContext::new("s", Role::Staff).require_admin().is_err());
    }
}
