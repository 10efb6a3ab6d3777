//! Login with password plus emailed one-time code.

use chrono::{Duration, Utc};
use domain::models::User;
use domain::services::{
    EntityStore, NotificationResult, NotificationService, OneTimeCodeMessage, StoreError,
};
use serde::Serialize;
use shared::crypto::{constant_time_eq, generate_numeric_code, sha256_hex};
use shared::jwt::{JwtConfig, JwtError};
use shared::password::{verify_password, PasswordError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::OtpConfig;
use crate::error::ApiError;
use crate::middleware::metrics::record_one_time_code_issued;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown login, wrong password or inactive account.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired one-time code")]
    InvalidCode,

    #[error("Token error: {0}")]
    Token(#[from] JwtError),

    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::InvalidCode => {
                ApiError::InvalidCredential(err.to_string())
            }
            AuthError::Token(e) => e.into(),
            AuthError::Password(e) => ApiError::Internal(e.to_string()),
            AuthError::Store(e) => domain::DomainError::from(e).into(),
        }
    }
}

/// Outcome of the first login step. The code itself is never returned.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeIssued {
    pub message: String,
    pub expires_at: chrono::DateTime<Utc>,
}

/// Bearer token handed out after a verified one-time code.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

pub struct AuthService {
    store: Arc<dyn EntityStore>,
    notifier: Arc<dyn NotificationService>,
    jwt: Arc<JwtConfig>,
    otp: OtpConfig,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn EntityStore>,
        notifier: Arc<dyn NotificationService>,
        jwt: Arc<JwtConfig>,
        otp: OtpConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            jwt,
            otp,
        }
    }

    async fn find_active(&self, login: &str) -> Result<User, AuthError> {
        match self.store.find_user_by_login(login).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// Checks the password and mails a fresh one-time code.
    ///
    /// Issuing a new code replaces any code still pending for the user.
    pub async fn login(&self, login: &str, password: &str) -> Result<CodeIssued, AuthError> {
        let mut user = self.find_active(login).await?;
        if !verify_password(password, &user.password_hash)? {
            warn!(login = %login, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        let code = generate_numeric_code(self.otp.length);
        let expires_at = Utc::now() + Duration::seconds(self.otp.ttl_secs);
        user.set_one_time_code(sha256_hex(&code), expires_at);
        self.store.update_user(&user).await?;

        let result = self
            .notifier
            .send_one_time_code(OneTimeCodeMessage {
                email: user.email.clone(),
                recipient_name: user.patrol_guard_name.clone(),
                code,
                expires_at,
            })
            .await;
        if let NotificationResult::Failed(reason) = &result {
            warn!(user = %user.role_id(), reason = %reason, "One-time code delivery failed");
        }
        record_one_time_code_issued(result == NotificationResult::Sent);

        info!(user = %user.role_id(), "One-time code issued");
        Ok(CodeIssued {
            message: format!("A login code was sent to {}", user.email),
            expires_at,
        })
    }

    /// Consumes a live one-time code and issues a bearer token.
    pub async fn verify_code(&self, login: &str, code: &str) -> Result<IssuedToken, AuthError> {
        let mut user = self.find_active(login).await?;

        let matches = user
            .otp_hash
            .as_deref()
            .map(|hash| constant_time_eq(hash, &sha256_hex(code.trim())))
            .unwrap_or(false);
        if !matches || !user.one_time_code_live(Utc::now()) {
            return Err(AuthError::InvalidCode);
        }

        user.clear_one_time_code();
        self.store.update_user(&user).await?;

        let (access_token, _jti) =
            self.jwt
                .generate_access_token(user.role_id(), &user.username, user.role.as_str())?;

        info!(user = %user.role_id(), "One-time code verified, token issued");
        Ok(IssuedToken {
            access_token,
            token_type: "Bearer",
            expires_in: self.jwt.access_token_expiry_secs,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::company::CreateCompanyRequest;
    use domain::models::user::SignupRequest;
    use domain::models::Role;
    use domain::services::{DirectoryService, InMemoryEntityStore, MockNotificationService};

    struct Fixture {
        auth: AuthService,
        notifier: Arc<MockNotificationService>,
        store: Arc<dyn EntityStore>,
    }

    async fn fixture(ttl_secs: i64) -> Fixture {
        fixture_with(ttl_secs, MockNotificationService::new()).await
    }

    async fn fixture_with(ttl_secs: i64, notifier: MockNotificationService) -> Fixture {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        let directory = DirectoryService::new(store.clone());
        let company = directory
            .create_company(CreateCompanyRequest {
                company_name: "Acme Security".into(),
                company_location: "Pune".into(),
                latitude: 18.52,
                longitude: 73.85,
            })
            .await
            .unwrap();
        directory
            .signup(SignupRequest {
                username: "guard@gmail.com".into(),
                password: "s3cret-pass".into(),
                email: "guard@gmail.com".into(),
                patrol_guard_name: "Night Guard".into(),
                mobile_number: "9876543210".into(),
                company_code: company.company_code,
                image_url: None,
                role: Role::Patrol,
                department: "Security".into(),
                designation: "Guard".into(),
            })
            .await
            .unwrap();

        let notifier = Arc::new(notifier);
        let jwt = Arc::new(JwtConfig::new("auth-service-secret", 7200, 30).unwrap());
        let auth = AuthService::new(
            store.clone(),
            notifier.clone(),
            jwt,
            OtpConfig {
                length: 4,
                ttl_secs,
            },
        );
        Fixture {
            auth,
            notifier,
            store,
        }
    }

    #[tokio::test]
    async fn test_login_then_verify() {
        let f = fixture(300).await;
        let issued = f.auth.login("guard@gmail.com", "s3cret-pass").await.unwrap();
        assert!(issued.expires_at > Utc::now());

        let code = f.notifier.last_code_for("guard@gmail.com").unwrap();
        assert_eq!(code.len(), 4);
        assert!(!issued.message.contains(&code));

        let token = f.auth.verify_code("guard@gmail.com", &code).await.unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 7200);
        assert_eq!(token.user.patrol_id.as_deref(), Some("PTR001"));

        let user = f.store.find_user(Role::Patrol, "PTR001").await.unwrap().unwrap();
        assert!(user.otp_hash.is_none());
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let f = fixture(300).await;
        f.auth.login("guard@gmail.com", "s3cret-pass").await.unwrap();
        let code = f.notifier.last_code_for("guard@gmail.com").unwrap();

        f.auth.verify_code("guard@gmail.com", &code).await.unwrap();
        assert!(matches!(
            f.auth.verify_code("guard@gmail.com", &code).await,
            Err(AuthError::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_login() {
        let f = fixture(300).await;
        assert!(matches!(
            f.auth.login("guard@gmail.com", "nope").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            f.auth.login("nobody@gmail.com", "s3cret-pass").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(f.notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_expired_code_rejected() {
        let f = fixture(-1).await;
        f.auth.login("guard@gmail.com", "s3cret-pass").await.unwrap();
        let code = f.notifier.last_code_for("guard@gmail.com").unwrap();

        assert!(matches!(
            f.auth.verify_code("guard@gmail.com", &code).await,
            Err(AuthError::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn test_wrong_code_rejected() {
        let f = fixture(300).await;
        f.auth.login("guard@gmail.com", "s3cret-pass").await.unwrap();
        let code = f.notifier.last_code_for("guard@gmail.com").unwrap();
        let wrong = if code == "0000" { "1111" } else { "0000" };

        assert!(matches!(
            f.auth.verify_code("guard@gmail.com", wrong).await,
            Err(AuthError::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn test_login_survives_delivery_failure() {
        let f = fixture_with(300, MockNotificationService::failing()).await;
        let issued = f.auth.login("guard@gmail.com", "s3cret-pass").await;
        assert!(issued.is_ok());
        assert!(f.notifier.sent().is_empty());

        let user = f.store.find_user(Role::Patrol, "PTR001").await.unwrap().unwrap();
        assert!(user.otp_hash.is_some());
    }
}
