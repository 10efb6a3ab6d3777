//! User directory models.
//!
//! A single record type covers both roles. The role is fixed at signup and
//! decides which of `admin_id` / `patrol_id` is populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use super::ids::IdFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Patrol,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Patrol => "Patrol",
        }
    }

    pub fn id_family(&self) -> IdFamily {
        match self {
            Role::Admin => IdFamily::Admin,
            Role::Patrol => IdFamily::Patrol,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Patrol" => Ok(Role::Patrol),
            _ => Err(format!("Invalid role: {}. Allowed roles: Admin, Patrol", s)),
        }
    }
}

/// A directory user. Credential material is never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub patrol_guard_name: String,
    pub role: Role,
    pub admin_id: Option<String>,
    pub patrol_id: Option<String>,
    pub mobile_number: String,
    pub email: String,
    pub company_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(skip_serializing)]
    pub otp_hash: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl User {
    /// The ADM### or PTR### identifier matching the user's role.
    pub fn role_id(&self) -> &str {
        let id = match self.role {
            Role::Admin => self.admin_id.as_deref(),
            Role::Patrol => self.patrol_id.as_deref(),
        };
        id.unwrap_or_default()
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_patrol(&self) -> bool {
        self.role == Role::Patrol
    }

    /// Stores a pending one-time code digest.
    pub fn set_one_time_code(&mut self, code_hash: String, expires_at: DateTime<Utc>) {
        self.otp_hash = Some(code_hash);
        self.otp_expires_at = Some(expires_at);
    }

    pub fn clear_one_time_code(&mut self) {
        self.otp_hash = None;
        self.otp_expires_at = None;
    }

    /// Whether a pending code exists and has not expired at `now`.
    pub fn one_time_code_live(&self, now: DateTime<Utc>) -> bool {
        matches!(
            (&self.otp_hash, self.otp_expires_at),
            (Some(_), Some(expires_at)) if expires_at > now
        )
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(custom(function = "shared::validation::validate_gmail_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "password must be 1-128 characters"))]
    pub password: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "patrolGuardName is required"))]
    pub patrol_guard_name: String,

    #[validate(length(min = 1, max = 20, message = "mobileNumber is required"))]
    pub mobile_number: String,

    #[validate(length(min = 1, message = "companyCode is required"))]
    pub company_code: String,

    pub image_url: Option<String>,

    pub role: Role,

    #[validate(length(min = 1, max = 100, message = "department is required"))]
    pub department: String,

    #[validate(length(min = 1, max = 100, message = "designation is required"))]
    pub designation: String,
}

/// Full profile replacement for an existing admin or patrol.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(custom(function = "shared::validation::validate_gmail_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 128, message = "password must be 1-128 characters"))]
    pub password: String,

    #[validate(email(message = "email must be a valid address"))]
    pub email: String,

    #[validate(length(min = 1, max = 200, message = "patrolGuardName is required"))]
    pub patrol_guard_name: String,

    #[validate(length(min = 1, max = 20, message = "mobileNumber is required"))]
    pub mobile_number: String,

    #[validate(length(min = 1, message = "companyCode is required"))]
    pub company_code: String,

    pub image_url: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
}

/// Summary of a patrol with its assignments and uploaded media.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolDetail {
    pub patrol_id: String,
    pub patrol_guard_name: String,
    pub created_date: DateTime<Utc>,
    pub checklist_ids: Vec<String>,
    pub multimedia: Vec<PatrolMediaRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatrolMediaRef {
    pub media_type: super::attachment::MediaType,
    pub media_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::str::FromStr;

    fn sample_user(role: Role) -> User {
        User {
            username: "guard@gmail.com".into(),
            password_hash: "$argon2id$hash".into(),
            patrol_guard_name: "Night Guard".into(),
            role,
            admin_id: (role == Role::Admin).then(|| "ADM001".to_string()),
            patrol_id: (role == Role::Patrol).then(|| "PTR001".to_string()),
            mobile_number: "9999999999".into(),
            email: "guard@gmail.com".into(),
            company_code: "CMP001".into(),
            image_url: None,
            department: Some("Security".into()),
            designation: Some("Guard".into()),
            otp_hash: None,
            otp_expires_at: None,
            modified_by: None,
            created_date: Utc::now(),
            modified_date: Utc::now(),
            is_active: true,
        }
    }

    #[test]
    fn test_role_id_follows_role() {
        assert_eq!(sample_user(Role::Admin).role_id(), "ADM001");
        assert_eq!(sample_user(Role::Patrol).role_id(), "PTR001");
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("Admin").unwrap(), Role::Admin);
        assert!(Role::from_str("admin").is_err());
        assert_eq!(Role::Patrol.id_family(), IdFamily::Patrol);
    }

    #[test]
    fn test_credentials_never_serialized() {
        let mut user = sample_user(Role::Patrol);
        user.set_one_time_code("digest".into(), Utc::now() + Duration::minutes(5));
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("otpHash").is_none());
        assert!(json.get("otpExpiresAt").is_none());
        assert_eq!(json["patrolId"], "PTR001");
        assert_eq!(json["role"], "Patrol");
    }

    #[test]
    fn test_one_time_code_lifecycle() {
        let mut user = sample_user(Role::Admin);
        let now = Utc::now();
        assert!(!user.one_time_code_live(now));

        user.set_one_time_code("digest".into(), now + Duration::minutes(5));
        assert!(user.one_time_code_live(now));
        assert!(!user.one_time_code_live(now + Duration::minutes(6)));

        user.clear_one_time_code();
        assert!(!user.one_time_code_live(now));
    }

    #[test]
    fn test_signup_request_rejects_non_gmail() {
        let request: SignupRequest = serde_json::from_str(
            r#"{
                "username": "guard@yahoo.com",
                "password": "secret",
                "email": "guard@yahoo.com",
                "patrolGuardName": "Guard",
                "mobileNumber": "99999",
                "companyCode": "CMP001",
                "role": "Patrol",
                "department": "Security",
                "designation": "Guard"
            }"#,
        )
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("username"));
    }

    #[test]
    fn test_signup_request_rejects_unknown_role() {
        let result = serde_json::from_str::<SignupRequest>(
            r#"{
                "username": "guard@gmail.com",
                "password": "secret",
                "email": "guard@gmail.com",
                "patrolGuardName": "Guard",
                "mobileNumber": "99999",
                "companyCode": "CMP001",
                "role": "Supervisor",
                "department": "Security",
                "designation": "Guard"
            }"#,
        );
        assert!(result.is_err());
    }
}
