//! User entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Role, User};
use sqlx::FromRow;

/// Database enum for user_role that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role")]
pub enum UserRoleDb {
    Admin,
    Patrol,
}

impl From<UserRoleDb> for Role {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::Admin => Role::Admin,
            UserRoleDb::Patrol => Role::Patrol,
        }
    }
}

impl From<Role> for UserRoleDb {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => UserRoleDb::Admin,
            Role::Patrol => UserRoleDb::Patrol,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub patrol_guard_name: String,
    pub role: UserRoleDb,
    pub admin_id: Option<String>,
    pub patrol_id: Option<String>,
    pub mobile_number: String,
    pub email: String,
    pub company_code: String,
    pub image_url: Option<String>,
    pub department: Option<String>,
    pub designation: Option<String>,
    pub otp_hash: Option<String>,
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            username: entity.username,
            password_hash: entity.password_hash,
            patrol_guard_name: entity.patrol_guard_name,
            role: entity.role.into(),
            admin_id: entity.admin_id,
            patrol_id: entity.patrol_id,
            mobile_number: entity.mobile_number,
            email: entity.email,
            company_code: entity.company_code,
            image_url: entity.image_url,
            department: entity.department,
            designation: entity.designation,
            otp_hash: entity.otp_hash,
            otp_expires_at: entity.otp_expires_at,
            modified_by: entity.modified_by,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            is_active: entity.is_active,
        }
    }
}
