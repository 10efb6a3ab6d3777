//! User repository for database operations.

use domain::models::{Role, User};
use sqlx::PgPool;

use crate::entities::{UserEntity, UserRoleDb};
use crate::metrics::QueryTimer;

/// Repository for directory users (admins and patrol guards).
///
/// Users are addressed by role plus role id; the check constraint on the
/// table guarantees exactly one of admin_id/patrol_id is set.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert(&self, user: &User) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_user");
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, patrol_guard_name, role, admin_id, patrol_id,
                               mobile_number, email, company_code, image_url, department, designation,
                               otp_hash, otp_expires_at, modified_by, created_date, modified_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.patrol_guard_name)
        .bind(UserRoleDb::from(user.role))
        .bind(&user.admin_id)
        .bind(&user.patrol_id)
        .bind(&user.mobile_number)
        .bind(&user.email)
        .bind(&user.company_code)
        .bind(&user.image_url)
        .bind(&user.department)
        .bind(&user.designation)
        .bind(&user.otp_hash)
        .bind(user.otp_expires_at)
        .bind(&user.modified_by)
        .bind(user.created_date)
        .bind(user.modified_date)
        .bind(user.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    /// Find a user by role-specific id (ADM### or PTR###).
    pub async fn find_by_role_id(
        &self,
        role: Role,
        role_id: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_role_id");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, password_hash, patrol_guard_name, role, admin_id, patrol_id,
                   mobile_number, email, company_code, image_url, department, designation,
                   otp_hash, otp_expires_at, modified_by, created_date, modified_date, is_active
            FROM users
            WHERE role = $1 AND COALESCE(admin_id, patrol_id) = $2
            "#,
        )
        .bind(UserRoleDb::from(role))
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user whose username or email equals `login`.
    pub async fn find_by_login(&self, login: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_login");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, password_hash, patrol_guard_name, role, admin_id, patrol_id,
                   mobile_number, email, company_code, image_url, department, designation,
                   otp_hash, otp_expires_at, modified_by, created_date, modified_date, is_active
            FROM users
            WHERE username = $1 OR email = $1
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_username_or_email");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, password_hash, patrol_guard_name, role, admin_id, patrol_id,
                   mobile_number, email, company_code, image_url, department, designation,
                   otp_hash, otp_expires_at, modified_by, created_date, modified_date, is_active
            FROM users
            WHERE username = $1 OR email = $2
            ORDER BY id ASC
            "#,
        )
        .bind(username)
        .bind(email)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List users, optionally restricted to one role, oldest first.
    pub async fn list(&self, role: Option<Role>) -> Result<Vec<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_users");
        let result = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT id, username, password_hash, patrol_guard_name, role, admin_id, patrol_id,
                   mobile_number, email, company_code, image_url, department, designation,
                   otp_hash, otp_expires_at, modified_by, created_date, modified_date, is_active
            FROM users
            WHERE ($1::user_role IS NULL OR role = $1)
            ORDER BY created_date ASC, id ASC
            "#,
        )
        .bind(role.map(UserRoleDb::from))
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Overwrite every mutable column. Returns the number of rows affected.
    pub async fn update(&self, user: &User) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("update_user");
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $3, password_hash = $4, patrol_guard_name = $5, mobile_number = $6,
                email = $7, company_code = $8, image_url = $9, department = $10, designation = $11,
                otp_hash = $12, otp_expires_at = $13, modified_by = $14, modified_date = $15,
                is_active = $16
            WHERE role = $1 AND COALESCE(admin_id, patrol_id) = $2
            "#,
        )
        .bind(UserRoleDb::from(user.role))
        .bind(user.role_id())
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.patrol_guard_name)
        .bind(&user.mobile_number)
        .bind(&user.email)
        .bind(&user.company_code)
        .bind(&user.image_url)
        .bind(&user.department)
        .bind(&user.designation)
        .bind(&user.otp_hash)
        .bind(user.otp_expires_at)
        .bind(&user.modified_by)
        .bind(user.modified_date)
        .bind(user.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }

    /// Hard delete. Returns the number of rows affected.
    pub async fn delete(&self, role: Role, role_id: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_user");
        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE role = $1 AND COALESCE(admin_id, patrol_id) = $2
            "#,
        )
        .bind(UserRoleDb::from(role))
        .bind(role_id)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|r| r.rows_affected())
    }
}
