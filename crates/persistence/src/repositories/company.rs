//! Company and location repository for database operations.

use domain::models::{Company, Location};
use sqlx::PgPool;

use crate::entities::{CompanyEntity, LocationEntity};
use crate::metrics::QueryTimer;

/// Repository for the company and location registries.
#[derive(Clone)]
pub struct CompanyRepository {
    pool: PgPool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn insert_company(&self, company: &Company) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_company");
        let result = sqlx::query(
            r#"
            INSERT INTO companies (company_code, company_name, company_location, latitude, longitude,
                                   modified_by, created_date, modified_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&company.company_code)
        .bind(&company.company_name)
        .bind(&company.company_location)
        .bind(company.latitude)
        .bind(company.longitude)
        .bind(&company.modified_by)
        .bind(company.created_date)
        .bind(company.modified_date)
        .bind(company.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_company(
        &self,
        company_code: &str,
    ) -> Result<Option<CompanyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_company");
        let result = sqlx::query_as::<_, CompanyEntity>(
            r#"
            SELECT company_code, company_name, company_location, latitude, longitude,
                   modified_by, created_date, modified_date, is_active
            FROM companies
            WHERE company_code = $1
            "#,
        )
        .bind(company_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn find_company_by_name_and_location(
        &self,
        company_name: &str,
        company_location: &str,
    ) -> Result<Option<CompanyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_company_by_name_and_location");
        let result = sqlx::query_as::<_, CompanyEntity>(
            r#"
            SELECT company_code, company_name, company_location, latitude, longitude,
                   modified_by, created_date, modified_date, is_active
            FROM companies
            WHERE company_name = $1 AND company_location = $2
            "#,
        )
        .bind(company_name)
        .bind(company_location)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_companies(&self) -> Result<Vec<CompanyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_companies");
        let result = sqlx::query_as::<_, CompanyEntity>(
            r#"
            SELECT company_code, company_name, company_location, latitude, longitude,
                   modified_by, created_date, modified_date, is_active
            FROM companies
            ORDER BY created_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn insert_location(&self, location: &Location) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("insert_location");
        let result = sqlx::query(
            r#"
            INSERT INTO locations (location_id, location_code, latitude, longitude, description,
                                   created_by, modified_by, created_date, modified_date, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&location.location_id)
        .bind(&location.location_code)
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(&location.description)
        .bind(&location.created_by)
        .bind(&location.modified_by)
        .bind(location.created_date)
        .bind(location.modified_date)
        .bind(location.is_active)
        .execute(&self.pool)
        .await;
        timer.record();
        result.map(|_| ())
    }

    pub async fn find_location_by_code(
        &self,
        location_code: &str,
    ) -> Result<Option<LocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_location_by_code");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT location_id, location_code, latitude, longitude, description,
                   created_by, modified_by, created_date, modified_date, is_active
            FROM locations
            WHERE location_code = $1
            "#,
        )
        .bind(location_code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn list_locations(&self) -> Result<Vec<LocationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_locations");
        let result = sqlx::query_as::<_, LocationEntity>(
            r#"
            SELECT location_id, location_code, latitude, longitude, description,
                   created_by, modified_by, created_date, modified_date, is_active
            FROM locations
            ORDER BY created_date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
