//! Company and location entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Company, Location};
use sqlx::FromRow;

/// Database row mapping for the companies table.
#[derive(Debug, Clone, FromRow)]
pub struct CompanyEntity {
    pub company_code: String,
    pub company_name: String,
    pub company_location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<CompanyEntity> for Company {
    fn from(entity: CompanyEntity) -> Self {
        Self {
            company_code: entity.company_code,
            company_name: entity.company_name,
            company_location: entity.company_location,
            latitude: entity.latitude,
            longitude: entity.longitude,
            modified_by: entity.modified_by,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            is_active: entity.is_active,
        }
    }
}

/// Database row mapping for the locations table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationEntity {
    pub location_id: String,
    pub location_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub description: Option<String>,
    pub created_by: String,
    pub modified_by: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub is_active: bool,
}

impl From<LocationEntity> for Location {
    fn from(entity: LocationEntity) -> Self {
        Self {
            location_id: entity.location_id,
            location_code: entity.location_code,
            latitude: entity.latitude,
            longitude: entity.longitude,
            description: entity.description,
            created_by: entity.created_by,
            modified_by: entity.modified_by,
            created_date: entity.created_date,
            modified_date: entity.modified_date,
            is_active: entity.is_active,
        }
    }
}
