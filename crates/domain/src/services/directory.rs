//! Company, location and user directory.

use chrono::Utc;
use shared::password::hash_password;
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use super::store::{AttachmentScope, ChecklistFilter, EntityStore};
use crate::error::{DomainError, DomainResult};
use crate::models::company::{CreateCompanyRequest, CreateLocationRequest};
use crate::models::user::{PatrolDetail, PatrolMediaRef, SignupRequest, UpdateUserRequest};
use crate::models::{Company, IdFamily, Location, Role, User};

/// Resolves an administrator id, or `NotFound`.
pub async fn require_admin(store: &dyn EntityStore, admin_id: &str) -> DomainResult<User> {
    store
        .find_user(Role::Admin, admin_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Admin {} does not exist", admin_id)))
}

/// Resolves a patrol id, or `NotFound`.
pub async fn require_patrol(store: &dyn EntityStore, patrol_id: &str) -> DomainResult<User> {
    store
        .find_user(Role::Patrol, patrol_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Patrol {} does not exist", patrol_id)))
}

/// Resolves an id that may belong to either role.
pub async fn require_admin_or_patrol(store: &dyn EntityStore, id: &str) -> DomainResult<User> {
    let role = if id.starts_with(IdFamily::Patrol.prefix()) {
        Role::Patrol
    } else {
        Role::Admin
    };
    store
        .find_user(role, id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Creator {} is not an Admin or Patrol", id)))
}

/// Directory operations over companies, locations and users.
pub struct DirectoryService {
    store: Arc<dyn EntityStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    // ========================================================================
    // Companies
    // ========================================================================

    pub async fn create_company(&self, request: CreateCompanyRequest) -> DomainResult<Company> {
        request.validate()?;

        if self
            .store
            .find_company_by_name_and_location(&request.company_name, &request.company_location)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Company {} at {} already exists",
                request.company_name, request.company_location
            )));
        }

        let now = Utc::now();
        let company = Company {
            company_code: self.store.next_id(IdFamily::Company).await?,
            company_name: request.company_name,
            company_location: request.company_location,
            latitude: request.latitude,
            longitude: request.longitude,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_company(&company).await?;

        info!(company_code = %company.company_code, "Company created");
        Ok(company)
    }

    pub async fn list_companies(&self) -> DomainResult<Vec<Company>> {
        Ok(self.store.list_companies().await?)
    }

    // ========================================================================
    // Locations
    // ========================================================================

    pub async fn create_location(&self, request: CreateLocationRequest) -> DomainResult<Location> {
        request.validate()?;
        require_admin(self.store.as_ref(), &request.created_by).await?;

        if self
            .store
            .find_location_by_code(&request.location_code)
            .await?
            .is_some()
        {
            return Err(DomainError::Conflict(format!(
                "Location code {} already exists",
                request.location_code
            )));
        }

        let now = Utc::now();
        let location = Location {
            location_id: self.store.next_id(IdFamily::Location).await?,
            location_code: request.location_code,
            latitude: request.latitude,
            longitude: request.longitude,
            description: request.description,
            created_by: request.created_by,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_location(&location).await?;

        info!(
            location_id = %location.location_id,
            location_code = %location.location_code,
            "Location created"
        );
        Ok(location)
    }

    pub async fn list_locations(&self) -> DomainResult<Vec<Location>> {
        Ok(self.store.list_locations().await?)
    }

    pub async fn get_location(&self, location_code: &str) -> DomainResult<Location> {
        self.store
            .find_location_by_code(location_code)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Location {}", location_code)))
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn signup(&self, request: SignupRequest) -> DomainResult<User> {
        request.validate()?;
        self.require_company(&request.company_code).await?;
        self.ensure_unique_login(&request.username, &request.email, None).await?;

        let password_hash = hash_password(&request.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        let role_id = self.store.next_id(request.role.id_family()).await?;
        let (admin_id, patrol_id) = match request.role {
            Role::Admin => (Some(role_id), None),
            Role::Patrol => (None, Some(role_id)),
        };

        let now = Utc::now();
        let user = User {
            username: request.username,
            password_hash,
            patrol_guard_name: request.patrol_guard_name,
            role: request.role,
            admin_id,
            patrol_id,
            mobile_number: request.mobile_number,
            email: request.email,
            company_code: request.company_code,
            image_url: request.image_url,
            department: Some(request.department),
            designation: Some(request.designation),
            otp_hash: None,
            otp_expires_at: None,
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
        };
        self.store.insert_user(&user).await?;

        info!(role = %user.role, role_id = %user.role_id(), "User signed up");
        Ok(user)
    }

    pub async fn list_users(&self, role: Option<Role>) -> DomainResult<Vec<User>> {
        Ok(self.store.list_users(role).await?)
    }

    pub async fn patrol_detail(&self, patrol_id: &str) -> DomainResult<PatrolDetail> {
        let patrol = self
            .store
            .find_user(Role::Patrol, patrol_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Patrol {}", patrol_id)))?;

        let checklist_ids = self
            .store
            .list_checklists(&ChecklistFilter::for_patrol(patrol_id))
            .await?
            .into_iter()
            .map(|c| c.checklist_id)
            .collect();

        let multimedia = self
            .store
            .list_media(patrol_id, AttachmentScope::All)
            .await?
            .into_iter()
            .map(|m| PatrolMediaRef {
                media_type: m.media_type,
                media_url: m.media_url,
            })
            .collect();

        Ok(PatrolDetail {
            patrol_id: patrol.role_id().to_string(),
            patrol_guard_name: patrol.patrol_guard_name,
            created_date: patrol.created_date,
            checklist_ids,
            multimedia,
        })
    }

    /// Replaces the profile of an existing admin or patrol. Role is immutable.
    pub async fn update_user(
        &self,
        role: Role,
        role_id: &str,
        request: UpdateUserRequest,
        modified_by: &str,
    ) -> DomainResult<User> {
        request.validate()?;

        let mut user = self
            .store
            .find_user(role, role_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("{} {}", role, role_id)))?;

        self.require_company(&request.company_code).await?;
        self.ensure_unique_login(&request.username, &request.email, Some(&user))
            .await?;

        user.username = request.username;
        user.password_hash = hash_password(&request.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        user.email = request.email;
        user.patrol_guard_name = request.patrol_guard_name;
        user.mobile_number = request.mobile_number;
        user.company_code = request.company_code;
        user.image_url = request.image_url.or(user.image_url);
        user.department = request.department.or(user.department);
        user.designation = request.designation.or(user.designation);
        user.modified_by = Some(modified_by.to_string());
        user.modified_date = Utc::now();

        self.store.update_user(&user).await?;

        info!(role = %role, role_id = %role_id, "User updated");
        Ok(user)
    }

    /// Hard-deletes an admin or patrol. Only an existing admin may do this.
    pub async fn delete_user(
        &self,
        role: Role,
        role_id: &str,
        requested_by: &str,
    ) -> DomainResult<()> {
        if self
            .store
            .find_user(Role::Admin, requested_by)
            .await?
            .is_none()
        {
            return Err(DomainError::Forbidden(
                "Only an existing admin may delete users".to_string(),
            ));
        }

        if !self.store.delete_user(role, role_id).await? {
            return Err(DomainError::not_found(format!("{} {}", role, role_id)));
        }

        info!(role = %role, role_id = %role_id, deleted_by = %requested_by, "User deleted");
        Ok(())
    }

    async fn require_company(&self, company_code: &str) -> DomainResult<Company> {
        self.store
            .find_company(company_code)
            .await?
            .ok_or_else(|| {
                DomainError::NotFound(format!("Company code {} does not exist", company_code))
            })
    }

    async fn ensure_unique_login(
        &self,
        username: &str,
        email: &str,
        current: Option<&User>,
    ) -> DomainResult<()> {
        let clashes = self
            .store
            .find_user_by_username_or_email(username, email)
            .await?;
        let taken = clashes.iter().any(|other| match current {
            Some(current) => !(other.role == current.role && other.role_id() == current.role_id()),
            None => true,
        });
        if taken {
            Err(DomainError::Conflict("Username or email already exists".to_string()))
        } else {
            Ok(())
        }
    }
}
