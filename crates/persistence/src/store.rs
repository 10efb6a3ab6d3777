//! PostgreSQL-backed [`EntityStore`].

use async_trait::async_trait;
use domain::models::{
    Checklist, Company, History, IdFamily, Incident, IncidentMaster, Location, Media, Role, Scan,
    Signature, User, Workflow,
};
use domain::services::{
    AttachmentScope, ChecklistFilter, EntityStore, StoreError, StoreResult, WorkflowFilter,
};
use sqlx::PgPool;

use crate::entities::{ChecklistEntity, WorkflowEntity};
use crate::repositories::{
    AttachmentRepository, ChecklistRepository, CompanyRepository, IdSequenceRepository,
    IncidentRepository, UserRepository, WorkflowRepository,
};

/// Maps a driver error onto the store contract. Unique violations become
/// [`StoreError::Duplicate`].
fn store_err(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.message().to_string())
        }
        _ => StoreError::Backend(err.to_string()),
    }
}

fn workflows(rows: Vec<WorkflowEntity>) -> StoreResult<Vec<Workflow>> {
    rows.into_iter().map(Workflow::try_from).collect()
}

fn checklists(rows: Vec<ChecklistEntity>) -> StoreResult<Vec<Checklist>> {
    rows.into_iter().map(Checklist::try_from).collect()
}

fn convert<E, T: From<E>>(rows: Vec<E>) -> Vec<T> {
    rows.into_iter().map(T::from).collect()
}

/// Entity store over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
    ids: IdSequenceRepository,
    companies: CompanyRepository,
    users: UserRepository,
    workflows: WorkflowRepository,
    checklists: ChecklistRepository,
    attachments: AttachmentRepository,
    incidents: IncidentRepository,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ids: IdSequenceRepository::new(pool.clone()),
            companies: CompanyRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            workflows: WorkflowRepository::new(pool.clone()),
            checklists: ChecklistRepository::new(pool.clone()),
            attachments: AttachmentRepository::new(pool.clone()),
            incidents: IncidentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn next_id(&self, family: IdFamily) -> StoreResult<String> {
        let value = self.ids.next_value(family).await.map_err(store_err)?;
        let value = u64::try_from(value)
            .map_err(|_| StoreError::Corrupt(format!("{} counter is negative", family.prefix())))?;
        Ok(family.render(value))
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(store_err)
    }

    async fn insert_company(&self, company: &Company) -> StoreResult<()> {
        self.companies.insert_company(company).await.map_err(store_err)
    }

    async fn find_company(&self, company_code: &str) -> StoreResult<Option<Company>> {
        let row = self.companies.find_company(company_code).await.map_err(store_err)?;
        Ok(row.map(Company::from))
    }

    async fn find_company_by_name_and_location(
        &self,
        company_name: &str,
        company_location: &str,
    ) -> StoreResult<Option<Company>> {
        let row = self
            .companies
            .find_company_by_name_and_location(company_name, company_location)
            .await
            .map_err(store_err)?;
        Ok(row.map(Company::from))
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let rows = self.companies.list_companies().await.map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn insert_location(&self, location: &Location) -> StoreResult<()> {
        self.companies.insert_location(location).await.map_err(store_err)
    }

    async fn find_location_by_code(&self, location_code: &str) -> StoreResult<Option<Location>> {
        let row = self
            .companies
            .find_location_by_code(location_code)
            .await
            .map_err(store_err)?;
        Ok(row.map(Location::from))
    }

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        let rows = self.companies.list_locations().await.map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        self.users.insert(user).await.map_err(store_err)
    }

    async fn find_user(&self, role: Role, role_id: &str) -> StoreResult<Option<User>> {
        let row = self.users.find_by_role_id(role, role_id).await.map_err(store_err)?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let row = self.users.find_by_login(login).await.map_err(store_err)?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Vec<User>> {
        let rows = self
            .users
            .find_by_username_or_email(username, email)
            .await
            .map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let rows = self.users.list(role).await.map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        match self.users.update(user).await.map_err(store_err)? {
            0 => Err(StoreError::Backend(format!("user {} vanished", user.role_id()))),
            _ => Ok(()),
        }
    }

    async fn delete_user(&self, role: Role, role_id: &str) -> StoreResult<bool> {
        let affected = self.users.delete(role, role_id).await.map_err(store_err)?;
        Ok(affected > 0)
    }

    async fn insert_workflow(&self, workflow: &Workflow) -> StoreResult<()> {
        self.workflows.insert(workflow).await.map_err(store_err)
    }

    async fn find_workflow(&self, workflow_id: &str) -> StoreResult<Option<Workflow>> {
        self.workflows
            .find_by_id(workflow_id)
            .await
            .map_err(store_err)?
            .map(Workflow::try_from)
            .transpose()
    }

    async fn find_workflow_by_title(&self, title: &str) -> StoreResult<Option<Workflow>> {
        self.workflows
            .find_by_title(title)
            .await
            .map_err(store_err)?
            .map(Workflow::try_from)
            .transpose()
    }

    async fn list_workflows(&self, filter: &WorkflowFilter) -> StoreResult<Vec<Workflow>> {
        workflows(self.workflows.list(filter).await.map_err(store_err)?)
    }

    async fn update_workflow(&self, workflow: &Workflow) -> StoreResult<Workflow> {
        self.workflows
            .update_versioned(workflow)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::VersionConflict {
                entity: "Workflow",
                id: workflow.workflow_id.clone(),
            })
            .and_then(Workflow::try_from)
    }

    async fn delete_workflow(&self, workflow_id: &str) -> StoreResult<bool> {
        let affected = self.workflows.delete(workflow_id).await.map_err(store_err)?;
        Ok(affected > 0)
    }

    async fn insert_checklist(&self, checklist: &Checklist) -> StoreResult<()> {
        self.checklists.insert(checklist).await.map_err(store_err)
    }

    async fn find_checklist(&self, checklist_id: &str) -> StoreResult<Option<Checklist>> {
        self.checklists
            .find_by_id(checklist_id)
            .await
            .map_err(store_err)?
            .map(Checklist::try_from)
            .transpose()
    }

    async fn find_checklists(&self, checklist_ids: &[String]) -> StoreResult<Vec<Checklist>> {
        checklists(self.checklists.find_by_ids(checklist_ids).await.map_err(store_err)?)
    }

    async fn list_checklists(&self, filter: &ChecklistFilter) -> StoreResult<Vec<Checklist>> {
        checklists(self.checklists.list(filter).await.map_err(store_err)?)
    }

    async fn count_checklists(&self, workflow_id: &str) -> StoreResult<u64> {
        let count = self
            .checklists
            .count_by_workflow(workflow_id)
            .await
            .map_err(store_err)?;
        Ok(count.max(0) as u64)
    }

    async fn update_checklist(&self, checklist: &Checklist) -> StoreResult<Checklist> {
        let mut updated = self.update_checklists(std::slice::from_ref(checklist)).await?;
        updated
            .pop()
            .ok_or_else(|| StoreError::Backend("empty batch result".to_string()))
    }

    async fn update_checklists(&self, batch: &[Checklist]) -> StoreResult<Vec<Checklist>> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let mut written = Vec::with_capacity(batch.len());
        for checklist in batch {
            let row = ChecklistRepository::update_versioned(&mut tx, checklist)
                .await
                .map_err(store_err)?;
            match row {
                Some(row) => written.push(Checklist::try_from(row)?),
                // Dropping the transaction rolls back rows already written.
                None => {
                    return Err(StoreError::VersionConflict {
                        entity: "Checklist",
                        id: checklist.checklist_id.clone(),
                    })
                }
            }
        }
        tx.commit().await.map_err(store_err)?;
        Ok(written)
    }

    async fn insert_scan(&self, scan: &Scan) -> StoreResult<()> {
        self.attachments.insert_scan(scan).await.map_err(store_err)
    }

    async fn list_scans(&self, checklist_id: &str) -> StoreResult<Vec<Scan>> {
        let rows = self.attachments.list_scans(checklist_id).await.map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn insert_media(&self, media: &Media) -> StoreResult<()> {
        self.attachments.insert_media(media).await.map_err(store_err)
    }

    async fn list_media(&self, patrol_id: &str, scope: AttachmentScope) -> StoreResult<Vec<Media>> {
        let general_only = scope == AttachmentScope::General;
        let rows = self
            .attachments
            .list_media(patrol_id, general_only)
            .await
            .map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn insert_signature(&self, signature: &Signature) -> StoreResult<()> {
        self.attachments
            .insert_signature(signature)
            .await
            .map_err(store_err)
    }

    async fn list_signatures(
        &self,
        patrol_id: &str,
        scope: AttachmentScope,
    ) -> StoreResult<Vec<Signature>> {
        let general_only = scope == AttachmentScope::General;
        let rows = self
            .attachments
            .list_signatures(patrol_id, general_only)
            .await
            .map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn insert_history(&self, history: &History) -> StoreResult<()> {
        self.attachments.insert_history(history).await.map_err(store_err)
    }

    async fn insert_incident_master(&self, master: &IncidentMaster) -> StoreResult<()> {
        self.incidents.insert_master(master).await.map_err(store_err)
    }

    async fn find_incident_master(&self, code: &str) -> StoreResult<Option<IncidentMaster>> {
        let row = self.incidents.find_master(code).await.map_err(store_err)?;
        Ok(row.map(IncidentMaster::from))
    }

    async fn find_incident_masters(&self, codes: &[String]) -> StoreResult<Vec<IncidentMaster>> {
        let rows = self.incidents.find_masters(codes).await.map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn list_incident_masters(&self) -> StoreResult<Vec<IncidentMaster>> {
        let rows = self.incidents.list_masters().await.map_err(store_err)?;
        Ok(convert(rows))
    }

    async fn update_incident_master(&self, master: &IncidentMaster) -> StoreResult<()> {
        match self.incidents.update_master(master).await.map_err(store_err)? {
            0 => Err(StoreError::Backend(format!(
                "incident code {} vanished",
                master.code
            ))),
            _ => Ok(()),
        }
    }

    async fn insert_incidents(&self, incidents: &[Incident]) -> StoreResult<()> {
        self.incidents.insert_incidents(incidents).await.map_err(store_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_database_errors_map_to_backend() {
        let err = store_err(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Backend(_)));
    }

    #[test]
    fn test_pool_timeout_maps_to_backend() {
        let err = store_err(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Backend(message) if message.contains("timed out")));
    }
}
