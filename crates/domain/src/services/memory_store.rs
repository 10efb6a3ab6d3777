//! In-memory entity store used by tests and local runs.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use tokio::sync::RwLock;

use super::store::{
    AttachmentScope, ChecklistFilter, EntityStore, StoreError, StoreResult, WorkflowFilter,
};
use crate::models::{
    Checklist, Company, History, IdFamily, Incident, IncidentMaster, Location, Media, Role, Scan,
    Signature, User, Workflow,
};

#[derive(Default)]
struct Tables {
    counters: HashMap<IdFamily, u64>,
    companies: Vec<Company>,
    locations: Vec<Location>,
    users: Vec<User>,
    workflows: Vec<Workflow>,
    checklists: Vec<Checklist>,
    scans: Vec<Scan>,
    media: Vec<Media>,
    signatures: Vec<Signature>,
    history: Vec<History>,
    incident_masters: BTreeMap<String, IncidentMaster>,
    incidents: Vec<Incident>,
}

impl Tables {
    fn existing_ids(&self, family: IdFamily) -> Vec<&str> {
        match family {
            IdFamily::Company => self.companies.iter().map(|c| c.company_code.as_str()).collect(),
            IdFamily::Location => self.locations.iter().map(|l| l.location_id.as_str()).collect(),
            IdFamily::Admin => self
                .users
                .iter()
                .filter_map(|u| u.admin_id.as_deref())
                .collect(),
            IdFamily::Patrol => self
                .users
                .iter()
                .filter_map(|u| u.patrol_id.as_deref())
                .collect(),
            IdFamily::Workflow => self.workflows.iter().map(|w| w.workflow_id.as_str()).collect(),
            IdFamily::Checklist => self
                .checklists
                .iter()
                .map(|c| c.checklist_id.as_str())
                .collect(),
            IdFamily::Scan => self.scans.iter().map(|s| s.scan_id.as_str()).collect(),
            IdFamily::Signature => self
                .signatures
                .iter()
                .map(|s| s.signature_id.as_str())
                .collect(),
            IdFamily::Media => self.media.iter().map(|m| m.multimedia_id.as_str()).collect(),
            IdFamily::History => self.history.iter().map(|h| h.history_id.as_str()).collect(),
        }
    }

    fn user_index(&self, role: Role, role_id: &str) -> Option<usize> {
        self.users
            .iter()
            .position(|u| u.role == role && u.role_id() == role_id)
    }

    fn checklist_index(&self, checklist_id: &str) -> Option<usize> {
        self.checklists
            .iter()
            .position(|c| c.checklist_id == checklist_id)
    }
}

/// Entity store backed by process memory. All tables share one lock, so
/// batch writes are atomic.
#[derive(Default)]
pub struct InMemoryEntityStore {
    tables: RwLock<Tables>,
    pending_conflicts: AtomicU32,
    unavailable: AtomicBool,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `count` single checklist updates fail with `VersionConflict`,
    /// as if another request had written first.
    pub fn inject_checklist_conflicts(&self, count: u32) {
        self.pending_conflicts.store(count, Ordering::SeqCst);
    }

    /// While set, `ping` and user lookups fail with a backend error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("store unavailable".to_string()));
        }
        Ok(())
    }

    fn take_conflict(&self) -> bool {
        self.pending_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn sorted_by<T, K: Ord>(mut items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    items.sort_by_key(key);
    items
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn next_id(&self, family: IdFamily) -> StoreResult<String> {
        let mut tables = self.tables.write().await;
        let counter = tables.counters.get(&family).copied().unwrap_or(0);
        let next = family.next_value(counter, tables.existing_ids(family));
        tables.counters.insert(family, next);
        Ok(family.render(next))
    }

    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn insert_company(&self, company: &Company) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .companies
            .iter()
            .any(|c| c.company_code == company.company_code)
        {
            return Err(StoreError::Duplicate(format!(
                "company {}",
                company.company_code
            )));
        }
        tables.companies.push(company.clone());
        Ok(())
    }

    async fn find_company(&self, company_code: &str) -> StoreResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables
            .companies
            .iter()
            .find(|c| c.company_code == company_code)
            .cloned())
    }

    async fn find_company_by_name_and_location(
        &self,
        company_name: &str,
        company_location: &str,
    ) -> StoreResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables
            .companies
            .iter()
            .find(|c| c.company_name == company_name && c.company_location == company_location)
            .cloned())
    }

    async fn list_companies(&self) -> StoreResult<Vec<Company>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.companies.clone(), |c| c.created_date))
    }

    async fn insert_location(&self, location: &Location) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.locations.iter().any(|l| {
            l.location_id == location.location_id || l.location_code == location.location_code
        }) {
            return Err(StoreError::Duplicate(format!(
                "location {}",
                location.location_code
            )));
        }
        tables.locations.push(location.clone());
        Ok(())
    }

    async fn find_location_by_code(&self, location_code: &str) -> StoreResult<Option<Location>> {
        let tables = self.tables.read().await;
        Ok(tables
            .locations
            .iter()
            .find(|l| l.location_code == location_code)
            .cloned())
    }

    async fn list_locations(&self) -> StoreResult<Vec<Location>> {
        let tables = self.tables.read().await;
        Ok(sorted_by(tables.locations.clone(), |l| l.created_date))
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Duplicate(format!("user {}", user.username)));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn find_user(&self, role: Role, role_id: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        let tables = self.tables.read().await;
        Ok(tables
            .user_index(role, role_id)
            .map(|idx| tables.users[idx].clone()))
    }

    async fn find_user_by_login(&self, login: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.username == login || u.email == login)
            .cloned())
    }

    async fn find_user_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| u.username == username || u.email == email)
            .cloned()
            .collect())
    }

    async fn list_users(&self, role: Option<Role>) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        let users = tables
            .users
            .iter()
            .filter(|u| role.map_or(true, |r| u.role == r))
            .cloned()
            .collect();
        Ok(sorted_by(users, |u: &User| u.created_date))
    }

    async fn update_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let idx = tables
            .user_index(user.role, user.role_id())
            .ok_or_else(|| StoreError::Backend(format!("user {} vanished", user.role_id())))?;
        let clash = tables.users.iter().enumerate().any(|(i, u)| {
            i != idx && (u.username == user.username || u.email == user.email)
        });
        if clash {
            return Err(StoreError::Duplicate(format!("user {}", user.username)));
        }
        tables.users[idx] = user.clone();
        Ok(())
    }

    async fn delete_user(&self, role: Role, role_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.user_index(role, role_id) {
            Some(idx) => {
                tables.users.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_workflow(&self, workflow: &Workflow) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .workflows
            .iter()
            .any(|w| w.workflow_id == workflow.workflow_id)
        {
            return Err(StoreError::Duplicate(format!(
                "workflow {}",
                workflow.workflow_id
            )));
        }
        tables.workflows.push(workflow.clone());
        Ok(())
    }

    async fn find_workflow(&self, workflow_id: &str) -> StoreResult<Option<Workflow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workflows
            .iter()
            .find(|w| w.workflow_id == workflow_id)
            .cloned())
    }

    async fn find_workflow_by_title(&self, title: &str) -> StoreResult<Option<Workflow>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workflows
            .iter()
            .find(|w| w.workflow_title == title)
            .cloned())
    }

    async fn list_workflows(&self, filter: &WorkflowFilter) -> StoreResult<Vec<Workflow>> {
        let tables = self.tables.read().await;
        let workflows = tables
            .workflows
            .iter()
            .filter(|w| filter.status.map_or(true, |s| w.status() == s))
            .filter(|w| filter.is_active.map_or(true, |a| w.is_active == a))
            .cloned()
            .collect();
        Ok(sorted_by(workflows, |w: &Workflow| w.created_date))
    }

    async fn update_workflow(&self, workflow: &Workflow) -> StoreResult<Workflow> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .workflows
            .iter_mut()
            .find(|w| w.workflow_id == workflow.workflow_id)
            .filter(|w| w.version == workflow.version)
            .ok_or_else(|| StoreError::VersionConflict {
                entity: "Workflow",
                id: workflow.workflow_id.clone(),
            })?;
        *stored = workflow.clone();
        stored.version += 1;
        Ok(stored.clone())
    }

    async fn delete_workflow(&self, workflow_id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.workflows.len();
        tables.workflows.retain(|w| w.workflow_id != workflow_id);
        Ok(tables.workflows.len() != before)
    }

    async fn insert_checklist(&self, checklist: &Checklist) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.checklist_index(&checklist.checklist_id).is_some() {
            return Err(StoreError::Duplicate(format!(
                "checklist {}",
                checklist.checklist_id
            )));
        }
        tables.checklists.push(checklist.clone());
        Ok(())
    }

    async fn find_checklist(&self, checklist_id: &str) -> StoreResult<Option<Checklist>> {
        let tables = self.tables.read().await;
        Ok(tables
            .checklist_index(checklist_id)
            .map(|idx| tables.checklists[idx].clone()))
    }

    async fn find_checklists(&self, checklist_ids: &[String]) -> StoreResult<Vec<Checklist>> {
        let tables = self.tables.read().await;
        let found = tables
            .checklists
            .iter()
            .filter(|c| checklist_ids.contains(&c.checklist_id))
            .cloned()
            .collect();
        Ok(sorted_by(found, |c: &Checklist| c.created_date))
    }

    async fn list_checklists(&self, filter: &ChecklistFilter) -> StoreResult<Vec<Checklist>> {
        let tables = self.tables.read().await;
        let found = tables
            .checklists
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Ok(sorted_by(found, |c: &Checklist| c.created_date))
    }

    async fn count_checklists(&self, workflow_id: &str) -> StoreResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .checklists
            .iter()
            .filter(|c| c.workflow_id == workflow_id)
            .count() as u64)
    }

    async fn update_checklist(&self, checklist: &Checklist) -> StoreResult<Checklist> {
        if self.take_conflict() {
            return Err(StoreError::VersionConflict {
                entity: "Checklist",
                id: checklist.checklist_id.clone(),
            });
        }
        let mut updated = self.update_checklists(std::slice::from_ref(checklist)).await?;
        updated
            .pop()
            .ok_or_else(|| StoreError::Backend("empty batch result".to_string()))
    }

    async fn update_checklists(&self, checklists: &[Checklist]) -> StoreResult<Vec<Checklist>> {
        let mut tables = self.tables.write().await;

        let mut positions = Vec::with_capacity(checklists.len());
        for checklist in checklists {
            let idx = tables
                .checklist_index(&checklist.checklist_id)
                .filter(|&idx| tables.checklists[idx].version == checklist.version)
                .ok_or_else(|| StoreError::VersionConflict {
                    entity: "Checklist",
                    id: checklist.checklist_id.clone(),
                })?;
            positions.push(idx);
        }

        let mut written = Vec::with_capacity(checklists.len());
        for (idx, checklist) in positions.into_iter().zip(checklists) {
            let mut stored = checklist.clone();
            stored.version += 1;
            tables.checklists[idx] = stored.clone();
            written.push(stored);
        }
        Ok(written)
    }

    async fn insert_scan(&self, scan: &Scan) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.scans.push(scan.clone());
        Ok(())
    }

    async fn list_scans(&self, checklist_id: &str) -> StoreResult<Vec<Scan>> {
        let tables = self.tables.read().await;
        Ok(tables
            .scans
            .iter()
            .filter(|s| s.checklist_id == checklist_id)
            .cloned()
            .collect())
    }

    async fn insert_media(&self, media: &Media) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.media.push(media.clone());
        Ok(())
    }

    async fn list_media(&self, patrol_id: &str, scope: AttachmentScope) -> StoreResult<Vec<Media>> {
        let tables = self.tables.read().await;
        Ok(tables
            .media
            .iter()
            .filter(|m| m.patrol_id == patrol_id && scope.admits(m.checklist_id.as_deref()))
            .cloned()
            .collect())
    }

    async fn insert_signature(&self, signature: &Signature) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.signatures.push(signature.clone());
        Ok(())
    }

    async fn list_signatures(
        &self,
        patrol_id: &str,
        scope: AttachmentScope,
    ) -> StoreResult<Vec<Signature>> {
        let tables = self.tables.read().await;
        Ok(tables
            .signatures
            .iter()
            .filter(|s| s.patrol_id == patrol_id && scope.admits(s.checklist_id.as_deref()))
            .cloned()
            .collect())
    }

    async fn insert_history(&self, history: &History) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.history.push(history.clone());
        Ok(())
    }

    async fn insert_incident_master(&self, master: &IncidentMaster) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.incident_masters.contains_key(&master.code) {
            return Err(StoreError::Duplicate(format!("incident code {}", master.code)));
        }
        tables
            .incident_masters
            .insert(master.code.clone(), master.clone());
        Ok(())
    }

    async fn find_incident_master(&self, code: &str) -> StoreResult<Option<IncidentMaster>> {
        let tables = self.tables.read().await;
        Ok(tables.incident_masters.get(code).cloned())
    }

    async fn find_incident_masters(&self, codes: &[String]) -> StoreResult<Vec<IncidentMaster>> {
        let tables = self.tables.read().await;
        Ok(tables
            .incident_masters
            .values()
            .filter(|m| codes.contains(&m.code))
            .cloned()
            .collect())
    }

    async fn list_incident_masters(&self) -> StoreResult<Vec<IncidentMaster>> {
        let tables = self.tables.read().await;
        let masters = tables.incident_masters.values().cloned().collect();
        Ok(sorted_by(masters, |m: &IncidentMaster| m.created_date))
    }

    async fn update_incident_master(&self, master: &IncidentMaster) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        match tables.incident_masters.get_mut(&master.code) {
            Some(stored) => {
                *stored = master.clone();
                Ok(())
            }
            None => Err(StoreError::Backend(format!(
                "incident code {} vanished",
                master.code
            ))),
        }
    }

    async fn insert_incidents(&self, incidents: &[Incident]) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        tables.incidents.extend_from_slice(incidents);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::checklist::ChecklistFields;
    use crate::models::workflow::WorkflowFields;
    use chrono::Utc;

    fn workflow(id: &str) -> Workflow {
        let now = Utc::now();
        Workflow::new(WorkflowFields {
            workflow_id: id.into(),
            workflow_title: format!("Round {}", id),
            description: None,
            assigned_start: None,
            assigned_end: None,
            created_by: "ADM001".into(),
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
            version: 0,
        })
    }

    fn checklist(id: &str) -> Checklist {
        let now = Utc::now();
        Checklist::new(ChecklistFields {
            checklist_id: id.into(),
            workflow_id: "WF001".into(),
            location_code: "GATE-1".into(),
            title: "Gate".into(),
            remarks: None,
            start_date_time: None,
            end_date_time: None,
            created_by: "ADM001".into(),
            modified_by: None,
            created_date: now,
            modified_date: now,
            is_active: true,
            scan_start_date: None,
            scan_end_date: None,
            version: 0,
        })
    }

    #[tokio::test]
    async fn test_next_id_seeds_each_family() {
        let store = InMemoryEntityStore::new();
        assert_eq!(store.next_id(IdFamily::Workflow).await.unwrap(), "WF001");
        assert_eq!(store.next_id(IdFamily::Checklist).await.unwrap(), "CHK001");
        assert_eq!(store.next_id(IdFamily::Workflow).await.unwrap(), "WF002");
    }

    #[tokio::test]
    async fn test_next_id_follows_inserted_records() {
        let store = InMemoryEntityStore::new();
        store.insert_workflow(&workflow("WF007")).await.unwrap();
        assert_eq!(store.next_id(IdFamily::Workflow).await.unwrap(), "WF008");
    }

    #[tokio::test]
    async fn test_concurrent_next_id_is_unique() {
        let store = std::sync::Arc::new(InMemoryEntityStore::new());
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.next_id(IdFamily::Scan).await.unwrap()
            }));
        }
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 50);
        assert_eq!(ids.last().map(String::as_str), Some("SCN050"));
    }

    #[tokio::test]
    async fn test_update_workflow_checks_version() {
        let store = InMemoryEntityStore::new();
        let original = workflow("WF001");
        store.insert_workflow(&original).await.unwrap();

        let mut first = original.clone();
        first.description = Some("first".into());
        let stored = store.update_workflow(&first).await.unwrap();
        assert_eq!(stored.version, 1);

        let mut stale = original;
        stale.description = Some("stale".into());
        let err = store.update_workflow(&stale).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));

        let current = store.find_workflow("WF001").await.unwrap().unwrap();
        assert_eq!(current.description.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_batch_update_is_all_or_nothing() {
        let store = InMemoryEntityStore::new();
        for id in ["CHK001", "CHK002"] {
            store.insert_checklist(&checklist(id)).await.unwrap();
        }

        let mut a = checklist("CHK001");
        a.assign("PTR001", "ADM001", Utc::now()).unwrap();
        let mut b = checklist("CHK002");
        b.assign("PTR001", "ADM001", Utc::now()).unwrap();
        b.version = 5;

        assert!(store.update_checklists(&[a, b]).await.is_err());
        let untouched = store.find_checklist("CHK001").await.unwrap().unwrap();
        assert!(untouched.assigned_to().is_none());
        assert_eq!(untouched.version, 0);
    }

    #[tokio::test]
    async fn test_injected_conflicts_are_consumed() {
        let store = InMemoryEntityStore::new();
        store.insert_checklist(&checklist("CHK001")).await.unwrap();
        store.inject_checklist_conflicts(1);

        let err = store.update_checklist(&checklist("CHK001")).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
        assert_eq!(
            store.find_checklist("CHK001").await.unwrap().unwrap().version,
            0
        );

        let stored = store.update_checklist(&checklist("CHK001")).await.unwrap();
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_ping_and_user_lookup() {
        let store = InMemoryEntityStore::new();
        store.set_unavailable(true);
        assert!(matches!(store.ping().await, Err(StoreError::Backend(_))));
        assert!(store.find_user(Role::Admin, "ADM001").await.is_err());

        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_attachment_scope() {
        let store = InMemoryEntityStore::new();
        let now = Utc::now();
        for (id, link) in [("MMD001", None), ("MMD002", Some("CHK001".to_string()))] {
            store
                .insert_media(&Media {
                    multimedia_id: id.into(),
                    media_url: format!("/uploads/{}.png", id),
                    media_type: crate::models::MediaType::Image,
                    description: None,
                    patrol_id: "PTR001".into(),
                    checklist_id: link,
                    created_by: "PTR001".into(),
                    modified_by: None,
                    created_date: now,
                    modified_date: now,
                    is_active: true,
                })
                .await
                .unwrap();
        }

        let all = store.list_media("PTR001", AttachmentScope::All).await.unwrap();
        assert_eq!(all.len(), 2);
        let general = store
            .list_media("PTR001", AttachmentScope::General)
            .await
            .unwrap();
        assert_eq!(general.len(), 1);
        assert_eq!(general[0].multimedia_id, "MMD001");
    }
}
