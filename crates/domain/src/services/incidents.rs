//! Incident catalog and incident reporting.

use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::store::EntityStore;
use crate::error::{DomainError, DomainResult};
use crate::models::incident::{
    CreateIncidentMasterRequest, ReportIncidentsRequest, UpdateIncidentMasterRequest,
    INCIDENT_TYPE,
};
use crate::models::{Incident, IncidentMaster};

pub struct IncidentService {
    store: Arc<dyn EntityStore>,
}

impl IncidentService {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub async fn create_master(
        &self,
        request: CreateIncidentMasterRequest,
    ) -> DomainResult<IncidentMaster> {
        request.validate()?;
        if self.store.find_incident_master(&request.code).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "Incident code {} already exists",
                request.code
            )));
        }

        let master = IncidentMaster {
            code: request.code,
            incident: request.incident,
            severity: request.severity,
            created_date: Utc::now(),
            is_active: true,
        };
        self.store.insert_incident_master(&master).await?;

        info!(code = %master.code, severity = master.severity.as_str(), "Incident master created");
        Ok(master)
    }

    pub async fn list_masters(&self) -> DomainResult<Vec<IncidentMaster>> {
        Ok(self.store.list_incident_masters().await?)
    }

    pub async fn get_master(&self, code: &str) -> DomainResult<IncidentMaster> {
        self.store
            .find_incident_master(code)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Incident master {}", code)))
    }

    pub async fn update_master(
        &self,
        code: &str,
        request: UpdateIncidentMasterRequest,
    ) -> DomainResult<IncidentMaster> {
        request.validate()?;
        let mut master = self.get_master(code).await?;

        if let Some(incident) = request.incident {
            master.incident = incident;
        }
        if let Some(severity) = request.severity {
            master.severity = severity;
        }
        if let Some(is_active) = request.is_active {
            master.is_active = is_active;
        }
        self.store.update_incident_master(&master).await?;

        info!(code = %code, "Incident master updated");
        Ok(master)
    }

    /// Soft delete: the entry stays in the catalog, marked inactive.
    pub async fn deactivate_master(&self, code: &str) -> DomainResult<IncidentMaster> {
        let mut master = self.get_master(code).await?;
        master.is_active = false;
        self.store.update_incident_master(&master).await?;

        info!(code = %code, "Incident master deactivated");
        Ok(master)
    }

    /// Records one incident per catalog code, copying name and severity.
    pub async fn report(&self, request: ReportIncidentsRequest) -> DomainResult<Vec<Incident>> {
        request.validate()?;

        let masters = self.store.find_incident_masters(&request.incident_codes).await?;
        let missing: Vec<&str> = request
            .incident_codes
            .iter()
            .filter(|code| !masters.iter().any(|m| &m.code == *code))
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Err(DomainError::NotFound(format!(
                "Incident codes not found: {}",
                missing.join(", ")
            )));
        }

        let now = Utc::now();
        let incidents: Vec<Incident> = masters
            .into_iter()
            .map(|master| Incident {
                id: Uuid::new_v4(),
                incident_name: master.incident,
                severity: master.severity,
                incident_type: INCIDENT_TYPE.to_string(),
                patrol_id: request.patrol_id.clone(),
                date: now,
                is_active: true,
            })
            .collect();
        self.store.insert_incidents(&incidents).await?;

        info!(patrol_id = %request.patrol_id, count = incidents.len(), "Incidents reported");
        Ok(incidents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::services::memory_store::InMemoryEntityStore;

    async fn service_with_catalog() -> IncidentService {
        let store: Arc<dyn EntityStore> = Arc::new(InMemoryEntityStore::new());
        let service = IncidentService::new(store);
        for (code, name, severity) in [
            ("FIRE", "Fire", Severity::Critical),
            ("FENCE", "Broken fence", Severity::Moderate),
        ] {
            service
                .create_master(CreateIncidentMasterRequest {
                    code: code.into(),
                    incident: name.into(),
                    severity,
                })
                .await
                .unwrap();
        }
        service
    }

    #[tokio::test]
    async fn test_duplicate_code_conflicts() {
        let service = service_with_catalog().await;
        let result = service
            .create_master(CreateIncidentMasterRequest {
                code: "FIRE".into(),
                incident: "Smoke".into(),
                severity: Severity::Low,
            })
            .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_report_copies_catalog_by_value() {
        let service = service_with_catalog().await;
        let incidents = service
            .report(ReportIncidentsRequest {
                patrol_id: "PTR001".into(),
                incident_codes: vec!["FENCE".into()],
            })
            .await
            .unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].incident_name, "Broken fence");
        assert_eq!(incidents[0].incident_type, "incident");

        service
            .update_master(
                "FENCE",
                UpdateIncidentMasterRequest {
                    incident: Some("Damaged fence".into()),
                    severity: Some(Severity::Major),
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(incidents[0].severity, Severity::Moderate);
    }

    #[tokio::test]
    async fn test_report_lists_missing_codes() {
        let service = service_with_catalog().await;
        let err = service
            .report(ReportIncidentsRequest {
                patrol_id: "PTR001".into(),
                incident_codes: vec!["FIRE".into(), "FLOOD".into(), "THEFT".into()],
            })
            .await
            .unwrap_err();
        match err {
            DomainError::NotFound(message) => {
                assert!(message.contains("FLOOD"));
                assert!(message.contains("THEFT"));
                assert!(!message.contains("FIRE"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deactivate_is_soft() {
        let service = service_with_catalog().await;
        let master = service.deactivate_master("FIRE").await.unwrap();
        assert!(!master.is_active);
        assert!(!service.get_master("FIRE").await.unwrap().is_active);
        assert_eq!(service.list_masters().await.unwrap().len(), 2);

        assert!(matches!(
            service.deactivate_master("NOPE").await,
            Err(DomainError::NotFound(_))
        ));
    }
}
