//! Read-only report views.

use serde::{Deserialize, Serialize};

use super::attachment::{Media, Signature};
use super::checklist::Checklist;
use super::workflow::Workflow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    #[default]
    Regular,
    Media,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(default, rename = "type")]
    pub report_type: ReportType,
    pub start_date_time: Option<String>,
    pub end_date_time: Option<String>,
}

/// A checklist with the attachments recorded against it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistReport {
    #[serde(flatten)]
    pub checklist: Checklist,
    pub multimedia: Vec<Media>,
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowReport {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub checklists: Vec<ChecklistReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularReport {
    pub patrol_id: String,
    pub workflows: Vec<WorkflowReport>,
}

/// General attachments, not linked to any checklist.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaReport {
    pub patrol_id: String,
    pub multimedia: Vec<Media>,
    pub signatures: Vec<Signature>,
}
