//! Domain services for the patrol operations backend.
//!
//! Services hold the business rules and talk to persistence only through
//! [`EntityStore`].

pub mod attachments;
pub mod checklist_lifecycle;
pub mod directory;
pub mod incidents;
pub mod memory_store;
pub mod notification;
pub mod reporting;
pub mod store;
pub mod workflow_lifecycle;

pub use attachments::{
    AttachmentService, BlobError, BlobStore, MemoryBlobStore, UploadPolicy,
    DEFAULT_MAX_UPLOAD_BYTES,
};
pub use checklist_lifecycle::ChecklistLifecycle;
pub use directory::DirectoryService;
pub use incidents::IncidentService;
pub use memory_store::InMemoryEntityStore;
pub use notification::{
    MockNotificationService, NotificationResult, NotificationService, OneTimeCodeMessage,
};
pub use reporting::{ReportWindow, ReportingService};
pub use store::{
    AttachmentScope, ChecklistFilter, EntityStore, StoreError, StoreResult, WorkflowFilter,
};
pub use workflow_lifecycle::WorkflowLifecycle;
