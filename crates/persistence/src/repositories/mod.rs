//! Repository implementations for database operations.

pub mod attachment;
pub mod checklist;
pub mod company;
pub mod id_sequence;
pub mod incident;
pub mod user;
pub mod workflow;

pub use attachment::AttachmentRepository;
pub use checklist::ChecklistRepository;
pub use company::CompanyRepository;
pub use id_sequence::IdSequenceRepository;
pub use incident::IncidentRepository;
pub use user::UserRepository;
pub use workflow::WorkflowRepository;
