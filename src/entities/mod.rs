//! Record types stored in the workspace
//!
//! **Supplier management:**
//! - [`Supplier`] - Master data, performance and ESG metrics
//! - [`Asset`] - Equipment owned or operated by a supplier
//! - [`Task`] - Project tasks, including ESG initiatives
//! - [`AuditPoint`] - Findings raised during audits
//!
//! **Collaboration:**
//! - [`UploadedFile`] and [`Comment`] - Shared documents with threaded comments
//! - [`Notification`] - Role-to-role messages
//! - [`Event`] - Shared calendar entries

pub mod asset;
pub mod audit;
pub mod comment;
pub mod event;
pub mod file;
pub mod notification;
pub mod supplier;
pub mod task;

pub use asset::{Asset, AssetStatus};
pub use audit::{AuditPoint, AuditStatus};
pub use comment::Comment;
pub use event::Event;
pub use file::UploadedFile;
pub use notification::{MessageStatus, Notification};
pub use supplier::{AgreementStatus, RiskLevel, Supplier};
pub use task::{Task, TaskStatus};

use crate::core::records::{RecordError, Records};
use crate::core::workspace::Workspace;

/// Create any missing table file with its header row
pub fn initialize_all(workspace: &Workspace) -> Result<(), RecordError> {
    Records::<Supplier>::new(workspace).initialize()?;
    Records::<Asset>::new(workspace).initialize()?;
    Records::<Task>::new(workspace).initialize()?;
    Records::<AuditPoint>::new(workspace).initialize()?;
    Records::<UploadedFile>::new(workspace).initialize()?;
    Records::<Comment>::new(workspace).initialize()?;
    Records::<Notification>::new(workspace).initialize()?;
    Records::<Event>::new(workspace).initialize()?;
    Ok(())
}
