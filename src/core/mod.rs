//! Core module - storage, filtering, and shared infrastructure

pub mod cells;
pub mod config;
pub mod dashboard;
pub mod entity;
pub mod filter;
pub mod records;
pub mod role;
pub mod sequence;
pub mod session;
pub mod store;
pub mod table;
pub mod workspace;

pub use config::{Config, Thresholds};
pub use entity::{Record, ValidationError};
pub use filter::{ColumnControl, ColumnFilter, FilterError, FilterOutcome, SearchFilter, Selection};
pub use records::{RecordError, Records};
pub use role::Role;
pub use sequence::IdSequences;
pub use session::{Session, SessionError};
pub use store::StoreError;
pub use table::{ColumnKind, Row, RowRef, Table, Value};
pub use workspace::{Workspace, WorkspaceError};
