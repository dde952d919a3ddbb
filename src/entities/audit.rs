//! Audit points raised against suppliers

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::cells;
use crate::core::entity::{label_enum, require, Record, ValidationError};
use crate::core::table::{Row, RowRef};

label_enum! {
    #[derive(Default)]
    AuditStatus {
        #[default]
        Open => "Open",
        InProgress => "In Progress",
        RequiresSupplierInput => "Requires Supplier Input",
        Completed => "Completed",
        Closed => "Closed",
    }
}

impl AuditStatus {
    /// Completed and Closed both end an audit point
    pub fn is_closed(&self) -> bool {
        matches!(self, AuditStatus::Completed | AuditStatus::Closed)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditPoint {
    pub audit_id: String,
    pub point_description: String,
    pub status: AuditStatus,
    pub assignee: String,
    pub due_date: Option<NaiveDate>,
    pub resolution: Option<String>,
    pub input_pending: bool,
}

impl AuditPoint {
    pub fn new(description: impl Into<String>, assignee: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            audit_id: String::new(),
            point_description: description.into(),
            status: AuditStatus::Open,
            assignee: assignee.into(),
            due_date: Some(today + chrono::Duration::days(14)),
            resolution: None,
            input_pending: false,
        }
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.status.is_closed() && self.due_date.is_some_and(|due| due < today)
    }

    /// Open and due within `horizon_days` from today (inclusive)
    pub fn is_upcoming(&self, today: NaiveDate, horizon_days: i64) -> bool {
        let horizon = today + chrono::Duration::days(horizon_days);
        !self.status.is_closed()
            && self
                .due_date
                .is_some_and(|due| due >= today && due <= horizon)
    }
}

impl Record for AuditPoint {
    const KIND: &'static str = "audit point";
    const FILE: &'static str = "audit_points.csv";
    const COLUMNS: &'static [&'static str] = &[
        "audit_id",
        "point_description",
        "status",
        "assignee",
        "due_date",
        "resolution",
        "input_pending",
    ];
    const ID_COLUMN: &'static str = "audit_id";
    const ID_PREFIX: Option<&'static str> = Some("AUDIT");
    const OWNER_COLUMN: Option<&'static str> = Some("assignee");

    fn id(&self) -> &str {
        &self.audit_id
    }

    fn assign_id(&mut self, id: String) {
        self.audit_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("Point Description", &self.point_description),
            ("Assignee", &self.assignee),
        ])
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("audit_id", self.audit_id.as_str())
            .with("point_description", self.point_description.as_str())
            .with("status", self.status.as_str())
            .with("assignee", self.assignee.as_str())
            .with("due_date", self.due_date.map(cells::format_date))
            .with("resolution", self.resolution.clone())
            .with("input_pending", self.input_pending)
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            audit_id: cells::text_or_default(row, "audit_id"),
            point_description: cells::text_or_default(row, "point_description"),
            status: cells::label(row, "status"),
            assignee: cells::text_or_default(row, "assignee"),
            due_date: cells::date(row, "due_date"),
            resolution: cells::text(row, "resolution"),
            input_pending: cells::flag(row, "input_pending"),
        }
    }
}
