//! Project tasks, including ESG initiatives

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::cells;
use crate::core::entity::{label_enum, require, Record, ValidationError};
use crate::core::table::{Row, RowRef};

label_enum! {
    #[derive(Default)]
    TaskStatus {
        #[default]
        NotStarted => "Not Started",
        InProgress => "In Progress",
        Completed => "Completed",
        OnHold => "On Hold",
        InputPending => "Input Pending",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub task_id: String,
    pub task_name: String,
    pub status: TaskStatus,
    pub assigned_to: String,
    pub due_date: Option<NaiveDate>,
    pub description: Option<String>,
    pub input_pending: bool,
    pub is_esg_project: bool,
}

impl Task {
    pub fn new(name: impl Into<String>, assigned_to: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            task_id: String::new(),
            task_name: name.into(),
            status: TaskStatus::NotStarted,
            assigned_to: assigned_to.into(),
            due_date: Some(today + chrono::Duration::days(7)),
            description: None,
            input_pending: false,
            is_esg_project: false,
        }
    }

    /// Open past its due date
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status != TaskStatus::Completed && self.due_date.is_some_and(|due| due < today)
    }
}

impl Record for Task {
    const KIND: &'static str = "task";
    const FILE: &'static str = "project_tasks.csv";
    const COLUMNS: &'static [&'static str] = &[
        "task_id",
        "task_name",
        "status",
        "assigned_to",
        "due_date",
        "description",
        "input_pending",
        "is_esg_project",
    ];
    const ID_COLUMN: &'static str = "task_id";
    const ID_PREFIX: Option<&'static str> = Some("TASK");
    const OWNER_COLUMN: Option<&'static str> = Some("assigned_to");

    fn id(&self) -> &str {
        &self.task_id
    }

    fn assign_id(&mut self, id: String) {
        self.task_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[("Task Name", &self.task_name), ("Assigned To", &self.assigned_to)])
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("task_id", self.task_id.as_str())
            .with("task_name", self.task_name.as_str())
            .with("status", self.status.as_str())
            .with("assigned_to", self.assigned_to.as_str())
            .with("due_date", self.due_date.map(cells::format_date))
            .with("description", self.description.clone())
            .with("input_pending", self.input_pending)
            .with("is_esg_project", self.is_esg_project)
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            task_id: cells::text_or_default(row, "task_id"),
            task_name: cells::text_or_default(row, "task_name"),
            status: cells::label(row, "status"),
            assigned_to: cells::text_or_default(row, "assigned_to"),
            due_date: cells::date(row, "due_date"),
            description: cells::text(row, "description"),
            input_pending: cells::flag(row, "input_pending"),
            is_esg_project: cells::flag(row, "is_esg_project"),
        }
    }
}
