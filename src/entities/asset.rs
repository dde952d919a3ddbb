//! Physical assets tracked per supplier

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::cells;
use crate::core::entity::{label_enum, require, Record, ValidationError};
use crate::core::table::{Row, RowRef};

label_enum! {
    #[derive(Default)]
    AssetStatus {
        #[default]
        Operational => "Operational",
        UnderMaintenance => "Under Maintenance",
        Retired => "Retired",
        Idle => "Idle",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    pub asset_id: String,
    pub asset_name: String,
    pub location: String,
    pub status: AssetStatus,
    /// End of life
    pub eol_date: Option<NaiveDate>,
    pub calibration_date: Option<NaiveDate>,
    pub notes: Option<String>,
    /// Owning supplier role; scopes supplier views
    pub supplier: Option<String>,
    pub last_active_date: Option<NaiveDate>,
}

impl Asset {
    pub fn new(name: impl Into<String>, location: impl Into<String>, today: NaiveDate) -> Self {
        Self {
            asset_id: String::new(),
            asset_name: name.into(),
            location: location.into(),
            status: AssetStatus::Operational,
            eol_date: Some(today + chrono::Duration::days(365 * 5)),
            calibration_date: Some(today),
            notes: None,
            supplier: None,
            last_active_date: Some(today),
        }
    }
}

impl Record for Asset {
    const KIND: &'static str = "asset";
    const FILE: &'static str = "assets.csv";
    const COLUMNS: &'static [&'static str] = &[
        "asset_id",
        "asset_name",
        "location",
        "status",
        "eol_date",
        "calibration_date",
        "notes",
        "supplier",
        "last_active_date",
    ];
    const ID_COLUMN: &'static str = "asset_id";
    const ID_PREFIX: Option<&'static str> = Some("AST");
    const OWNER_COLUMN: Option<&'static str> = Some("supplier");

    fn id(&self) -> &str {
        &self.asset_id
    }

    fn assign_id(&mut self, id: String) {
        self.asset_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[("Asset Name", &self.asset_name), ("Location", &self.location)])
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("asset_id", self.asset_id.as_str())
            .with("asset_name", self.asset_name.as_str())
            .with("location", self.location.as_str())
            .with("status", self.status.as_str())
            .with("eol_date", self.eol_date.map(cells::format_date))
            .with("calibration_date", self.calibration_date.map(cells::format_date))
            .with("notes", self.notes.clone())
            .with("supplier", self.supplier.clone())
            .with("last_active_date", self.last_active_date.map(cells::format_date))
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            asset_id: cells::text_or_default(row, "asset_id"),
            asset_name: cells::text_or_default(row, "asset_name"),
            location: cells::text_or_default(row, "location"),
            status: cells::label(row, "status"),
            eol_date: cells::date(row, "eol_date"),
            calibration_date: cells::date(row, "calibration_date"),
            notes: cells::text(row, "notes"),
            supplier: cells::text(row, "supplier"),
            last_active_date: cells::date(row, "last_active_date"),
        }
    }
}
