//! Supplier master data

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::cells;
use crate::core::entity::{label_enum, require, within, Record, ValidationError};
use crate::core::table::{Row, RowRef};

label_enum! {
    /// State of the supply agreement
    AgreementStatus {
        Active => "Active",
        PendingRenewal => "Pending Renewal",
        Expired => "Expired",
        UnderReview => "Under Review",
    }
}

label_enum! {
    RiskLevel {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Supplier {
    pub supplier_id: String,
    pub supplier_name: String,
    pub contact_person: String,
    pub email: String,
    pub phone: Option<String>,
    pub agreement_status: Option<AgreementStatus>,
    pub last_audit_score: Option<f64>,
    pub notes: Option<String>,
    pub primary_product_category: Option<String>,
    /// Percent of deliveries on time
    pub on_time_delivery_rate: Option<f64>,
    /// Percent of parts rejected
    pub quality_reject_rate: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub certification: Option<String>,
    pub annual_spend_usd: Option<i64>,
    pub last_performance_review_date: Option<NaiveDate>,
    pub esg_compliance_score: Option<f64>,
    /// `None` when the emissions outcome was never recorded
    pub emissions_target_met: Option<bool>,
}

impl Supplier {
    /// New supplier with the onboarding form defaults
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        email: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            supplier_id: String::new(),
            supplier_name: name.into(),
            contact_person: contact.into(),
            email: email.into(),
            phone: None,
            agreement_status: Some(AgreementStatus::Active),
            last_audit_score: Some(75.0),
            notes: None,
            primary_product_category: None,
            on_time_delivery_rate: Some(95.0),
            quality_reject_rate: Some(0.5),
            risk_level: Some(RiskLevel::Low),
            certification: None,
            annual_spend_usd: Some(100_000),
            last_performance_review_date: Some(today - chrono::Duration::days(90)),
            esg_compliance_score: Some(70.0),
            emissions_target_met: Some(false),
        }
    }
}

impl Record for Supplier {
    const KIND: &'static str = "supplier";
    const FILE: &'static str = "supplier_dummy_data.csv";
    const COLUMNS: &'static [&'static str] = &[
        "supplier_id",
        "supplier_name",
        "contact_person",
        "email",
        "phone",
        "agreement_status",
        "last_audit_score",
        "notes",
        "primary_product_category",
        "on_time_delivery_rate",
        "quality_reject_rate",
        "risk_level",
        "certification",
        "annual_spend_usd",
        "last_performance_review_date",
        "esg_compliance_score",
        "emissions_target_met",
    ];
    const ID_COLUMN: &'static str = "supplier_id";
    const ID_PREFIX: Option<&'static str> = Some("SUP");

    fn id(&self) -> &str {
        &self.supplier_id
    }

    fn assign_id(&mut self, id: String) {
        self.supplier_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("Supplier Name", &self.supplier_name),
            ("Contact Person", &self.contact_person),
            ("Email", &self.email),
        ])?;
        if !self.email.contains('@') {
            return Err(ValidationError::Invalid {
                field: "email",
                message: format!("'{}' is not an email address", self.email),
            });
        }
        within("last_audit_score", self.last_audit_score, 0.0, 100.0)?;
        within("esg_compliance_score", self.esg_compliance_score, 0.0, 100.0)?;
        within("on_time_delivery_rate", self.on_time_delivery_rate, 0.0, 100.0)?;
        within("quality_reject_rate", self.quality_reject_rate, 0.0, 100.0)?;
        within("annual_spend_usd", self.annual_spend_usd.map(|v| v as f64), 0.0, f64::MAX)?;
        Ok(())
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("supplier_id", self.supplier_id.as_str())
            .with("supplier_name", self.supplier_name.as_str())
            .with("contact_person", self.contact_person.as_str())
            .with("email", self.email.as_str())
            .with("phone", self.phone.clone())
            .with("agreement_status", self.agreement_status.map(|s| s.as_str()))
            .with("last_audit_score", cells::number(self.last_audit_score))
            .with("notes", self.notes.clone())
            .with("primary_product_category", self.primary_product_category.clone())
            .with("on_time_delivery_rate", self.on_time_delivery_rate)
            .with("quality_reject_rate", self.quality_reject_rate)
            .with("risk_level", self.risk_level.map(|r| r.as_str()))
            .with("certification", self.certification.clone())
            .with("annual_spend_usd", self.annual_spend_usd)
            .with(
                "last_performance_review_date",
                self.last_performance_review_date.map(cells::format_date),
            )
            .with("esg_compliance_score", cells::number(self.esg_compliance_score))
            .with("emissions_target_met", self.emissions_target_met)
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            supplier_id: cells::text_or_default(row, "supplier_id"),
            supplier_name: cells::text_or_default(row, "supplier_name"),
            contact_person: cells::text_or_default(row, "contact_person"),
            email: cells::text_or_default(row, "email"),
            phone: cells::text(row, "phone"),
            agreement_status: cells::known_label(row, "agreement_status"),
            last_audit_score: cells::float(row, "last_audit_score"),
            notes: cells::text(row, "notes"),
            primary_product_category: cells::text(row, "primary_product_category"),
            on_time_delivery_rate: cells::float(row, "on_time_delivery_rate"),
            quality_reject_rate: cells::float(row, "quality_reject_rate"),
            risk_level: cells::known_label(row, "risk_level"),
            certification: cells::text(row, "certification"),
            annual_spend_usd: cells::integer(row, "annual_spend_usd"),
            last_performance_review_date: cells::date(row, "last_performance_review_date"),
            esg_compliance_score: cells::float(row, "esg_compliance_score"),
            emissions_target_met: cells::known_flag(row, "emissions_target_met"),
        }
    }
}
