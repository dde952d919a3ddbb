//! `srp supplier` command - Supplier records

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, parse_date_arg, FilterArgs};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::dashboard::recognition_subject;
use crate::core::records::Records;
use crate::entities::notification::Mailbox;
use crate::entities::supplier::{AgreementStatus, RiskLevel, Supplier};

#[derive(Subcommand, Debug)]
pub enum SupplierCommands {
    /// List suppliers with search and filtering
    List(ListArgs),

    /// Onboard a new supplier
    New(NewArgs),

    /// Show a supplier's details
    Show(ShowArgs),

    /// Update fields on an existing supplier
    Edit(EditArgs),

    /// Delete a supplier
    Delete(ShowArgs),

    /// Send a recognition message to a supplier
    Recognize(RecognizeArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Supplier fields settable from the command line
#[derive(clap::Args, Debug, Default)]
pub struct SupplierFields {
    /// Supplier name
    #[arg(long)]
    pub name: Option<String>,

    /// Contact person
    #[arg(long)]
    pub contact: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// Agreement status (active, pending-renewal, expired, under-review)
    #[arg(long)]
    pub agreement: Option<AgreementStatus>,

    /// Last audit score (0-100)
    #[arg(long)]
    pub audit_score: Option<f64>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Primary product category
    #[arg(long)]
    pub category: Option<String>,

    /// On-time delivery rate in percent
    #[arg(long)]
    pub on_time: Option<f64>,

    /// Quality reject rate in percent
    #[arg(long)]
    pub reject_rate: Option<f64>,

    /// Risk level (low, medium, high)
    #[arg(long)]
    pub risk: Option<RiskLevel>,

    #[arg(long)]
    pub certification: Option<String>,

    /// Annual spend in USD
    #[arg(long)]
    pub spend: Option<i64>,

    /// Last performance review date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub review_date: Option<NaiveDate>,

    /// ESG compliance score (0-100)
    #[arg(long)]
    pub esg_score: Option<f64>,

    /// Whether the emissions target was met (true/false)
    #[arg(long)]
    pub emissions_met: Option<bool>,
}

impl SupplierFields {
    fn apply(self, s: &mut Supplier) {
        if let Some(v) = self.name {
            s.supplier_name = v;
        }
        if let Some(v) = self.contact {
            s.contact_person = v;
        }
        if let Some(v) = self.email {
            s.email = v;
        }
        if self.phone.is_some() {
            s.phone = self.phone;
        }
        if self.agreement.is_some() {
            s.agreement_status = self.agreement;
        }
        if self.audit_score.is_some() {
            s.last_audit_score = self.audit_score;
        }
        if self.notes.is_some() {
            s.notes = self.notes;
        }
        if self.category.is_some() {
            s.primary_product_category = self.category;
        }
        if self.on_time.is_some() {
            s.on_time_delivery_rate = self.on_time;
        }
        if self.reject_rate.is_some() {
            s.quality_reject_rate = self.reject_rate;
        }
        if self.risk.is_some() {
            s.risk_level = self.risk;
        }
        if self.certification.is_some() {
            s.certification = self.certification;
        }
        if self.spend.is_some() {
            s.annual_spend_usd = self.spend;
        }
        if self.review_date.is_some() {
            s.last_performance_review_date = self.review_date;
        }
        if self.esg_score.is_some() {
            s.esg_compliance_score = self.esg_score;
        }
        if self.emissions_met.is_some() {
            s.emissions_target_met = self.emissions_met;
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: SupplierFields,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Supplier ID (e.g. SUP0001)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Supplier ID (e.g. SUP0001)
    pub id: String,

    #[command(flatten)]
    pub fields: SupplierFields,
}

#[derive(clap::Args, Debug)]
pub struct RecognizeArgs {
    /// Supplier ID (e.g. SUP0001)
    pub id: String,

    /// Recognition message
    #[arg(long, short = 'm')]
    pub message: String,
}

/// Run a supplier subcommand
pub fn run(cmd: SupplierCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    match cmd {
        SupplierCommands::List(args) => {
            helpers::list_records::<Supplier>(&session, &args.filter, global)
        }
        SupplierCommands::New(args) => {
            let mut supplier = Supplier::new("", "", "", session.today());
            args.fields.apply(&mut supplier);
            let created = Records::<Supplier>::new(session.workspace())
                .create(supplier)
                .map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", created.supplier_id);
            } else {
                output::success(
                    false,
                    format!(
                        "Supplier '{}' onboarded as {}",
                        created.supplier_name,
                        style(&created.supplier_id).cyan()
                    ),
                );
            }
            Ok(())
        }
        SupplierCommands::Show(args) => helpers::show_record::<Supplier>(&session, &args.id, global),
        SupplierCommands::Edit(args) => {
            let records = Records::<Supplier>::new(session.workspace());
            let mut supplier = records.get(&args.id).map_err(|e| miette::miette!("{}", e))?;
            args.fields.apply(&mut supplier);
            records.update(&supplier).map_err(|e| miette::miette!("{}", e))?;
            output::success(
                global.quiet,
                format!("Updated supplier {}", style(&supplier.supplier_id).cyan()),
            );
            Ok(())
        }
        SupplierCommands::Delete(args) => helpers::delete_record::<Supplier>(&session, &args.id, global),
        SupplierCommands::Recognize(args) => {
            let supplier = Records::<Supplier>::new(session.workspace())
                .get(&args.id)
                .map_err(|e| miette::miette!("{}", e))?;
            let sent = Mailbox::new(session.workspace(), session.role())
                .send(
                    &supplier.supplier_name,
                    &recognition_subject(&supplier.supplier_name),
                    &args.message,
                    session.now(),
                )
                .map_err(|e| miette::miette!("{}", e))?;
            output::success(
                global.quiet,
                format!(
                    "Recognition message {} sent to {}",
                    style(&sent.notification_id).cyan(),
                    supplier.supplier_name
                ),
            );
            Ok(())
        }
    }
}
