//! `srp audit` command - Audit points

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, parse_date_arg, FilterArgs};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::records::Records;
use crate::entities::audit::{AuditPoint, AuditStatus};

#[derive(Subcommand, Debug)]
pub enum AuditCommands {
    /// List audit points visible to the current role
    List(ListArgs),

    /// Raise a new audit point
    New(NewArgs),

    /// Show an audit point
    Show(IdArgs),

    /// Update status, resolution, or other fields
    Edit(EditArgs),

    /// Delete an audit point
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::Args, Debug, Default)]
pub struct AuditFields {
    /// What needs to be checked or fixed
    #[arg(long)]
    pub description: Option<String>,

    /// Status (open, in-progress, requires-supplier-input, completed, closed)
    #[arg(long)]
    pub status: Option<AuditStatus>,

    /// Responsible role
    #[arg(long)]
    pub assign: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub due: Option<NaiveDate>,

    #[arg(long)]
    pub resolution: Option<String>,

    /// Waiting on supplier input (true/false)
    #[arg(long)]
    pub input_pending: Option<bool>,
}

impl AuditFields {
    fn apply(self, a: &mut AuditPoint) {
        if let Some(v) = self.description {
            a.point_description = v;
        }
        if let Some(v) = self.status {
            a.status = v;
        }
        if let Some(v) = self.assign {
            a.assignee = v;
        }
        if self.due.is_some() {
            a.due_date = self.due;
        }
        if self.resolution.is_some() {
            a.resolution = self.resolution;
        }
        if let Some(v) = self.input_pending {
            a.input_pending = v;
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: AuditFields,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Audit point ID (e.g. AUDIT0001)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Audit point ID (e.g. AUDIT0001)
    pub id: String,

    #[command(flatten)]
    pub fields: AuditFields,
}

/// Run an audit subcommand
pub fn run(cmd: AuditCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    match cmd {
        AuditCommands::List(args) => {
            helpers::list_records::<AuditPoint>(&session, &args.filter, global)
        }
        AuditCommands::New(args) => {
            let mut point = AuditPoint::new("", "", session.today());
            args.fields.apply(&mut point);
            let created = Records::<AuditPoint>::new(session.workspace())
                .create(point)
                .map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", created.audit_id);
            } else {
                output::success(
                    false,
                    format!(
                        "Audit point {} raised for {}",
                        style(&created.audit_id).cyan(),
                        created.assignee
                    ),
                );
            }
            Ok(())
        }
        AuditCommands::Show(args) => helpers::show_record::<AuditPoint>(&session, &args.id, global),
        AuditCommands::Edit(args) => {
            let records = Records::<AuditPoint>::new(session.workspace());
            let mut point = records.get(&args.id).map_err(|e| miette::miette!("{}", e))?;
            args.fields.apply(&mut point);
            records.update(&point).map_err(|e| miette::miette!("{}", e))?;
            output::success(
                global.quiet,
                format!("Updated audit point {}", style(&point.audit_id).cyan()),
            );
            Ok(())
        }
        AuditCommands::Delete(args) => helpers::delete_record::<AuditPoint>(&session, &args.id, global),
    }
}
