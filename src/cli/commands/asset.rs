//! `srp asset` command - Asset management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, parse_date_arg, FilterArgs};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::records::Records;
use crate::entities::asset::{Asset, AssetStatus};

#[derive(Subcommand, Debug)]
pub enum AssetCommands {
    /// List assets visible to the current role
    List(ListArgs),

    /// Register a new asset
    New(NewArgs),

    /// Show an asset's details
    Show(IdArgs),

    /// Update fields on an existing asset
    Edit(EditArgs),

    /// Delete an asset
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::Args, Debug, Default)]
pub struct AssetFields {
    /// Asset name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    /// Status (operational, under-maintenance, retired, idle)
    #[arg(long)]
    pub status: Option<AssetStatus>,

    /// End-of-life date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub eol: Option<NaiveDate>,

    /// Last calibration date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub calibration: Option<NaiveDate>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Owning supplier
    #[arg(long)]
    pub supplier: Option<String>,

    /// Date the asset was last active (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub last_active: Option<NaiveDate>,
}

impl AssetFields {
    fn apply(self, a: &mut Asset) {
        if let Some(v) = self.name {
            a.asset_name = v;
        }
        if let Some(v) = self.location {
            a.location = v;
        }
        if let Some(v) = self.status {
            a.status = v;
        }
        if self.eol.is_some() {
            a.eol_date = self.eol;
        }
        if self.calibration.is_some() {
            a.calibration_date = self.calibration;
        }
        if self.notes.is_some() {
            a.notes = self.notes;
        }
        if self.supplier.is_some() {
            a.supplier = self.supplier;
        }
        if self.last_active.is_some() {
            a.last_active_date = self.last_active;
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: AssetFields,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Asset ID (e.g. AST0001)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Asset ID (e.g. AST0001)
    pub id: String,

    #[command(flatten)]
    pub fields: AssetFields,
}

/// Run an asset subcommand
pub fn run(cmd: AssetCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    match cmd {
        AssetCommands::List(args) => helpers::list_records::<Asset>(&session, &args.filter, global),
        AssetCommands::New(args) => {
            let mut asset = Asset::new("", "", session.today());
            // supplier roles own what they register
            if !session.role().sees_everything() {
                asset.supplier = Some(session.role().to_string());
            }
            args.fields.apply(&mut asset);
            let created = Records::<Asset>::new(session.workspace())
                .create(asset)
                .map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", created.asset_id);
            } else {
                output::success(
                    false,
                    format!(
                        "Asset '{}' registered as {}",
                        created.asset_name,
                        style(&created.asset_id).cyan()
                    ),
                );
            }
            Ok(())
        }
        AssetCommands::Show(args) => helpers::show_record::<Asset>(&session, &args.id, global),
        AssetCommands::Edit(args) => {
            let records = Records::<Asset>::new(session.workspace());
            let mut asset = records.get(&args.id).map_err(|e| miette::miette!("{}", e))?;
            args.fields.apply(&mut asset);
            records.update(&asset).map_err(|e| miette::miette!("{}", e))?;
            output::success(
                global.quiet,
                format!("Updated asset {}", style(&asset.asset_id).cyan()),
            );
            Ok(())
        }
        AssetCommands::Delete(args) => helpers::delete_record::<Asset>(&session, &args.id, global),
    }
}
