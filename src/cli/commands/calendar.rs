//! `srp calendar` command - Shared calendar events

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, parse_date_arg, records_table, split_list, FilterArgs};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::records::Records;
use crate::entities::event::{self, Event};

#[derive(Subcommand, Debug)]
pub enum CalendarCommands {
    /// Schedule an event
    Add(AddArgs),

    /// Events the current role attends that have not ended yet
    Upcoming,

    /// All events
    List(ListArgs),

    /// Delete an event
    Delete(IdArg),
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Event title
    pub title: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub start: NaiveDate,

    /// End date (YYYY-MM-DD, defaults to the start date)
    #[arg(long, value_parser = parse_date_arg)]
    pub end: Option<NaiveDate>,

    /// Attending roles (comma-separated)
    #[arg(long, short = 'a', value_delimiter = ',')]
    pub attendees: Vec<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Event ID (e.g. EVENT0001)
    pub id: String,
}

/// Run a calendar subcommand
pub fn run(cmd: CalendarCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    let records = Records::<Event>::new(session.workspace());

    match cmd {
        CalendarCommands::Add(args) => {
            let end = args.end.unwrap_or(args.start);
            let mut ev = Event::new(&args.title, args.start, end, session.role(), session.now());
            ev.attendees = split_list(&args.attendees);
            ev.description = args.description.filter(|d| !d.trim().is_empty());

            let created = records.create(ev).map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", created.event_id);
            } else {
                output::success(
                    false,
                    format!("Scheduled '{}' as {}", created.title, style(&created.event_id).cyan()),
                );
            }
            Ok(())
        }
        CalendarCommands::Upcoming => {
            let all = records.list().map_err(|e| miette::miette!("{}", e))?;
            let upcoming = event::upcoming(all, session.role(), session.today());
            let format = helpers::resolve_format(global, &session);
            if output::print_json_if(format, &upcoming)? {
                return Ok(());
            }
            let table = records_table(&upcoming).reindex(&["event_id", "title", "start_date", "end_date", "attendees"]);
            output::print_table(&table, format, "event_id", "upcoming event", global.quiet)
        }
        CalendarCommands::List(args) => {
            let table = records.table().map_err(|e| miette::miette!("{}", e))?;
            helpers::list_table(table, &args.filter, global, &session, "event_id", "event")
        }
        CalendarCommands::Delete(args) => helpers::delete_record::<Event>(&session, &args.id, global),
    }
}
