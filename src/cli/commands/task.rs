//! `srp task` command - Project and ESG task management

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, parse_date_arg, FilterArgs};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::records::Records;
use crate::entities::task::{Task, TaskStatus};

#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks visible to the current role
    List(ListArgs),

    /// Create a new task
    New(NewArgs),

    /// Show a task's details
    Show(IdArgs),

    /// Update fields on an existing task
    Edit(EditArgs),

    /// Delete a task
    Delete(IdArgs),
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::Args, Debug, Default)]
pub struct TaskFields {
    /// Task name
    #[arg(long)]
    pub name: Option<String>,

    /// Status (not-started, in-progress, completed, on-hold, input-pending)
    #[arg(long)]
    pub status: Option<TaskStatus>,

    /// Role or person responsible
    #[arg(long)]
    pub assign: Option<String>,

    /// Due date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date_arg)]
    pub due: Option<NaiveDate>,

    #[arg(long)]
    pub description: Option<String>,

    /// Waiting on input from another party (true/false)
    #[arg(long)]
    pub input_pending: Option<bool>,

    /// Counts toward ESG tracking (true/false)
    #[arg(long)]
    pub esg: Option<bool>,
}

impl TaskFields {
    fn apply(self, t: &mut Task) {
        if let Some(v) = self.name {
            t.task_name = v;
        }
        if let Some(v) = self.status {
            t.status = v;
        }
        if let Some(v) = self.assign {
            t.assigned_to = v;
        }
        if self.due.is_some() {
            t.due_date = self.due;
        }
        if self.description.is_some() {
            t.description = self.description;
        }
        if let Some(v) = self.input_pending {
            t.input_pending = v;
        }
        if let Some(v) = self.esg {
            t.is_esg_project = v;
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[command(flatten)]
    pub fields: TaskFields,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Task ID (e.g. TASK0001)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Task ID (e.g. TASK0001)
    pub id: String,

    #[command(flatten)]
    pub fields: TaskFields,
}

/// Run a task subcommand
pub fn run(cmd: TaskCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    match cmd {
        TaskCommands::List(args) => helpers::list_records::<Task>(&session, &args.filter, global),
        TaskCommands::New(args) => {
            let mut task = Task::new("", session.role().as_str(), session.today());
            args.fields.apply(&mut task);
            let created = Records::<Task>::new(session.workspace())
                .create(task)
                .map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", created.task_id);
            } else {
                output::success(
                    false,
                    format!(
                        "Task '{}' created as {}",
                        created.task_name,
                        style(&created.task_id).cyan()
                    ),
                );
            }
            Ok(())
        }
        TaskCommands::Show(args) => helpers::show_record::<Task>(&session, &args.id, global),
        TaskCommands::Edit(args) => {
            let records = Records::<Task>::new(session.workspace());
            let mut task = records.get(&args.id).map_err(|e| miette::miette!("{}", e))?;
            args.fields.apply(&mut task);
            records.update(&task).map_err(|e| miette::miette!("{}", e))?;
            output::success(
                global.quiet,
                format!("Updated task {}", style(&task.task_id).cyan()),
            );
            Ok(())
        }
        TaskCommands::Delete(args) => helpers::delete_record::<Task>(&session, &args.id, global),
    }
}
