//! `srp init` command - Create a workspace and its tables

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::cli::GlobalOpts;
use crate::core::workspace::{Workspace, CONFIG_FILE, SUPPLIER_RECORDS_DIR, UPLOADS_DIR};
use crate::core::Record;
use crate::entities::{self, Asset, AuditPoint, Comment, Event, Notification, Supplier, Task, UploadedFile};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let root = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    let (workspace, existed) = match &global.data_dir {
        Some(dir) => Workspace::init_data_dir(dir),
        None => Workspace::init(&root),
    }
    .map_err(|e| miette::miette!("{}", e))?;

    // creates missing tables only; existing rows are never touched
    entities::initialize_all(&workspace).map_err(|e| miette::miette!("{}", e))?;

    if global.quiet {
        return Ok(());
    }

    if existed {
        println!(
            "{} Workspace already exists at {}; missing tables were created",
            style("!").yellow(),
            style(workspace.data_dir().display()).cyan()
        );
        return Ok(());
    }

    println!(
        "{} Initialized workspace at {}",
        style("✓").green(),
        style(workspace.data_dir().display()).cyan()
    );
    println!();
    println!("Created:");
    print_structure(workspace.data_dir());
    println!();
    println!("Next steps:");
    println!(
        "  {} Onboard a supplier",
        style("srp supplier new --name ... --contact ... --email ...").yellow()
    );
    println!("  {} See the overview", style("srp dashboard").yellow());
    Ok(())
}

fn print_structure(data_dir: &Path) {
    let dirs = [UPLOADS_DIR, SUPPLIER_RECORDS_DIR];
    let files = [
        CONFIG_FILE,
        Supplier::FILE,
        Asset::FILE,
        Task::FILE,
        AuditPoint::FILE,
        UploadedFile::FILE,
        Comment::FILE,
        Notification::FILE,
        Event::FILE,
    ];

    for dir in dirs {
        if data_dir.join(dir).is_dir() {
            println!("  {} {}/", style("dir ").dim(), dir);
        }
    }
    for file in files {
        if data_dir.join(file).is_file() {
            println!("  {} {}", style("file").dim(), file);
        }
    }
}
