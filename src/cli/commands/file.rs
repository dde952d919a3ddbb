//! `srp file` command - Shared files and threaded comments

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, split_list, FilterArgs};
use crate::cli::output;
use crate::cli::GlobalOpts;
use crate::core::records::Records;
use crate::entities::comment::{self, Comment};
use crate::entities::file::{original_name, Download, FileStore, UploadedFile};

#[derive(Subcommand, Debug)]
pub enum FileCommands {
    /// Upload a local file
    Upload(UploadArgs),

    /// List uploaded files visible to the current role
    List(ListArgs),

    /// Copy a stored file to a local path
    Download(DownloadArgs),

    /// Delete a stored file and its comments
    Delete(FileArg),

    /// Comment on a file, or reply to a comment
    Comment(CommentArgs),

    /// Show the comment thread for a file
    Comments(FileArg),
}

#[derive(clap::Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(clap::Args, Debug)]
pub struct DownloadArgs {
    /// Stored file name (as shown by `srp file list`)
    pub filename: String,

    /// Destination file or directory
    #[arg(default_value = ".")]
    pub dest: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct FileArg {
    /// Stored file name (as shown by `srp file list`)
    pub filename: String,
}

#[derive(clap::Args, Debug)]
pub struct CommentArgs {
    /// Stored file name
    pub filename: String,

    /// Comment text
    #[arg(long, short = 'm')]
    pub message: String,

    /// Reply to this comment ID
    #[arg(long)]
    pub reply_to: Option<String>,

    /// Roles to mention (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub mention: Vec<String>,
}

/// Run a file subcommand
pub fn run(cmd: FileCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    let store = FileStore::new(session.workspace());

    match cmd {
        FileCommands::Upload(args) => {
            if !args.path.is_file() {
                return Err(miette::miette!("'{}' is not a file", args.path.display()));
            }
            let file = store
                .upload(&args.path, session.role(), session.now())
                .map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", file.filename);
            } else {
                output::success(
                    false,
                    format!(
                        "Uploaded {} ({} bytes) as {}",
                        original_name(&file.filename),
                        file.size,
                        style(&file.filename).cyan()
                    ),
                );
            }
            Ok(())
        }
        FileCommands::List(args) => {
            helpers::list_records::<UploadedFile>(&session, &args.filter, global)
        }
        FileCommands::Download(args) => {
            match store
                .download(&args.filename, &args.dest)
                .map_err(|e| miette::miette!("{}", e))?
            {
                Download::Copied { to, bytes } => output::success(
                    global.quiet,
                    format!("Saved {} ({} bytes)", style(to.display()).cyan(), bytes),
                ),
                Download::MissingBlob { expected } => output::warning(format!(
                    "{} is listed but its stored copy is missing ({})",
                    args.filename,
                    expected.display()
                )),
            }
            Ok(())
        }
        FileCommands::Delete(args) => {
            let removal = store
                .delete(&args.filename)
                .map_err(|e| miette::miette!("{}", e))?;
            if removal.blob_was_missing {
                output::warning(format!(
                    "stored copy of {} was already missing",
                    removal.file.filename
                ));
            }
            output::success(
                global.quiet,
                format!(
                    "Deleted {} and {} comment(s)",
                    style(&removal.file.filename).cyan(),
                    removal.comments_removed
                ),
            );
            Ok(())
        }
        FileCommands::Comment(args) => {
            // comments hang off a known file
            store
                .records()
                .get(&args.filename)
                .map_err(|e| miette::miette!("{}", e))?;

            let comments = Records::<Comment>::new(session.workspace());
            let mut comment = Comment::new(
                &args.filename,
                session.role().as_str(),
                &args.message,
                session.now(),
            )
            .mentioning(split_list(&args.mention));
            if let Some(parent) = args.reply_to {
                let parent = comments.get(&parent).map_err(|e| miette::miette!("{}", e))?;
                if parent.file_name != args.filename {
                    return Err(miette::miette!(
                        "comment {} belongs to {}, not {}",
                        parent.comment_id,
                        parent.file_name,
                        args.filename
                    ));
                }
                comment = comment.reply_to(parent.thread_root());
            }

            let created = comments.create(comment).map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", created.comment_id);
            } else {
                output::success(false, format!("Posted comment {}", style(&created.comment_id).cyan()));
            }
            Ok(())
        }
        FileCommands::Comments(args) => {
            let all = Records::<Comment>::new(session.workspace())
                .list()
                .map_err(|e| miette::miette!("{}", e))?;
            let threads = comment::threads(all, &args.filename);
            if output::print_json_if(helpers::resolve_format(global, &session), &threads)? {
                return Ok(());
            }

            if threads.is_empty() {
                println!("No comments on {}.", args.filename);
                return Ok(());
            }
            for thread in &threads {
                print_comment(&thread.comment, 0);
                for reply in &thread.replies {
                    print_comment(reply, 1);
                }
            }
            Ok(())
        }
    }
}

fn print_comment(c: &Comment, depth: usize) {
    let indent = "    ".repeat(depth);
    let when = c
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "{}{} {} {}",
        indent,
        style(&c.comment_id).cyan(),
        style(&c.author).bold(),
        style(when).dim()
    );
    println!("{}  {}", indent, c.comment_text);
    if !c.mentions.is_empty() {
        println!("{}  mentions: {}", indent, c.mentions.join(", "));
    }
}
