//! `srp mail` command - Role-to-role messages

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::helpers::{self, records_table};
use crate::cli::output;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::session::Session;
use crate::entities::notification::{Mailbox, MessageStatus, Notification};

/// Columns shown in inbox and sent listings
const LISTING: &[&str] = &[
    "notification_id",
    "sender_role",
    "recipient_role",
    "subject",
    "timestamp",
    "status",
];

#[derive(Subcommand, Debug)]
pub enum MailCommands {
    /// Send a message to another role
    Send(SendArgs),

    /// Messages addressed to the current role
    Inbox,

    /// Messages sent by the current role
    Sent,

    /// Open a message and its replies (marks it read)
    View(IdArg),

    /// Reply to a message
    Reply(ReplyArgs),
}

#[derive(clap::Args, Debug)]
pub struct SendArgs {
    /// Recipient role (OEM, Supplier A, Supplier B, Auditor)
    #[arg(long)]
    pub to: String,

    #[arg(long)]
    pub subject: String,

    /// Message body
    #[arg(long, short = 'm')]
    pub message: String,
}

#[derive(clap::Args, Debug)]
pub struct IdArg {
    /// Message ID (e.g. NOTIF0001)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct ReplyArgs {
    /// Message ID to reply to
    pub id: String,

    /// Reply body
    #[arg(long, short = 'm')]
    pub message: String,
}

/// Run a mail subcommand
pub fn run(cmd: MailCommands, global: &GlobalOpts) -> Result<()> {
    let session = helpers::open_session(global)?;
    let mailbox = Mailbox::new(session.workspace(), session.role());

    match cmd {
        MailCommands::Send(args) => {
            if args.to.trim().is_empty() || args.subject.trim().is_empty() || args.message.trim().is_empty() {
                return Err(miette::miette!("please fill in all required fields: to, subject, message"));
            }
            if !crate::core::role::Role::new(&args.to).is_known() {
                output::warning(format!("'{}' is not a known role", args.to.trim()));
            }
            let sent = mailbox
                .send(&args.to, &args.subject, &args.message, session.now())
                .map_err(|e| miette::miette!("{}", e))?;
            if global.quiet {
                println!("{}", sent.notification_id);
            } else {
                output::success(
                    false,
                    format!(
                        "Message {} sent to {}",
                        style(&sent.notification_id).cyan(),
                        sent.recipient_role
                    ),
                );
            }
            Ok(())
        }
        MailCommands::Inbox => {
            let messages = mailbox.inbox().map_err(|e| miette::miette!("{}", e))?;
            print_listing(&messages, global, &session)
        }
        MailCommands::Sent => {
            let messages = mailbox.sent().map_err(|e| miette::miette!("{}", e))?;
            print_listing(&messages, global, &session)
        }
        MailCommands::View(args) => {
            let conversation = mailbox.view(&args.id).map_err(|e| miette::miette!("{}", e))?;
            if output::print_json_if(helpers::resolve_format(global, &session), &conversation)? {
                return Ok(());
            }
            print_message(&conversation.message);
            for reply in &conversation.replies {
                println!();
                print_message(reply);
            }
            Ok(())
        }
        MailCommands::Reply(args) => {
            if args.message.trim().is_empty() {
                return Err(miette::miette!("please fill in all required fields: message"));
            }
            let reply = mailbox
                .reply(&args.id, &args.message, session.now())
                .map_err(|e| miette::miette!("{}", e))?;
            output::success(
                global.quiet,
                format!(
                    "Reply {} sent to {}",
                    style(&reply.notification_id).cyan(),
                    reply.recipient_role
                ),
            );
            Ok(())
        }
    }
}

fn print_listing(messages: &[Notification], global: &GlobalOpts, session: &Session) -> Result<()> {
    let format = helpers::resolve_format(global, session);
    let table = records_table(messages);
    let table = match format {
        OutputFormat::Json | OutputFormat::Csv => table,
        _ => table.reindex(LISTING),
    };
    output::print_table(&table, format, "notification_id", "message", global.quiet)
}

fn print_message(n: &Notification) {
    let when = n
        .timestamp
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let status = match n.status {
        MessageStatus::Sent => style(n.status.as_str()).yellow(),
        MessageStatus::Read => style(n.status.as_str()).dim(),
        MessageStatus::Replied => style(n.status.as_str()).green(),
    };
    println!("{} {}", style(&n.notification_id).cyan(), style(&n.subject).bold());
    println!("From: {}  To: {}  {}  [{}]", n.sender_role, n.recipient_role, when, status);
    println!("{}", n.message);
}
