//! Role-to-role messages and the mailbox rules over them

use chrono::NaiveDateTime;
use serde::Serialize;
use thiserror::Error;

use crate::core::cells;
use crate::core::entity::{label_enum, require, Record, ValidationError};
use crate::core::records::{RecordError, Records};
use crate::core::role::{Role, KNOWN_ROLES};
use crate::core::table::{Row, RowRef};
use crate::core::workspace::Workspace;

label_enum! {
    #[derive(Default)]
    MessageStatus {
        #[default]
        Sent => "Sent",
        Read => "Read",
        Replied => "Replied",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub notification_id: String,
    pub sender_role: String,
    pub recipient_role: String,
    pub subject: String,
    pub message: String,
    pub timestamp: Option<NaiveDateTime>,
    pub status: MessageStatus,
    pub parent_notification_id: Option<String>,
}

impl Notification {
    pub fn new(
        sender: &Role,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            notification_id: String::new(),
            sender_role: sender.as_str().to_string(),
            recipient_role: recipient.into(),
            subject: subject.into(),
            message: message.into(),
            timestamp: Some(now),
            status: MessageStatus::Sent,
            parent_notification_id: None,
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_notification_id.is_none()
    }

    /// Whether this message shows up in `role`'s inbox
    ///
    /// OEM and Auditor also see traffic addressed to any known role that
    /// they did not send themselves.
    pub fn in_inbox_of(&self, role: &Role) -> bool {
        if self.recipient_role == role.as_str() {
            return true;
        }
        role.sees_everything()
            && KNOWN_ROLES.contains(&self.recipient_role.as_str())
            && self.sender_role != role.as_str()
    }
}

impl Record for Notification {
    const KIND: &'static str = "message";
    const FILE: &'static str = "notifications.csv";
    const COLUMNS: &'static [&'static str] = &[
        "notification_id",
        "sender_role",
        "recipient_role",
        "subject",
        "message",
        "timestamp",
        "status",
        "parent_notification_id",
    ];
    const ID_COLUMN: &'static str = "notification_id";
    const ID_PREFIX: Option<&'static str> = Some("NOTIF");

    fn id(&self) -> &str {
        &self.notification_id
    }

    fn assign_id(&mut self, id: String) {
        self.notification_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[
            ("Recipient", &self.recipient_role),
            ("Subject", &self.subject),
            ("Message", &self.message),
        ])
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("notification_id", self.notification_id.as_str())
            .with("sender_role", self.sender_role.as_str())
            .with("recipient_role", self.recipient_role.as_str())
            .with("subject", self.subject.as_str())
            .with("message", self.message.as_str())
            .with("timestamp", self.timestamp.map(cells::format_timestamp))
            .with("status", self.status.as_str())
            .with("parent_notification_id", self.parent_notification_id.clone())
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            notification_id: cells::text_or_default(row, "notification_id"),
            sender_role: cells::text_or_default(row, "sender_role"),
            recipient_role: cells::text_or_default(row, "recipient_role"),
            subject: cells::text_or_default(row, "subject"),
            message: cells::text_or_default(row, "message"),
            timestamp: cells::timestamp(row, "timestamp"),
            status: cells::label(row, "status"),
            parent_notification_id: cells::text(row, "parent_notification_id"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("only the sender or recipient of '{id}' can reply to it")]
    NotParticipant { id: String },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// A message with the replies posted under it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversation {
    pub message: Notification,
    pub replies: Vec<Notification>,
}

/// Mailbox operations for one role
pub struct Mailbox<'a> {
    records: Records<'a, Notification>,
    role: &'a Role,
}

impl<'a> Mailbox<'a> {
    pub fn new(workspace: &'a Workspace, role: &'a Role) -> Self {
        Self {
            records: Records::new(workspace),
            role,
        }
    }

    pub fn send(
        &self,
        recipient: &str,
        subject: &str,
        message: &str,
        now: NaiveDateTime,
    ) -> Result<Notification, MailError> {
        let note = Notification::new(self.role, recipient.trim(), subject.trim(), message, now);
        Ok(self.records.create(note)?)
    }

    /// Top-level messages for this role, newest first
    pub fn inbox(&self) -> Result<Vec<Notification>, MailError> {
        let role = self.role;
        self.top_level(|n| n.in_inbox_of(role))
    }

    /// Top-level messages sent by this role, newest first
    pub fn sent(&self) -> Result<Vec<Notification>, MailError> {
        let role = self.role;
        self.top_level(|n| n.sender_role == role.as_str())
    }

    fn top_level<F>(&self, keep: F) -> Result<Vec<Notification>, MailError>
    where
        F: Fn(&Notification) -> bool,
    {
        let mut messages: Vec<Notification> = self
            .records
            .list()?
            .into_iter()
            .filter(|n| n.is_top_level() && keep(n))
            .collect();
        messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(messages)
    }

    /// Open a message with its replies; marks it read when addressed to this role
    pub fn view(&self, id: &str) -> Result<Conversation, MailError> {
        let mut message = self.records.get(id)?;
        if message.recipient_role == self.role.as_str() && message.status == MessageStatus::Sent {
            message.status = MessageStatus::Read;
            self.records.update(&message)?;
        }

        let mut replies: Vec<Notification> = self
            .records
            .list()?
            .into_iter()
            .filter(|n| n.parent_notification_id.as_deref() == Some(id))
            .collect();
        replies.sort_by_key(|n| n.timestamp);

        Ok(Conversation { message, replies })
    }

    /// Reply to a message; the reply goes to whichever party this role is not
    pub fn reply(&self, id: &str, body: &str, now: NaiveDateTime) -> Result<Notification, MailError> {
        let mut original = self.records.get(id)?;
        let me = self.role.as_str();

        let recipient = if original.recipient_role == me {
            original.sender_role.clone()
        } else if original.sender_role == me {
            original.recipient_role.clone()
        } else {
            return Err(MailError::NotParticipant { id: id.to_string() });
        };

        let mut reply = Notification::new(
            self.role,
            recipient,
            format!("Re: {}", original.subject),
            body,
            now,
        );
        reply.parent_notification_id = Some(original.notification_id.clone());
        let reply = self.records.create(reply)?;

        if original.recipient_role == me {
            original.status = MessageStatus::Replied;
            self.records.update(&original)?;
        }
        Ok(reply)
    }
}
