//! Threaded comments on uploaded files

use std::collections::{HashMap, HashSet};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::core::cells;
use crate::core::entity::{require, Record, ValidationError};
use crate::core::table::{Row, RowRef};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub comment_id: String,
    /// Stored file name the comment belongs to
    pub file_name: String,
    pub parent_comment_id: Option<String>,
    pub author: String,
    pub timestamp: Option<NaiveDateTime>,
    pub comment_text: String,
    pub mentions: Vec<String>,
}

impl Comment {
    pub fn new(
        file_name: impl Into<String>,
        author: impl Into<String>,
        text: impl Into<String>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            comment_id: String::new(),
            file_name: file_name.into(),
            parent_comment_id: None,
            author: author.into(),
            timestamp: Some(now),
            comment_text: text.into(),
            mentions: Vec::new(),
        }
    }

    pub fn reply_to(mut self, parent: impl Into<String>) -> Self {
        self.parent_comment_id = Some(parent.into());
        self
    }

    /// The top-level comment of this comment's thread
    ///
    /// Threads are one level deep, so replying to a reply joins its thread.
    pub fn thread_root(&self) -> &str {
        self.parent_comment_id.as_deref().unwrap_or(&self.comment_id)
    }

    pub fn mentioning(mut self, mentions: Vec<String>) -> Self {
        self.mentions = mentions;
        self
    }
}

impl Record for Comment {
    const KIND: &'static str = "comment";
    const FILE: &'static str = "file_comments.csv";
    const COLUMNS: &'static [&'static str] = &[
        "comment_id",
        "file_name",
        "parent_comment_id",
        "author",
        "timestamp",
        "comment_text",
        "mentions",
    ];
    const ID_COLUMN: &'static str = "comment_id";
    const ID_PREFIX: Option<&'static str> = Some("COMM");

    fn id(&self) -> &str {
        &self.comment_id
    }

    fn assign_id(&mut self, id: String) {
        self.comment_id = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[("Comment", &self.comment_text), ("File", &self.file_name)])
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("comment_id", self.comment_id.as_str())
            .with("file_name", self.file_name.as_str())
            .with("parent_comment_id", self.parent_comment_id.clone())
            .with("author", self.author.as_str())
            .with("timestamp", self.timestamp.map(cells::format_timestamp))
            .with("comment_text", self.comment_text.as_str())
            .with("mentions", cells::encode_list(&self.mentions))
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            comment_id: cells::text_or_default(row, "comment_id"),
            file_name: cells::text_or_default(row, "file_name"),
            parent_comment_id: cells::text(row, "parent_comment_id"),
            author: cells::text_or_default(row, "author"),
            timestamp: cells::timestamp(row, "timestamp"),
            comment_text: cells::text_or_default(row, "comment_text"),
            mentions: cells::list(row, "mentions"),
        }
    }
}

/// A top-level comment with every reply in its thread, oldest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// Group a file's comments into threads in posting order
pub fn threads(all: Vec<Comment>, file_name: &str) -> Vec<Thread> {
    let mut mine: Vec<Comment> = all.into_iter().filter(|c| c.file_name == file_name).collect();
    mine.sort_by_key(|c| c.timestamp);

    let parents: HashMap<&str, &str> = mine
        .iter()
        .filter_map(|c| Some((c.comment_id.as_str(), c.parent_comment_id.as_deref()?)))
        .collect();
    let roots: Vec<String> = mine
        .iter()
        .map(|c| root_of(&c.comment_id, &parents).to_string())
        .collect();

    let mut threads: Vec<Thread> = Vec::new();
    let mut replies: Vec<(String, Comment)> = Vec::new();
    for (comment, root) in mine.into_iter().zip(roots) {
        if comment.parent_comment_id.is_none() {
            threads.push(Thread {
                comment,
                replies: Vec::new(),
            });
        } else {
            replies.push((root, comment));
        }
    }
    for (root, reply) in replies {
        if let Some(thread) = threads.iter_mut().find(|t| t.comment.comment_id == root) {
            thread.replies.push(reply);
        }
    }
    threads
}

/// Follow parent links up to the top-level comment, stopping on a cycle
fn root_of<'a>(id: &'a str, parents: &HashMap<&'a str, &'a str>) -> &'a str {
    let mut current = id;
    let mut seen = HashSet::new();
    while let Some(&parent) = parents.get(current) {
        if !seen.insert(current) {
            break;
        }
        current = parent;
    }
    current
}
