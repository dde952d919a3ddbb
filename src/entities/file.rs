//! Uploaded file metadata and blob storage

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::core::cells;
use crate::core::entity::{require, Record, ValidationError};
use crate::core::records::{RecordError, Records};
use crate::core::role::Role;
use crate::core::store::StoreError;
use crate::core::workspace::Workspace;
use crate::core::table::{Row, RowRef};
use crate::entities::comment::Comment;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadedFile {
    /// Stored name, `<YYYYmmddHHMMSS>_<original>`
    pub filename: String,
    /// MIME type guessed from the extension
    pub file_type: String,
    pub size: u64,
    pub uploader: String,
    pub timestamp: Option<NaiveDateTime>,
    pub path: String,
}

impl Record for UploadedFile {
    const KIND: &'static str = "file";
    const FILE: &'static str = "uploaded_files.csv";
    const COLUMNS: &'static [&'static str] =
        &["filename", "type", "size", "uploader", "timestamp", "path"];
    const ID_COLUMN: &'static str = "filename";
    const ID_PREFIX: Option<&'static str> = None;
    const OWNER_COLUMN: Option<&'static str> = Some("uploader");

    fn id(&self) -> &str {
        &self.filename
    }

    fn assign_id(&mut self, id: String) {
        self.filename = id;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(&[("File Name", &self.filename), ("Uploader", &self.uploader)])
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("filename", self.filename.as_str())
            .with("type", self.file_type.as_str())
            .with("size", self.size)
            .with("uploader", self.uploader.as_str())
            .with("timestamp", self.timestamp.map(cells::format_timestamp))
            .with("path", self.path.as_str())
    }

    fn from_row(row: &RowRef<'_>) -> Self {
        Self {
            filename: cells::text_or_default(row, "filename"),
            file_type: cells::text_or_default(row, "type"),
            size: cells::integer(row, "size").unwrap_or(0).max(0) as u64,
            uploader: cells::text_or_default(row, "uploader"),
            timestamp: cells::timestamp(row, "timestamp"),
            path: cells::text_or_default(row, "path"),
        }
    }
}

/// Outcome of copying a stored blob out of the workspace
#[derive(Debug, PartialEq)]
pub enum Download {
    Copied { to: PathBuf, bytes: u64 },
    /// Metadata exists but the blob is gone; the row is left alone
    MissingBlob { expected: PathBuf },
}

/// Outcome of deleting a file and everything hanging off it
#[derive(Debug, PartialEq)]
pub struct Removal {
    pub file: UploadedFile,
    pub blob_was_missing: bool,
    pub comments_removed: usize,
}

/// Upload, download, and delete operations over the file table and blob dir
pub struct FileStore<'a> {
    workspace: &'a Workspace,
    records: Records<'a, UploadedFile>,
}

impl<'a> FileStore<'a> {
    pub fn new(workspace: &'a Workspace) -> Self {
        Self {
            workspace,
            records: Records::new(workspace),
        }
    }

    pub fn records(&self) -> &Records<'a, UploadedFile> {
        &self.records
    }

    /// Copy `source` into the upload directory and record its metadata
    pub fn upload(&self, source: &Path, uploader: &Role, now: NaiveDateTime) -> Result<UploadedFile, RecordError> {
        let original = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stored_name = format!("{}_{}", now.format("%Y%m%d%H%M%S"), original);

        let dir = self.workspace.uploads_dir();
        let target = dir.join(&stored_name);

        let record = UploadedFile {
            filename: stored_name,
            file_type: guess_mime(&original).to_string(),
            size: std::fs::metadata(source)
                .map_err(|e| StoreError::read(source, e))?
                .len(),
            uploader: uploader.as_str().to_string(),
            timestamp: Some(now),
            path: target.to_string_lossy().into_owned(),
        };
        record.validate()?;
        if self.records.table()?.position(UploadedFile::ID_COLUMN, &record.filename).is_some() {
            return Err(RecordError::Duplicate {
                kind: UploadedFile::KIND,
                id: record.filename,
            });
        }

        std::fs::create_dir_all(&dir).map_err(|e| StoreError::write(&dir, e))?;
        std::fs::copy(source, &target).map_err(|e| StoreError::write(&target, e))?;
        debug!(from = %source.display(), to = %target.display(), "stored upload");

        self.records.create(record).inspect_err(|_| {
            // no metadata row, so the blob must not stay behind
            if let Err(e) = std::fs::remove_file(&target) {
                warn!(path = %target.display(), error = %e, "could not remove orphaned upload");
            }
        })
    }

    /// Copy a stored blob to `destination` (a file path or an existing directory)
    pub fn download(&self, filename: &str, destination: &Path) -> Result<Download, RecordError> {
        let file = self.records.get(filename)?;
        let blob = self.blob_path(&file);
        if !blob.is_file() {
            warn!(file = filename, path = %blob.display(), "stored blob is missing");
            return Ok(Download::MissingBlob { expected: blob });
        }

        let to = if destination.is_dir() {
            destination.join(original_name(&file.filename))
        } else {
            destination.to_path_buf()
        };
        let bytes = std::fs::copy(&blob, &to).map_err(|e| StoreError::write(&to, e))?;
        Ok(Download::Copied { to, bytes })
    }

    /// Delete the blob, its metadata row, and every comment on it
    pub fn delete(&self, filename: &str) -> Result<Removal, RecordError> {
        let file = self.records.get(filename)?;
        let blob = self.blob_path(&file);

        let blob_was_missing = match std::fs::remove_file(&blob) {
            Ok(()) => false,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(file = filename, path = %blob.display(), "blob already missing");
                true
            }
            Err(e) => return Err(StoreError::write(&blob, e).into()),
        };

        let file = self.records.delete(filename)?;
        let comments_removed = Records::<Comment>::new(self.workspace).delete_where("file_name", filename)?;

        Ok(Removal {
            file,
            blob_was_missing,
            comments_removed,
        })
    }

    /// Recorded path, or the conventional location when the row has none
    fn blob_path(&self, file: &UploadedFile) -> PathBuf {
        if file.path.is_empty() {
            self.workspace.uploads_dir().join(&file.filename)
        } else {
            PathBuf::from(&file.path)
        }
    }
}

/// Name without the upload timestamp prefix
pub fn original_name(stored: &str) -> &str {
    match stored.split_once('_') {
        Some((stamp, rest)) if stamp.len() == 14 && stamp.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => stored,
    }
}

/// MIME type from a file extension
pub fn guess_mime(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "csv" => "text/csv",
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "json" => "application/json",
        "xml" => "application/xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::initialize_all;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 3)
            .unwrap()
            .and_hms_opt(4, 5, 6)
            .unwrap()
    }

    fn setup() -> (tempfile::TempDir, Workspace) {
        let tmp = tempdir().unwrap();
        let (ws, _) = Workspace::init(tmp.path()).unwrap();
        initialize_all(&ws).unwrap();
        (tmp, ws)
    }

    #[test]
    fn test_upload_copies_blob_and_records_metadata() {
        let (tmp, ws) = setup();
        let source = tmp.path().join("data sheet.pdf");
        std::fs::write(&source, b"%PDF-1.4").unwrap();

        let files = FileStore::new(&ws);
        let stored = files.upload(&source, &Role::new("Supplier A"), now()).unwrap();

        assert_eq!(stored.filename, "20240203040506_data sheet.pdf");
        assert_eq!(stored.file_type, "application/pdf");
        assert_eq!(stored.size, 8);
        assert!(ws.uploads_dir().join(&stored.filename).is_file());
        assert_eq!(files.records().get(&stored.filename).unwrap(), stored);
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_metadata_write_removes_blob() {
        let (tmp, ws) = setup();
        let source = tmp.path().join("report.csv");
        std::fs::write(&source, "a,b\n").unwrap();

        // the table file points into a directory that does not exist
        let table = ws.table_path(UploadedFile::FILE);
        std::fs::remove_file(&table).unwrap();
        std::os::unix::fs::symlink(tmp.path().join("nowhere/files.csv"), &table).unwrap();

        let files = FileStore::new(&ws);
        assert!(files.upload(&source, &Role::default(), now()).is_err());
        let left: Vec<_> = std::fs::read_dir(ws.uploads_dir()).unwrap().collect();
        assert!(left.is_empty());
    }

    #[test]
    fn test_download_missing_blob_leaves_row() {
        let (tmp, ws) = setup();
        let source = tmp.path().join("report.csv");
        std::fs::write(&source, "a,b\n").unwrap();
        let files = FileStore::new(&ws);
        let stored = files.upload(&source, &Role::default(), now()).unwrap();

        std::fs::remove_file(ws.uploads_dir().join(&stored.filename)).unwrap();
        let outcome = files.download(&stored.filename, tmp.path()).unwrap();
        assert!(matches!(outcome, Download::MissingBlob { .. }));
        assert!(files.records().get(&stored.filename).is_ok());
    }

    #[test]
    fn test_download_to_directory_uses_original_name() {
        let (tmp, ws) = setup();
        let source = tmp.path().join("report.csv");
        std::fs::write(&source, "a,b\n").unwrap();
        let files = FileStore::new(&ws);
        let stored = files.upload(&source, &Role::default(), now()).unwrap();

        let out = tmp.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let outcome = files.download(&stored.filename, &out).unwrap();
        assert_eq!(
            outcome,
            Download::Copied {
                to: out.join("report.csv"),
                bytes: 4
            }
        );
    }

    #[test]
    fn test_delete_cascades_to_comments() {
        let (tmp, ws) = setup();
        let source = tmp.path().join("report.csv");
        std::fs::write(&source, "a,b\n").unwrap();
        let files = FileStore::new(&ws);
        let stored = files.upload(&source, &Role::default(), now()).unwrap();

        let comments = Records::<Comment>::new(&ws);
        comments
            .create(Comment::new(&stored.filename, "OEM", "Looks good", now()))
            .unwrap();
        comments
            .create(Comment::new("other.pdf", "OEM", "Unrelated", now()))
            .unwrap();

        let removal = files.delete(&stored.filename).unwrap();
        assert!(!removal.blob_was_missing);
        assert_eq!(removal.comments_removed, 1);
        assert!(files.records().list().unwrap().is_empty());
        assert_eq!(comments.list().unwrap().len(), 1);
        assert!(!ws.uploads_dir().join(&stored.filename).exists());
    }

    #[test]
    fn test_original_name_and_mime() {
        assert_eq!(original_name("20240203040506_a_b.txt"), "a_b.txt");
        assert_eq!(original_name("plain_name.txt"), "plain_name.txt");
        assert_eq!(guess_mime("PHOTO.JPG"), "image/jpeg");
        assert_eq!(guess_mime("noext"), "application/octet-stream");
    }
}
