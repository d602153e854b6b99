use std::fs;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub const SCHEMA_VERSION: i64 = 1;
const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "txt", "json"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub path: PathBuf,
    pub file_bytes: u64,
    pub documents: i64,
    pub body_bytes: i64,
    pub loaded_at: Option<String>,
}

impl std::fmt::Display for StoreStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "store:      {}", self.path.display())?;
        writeln!(f, "file size:  {} bytes", self.file_bytes)?;
        writeln!(f, "documents:  {}", self.documents)?;
        writeln!(f, "body bytes: {}", self.body_bytes)?;
        write!(
            f,
            "loaded at:  {}",
            self.loaded_at.as_deref().unwrap_or("never")
        )
    }
}

/// Read-write handle used by the management commands.
pub struct RagStore {
    path: PathBuf,
    conn: Connection,
}

impl RagStore {
    /// Opens (creating if needed) the store and applies the schema.
    pub fn init(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|err| Error::store(format!("{} ({})", parent.display(), err)))?;
        }
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        tracing::info!(path = %path.display(), "rag store initialized");
        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    /// Opens an existing store without creating it.
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::store(format!(
                "{} does not exist; run `init` first",
                path.display()
            )));
        }
        let conn = Connection::open(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            conn,
        })
    }

    /// Replaces every document with the contents of `knowledge_dir`.
    pub fn reload(&mut self, knowledge_dir: &Path) -> Result<usize> {
        let documents = collect_documents(knowledge_dir)?;
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM documents", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO documents(path, title, body, bytes) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for doc in &documents {
                insert.execute(params![doc.path, doc.title, doc.body, doc.body.len() as i64])?;
            }
        }
        let loaded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        tx.execute(
            "INSERT INTO meta(key, value) VALUES ('loaded_at', ?1)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![loaded_at],
        )?;
        tx.commit()?;
        tracing::info!(
            dir = %knowledge_dir.display(),
            documents = documents.len(),
            "rag store reloaded"
        );
        Ok(documents.len())
    }

    pub fn status(&self) -> Result<StoreStatus> {
        let file_bytes = fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        let (documents, body_bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(bytes), 0) FROM documents",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let loaded_at: Option<String> = self
            .conn
            .query_row("SELECT value FROM meta WHERE key = 'loaded_at'", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(StoreStatus {
            path: self.path.clone(),
            file_bytes,
            documents,
            body_bytes,
            loaded_at,
        })
    }
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "BEGIN;
        CREATE TABLE IF NOT EXISTS meta(
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS documents(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            body TEXT NOT NULL,
            bytes INTEGER NOT NULL
        );
        COMMIT;",
    )?;
    let existing: Option<String> = conn
        .query_row("SELECT value FROM meta WHERE key = 'schema_version'", [], |row| {
            row.get(0)
        })
        .optional()?;
    match existing {
        Some(current) if current == SCHEMA_VERSION.to_string() => Ok(()),
        Some(current) => Err(Error::store(format!(
            "rag store schema {current} incompatible with expected {SCHEMA_VERSION}"
        ))),
        None => {
            conn.execute(
                "INSERT INTO meta(key, value) VALUES ('schema_version', ?1)",
                params![SCHEMA_VERSION.to_string()],
            )?;
            Ok(())
        }
    }
}

struct Document {
    path: String,
    title: String,
    body: String,
}

fn collect_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(Error::store(format!(
            "{} is not a knowledge directory",
            dir.display()
        )));
    }
    let mut documents = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let wanted = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| DOCUMENT_EXTENSIONS.contains(&e));
        if !entry.file_type().is_file() || !wanted {
            continue;
        }
        let body = match fs::read_to_string(path) {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "skipping unreadable document");
                continue;
            }
        };
        let relative = path.strip_prefix(dir).unwrap_or(path);
        documents.push(Document {
            path: relative.to_string_lossy().replace('\\', "/"),
            title: title_of(path, &body),
            body,
        });
    }
    // The walk is depth-first; the store wants plain path order.
    documents.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(documents)
}

/// First non-empty line without markdown heading marks, else the file stem.
fn title_of(path: &Path, body: &str) -> String {
    body.lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
}
