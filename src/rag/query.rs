use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
const SNIPPET_CHARS: usize = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub path: String,
    pub title: String,
    pub snippet: String,
}

/// Query-only view of the RAG store.
///
/// Every failure degrades to an empty result; the helper never writes.
pub struct QueryHelper {
    path: PathBuf,
}

impl QueryHelper {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(CONNECT_TIMEOUT)?;
        conn.pragma_update(None, "query_only", true)?;
        Ok(conn)
    }

    pub fn search(&self, term: &str, limit: usize) -> Vec<SearchHit> {
        match self.try_search(term, limit) {
            Ok(hits) => hits,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "rag query failed");
                Vec::new()
            }
        }
    }

    pub fn document_count(&self) -> usize {
        let count = self.connect().and_then(|conn| {
            conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get::<_, i64>(0))
        });
        match count {
            Ok(n) => n.max(0) as usize,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "rag count failed");
                0
            }
        }
    }

    fn try_search(&self, term: &str, limit: usize) -> rusqlite::Result<Vec<SearchHit>> {
        let term = term.trim();
        if term.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let conn = self.connect()?;
        let pattern = format!("%{}%", escape_like(term));
        let mut stmt = conn.prepare(
            "SELECT path, title, body FROM documents
             WHERE title LIKE ?1 ESCAPE '\\' OR body LIKE ?1 ESCAPE '\\'
             ORDER BY path LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![pattern, limit as i64], |row| {
            let body: String = row.get(2)?;
            Ok(SearchHit {
                path: row.get(0)?,
                title: row.get(1)?,
                snippet: snippet(&body, term),
            })
        })?;
        rows.collect()
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Up to `SNIPPET_CHARS` characters starting a little before the match.
fn snippet(body: &str, term: &str) -> String {
    let lowered = body.to_ascii_lowercase();
    let start = lowered
        .find(&term.to_ascii_lowercase())
        .map(|byte| body[..byte].chars().count().saturating_sub(20))
        .unwrap_or(0);
    body.chars()
        .skip(start)
        .take(SNIPPET_CHARS)
        .collect::<String>()
        .replace('\n', " ")
}
