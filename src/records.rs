//! Diagnostic dump of the clinic-records spreadsheet.
//!
//! The workbook (`.xlsx`) is read directly: first worksheet, first row as
//! header. A `.csv` export of the same sheet is accepted too.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, ErrorKind, Result};

/// Decompressed size limit for a single workbook part.
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const WORKSHEET_PREFIX: &str = "xl/worksheets/sheet";
/// Column count of a worksheet (`XFD`); cells beyond it are dropped.
const MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordsReport {
    pub headers: Vec<String>,
    pub rows: usize,
    /// Empty cells per header column; missing trailing cells count as empty.
    pub empty_cells: Vec<usize>,
    pub sample: Vec<Vec<String>>,
}

pub fn inspect(path: &Path, sample_rows: usize) -> Result<RecordsReport> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("csv"));
    let file = File::open(path).map_err(|err| Error::input_missing(path, err))?;
    let mut rows = if is_csv {
        read_csv(path, file)?
    } else {
        read_workbook(path, file)?
    };
    if rows.is_empty() {
        return Err(malformed(path, "no header row"));
    }
    let headers: Vec<String> = rows
        .remove(0)
        .into_iter()
        .map(|h| h.trim().to_string())
        .collect();
    let report = summarize(headers, rows, sample_rows);
    tracing::debug!(
        path = %path.display(),
        rows = report.rows,
        columns = report.headers.len(),
        "read clinic records"
    );
    Ok(report)
}

fn summarize(headers: Vec<String>, rows: Vec<Vec<String>>, sample_rows: usize) -> RecordsReport {
    let mut empty_cells = vec![0; headers.len()];
    let mut sample = Vec::new();
    for record in &rows {
        for (column, count) in empty_cells.iter_mut().enumerate() {
            if record.get(column).map_or(true, |cell| cell.trim().is_empty()) {
                *count += 1;
            }
        }
        if sample.len() < sample_rows {
            sample.push(record.clone());
        }
    }
    RecordsReport {
        headers,
        rows: rows.len(),
        empty_cells,
        sample,
    }
}

fn malformed(path: &Path, what: &str) -> Error {
    Error::new(
        ErrorKind::InputMalformed,
        None,
        format!("{} ({})", path.display(), what),
    )
}

fn read_csv(path: &Path, file: File) -> Result<Vec<Vec<String>>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);
    reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect())
                .map_err(|err| Error::input_malformed(path, err))
        })
        .collect()
}

fn read_entry(
    path: &Path,
    archive: &mut zip::ZipArchive<File>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(err) => return Err(Error::input_malformed(path, err)),
    };
    let mut out = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut out)
        .map_err(|err| Error::input_malformed(path, err))?;
    if out.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(malformed(path, &format!("{name} exceeds size limit")));
    }
    Ok(Some(out))
}

/// Rows of the lowest-numbered worksheet, cells placed by their reference.
fn read_workbook(path: &Path, file: File) -> Result<Vec<Vec<String>>> {
    let mut archive = zip::ZipArchive::new(file).map_err(|err| Error::input_malformed(path, err))?;
    let first_sheet = archive
        .file_names()
        .filter(|n| n.starts_with(WORKSHEET_PREFIX) && n.ends_with(".xml"))
        .min_by_key(|name| {
            name.trim_start_matches(WORKSHEET_PREFIX)
                .trim_end_matches(".xml")
                .parse::<u32>()
                .unwrap_or(u32::MAX)
        })
        .map(str::to_string)
        .ok_or_else(|| malformed(path, "workbook has no worksheet"))?;

    let shared_strings = match read_entry(path, &mut archive, SHARED_STRINGS)? {
        Some(xml) => parse_shared_strings(&xml).map_err(|err| Error::input_malformed(path, err))?,
        None => Vec::new(),
    };
    let sheet = read_entry(path, &mut archive, &first_sheet)?
        .ok_or_else(|| malformed(path, "worksheet vanished"))?;
    parse_sheet(&sheet, &shared_strings).map_err(|err| Error::input_malformed(path, err))
}

/// One string per `<si>`, rich-text runs concatenated, phonetic runs skipped.
fn parse_shared_strings(xml: &[u8]) -> std::result::Result<Vec<String>, quick_xml::Error> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;
    let mut in_phonetic = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"rPh" => in_phonetic = true,
                b"t" => in_t = !in_phonetic,
                _ => {}
            },
            Event::Text(te) if in_t => current.push_str(&te.unescape()?),
            Event::End(e) => match e.local_name().as_ref() {
                b"t" => in_t = false,
                b"rPh" => in_phonetic = false,
                b"si" => strings.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Zero-based column of an `A1`-style reference (`B7` -> 1, `AA3` -> 26).
fn column_index(reference: &str) -> Option<usize> {
    let letters: Vec<u8> = reference
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .map(|b| b.to_ascii_uppercase())
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters
        .iter()
        .try_fold(0usize, |acc, b| {
            acc.checked_mul(26)?.checked_add((b - b'A' + 1) as usize)
        })
        .map(|n| n - 1)
}

struct Cell {
    column: Option<usize>,
    kind: Option<String>,
    text: String,
}

fn open_cell(e: &BytesStart) -> Cell {
    let mut cell = Cell {
        column: None,
        kind: None,
        text: String::new(),
    };
    for attr in e.attributes().flatten() {
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"r" => cell.column = column_index(&value),
            b"t" => cell.kind = Some(value),
            _ => {}
        }
    }
    cell
}

fn place(row: &mut Vec<String>, cell: Cell, shared_strings: &[String]) {
    let value = match cell.kind.as_deref() {
        Some("s") => cell
            .text
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared_strings.get(i).cloned())
            .unwrap_or_default(),
        _ => cell.text,
    };
    let column = cell.column.unwrap_or(row.len());
    if column >= MAX_COLUMNS {
        return;
    }
    if column >= row.len() {
        row.resize(column + 1, String::new());
    }
    row[column] = value;
}

/// Rows with no non-blank cell are dropped, like blank lines in CSV.
fn parse_sheet(
    xml: &[u8],
    shared_strings: &[String],
) -> std::result::Result<Vec<Vec<String>>, quick_xml::Error> {
    let mut reader = quick_xml::Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell: Option<Cell> = None;
    let mut in_value = false;
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row.clear(),
                b"c" => cell = Some(open_cell(&e)),
                b"v" | b"t" => in_value = cell.is_some(),
                _ => {}
            },
            Event::Text(te) if in_value => {
                if let Some(c) = cell.as_mut() {
                    c.text.push_str(&te.unescape()?);
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(c) = cell.take() {
                        place(&mut row, c, shared_strings);
                    }
                }
                b"row" => {
                    if row.iter().any(|c| !c.trim().is_empty()) {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}

impl fmt::Display for RecordsReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "columns ({}):", self.headers.len())?;
        for (header, empty) in self.headers.iter().zip(&self.empty_cells) {
            writeln!(f, "  {header} (empty: {empty})")?;
        }
        writeln!(f, "rows: {}", self.rows)?;
        write!(f, "first {} rows:", self.sample.len())?;
        for row in &self.sample {
            write!(f, "\n  {}", row.join(" | "))?;
        }
        Ok(())
    }
}
