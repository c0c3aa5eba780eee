//! Reading publisher submissions.
//!
//! A submission is one XLSX workbook in the fixed six-column template. The
//! grid reader ([`xlsx`]) handles the container format; the template parser
//! ([`template`]) handles the semi-structured layout inside it. Each
//! submission parses independently, so one bad file never corrupts the
//! records of another — it aborts the run with an error naming the file.

mod template;
mod xlsx;

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Result;
use crate::model::BookRecord;

/// Read one submission file into book records, with publisher and year
/// stamped on every record.
pub fn read_submission<P: AsRef<Path>>(path: P) -> Result<Vec<BookRecord>> {
    let path = path.as_ref();
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file = File::open(path)?;
    read_submission_from_reader(file, &label)
}

/// Read a submission from any [`Read`] + [`Seek`] source.
///
/// `file` labels errors; use the submission's filename.
///
/// # Example
///
/// ```no_run
/// use std::io::Cursor;
/// use prorata::import::read_submission_from_reader;
///
/// let bytes: Vec<u8> = std::fs::read("acme.xlsx")?;
/// let records = read_submission_from_reader(Cursor::new(bytes), "acme.xlsx")?;
/// # Ok::<(), prorata::Error>(())
/// ```
pub fn read_submission_from_reader<R: Read + Seek>(
    reader: R,
    file: &str,
) -> Result<Vec<BookRecord>> {
    let grid = xlsx::read_grid(reader, file)?;
    template::parse_submission(&grid, file)
}

/// Read every submission in a directory, in lexicographic filename order.
///
/// Only the directory's immediate files are considered. Names starting with
/// `.` or `__` are skipped: hidden files, and this tool's own timestamped
/// outputs from earlier runs. The fixed ordering keeps the output tables
/// deterministic across runs.
pub fn read_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<BookRecord>> {
    let mut names: Vec<std::path::PathBuf> = std::fs::read_dir(dir.as_ref())?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_submission_name)
        })
        .collect();
    names.sort();

    let mut records = Vec::new();
    for path in names {
        records.extend(read_submission(&path)?);
    }
    Ok(records)
}

/// Whether a filename is a candidate submission. `.`-prefixed names are
/// hidden files; `__`-prefixed names are reserved for this tool's outputs.
pub fn is_submission_name(name: &str) -> bool {
    !name.starts_with('.') && !name.starts_with("__")
}
