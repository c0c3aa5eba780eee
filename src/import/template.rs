//! Parser for the publisher submission template.
//!
//! Submissions follow a fixed six-column layout (book name, ISBN, authors,
//! pages, price, category) with no machine-readable structure: a labeled
//! publisher row, one or more "List of books published in YYYY" section
//! headers, repeated column-header rows, and blank spacer rows are all mixed
//! in with the book rows. This module turns that grid into clean
//! [`BookRecord`]s with publisher and year stamped on.

use crate::error::{Error, Result};
use crate::model::{BookRecord, Category, PointTerms};

/// Label on the publisher row of company submissions.
const COMPANY_LABEL: &str = "Name of Company";
/// Label on the publisher row of self-published submissions.
const SELF_PUBLISHED_LABEL: &str = "Self Published Author";
/// Prefix of every year-section header row.
const SECTION_MARKER: &str = "List of books published in";
/// First column header, repeated above each section's book rows.
const TITLE_HEADER: &str = "Name of Book";

/// Template column names, used to label malformed-cell errors.
const COL_TITLE: &str = "Name of Book";
const COL_PAGES: &str = "Number of pages";
const COL_PRICE: &str = "Retail price (inc. VAT)";
const COL_CATEGORY: &str = "Melitensia (1), Adult (2), Children's (3)";

/// A grid row paired with its 1-based sheet row number, kept so error
/// messages can point at the row the user sees.
type NumberedRow<'a> = (usize, &'a [String]);

/// Parse one submission grid into book records.
///
/// `file` labels errors; it is not interpreted.
pub fn parse_submission(grid: &[Vec<String>], file: &str) -> Result<Vec<BookRecord>> {
    // Blank spacer rows (empty first column) carry no information.
    let rows: Vec<NumberedRow> = grid
        .iter()
        .enumerate()
        .map(|(i, row)| (i + 1, row.as_slice()))
        .filter(|(_, row)| !cell(row, 0).is_empty())
        .collect();

    let publisher = find_publisher(&rows, file)?;

    let markers: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, (_, row))| cell(row, 0).contains(SECTION_MARKER))
        .map(|(i, _)| i)
        .collect();
    if markers.is_empty() {
        return Err(Error::NoSections {
            file: file.to_string(),
        });
    }

    let mut records = Vec::new();
    for (k, &marker) in markers.iter().enumerate() {
        let (marker_row, marker_cells) = rows[marker];
        let header = cell(marker_cells, 0);
        let year = extract_year(header).ok_or_else(|| Error::MalformedCell {
            file: file.to_string(),
            row: marker_row,
            column: COL_TITLE,
            value: header.to_string(),
        })?;

        let end = markers.get(k + 1).copied().unwrap_or(rows.len());
        for &(sheet_row, row) in &rows[marker + 1..end] {
            if is_structural_row(row) {
                continue;
            }
            records.push(parse_book_row(row, sheet_row, year, &publisher, file)?);
        }
    }

    Ok(records)
}

fn find_publisher(rows: &[NumberedRow], file: &str) -> Result<String> {
    let row = rows
        .iter()
        .find(|(_, row)| {
            let first = cell(row, 0);
            first.contains(COMPANY_LABEL) || first.contains(SELF_PUBLISHED_LABEL)
        })
        .ok_or_else(|| Error::MissingPublisher {
            file: file.to_string(),
        })?;

    // The template puts the name after a colon; take everything after the
    // last one so names containing colons survive partially rather than
    // vanish. A label with no colon yields the whole cell.
    let first = cell(row.1, 0);
    Ok(first.rsplit(':').next().unwrap_or(first).trim().to_string())
}

/// Rows inside a section that are template furniture, not books: repeated
/// column headers, stray section markers, stray publisher rows.
fn is_structural_row(row: &[String]) -> bool {
    let first = cell(row, 0);
    first == TITLE_HEADER
        || first.contains(SECTION_MARKER)
        || first.contains(COMPANY_LABEL)
        || first.contains(SELF_PUBLISHED_LABEL)
}

/// Pull the 4-digit year out of a section header.
///
/// Scans for the first occurrence of `20` and takes four characters from
/// there, so `"List of books published in 2021"` yields 2021. Deliberately
/// narrow: anything that does not put four ASCII digits at the first `20`
/// is rejected rather than guessed at.
fn extract_year(header: &str) -> Option<u16> {
    let at = header.find("20")?;
    let candidate = header.get(at..at + 4)?;
    if candidate.bytes().all(|b| b.is_ascii_digit()) {
        candidate.parse().ok()
    } else {
        None
    }
}

fn parse_book_row(
    row: &[String],
    sheet_row: usize,
    year: u16,
    publisher: &str,
    file: &str,
) -> Result<BookRecord> {
    let malformed = |column: &'static str, value: &str| Error::MalformedCell {
        file: file.to_string(),
        row: sheet_row,
        column,
        value: value.to_string(),
    };

    let pages_cell = cell(row, 3);
    let pages = match pages_cell.trim() {
        // Empty cell is a deliberate fallback to zero, not an error.
        "" => 0,
        s => s.parse::<u32>().map_err(|_| malformed(COL_PAGES, pages_cell))?,
    };

    let price_cell = cell(row, 4);
    let price = match price_cell.trim() {
        "" => 0.0,
        s => s.parse::<f64>().map_err(|_| malformed(COL_PRICE, price_cell))?,
    };

    let category_cell = cell(row, 5);
    let category = Category::from_code(category_cell)
        .ok_or_else(|| malformed(COL_CATEGORY, category_cell))?;

    // Each comma-delimited name is a distinct payee. Splitting an empty
    // cell still yields one (empty-string) author, which keeps the author
    // count >= 1 everywhere downstream.
    let authors: Vec<String> = cell(row, 2).split(',').map(|a| a.trim().to_string()).collect();

    Ok(BookRecord {
        title: cell(row, 0).to_string(),
        isbn: cell(row, 1).to_string(),
        authors,
        pages,
        price,
        category,
        year,
        publisher: publisher.to_string(),
        terms: PointTerms::default(),
        licence_amount: 0.0,
    })
}

/// Missing trailing cells read as explicitly blank.
fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
    row.get(index).map(String::as_str).unwrap_or("")
}
