//! Writing the three output tables.
//!
//! Each writer targets any [`io::Write`] so tests can capture output in
//! memory; [`write_outputs`] is the convenience that materializes all three
//! as timestamped CSV files in the submissions directory. Output filenames
//! carry a `__` prefix so later runs skip them when scanning for
//! submissions.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;

use crate::error::Result;
use crate::model::{BookRecord, FundPool, PayoutLedger};

/// One row of the all-books table. Headers mirror the submission template
/// so the output opens cleanly next to the inputs.
#[derive(Debug, Serialize)]
struct AllBooksRow<'a> {
    #[serde(rename = "Name of Book")]
    title: &'a str,
    #[serde(rename = "ISBN")]
    isbn: &'a str,
    #[serde(rename = "Author(s)")]
    authors: String,
    #[serde(rename = "Number of pages")]
    pages: u32,
    #[serde(rename = "Retail price (inc. VAT)")]
    price: f64,
    #[serde(rename = "Melitensia (1), Adult (2), Children's (3)")]
    category: u32,
    #[serde(rename = "Year of Publication")]
    year: u16,
    #[serde(rename = "Publisher")]
    publisher: &'a str,
    #[serde(rename = "A")]
    page_unit: u32,
    #[serde(rename = "B")]
    price_tier: u32,
    #[serde(rename = "C")]
    author_share: f64,
    #[serde(rename = "D")]
    category_weight: u32,
    #[serde(rename = "(A + B) x D")]
    raw_points: u32,
    #[serde(rename = "Funds distributed")]
    funds: f64,
    #[serde(rename = "Total points (A+B)xD for all books")]
    total_points: u64,
    #[serde(rename = "E")]
    point_value: f64,
    #[serde(rename = "Licence amount per book (A+B)xDxE")]
    licence_amount: f64,
}

/// Write the enriched all-books table: every raw column plus every derived
/// term, one row per book.
pub fn write_all_books<W: Write>(writer: W, records: &[BookRecord], pool: &FundPool) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for record in records {
        csv.serialize(AllBooksRow {
            title: &record.title,
            isbn: &record.isbn,
            authors: record.authors.join(", "),
            pages: record.pages,
            price: record.price,
            category: record.category.weight(),
            year: record.year,
            publisher: &record.publisher,
            page_unit: record.terms.page_unit,
            price_tier: record.terms.price_tier,
            author_share: record.terms.author_share,
            category_weight: record.terms.category_weight,
            raw_points: record.terms.raw_points,
            funds: pool.funds,
            total_points: pool.total_points,
            point_value: pool.point_value,
            licence_amount: record.licence_amount,
        })?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the publisher-payments table (`Publisher,Payment`).
pub fn write_publisher_payments<W: Write>(writer: W, ledger: &PayoutLedger) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Publisher", "Payment"])?;
    for (publisher, payment) in &ledger.publishers {
        csv.write_record([publisher, &payment.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the author-payments table (`Author,Payment`).
///
/// The payee label encodes both halves of the ledger key as
/// `[<publisher>] <author>`, since the same author name under two
/// publishers is two payees.
pub fn write_author_payments<W: Write>(writer: W, ledger: &PayoutLedger) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Author", "Payment"])?;
    for ((publisher, author), payment) in &ledger.authors {
        csv.write_record([&format!("[{publisher}] {author}"), &payment.to_string()])?;
    }
    csv.flush()?;
    Ok(())
}

/// The three artifact paths of one run.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub all_books: PathBuf,
    pub publisher_payments: PathBuf,
    pub author_payments: PathBuf,
}

/// Build timestamped output paths inside `dir`.
///
/// The suffix combines the run date with the last five digits of the Unix
/// timestamp, matching the collision-avoidance scheme the `__` skip rule
/// expects.
pub fn output_paths<P: AsRef<Path>>(dir: P) -> OutputPaths {
    let now = Local::now();
    let date = now.format("%d%m%y");
    let id = now.timestamp().rem_euclid(100_000);
    let dir = dir.as_ref();
    OutputPaths {
        all_books: dir.join(format!("__all_books_{date}_{id:05}.csv")),
        publisher_payments: dir.join(format!("__publishers_payment_{date}_{id:05}.csv")),
        author_payments: dir.join(format!("__authors_payment_{date}_{id:05}.csv")),
    }
}

/// Materialize all three tables in the submissions directory.
///
/// Nothing is written unless allocation already succeeded, so failed runs
/// leave no partial artifacts behind.
pub fn write_outputs<P: AsRef<Path>>(
    dir: P,
    records: &[BookRecord],
    pool: &FundPool,
    ledger: &PayoutLedger,
) -> Result<OutputPaths> {
    let paths = output_paths(dir);
    write_all_books(File::create(&paths.all_books)?, records, pool)?;
    write_publisher_payments(File::create(&paths.publisher_payments)?, ledger)?;
    write_author_payments(File::create(&paths.author_payments)?, ledger)?;
    Ok(paths)
}
