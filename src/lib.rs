//! # prorata
//!
//! Royalty distribution engine for reprographic-rights organisations.
//!
//! Publishers submit XLSX spreadsheets in a fixed six-column template
//! (book name, ISBN, authors, pages, price, category) with per-year
//! sections. prorata aggregates every publisher's books, computes each
//! book's point value from the `(A + B) x D` formula, apportions a total
//! fund pro-rata by points, and splits each book's payout between its
//! publisher and its author(s).
//!
//! ## Quick Start
//!
//! ```no_run
//! use prorata::{FundPool, distribute, formula, import};
//!
//! // Parse every submission in a directory (lexicographic order).
//! let mut records = import::read_directory("submissions/")?;
//!
//! // Derive each book's formula terms, then apportion the fund.
//! records.iter_mut().for_each(formula::annotate);
//! let pool = FundPool::allocate(&mut records, 25_000.0)?;
//!
//! // Split every licence amount between publisher and authors.
//! let ledger = distribute::settle(&records, distribute::DEFAULT_PUBLISHER_SHARE);
//! for (publisher, payment) in &ledger.publishers {
//!     println!("{publisher}: {payment:.2}");
//! }
//! # Ok::<(), prorata::Error>(())
//! ```
//!
//! The three output tables (all books, publisher payments, author payments)
//! are written with [`export::write_outputs`].

pub mod distribute;
pub mod error;
pub mod export;
pub mod formula;
pub mod import;
pub mod model;

pub use distribute::{DEFAULT_PUBLISHER_SHARE, settle};
pub use error::{Error, Result};
pub use import::{read_directory, read_submission, read_submission_from_reader};
pub use model::{BookRecord, Category, FundPool, PayoutLedger, PointTerms};
