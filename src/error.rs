//! Error types for prorata operations.

use thiserror::Error;

/// Errors that can occur while reading submissions or distributing funds.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid spreadsheet {file}: {reason}")]
    InvalidSheet { file: String, reason: String },

    #[error("No publisher header row (\"Name of Company\" or \"Self Published Author\") in {file}")]
    MissingPublisher { file: String },

    #[error("No \"List of books published in\" section markers in {file}")]
    NoSections { file: String },

    #[error("Malformed cell in {file}, row {row}, column \"{column}\": {value:?}")]
    MalformedCell {
        file: String,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Total points across all books is zero; nothing to distribute")]
    NoPoints,

    #[error("Funds to distribute must be a positive amount, got {0}")]
    InvalidFunds(f64),

    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, Error>;
