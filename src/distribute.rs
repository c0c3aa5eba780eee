//! Splitting licence amounts between publishers and authors.
//!
//! Settlement is a pure fold over the enriched record collection: no state
//! survives outside the returned [`PayoutLedger`], and running it twice over
//! the same records yields the same ledger.

use crate::model::{BookRecord, PayoutLedger};

/// Fraction of each licence amount paid to the publisher; the remainder is
/// split between the book's declared authors.
pub const DEFAULT_PUBLISHER_SHARE: f64 = 0.5;

/// Accumulate publisher and author payments over all records.
///
/// For each book, the publisher receives `ratio x licence_amount` and each
/// declared author receives `(1 - ratio) x licence_amount x C`, where C is
/// the per-author share. Author names are trimmed and title-cased; the
/// ledger key pairs them with their publisher, so a person submitting under
/// two publishers is two distinct payees.
pub fn settle(records: &[BookRecord], ratio: f64) -> PayoutLedger {
    records.iter().fold(PayoutLedger::default(), |mut ledger, record| {
        let publisher = record.publisher.trim().to_string();
        *ledger.publishers.entry(publisher.clone()).or_insert(0.0) +=
            ratio * record.licence_amount;

        let author_payment = (1.0 - ratio) * record.licence_amount * record.terms.author_share;
        for author in &record.authors {
            let key = (publisher.clone(), normalize_author(author));
            *ledger.authors.entry(key).or_insert(0.0) += author_payment;
        }

        ledger
    })
}

/// Canonical form of an author name: trimmed, with every alphabetic run
/// capitalized (`"  jane DOE "` -> `"Jane Doe"`).
pub fn normalize_author(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for ch in name.trim().chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
