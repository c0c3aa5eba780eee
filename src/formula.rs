//! The point formula: pure functions from a book's raw attributes to its
//! derived terms.
//!
//! A book earns `(A + B) x D` points, where A grows with page count, B with
//! retail price, and D is the category weight. C is the per-author fraction
//! used later when the author half of a payout is split.

use crate::model::{BookRecord, Category, PointTerms};

/// A term: one unit per started block of 100 pages.
///
/// A zero page count still counts as one unit; the template treats an
/// unstated page count like a one-page work rather than excluding the book.
pub fn page_unit(pages: u32) -> u32 {
    if pages == 0 { 1 } else { (pages - 1) / 100 + 1 }
}

/// B term: retail-price tier. Boundaries are inclusive on the lower tier.
pub fn price_tier(price: f64) -> u32 {
    if price <= 0.0 {
        0
    } else if price <= 10.0 {
        1
    } else if price <= 20.0 {
        2
    } else if price <= 50.0 {
        3
    } else if price <= 80.0 {
        4
    } else if price <= 100.0 {
        5
    } else if price <= 150.0 {
        6
    } else {
        7
    }
}

/// C term: each declared author's share of the author half.
pub fn author_share(author_count: usize) -> f64 {
    1.0 / author_count.max(1) as f64
}

/// Compute all derived terms for one book.
pub fn point_terms(pages: u32, price: f64, author_count: usize, category: Category) -> PointTerms {
    let a = page_unit(pages);
    let b = price_tier(price);
    let d = category.weight();
    PointTerms {
        page_unit: a,
        price_tier: b,
        author_share: author_share(author_count),
        category_weight: d,
        raw_points: (a + b) * d,
    }
}

/// Annotate a record with its derived terms.
pub fn annotate(record: &mut BookRecord) {
    record.terms = point_terms(
        record.pages,
        record.price,
        record.authors.len(),
        record.category,
    );
}
