//! Core data model for the distribution pipeline.
//!
//! A [`BookRecord`] is the unit the whole pipeline operates on: the importer
//! produces them, the formula engine fills in [`PointTerms`], the fund pool
//! stamps the licence amount, and settlement folds them into a
//! [`PayoutLedger`].

use std::collections::BTreeMap;

/// Book classification used as the payout multiplier D.
///
/// `Unset` is a legal state: uncategorized books stay in the all-books table
/// but earn zero points until a category is assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Unset,
    Melitensia,
    Adult,
    Childrens,
}

impl Category {
    /// Numeric multiplier (D term of the formula).
    pub fn weight(self) -> u32 {
        match self {
            Category::Unset => 0,
            Category::Melitensia => 1,
            Category::Adult => 2,
            Category::Childrens => 3,
        }
    }

    /// Parse the template's category code. Empty means unset; anything other
    /// than the digits 0-3 is rejected.
    pub fn from_code(code: &str) -> Option<Category> {
        match code.trim() {
            "" | "0" => Some(Category::Unset),
            "1" => Some(Category::Melitensia),
            "2" => Some(Category::Adult),
            "3" => Some(Category::Childrens),
            _ => None,
        }
    }
}

/// Derived formula terms for one book. See [`crate::formula`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointTerms {
    /// A: page units, one per started block of 100 pages.
    pub page_unit: u32,
    /// B: retail-price tier.
    pub price_tier: u32,
    /// C: per-author share of the author half, `1 / authors.len()`.
    pub author_share: f64,
    /// D: category weight.
    pub category_weight: u32,
    /// (A + B) x D.
    pub raw_points: u32,
}

/// One book row from a publisher submission, enriched as it moves through
/// the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct BookRecord {
    pub title: String,
    pub isbn: String,
    /// Comma-split author names, in submission order. Never empty: an
    /// unparsed author cell still yields one empty-string author.
    pub authors: Vec<String>,
    pub pages: u32,
    pub price: f64,
    pub category: Category,
    /// Year of publication, from the section header the row appeared under.
    pub year: u16,
    pub publisher: String,
    pub terms: PointTerms,
    /// raw_points x E, stamped by [`FundPool::allocate`].
    pub licence_amount: f64,
}

/// The finalized fund context: total points over all records and the
/// per-point value E. Computed once, immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FundPool {
    /// Total funds to distribute (external input, > 0).
    pub funds: f64,
    /// Sum of raw_points over all records.
    pub total_points: u64,
    /// E = funds / total_points.
    pub point_value: f64,
}

impl FundPool {
    /// Finalize the fund context over the full record collection and stamp
    /// `licence_amount` onto every record.
    ///
    /// Fails with [`Error::InvalidFunds`](crate::Error::InvalidFunds) when
    /// `funds` is not a positive finite amount, and with
    /// [`Error::NoPoints`](crate::Error::NoPoints) when no book earned any
    /// points (all uncategorized, or an empty input set).
    pub fn allocate(records: &mut [BookRecord], funds: f64) -> crate::Result<FundPool> {
        if !funds.is_finite() || funds <= 0.0 {
            return Err(crate::Error::InvalidFunds(funds));
        }

        let total_points: u64 = records.iter().map(|r| u64::from(r.terms.raw_points)).sum();
        if total_points == 0 {
            return Err(crate::Error::NoPoints);
        }

        let point_value = funds / total_points as f64;
        for record in records.iter_mut() {
            record.licence_amount = f64::from(record.terms.raw_points) * point_value;
        }

        Ok(FundPool {
            funds,
            total_points,
            point_value,
        })
    }
}

/// Accumulated payments keyed by publisher and by (publisher, author).
///
/// `BTreeMap` keeps output row order deterministic. Same-named authors under
/// different publishers are distinct payees by design; merging identities
/// across publishers is an external policy this crate does not implement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayoutLedger {
    pub publishers: BTreeMap<String, f64>,
    pub authors: BTreeMap<(String, String), f64>,
}
