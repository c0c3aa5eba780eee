//! End-to-end pipeline tests over real XLSX bytes.

mod common;

use std::io::Cursor;

use prorata::{
    Category, Error, FundPool, distribute, export, formula, import,
    read_submission_from_reader,
};

use common::{acme_submission, build_xlsx};

#[test]
fn worked_scenario_from_xlsx_to_ledger() {
    let bytes = acme_submission();
    let mut records = read_submission_from_reader(Cursor::new(bytes), "acme.xlsx").unwrap();

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.title, "First Book");
    assert_eq!(record.isbn, "978-1");
    assert_eq!(record.authors, vec!["Jane Doe", "John Smith"]);
    assert_eq!(record.pages, 150);
    assert_eq!(record.price, 12.5);
    assert_eq!(record.category, Category::Adult);
    assert_eq!(record.year, 2020);
    assert_eq!(record.publisher, "Acme Books");

    records.iter_mut().for_each(formula::annotate);
    let terms = records[0].terms;
    assert_eq!(terms.page_unit, 2);
    assert_eq!(terms.price_tier, 2);
    assert_eq!(terms.category_weight, 2);
    assert_eq!(terms.raw_points, 8);
    assert_eq!(terms.author_share, 0.5);

    let pool = FundPool::allocate(&mut records, 100.0).unwrap();
    assert_eq!(pool.total_points, 8);
    assert_eq!(pool.point_value, 12.5);
    assert_eq!(records[0].licence_amount, 100.0);

    let ledger = distribute::settle(&records, 0.5);
    assert_eq!(ledger.publishers["Acme Books"], 50.0);
    assert_eq!(
        ledger.authors[&("Acme Books".to_string(), "Jane Doe".to_string())],
        25.0
    );
    assert_eq!(
        ledger.authors[&("Acme Books".to_string(), "John Smith".to_string())],
        25.0
    );
}

#[test]
fn parsing_the_same_bytes_twice_is_identical() {
    let bytes = acme_submission();
    let first = read_submission_from_reader(Cursor::new(bytes.clone()), "acme.xlsx").unwrap();
    let second = read_submission_from_reader(Cursor::new(bytes), "acme.xlsx").unwrap();
    assert_eq!(first, second);
}

#[test]
fn submission_without_publisher_row_names_the_file() {
    let bytes = build_xlsx(&[
        vec!["List of books published in 2020"],
        vec!["Orphan Book", "", "Jane Doe", "10", "5", "1"],
    ]);
    let err = read_submission_from_reader(Cursor::new(bytes), "orphan.xlsx").unwrap_err();
    match err {
        Error::MissingPublisher { file } => assert_eq!(file, "orphan.xlsx"),
        other => panic!("expected MissingPublisher, got {other:?}"),
    }
}

#[test]
fn submission_without_sections_names_the_file() {
    let bytes = build_xlsx(&[
        vec!["Name of Company: Acme Books"],
        vec!["First Book", "", "Jane Doe", "10", "5", "1"],
    ]);
    let err = read_submission_from_reader(Cursor::new(bytes), "acme.xlsx").unwrap_err();
    assert!(matches!(err, Error::NoSections { file } if file == "acme.xlsx"));
}

#[test]
fn empty_cells_fall_back_and_earn_tier_zero() {
    let bytes = build_xlsx(&[
        vec!["Name of Company: Acme Books"],
        vec!["List of books published in 2020"],
        vec!["Sparse Book", "", "Jane Doe", "", "", "1"],
    ]);
    let mut records = read_submission_from_reader(Cursor::new(bytes), "acme.xlsx").unwrap();
    records.iter_mut().for_each(formula::annotate);

    let record = &records[0];
    assert_eq!(record.pages, 0);
    assert_eq!(record.price, 0.0);
    assert_eq!(record.terms.page_unit, 1);
    assert_eq!(record.terms.price_tier, 0);
}

#[test]
fn directory_run_merges_publishers_in_filename_order() {
    let dir = tempfile::tempdir().unwrap();

    let beta = build_xlsx(&[
        vec!["Name of Company: Beta Press"],
        vec!["List of books published in 2021"],
        vec!["Beta Book", "978-9", "Solo Author", "90", "8", "3"],
    ]);
    std::fs::write(dir.path().join("beta.xlsx"), beta).unwrap();
    std::fs::write(dir.path().join("acme.xlsx"), acme_submission()).unwrap();
    // Hidden files and previous outputs must be ignored.
    std::fs::write(dir.path().join(".DS_Store"), b"junk").unwrap();
    std::fs::write(dir.path().join("__all_books_010120_00001.csv"), b"old,run").unwrap();

    let mut records = import::read_directory(dir.path()).unwrap();
    assert_eq!(records.len(), 2);
    // Lexicographic file order: acme before beta.
    assert_eq!(records[0].publisher, "Acme Books");
    assert_eq!(records[1].publisher, "Beta Press");

    records.iter_mut().for_each(formula::annotate);
    // Acme: (2+2)x2 = 8; Beta: A=1, B=1, D=3 -> 6.
    let pool = FundPool::allocate(&mut records, 700.0).unwrap();
    assert_eq!(pool.total_points, 14);
    assert_eq!(pool.point_value, 50.0);

    let ledger = distribute::settle(&records, 0.5);
    let paid: f64 =
        ledger.publishers.values().sum::<f64>() + ledger.authors.values().sum::<f64>();
    assert!((paid - 700.0).abs() < 1e-9 * 700.0);
}

#[test]
fn all_points_zero_fails_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let uncategorized = build_xlsx(&[
        vec!["Name of Company: Acme Books"],
        vec!["List of books published in 2020"],
        vec!["Unclassified", "", "Jane Doe", "200", "15", ""],
    ]);
    std::fs::write(dir.path().join("acme.xlsx"), uncategorized).unwrap();

    let mut records = import::read_directory(dir.path()).unwrap();
    records.iter_mut().for_each(formula::annotate);
    assert!(matches!(
        FundPool::allocate(&mut records, 100.0),
        Err(Error::NoPoints)
    ));

    // Allocation failed before export, so the directory only holds the input.
    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["acme.xlsx".to_string()]);
}

#[test]
fn outputs_land_in_the_submissions_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("acme.xlsx"), acme_submission()).unwrap();

    let mut records = import::read_directory(dir.path()).unwrap();
    records.iter_mut().for_each(formula::annotate);
    let pool = FundPool::allocate(&mut records, 100.0).unwrap();
    let ledger = distribute::settle(&records, 0.5);
    let paths = export::write_outputs(dir.path(), &records, &pool, &ledger).unwrap();

    let all_books = std::fs::read_to_string(&paths.all_books).unwrap();
    assert!(all_books.lines().count() == 2);
    assert!(all_books.contains("First Book"));

    let publishers = std::fs::read_to_string(&paths.publisher_payments).unwrap();
    assert!(publishers.contains("Acme Books,50"));

    let authors = std::fs::read_to_string(&paths.author_payments).unwrap();
    assert!(authors.contains("[Acme Books] Jane Doe,25"));

    // A second scan of the directory must not pick the outputs up as input.
    let records_again = import::read_directory(dir.path()).unwrap();
    assert_eq!(records_again.len(), 1);
}
