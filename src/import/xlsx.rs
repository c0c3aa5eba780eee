//! Minimal XLSX grid reader.
//!
//! An `.xlsx` file is a ZIP container of XML parts. This module resolves the
//! first worksheet, loads the shared-string table, and flattens the sheet
//! into a dense row/column grid of strings. Every cell surfaces as a
//! `String`; absent or empty cells are empty strings, never a null marker,
//! so the template layer can distinguish "explicitly blank" from "row not
//! present".

use quick_xml::Reader;
use quick_xml::events::Event;
use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Read the first worksheet of an XLSX byte stream into a row grid.
///
/// `file` is only used to label errors.
pub fn read_grid<R: Read + Seek>(reader: R, file: &str) -> Result<Vec<Vec<String>>> {
    let mut archive = ZipArchive::new(reader)?;

    let shared = match read_archive_file(&mut archive, "xl/sharedStrings.xml") {
        Ok(xml) => parse_shared_strings(&xml)?,
        // The part is optional; workbooks with only inline/numeric cells omit it.
        Err(_) => Vec::new(),
    };

    let sheet_path = find_first_sheet_path(&mut archive, file)?;
    let sheet_xml = read_archive_file(&mut archive, &sheet_path).map_err(|_| {
        Error::InvalidSheet {
            file: file.to_string(),
            reason: format!("worksheet part {sheet_path} not found"),
        }
    })?;

    parse_sheet(&sheet_xml, &shared)
}

fn read_archive_file<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<String> {
    let mut entry = archive.by_name(path)?;
    let mut content = String::new();
    entry.read_to_string(&mut content)?;
    Ok(content)
}

/// Resolve the path of the workbook's first sheet.
///
/// Takes the first `<sheet>` of `xl/workbook.xml` and follows its
/// relationship id through `xl/_rels/workbook.xml.rels`. Falls back to the
/// conventional `xl/worksheets/sheet1.xml` when either part is missing.
fn find_first_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    file: &str,
) -> Result<String> {
    const FALLBACK: &str = "xl/worksheets/sheet1.xml";

    let Ok(workbook) = read_archive_file(archive, "xl/workbook.xml") else {
        return Err(Error::InvalidSheet {
            file: file.to_string(),
            reason: "xl/workbook.xml not found".to_string(),
        });
    };

    let Some(rel_id) = first_sheet_rel_id(&workbook)? else {
        return Err(Error::InvalidSheet {
            file: file.to_string(),
            reason: "workbook declares no sheets".to_string(),
        });
    };

    let Ok(rels) = read_archive_file(archive, "xl/_rels/workbook.xml.rels") else {
        return Ok(FALLBACK.to_string());
    };

    match rel_target(&rels, &rel_id)? {
        Some(target) => {
            // Relationship targets are relative to xl/.
            let target = target.trim_start_matches('/');
            if target.starts_with("xl/") {
                Ok(target.to_string())
            } else {
                Ok(format!("xl/{target}"))
            }
        }
        None => Ok(FALLBACK.to_string()),
    }
}

fn first_sheet_rel_id(workbook_xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(workbook_xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes().flatten() {
                    // The namespaced form is r:id.
                    if attr.key.as_ref() == b"r:id" || attr.key.as_ref() == b"id" {
                        return Ok(Some(String::from_utf8(attr.value.to_vec())?));
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }
    Ok(None)
}

fn rel_target(rels_xml: &str, rel_id: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(rels_xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8(attr.value.to_vec())?),
                        b"Target" => target = Some(String::from_utf8(attr.value.to_vec())?),
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rel_id) {
                    return Ok(target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }
    Ok(None)
}

/// Parse `xl/sharedStrings.xml` into the string table.
///
/// Rich-text entries split one string across several `<t>` runs; all runs of
/// one `<si>` are concatenated.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_t = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = true,
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_t => {
                current.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if in_t => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    current.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(strings)
}

/// Flatten a worksheet part into a dense grid.
///
/// Row and cell `r` attributes give absolute sheet positions; gaps are
/// filled with empty rows/cells so grid indices match what a user sees in a
/// spreadsheet application (error messages report 1-based sheet rows).
fn parse_sheet(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);

    let mut grid: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut row_index = 0usize; // 1-based once inside a <row>

    let mut cell_col = 0usize;
    let mut cell_type = CellType::Number;
    let mut in_value = false;
    let mut in_inline_t = false;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"row" => {
                let declared = attr_value(&e, b"r")?.and_then(|v| v.parse::<usize>().ok());
                row_index = declared.unwrap_or(grid.len() + 1);
                row.clear();
                cell_col = 0;
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"row" => {
                // Self-closing row: present but blank.
                let declared = attr_value(&e, b"r")?.and_then(|v| v.parse::<usize>().ok());
                let index = declared.unwrap_or(grid.len() + 1);
                while grid.len() < index {
                    grid.push(Vec::new());
                }
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"row" => {
                if row_index > 0 {
                    // Fill skipped rows so indices stay absolute.
                    while grid.len() + 1 < row_index {
                        grid.push(Vec::new());
                    }
                    grid.push(std::mem::take(&mut row));
                    row_index = 0;
                }
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"c" => {
                let col = attr_value(&e, b"r")?
                    .as_deref()
                    .and_then(column_index)
                    .unwrap_or(cell_col);
                while row.len() < col {
                    row.push(String::new());
                }
                cell_col = col + 1;
                cell_type = match attr_value(&e, b"t")?.as_deref() {
                    Some("s") => CellType::Shared,
                    Some("inlineStr") => CellType::Inline,
                    Some("str") => CellType::FormulaString,
                    Some("b") => CellType::Bool,
                    _ => CellType::Number,
                };
                text.clear();
            }
            Ok(Event::Empty(e)) if e.name().as_ref() == b"c" => {
                // Self-closing cell: explicitly blank.
                let col = attr_value(&e, b"r")?
                    .as_deref()
                    .and_then(column_index)
                    .unwrap_or(cell_col);
                while row.len() <= col {
                    row.push(String::new());
                }
                cell_col = col + 1;
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"c" => {
                row.push(finish_cell(cell_type, &text, shared));
            }
            Ok(Event::Start(e)) if e.name().as_ref() == b"v" => in_value = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"v" => in_value = false,
            Ok(Event::Start(e)) if e.name().as_ref() == b"t" => in_inline_t = true,
            Ok(Event::End(e)) if e.name().as_ref() == b"t" => in_inline_t = false,
            Ok(Event::Text(e)) if in_value || in_inline_t => {
                text.push_str(&String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if in_value || in_inline_t => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    text.push_str(&resolved);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Ok(grid)
}

#[derive(Clone, Copy)]
enum CellType {
    Shared,
    Inline,
    FormulaString,
    Bool,
    Number,
}

fn finish_cell(cell_type: CellType, text: &str, shared: &[String]) -> String {
    match cell_type {
        CellType::Shared => text
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|idx| shared.get(idx).cloned())
            .unwrap_or_else(|| text.to_string()),
        CellType::Inline | CellType::FormulaString | CellType::Number => text.to_string(),
        CellType::Bool => if text.trim() == "1" { "TRUE" } else { "FALSE" }.to_string(),
    }
}

fn attr_value(e: &quick_xml::events::BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return Ok(Some(String::from_utf8(attr.value.to_vec())?));
        }
    }
    Ok(None)
}

/// Convert the letter prefix of a cell reference (`C7` -> 2) to a zero-based
/// column index.
fn column_index(cell_ref: &str) -> Option<usize> {
    let mut col = 0usize;
    let mut seen = false;
    for ch in cell_ref.chars() {
        if ch.is_ascii_alphabetic() {
            seen = true;
            col = col * 26 + (ch.to_ascii_uppercase() as u8 - b'A' + 1) as usize;
        } else {
            break;
        }
    }
    if seen { Some(col - 1) } else { None }
}

fn resolve_entity(entity: &str) -> Option<String> {
    match entity {
        "apos" => return Some("'".to_string()),
        "quot" => return Some("\"".to_string()),
        "lt" => return Some("<".to_string()),
        "gt" => return Some(">".to_string()),
        "amp" => return Some("&".to_string()),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        if let Ok(code) = u32::from_str_radix(hex, 16)
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    } else if let Some(dec) = entity.strip_prefix('#') {
        if let Ok(code) = dec.parse::<u32>()
            && let Some(c) = char::from_u32(code)
        {
            return Some(c.to_string());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_index_letters() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("B12"), Some(1));
        assert_eq!(column_index("F3"), Some(5));
        assert_eq!(column_index("Z1"), Some(25));
        assert_eq!(column_index("AA1"), Some(26));
        assert_eq!(column_index("7"), None);
    }

    #[test]
    fn shared_strings_concatenate_rich_text_runs() {
        let xml = r#"<sst><si><t>plain</t></si><si><r><t>ri</t></r><r><t>ch</t></r></si></sst>"#;
        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(strings, vec!["plain".to_string(), "rich".to_string()]);
    }

    #[test]
    fn sheet_grid_fills_gaps_and_resolves_types() {
        let shared = vec!["Hello".to_string()];
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1"><v>42</v></c></row>
            <row r="3"><c r="A3" t="inlineStr"><is><t>World</t></is></c></row>
        </sheetData></worksheet>"#;
        let grid = parse_sheet(xml, &shared).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0], vec!["Hello", "", "42"]);
        assert!(grid[1].is_empty());
        assert_eq!(grid[2], vec!["World"]);
    }

    #[test]
    fn entities_decode_in_cell_text() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="inlineStr"><is><t>Fish &amp; Chips</t></is></c></row>
        </sheetData></worksheet>"#;
        let grid = parse_sheet(xml, &[]).unwrap();
        assert_eq!(grid[0][0], "Fish & Chips");
    }
}
