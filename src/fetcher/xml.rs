//! XML decoding for schema and rowset payloads
//!
//! The analytics service wraps two XML documents in its JSON envelope: an
//! XSD describing the report columns, and per-page rowsets carrying the
//! data rows plus pagination markers. Both documents are namespace-heavy,
//! so matching works on local names throughout.

use crate::types::{ColumnMapping, RowRecord};
use quick_xml::events::Event;
use quick_xml::Reader;

/// One decoded page of report data
#[derive(Debug, Default)]
pub(crate) struct RowsetPage {
    /// Data rows in document order
    pub rows: Vec<RowRecord>,
    /// Resumption token for the next page, when the service sent one
    pub token: Option<String>,
    /// True when the service marked this page as the last one
    pub finished: bool,
}

/// Extract the column mapping from a report schema document
///
/// Columns come from `xsd:element` declarations, in document order. The
/// display heading is the `columnHeading` attribute (any namespace),
/// falling back to the element's `name` when absent.
pub(crate) fn parse_schema(xml: &str) -> Result<ColumnMapping, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut mapping = ColumnMapping::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"element" => {
                let mut name: Option<String> = None;
                let mut heading: Option<String> = None;
                for attr in e.attributes() {
                    let attr = attr.map_err(quick_xml::Error::InvalidAttr)?;
                    let local = local_attr_name(attr.key.as_ref());
                    match local {
                        b"name" => name = Some(attr.unescape_value()?.into_owned()),
                        b"columnHeading" => {
                            heading = Some(attr.unescape_value()?.into_owned());
                        }
                        _ => {}
                    }
                }
                if let Some(name) = name {
                    let heading = heading.unwrap_or_else(|| name.clone());
                    mapping.push(name, heading);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(mapping)
}

/// Decode one rowset page: data rows, resumption token, finished marker
pub(crate) fn parse_rowset(xml: &str) -> Result<RowsetPage, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut page = RowsetPage::default();
    let mut current_row: Option<RowRecord> = None;
    let mut current_cell: Option<String> = None;
    let mut cell_text = String::new();
    let mut marker: Option<Marker> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let local = e.local_name().as_ref().to_vec();
                if local == b"Row" {
                    current_row = Some(RowRecord::new());
                } else if current_row.is_some() {
                    current_cell = Some(String::from_utf8_lossy(&local).into_owned());
                    cell_text.clear();
                } else if local == b"ResumptionToken" {
                    marker = Some(Marker::Token);
                    cell_text.clear();
                } else if local == b"IsFinished" {
                    marker = Some(Marker::Finished);
                    cell_text.clear();
                }
            }
            Event::Empty(e) => {
                let local = e.local_name().as_ref().to_vec();
                if let Some(row) = current_row.as_mut() {
                    if local != b"Row" {
                        row.insert(String::from_utf8_lossy(&local).into_owned(), None);
                    }
                }
            }
            Event::Text(t) => {
                if current_cell.is_some() || marker.is_some() {
                    cell_text.push_str(&t.unescape()?);
                }
            }
            Event::CData(t) => {
                if current_cell.is_some() || marker.is_some() {
                    cell_text.push_str(&String::from_utf8_lossy(t.as_ref()));
                }
            }
            Event::End(e) => {
                let local = e.local_name().as_ref().to_vec();
                if local == b"Row" {
                    if let Some(row) = current_row.take() {
                        page.rows.push(row);
                    }
                    current_cell = None;
                } else if let Some(cell) = current_cell.take() {
                    if let Some(row) = current_row.as_mut() {
                        row.insert(cell, Some(std::mem::take(&mut cell_text)));
                    }
                } else {
                    match marker.take() {
                        Some(Marker::Token) => {
                            let token = std::mem::take(&mut cell_text);
                            if !token.is_empty() {
                                page.token = Some(token);
                            }
                        }
                        Some(Marker::Finished) => {
                            page.finished = cell_text.trim() == "true";
                            cell_text.clear();
                        }
                        None => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(page)
}

enum Marker {
    Token,
    Finished,
}

fn local_attr_name(key: &[u8]) -> &[u8] {
    match key.iter().rposition(|&b| b == b':') {
        Some(pos) => &key[pos + 1..],
        None => key,
    }
}
