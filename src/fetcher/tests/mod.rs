use super::*;
use crate::types::RowRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod resolver;

const ENDPOINT_PATH: &str = "/almaws/v1/analytics/reports";

/// Client pointed at a mock analytics endpoint
fn test_client(server: &MockServer) -> AnalyticsClient {
    AnalyticsClient::new(format!("{}{ENDPOINT_PATH}", server.uri()), "test-key", None)
}

/// JSON envelope carrying a schema document for the given (name, heading) columns
fn schema_payload(columns: &[(&str, &str)]) -> serde_json::Value {
    let elements: String = columns
        .iter()
        .map(|(name, heading)| {
            format!(
                r#"<xsd:element name="{name}" type="xsd:string" saw-sql:columnHeading="{heading}" minOccurs="0"/>"#
            )
        })
        .collect();
    let xml = format!(
        r#"<xsd:schema xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:saw-sql="urn:saw-sql"><xsd:complexType name="Row"><xsd:sequence>{elements}</xsd:sequence></xsd:complexType></xsd:schema>"#
    );
    serde_json::json!({ "anies": [xml] })
}

/// JSON envelope carrying one rowset page
fn rowset_payload(
    rows: &[Vec<(&str, &str)>],
    token: Option<&str>,
    finished: bool,
) -> serde_json::Value {
    let token_xml = token
        .map(|t| format!("<ResumptionToken>{t}</ResumptionToken>"))
        .unwrap_or_default();
    let rows_xml: String = rows
        .iter()
        .map(|row| {
            let cells: String = row
                .iter()
                .map(|(key, value)| format!("<{key}>{value}</{key}>"))
                .collect();
            format!("<Row>{cells}</Row>")
        })
        .collect();
    let xml = format!(
        r#"<QueryResult>{token_xml}<IsFinished>{finished}</IsFinished><ResultXml><rowset xmlns="urn:schemas-microsoft-com:xml-analysis:rowset">{rows_xml}</rowset></ResultXml></QueryResult>"#
    );
    serde_json::json!({ "anies": [xml] })
}

/// A page of `count` single-column rows numbered from `start`
fn numbered_rows(start: usize, count: usize) -> Vec<Vec<(&'static str, String)>> {
    (start..start + count)
        .map(|i| vec![("Column1", i.to_string())])
        .collect()
}

/// `rowset_payload` for owned cell values
fn rowset_payload_owned(
    rows: &[Vec<(&'static str, String)>],
    token: Option<&str>,
    finished: bool,
) -> serde_json::Value {
    let borrowed: Vec<Vec<(&str, &str)>> = rows
        .iter()
        .map(|row| row.iter().map(|(k, v)| (*k, v.as_str())).collect())
        .collect();
    rowset_payload(&borrowed, token, finished)
}
