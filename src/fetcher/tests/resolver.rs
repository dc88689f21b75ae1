use super::*;

#[tokio::test]
async fn resolves_columns_in_schema_order() {
    let server = MockServer::start().await;

    // The header request sends the path alone, no limit and no token
    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .and(query_param_is_missing("limit"))
        .and(query_param_is_missing("token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_payload(&[
            ("Column2", "Loans"),
            ("Column1", "Title"),
            ("Column3", "Barcode"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mapping = client.resolve_headers("%2Fshared%2FLoans").await;

    let keys: Vec<&str> = mapping.keys().collect();
    assert_eq!(keys, vec!["Column2", "Column1", "Column3"]);
    let headings: Vec<&str> = mapping.headings().collect();
    assert_eq!(headings, vec!["Loans", "Title", "Barcode"]);
}

#[tokio::test]
async fn duplicate_schema_elements_keep_the_first_heading() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(schema_payload(&[
            ("Column1", "Title"),
            ("Column1", "Shadowed"),
        ])))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mapping = client.resolve_headers("%2Fshared%2FLoans").await;

    assert_eq!(mapping.len(), 1);
    assert_eq!(mapping.headings().next(), Some("Title"));
}

#[tokio::test]
async fn server_error_resolves_to_empty_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mapping = client.resolve_headers("%2Fshared%2FLoans").await;

    assert!(mapping.is_empty());
}

#[tokio::test]
async fn non_json_response_resolves_to_empty_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mapping = client.resolve_headers("%2Fshared%2FLoans").await;

    assert!(mapping.is_empty());
}

#[tokio::test]
async fn empty_envelope_resolves_to_empty_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "anies": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mapping = client.resolve_headers("%2Fshared%2FLoans").await;

    assert!(mapping.is_empty());
}

#[tokio::test]
async fn header_request_sends_credential_and_accept_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(ENDPOINT_PATH))
        .and(wiremock::matchers::header("Authorization", "apikey test-key"))
        .and(wiremock::matchers::header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(schema_payload(&[("Column1", "Title")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mapping = client.resolve_headers("%2Fshared%2FLoans").await;

    assert_eq!(mapping.len(), 1);
}
