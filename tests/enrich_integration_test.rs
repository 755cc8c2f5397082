use httpmock::prelude::*;
use places_enrich::core::loader::{load_table, parse_table};
use places_enrich::core::preflight::{run_preflight, CheckOutcome};
use places_enrich::domain::model::ProcessingStatus;
use places_enrich::{
    EnrichEngine, EnrichError, GeminiClient, GooglePlacesClient, LocalStorage, TomlConfig,
};
use rust_xlsxwriter::Workbook;
use std::time::Duration;
use tempfile::TempDir;

const INPUT: &str = "Business Name,Address,Telephone,Category\n\
Blue Door Cafe,\"12 High St, Springfield\",555-0100,Cafe\n\
Iron Gym,40 Mill Rd,555-0199,Fitness\n\
Corner Books,\"7 Elm Ave, Shelbyville\",555-0142,Retail\n";

fn settings(server: &MockServer) -> TomlConfig {
    let toml = format!(
        r#"
[places]
endpoint = "{}"
api_key = "maps-key"

[generator]
endpoint = "{}"
api_key = "gem-key"
model = "gemini-2.0-flash"

[run]
checkpoint_every = 5
pacing_ms = 0
"#,
        server.url("/place"),
        server.url("/v1beta")
    );
    TomlConfig::from_toml_str(&toml).unwrap()
}

fn clients(config: &TomlConfig) -> (GooglePlacesClient, GeminiClient) {
    let places = GooglePlacesClient::new(
        &config.places.endpoint,
        config.places.api_key.as_deref().unwrap_or_default(),
        Duration::from_secs(5),
    )
    .unwrap();
    let generator = GeminiClient::new(
        &config.generator.endpoint,
        config.generator.api_key.as_deref().unwrap_or_default(),
        Duration::from_secs(5),
    )
    .unwrap();
    (places, generator)
}

fn workspace(input: &str) -> (TempDir, LocalStorage) {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("in.csv"), input).unwrap();
    let storage = LocalStorage::new(temp_dir.path());
    (temp_dir, storage)
}

fn read_output(temp_dir: &TempDir) -> places_enrich::core::RecordTable {
    let bytes = std::fs::read(temp_dir.path().join("out.csv")).unwrap();
    parse_table(&bytes, "out.csv").unwrap()
}

fn mock_blue_door_listing(server: &MockServer) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/place/findplacefromtext/json")
            .query_param("input", "Blue Door Cafe 12 High St, Springfield")
            .query_param("key", "maps-key");
        then.status(200).json_body(serde_json::json!({
            "status": "OK",
            "candidates": [{"place_id": "blue-door", "name": "Blue Door Cafe", "rating": 4.5}]
        }));
    });
    server.mock(|when, then| {
        when.method(GET)
            .path("/place/details/json")
            .query_param("place_id", "blue-door");
        then.status(200).json_body(serde_json::json!({
            "status": "OK",
            "result": {"url": "https://maps.google.com/?cid=42", "rating": 4.6}
        }));
    });
}

#[tokio::test]
async fn test_enrich_with_limit_keeps_every_row() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_blue_door_listing(&server);
    let generate_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .query_param("key", "gem-key");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Blue Door Cafe serves Springfield."}]}}]
        }));
    });

    let config = settings(&server);
    let (places, generator) = clients(&config);
    let (temp_dir, storage) = workspace(INPUT);

    let mut table = load_table(&storage, "in.csv").await?;
    let engine = EnrichEngine::new(storage, places, generator, &config, "out.csv");
    let summary = engine.run(&mut table, Some(1)).await;

    generate_mock.assert();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.success, 1);

    let output = read_output(&temp_dir);
    assert_eq!(output.len(), 3);
    assert_eq!(
        &output.headers()[..4],
        &["Business Name", "Address", "Telephone", "Category"]
    );

    let done = &output.records[0];
    assert_eq!(done.status, ProcessingStatus::Success);
    assert_eq!(done.maps_url.as_deref(), Some("https://maps.google.com/?cid=42"));
    assert_eq!(done.review_score, Some(4.6));
    assert_eq!(
        done.about_text.as_deref(),
        Some("Blue Door Cafe serves Springfield.")
    );
    assert_eq!(done.passthrough.get(&3).map(String::as_str), Some("Cafe"));

    for record in &output.records[1..] {
        assert_eq!(record.status, ProcessingStatus::Pending);
        assert!(record.maps_url.is_none());
    }
    assert_eq!(
        output.records[2].passthrough.get(&3).map(String::as_str),
        Some("Retail")
    );

    let raw = std::fs::read_to_string(temp_dir.path().join("out.csv"))?;
    assert!(raw.contains(",4.6,"));
    Ok(())
}

#[tokio::test]
async fn test_workbook_in_workbook_out() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_blue_door_listing(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Blue Door Cafe serves Springfield."}]}}]
        }));
    });

    let temp_dir = TempDir::new()?;
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Business Name", "Address", "Telephone", "Category"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, col as u16, *header)?;
        }
        sheet.write_string(1, 0, "Blue Door Cafe")?;
        sheet.write_string(1, 1, "12 High St, Springfield")?;
        sheet.write_string(1, 2, "555-0100")?;
        sheet.write_string(1, 3, "Cafe")?;
        sheet.write_string(2, 0, "Iron Gym")?;
        sheet.write_string(2, 1, "40 Mill Rd")?;
        sheet.write_number(2, 2, 5550199.0)?;
    }
    workbook.save(temp_dir.path().join("in.xlsx"))?;

    let config = settings(&server);
    let (places, generator) = clients(&config);
    let storage = LocalStorage::new(temp_dir.path());

    let mut table = load_table(&storage, "in.xlsx").await?;
    assert_eq!(table.records[1].phone, "5550199");

    let engine = EnrichEngine::new(storage, places, generator, &config, "out.xlsx");
    let summary = engine.run(&mut table, Some(1)).await;
    assert_eq!(summary.success, 1);

    let bytes = std::fs::read(temp_dir.path().join("out.xlsx"))?;
    let output = parse_table(&bytes, "out.xlsx")?;
    assert_eq!(output.len(), 2);
    assert_eq!(output.records[0].status, ProcessingStatus::Success);
    assert_eq!(output.records[0].review_score, Some(4.6));
    assert_eq!(output.records[0].passthrough.get(&3).map(String::as_str), Some("Cafe"));
    assert_eq!(output.records[1].status, ProcessingStatus::Pending);
    assert!(!temp_dir.path().join("out.csv").exists());
    Ok(())
}

#[tokio::test]
async fn test_request_denied_everywhere_is_partial_no_maps_data() -> anyhow::Result<()> {
    let server = MockServer::start();
    let find_mock = server.mock(|when, then| {
        when.method(GET).path("/place/findplacefromtext/json");
        then.status(200).json_body(serde_json::json!({
            "status": "REQUEST_DENIED",
            "candidates": [],
            "error_message": "The provided API key is invalid."
        }));
    });
    let generate_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "unused"}]}}]
        }));
    });

    let config = settings(&server);
    let (places, generator) = clients(&config);
    let (temp_dir, storage) = workspace(
        "Business Name,Address,Telephone\nNowhere Trading Co,\"1 Lost Ln, Void\",555-0000\n",
    );

    let mut table = load_table(&storage, "in.csv").await?;
    let engine = EnrichEngine::new(storage, places, generator, &config, "out.csv");
    let summary = engine.run(&mut table, None).await;

    find_mock.assert_hits(4);
    generate_mock.assert_hits(0);
    assert_eq!(summary.partial_no_maps_data, 1);

    let record = &read_output(&temp_dir).records[0];
    assert_eq!(record.status, ProcessingStatus::PartialNoMapsData);
    assert_eq!(
        record.error_message.as_deref(),
        Some("Could not find business on Google Maps")
    );
    assert!(record.about_text.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unknown_model_falls_back_once() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_blue_door_listing(&server);
    let primary_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent");
        then.status(404).json_body(serde_json::json!({
            "error": {
                "code": 404,
                "message": "models/gemini-2.0-flash is not found for API version v1beta",
                "status": "NOT_FOUND"
            }
        }));
    });
    let list_mock = server.mock(|when, then| {
        when.method(GET).path("/v1beta/models");
        then.status(200).json_body(serde_json::json!({
            "models": [
                {"name": "models/gemini-embedding-001", "supportedGenerationMethods": ["embedContent"]},
                {"name": "models/gemini-2.0-flash", "supportedGenerationMethods": ["generateContent"]},
                {"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent", "countTokens"]}
            ]
        }));
    });
    let fallback_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent");
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Written by the fallback model."}]}}]
        }));
    });

    let config = settings(&server);
    let (places, generator) = clients(&config);
    let (temp_dir, storage) = workspace(INPUT);

    let mut table = load_table(&storage, "in.csv").await?;
    let engine = EnrichEngine::new(storage, places, generator, &config, "out.csv");
    engine.run(&mut table, Some(1)).await;

    primary_mock.assert_hits(1);
    list_mock.assert_hits(1);
    fallback_mock.assert_hits(1);

    let record = &read_output(&temp_dir).records[0];
    assert_eq!(record.status, ProcessingStatus::Success);
    assert_eq!(record.about_text.as_deref(), Some("Written by the fallback model."));
    Ok(())
}

#[tokio::test]
async fn test_failed_fallback_is_partial_no_description() -> anyhow::Result<()> {
    let server = MockServer::start();
    mock_blue_door_listing(&server);
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent");
        then.status(429).json_body(serde_json::json!({
            "error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}
        }));
    });
    server.mock(|when, then| {
        when.method(GET).path("/v1beta/models");
        then.status(200).json_body(serde_json::json!({
            "models": [{"name": "models/gemini-1.5-flash", "supportedGenerationMethods": ["generateContent"]}]
        }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent");
        then.status(500).body("internal error");
    });

    let config = settings(&server);
    let (places, generator) = clients(&config);
    let (temp_dir, storage) = workspace(INPUT);

    let mut table = load_table(&storage, "in.csv").await?;
    let engine = EnrichEngine::new(storage, places, generator, &config, "out.csv");
    let summary = engine.run(&mut table, Some(1)).await;

    assert_eq!(summary.partial_no_description, 1);
    let raw = std::fs::read_to_string(temp_dir.path().join("out.csv"))?;
    assert!(raw.contains("Partial - No Description"));

    let record = &read_output(&temp_dir).records[0];
    assert_eq!(record.maps_url.as_deref(), Some("https://maps.google.com/?cid=42"));
    let message = record.error_message.as_deref().unwrap_or_default();
    assert!(message.starts_with("About section could not be generated. Error: "));
    assert!(message.contains("Quota exceeded"));
    Ok(())
}

#[tokio::test]
async fn test_missing_column_fails_before_any_output() {
    let (temp_dir, storage) = workspace("Business Name,Address\nBlue Door Cafe,12 High St\n");

    let err = load_table(&storage, "in.csv").await.unwrap_err();

    assert!(matches!(err, EnrichError::Load { .. }));
    assert!(err.to_string().contains("Telephone"));
    assert!(!temp_dir.path().join("out.csv").exists());
}

#[tokio::test]
async fn test_preflight_reports_denied_places_key() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/place/findplacefromtext/json")
            .query_param("input", "Google Headquarters");
        then.status(200).json_body(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }));
    });
    let hello_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/v1beta/models/gemini-2.0-flash:generateContent")
            .json_body_partial(r#"{"generationConfig": {"maxOutputTokens": 20}}"#);
        then.status(200).json_body(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "Hello!"}]}}]
        }));
    });

    let config = settings(&server);
    let (places, generator) = clients(&config);

    let report = run_preflight(Some(&places), Some(&generator), &config.generator).await;

    hello_mock.assert();
    assert!(!report.all_passed());
    assert!(report.generator.passed());
    assert_eq!(
        report.places.outcome,
        CheckOutcome::Failed("REQUEST_DENIED: The provided API key is invalid.".to_string())
    );
}
