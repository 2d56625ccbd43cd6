//! End-to-end tests for the prediction endpoint.
//!
//! Each test drives the real router with an in-memory multipart upload and
//! inspects the zip archive that comes back. No filesystem, no sockets.

use std::io::{Cursor, Read};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use tower::ServiceExt;
use zip::ZipArchive;

use tarifa::api::{create_router, AppState, ARCHIVE_DOWNLOAD_NAME};
use tarifa::archive::{PREDICTIONS_TXT, PREDICTIONS_XLSX, PREDICTION_COLUMN};
use tarifa::model::FareModel;
use tarifa::table::{Cell, RawTable};

const BOUNDARY: &str = "tarifa-e2e-boundary";

fn demo_model() -> FareModel {
    FareModel::from_json(
        br#"{
            "name": "e2e-fare",
            "version": "1",
            "feature_names": ["duration_mins", "total_stops", "Airline_IndiGo"],
            "weights": [10.0, 500.0, -250.0],
            "intercept": 1000.0
        }"#,
    )
    .expect("demo model")
}

fn flights_workbook() -> (RawTable, Vec<u8>) {
    let table = RawTable::new(
        vec![
            "Airline".to_string(),
            "Duration".to_string(),
            "Total_Stops".to_string(),
        ],
        vec![
            vec![
                Cell::Text("IndiGo".to_string()),
                Cell::Text("2h 50m".to_string()),
                Cell::Text("non-stop".to_string()),
            ],
            vec![
                Cell::Text("Jet Airways".to_string()),
                Cell::Text("7h 25m".to_string()),
                Cell::Text("2 stops".to_string()),
            ],
            vec![
                Cell::Text("IndiGo".to_string()),
                Cell::Text("1h".to_string()),
                Cell::Text("1 stop".to_string()),
            ],
        ],
    );
    let bytes = table.to_xlsx().expect("encode workbook");
    (table, bytes)
}

fn upload_request(filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; \
             name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("request")
}

async fn response_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

/// Expected predictions for `flights_workbook` under `demo_model`.
fn expected_predictions() -> Vec<f64> {
    vec![
        1000.0 + 170.0 * 10.0 - 250.0,          // IndiGo non-stop, 2h50m
        1000.0 + 445.0 * 10.0 + 2.0 * 500.0,    // Jet Airways, 2 stops
        1000.0 + 60.0 * 10.0 + 500.0 - 250.0,   // IndiGo, 1 stop, 1h
    ]
}

#[tokio::test]
async fn test_predict_returns_archive_with_both_members() {
    let (_, workbook) = flights_workbook();
    let app = create_router(AppState::new(demo_model()));

    let response = app
        .oneshot(upload_request("flights.xlsx", &workbook))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .expect("disposition header");
    assert_eq!(
        disposition,
        format!("attachment; filename=\"{ARCHIVE_DOWNLOAD_NAME}\"")
    );

    let bytes = response_bytes(response).await;
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let names: Vec<&str> = archive.file_names().collect();
    assert!(names.contains(&PREDICTIONS_TXT));
    assert!(names.contains(&PREDICTIONS_XLSX));
    assert_eq!(names.len(), 2);
}

#[tokio::test]
async fn test_text_member_lists_predictions_in_row_order() {
    let (_, workbook) = flights_workbook();
    let app = create_router(AppState::new(demo_model()));

    let response = app
        .oneshot(upload_request("flights.xlsx", &workbook))
        .await
        .expect("response");
    let bytes = response_bytes(response).await;

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let mut txt = String::new();
    archive
        .by_name(PREDICTIONS_TXT)
        .expect("txt member")
        .read_to_string(&mut txt)
        .expect("read txt");

    let values: Vec<f64> = txt.lines().map(|l| l.parse().expect("number")).collect();
    assert_eq!(values, expected_predictions());
}

#[tokio::test]
async fn test_spreadsheet_member_roundtrip() {
    let (table, workbook) = flights_workbook();
    let app = create_router(AppState::new(demo_model()));

    let response = app
        .oneshot(upload_request("flights.xlsx", &workbook))
        .await
        .expect("response");
    let bytes = response_bytes(response).await;

    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let mut xlsx = Vec::new();
    archive
        .by_name(PREDICTIONS_XLSX)
        .expect("xlsx member")
        .read_to_end(&mut xlsx)
        .expect("read xlsx");

    let augmented = RawTable::from_xlsx(&xlsx).expect("decode augmented");
    // exactly one more column than the input, appended last
    assert_eq!(augmented.headers().len(), table.headers().len() + 1);
    assert_eq!(
        augmented.headers().last().map(String::as_str),
        Some(PREDICTION_COLUMN)
    );
    assert_eq!(augmented.row_count(), table.row_count());

    // original cells survive untouched
    assert_eq!(augmented.rows()[1][0].as_text(), Some("Jet Airways"));

    // the added column equals the prediction vector element-wise
    let column: Vec<f64> = augmented
        .column(PREDICTION_COLUMN)
        .expect("prediction column")
        .iter()
        .map(|c| c.as_number().expect("numeric"))
        .collect();
    assert_eq!(column, expected_predictions());
}

#[tokio::test]
async fn test_header_only_workbook_yields_empty_predictions() {
    let table = RawTable::new(
        vec!["Airline".to_string(), "Duration".to_string()],
        vec![],
    );
    let workbook = table.to_xlsx().expect("encode");
    let app = create_router(AppState::new(demo_model()));

    let response = app
        .oneshot(upload_request("flights.xlsx", &workbook))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response_bytes(response).await;
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open archive");
    let mut txt = String::new();
    archive
        .by_name(PREDICTIONS_TXT)
        .expect("txt member")
        .read_to_string(&mut txt)
        .expect("read txt");
    assert!(txt.is_empty());
}

#[tokio::test]
async fn test_uppercase_extension_is_accepted() {
    let (_, workbook) = flights_workbook();
    let app = create_router(AppState::new(demo_model()));

    let response = app
        .oneshot(upload_request("FLIGHTS.XLSX", &workbook))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_extension_never_reaches_parser() {
    // a perfectly valid workbook under the wrong name must still be rejected
    let (_, workbook) = flights_workbook();
    let app = create_router(AppState::new(demo_model()));

    let response = app
        .oneshot(upload_request("flights.xls", &workbook))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unavailable_model_survives_repeated_calls() {
    let (_, workbook) = flights_workbook();
    let app = create_router(AppState::unavailable());

    for _ in 0..3 {
        let response = app
            .clone()
            .oneshot(upload_request("flights.xlsx", &workbook))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
