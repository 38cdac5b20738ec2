mod common;

use axum::{extract::Path, http::HeaderMap, http::StatusCode, routing::get, Json, Router};
use serde_json::{json, Value};

async fn verify(Path(code): Path<String>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    assert!(
        headers.get("authorization").is_none(),
        "verification must be anonymous"
    );
    if code != "AGR-0100" {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "Batch not found" })));
    }
    (
        StatusCode::OK,
        Json(json!({
            "batchHashValid": true,
            "eventChainValid": true,
            "batch": {
                "batchId": "AGR-0100",
                "product": { "name": "Durum Wheat", "type": "grain" },
                "weight": 50,
                "weightUnit": "kg",
                "origin": { "farm": "Sunrise Farm", "location": "Indore" },
                "certifications": [{ "name": "Organic Certified" }],
                "blockchain": { "hash": "0x9f86d081884c7d659a2feaa0c55ad015a3bf4f1b" },
                "createdAt": "2024-03-01T06:00:00Z",
                "events": [
                    { "id": 1, "type": "harvested", "description": "Cut and threshed",
                      "location": "Indore", "timestamp": "2024-03-01T09:00:00Z", "actor": "Asha" }
                ],
                "custodyChain": [
                    { "actor": "Ravi Kumar", "role": "PROCESSOR", "organization": "Shakti Mills",
                      "action": "Picked up for milling", "timestamp": "2024-03-01T10:00:00Z",
                      "location": "Dewas", "fromActor": "Asha Patel" }
                ]
            }
        })),
    )
}

async fn dashboard() -> String {
    let backend = common::serve(Router::new().route("/verify/batch/:code", get(verify))).await;
    common::spawn_dashboard(&backend).await
}

#[tokio::test]
async fn verified_batch_shows_merged_journey() {
    let base = dashboard().await;
    let response = reqwest::get(format!("{}/verify/AGR-0100", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();

    assert!(body.contains("Authentic Product"));
    assert!(body.contains("Verified on Chain"));
    assert!(body.contains("Organic Certified"));
    assert!(body.contains("0x9f86d081…bf4f1b"));

    let harvest = body.find("Cut and threshed").unwrap();
    let pickup = body.find("Picked up for milling").unwrap();
    assert!(harvest < pickup, "harvest event must precede the pickup");
    assert!(body.contains("Ravi Kumar (Shakti Mills) • Received from Asha Patel"));
}

#[tokio::test]
async fn query_link_and_path_link_agree() {
    let base = dashboard().await;
    let by_query = reqwest::get(format!("{}/verify?id=AGR-0100", base)).await.unwrap();
    assert_eq!(by_query.status(), 200);
    assert!(by_query.text().await.unwrap().contains("Durum Wheat"));
}

#[tokio::test]
async fn unknown_batch_fails_verification() {
    let base = dashboard().await;
    let response = reqwest::get(format!("{}/verify/FAKE-1", base)).await.unwrap();
    assert_eq!(response.status(), 404);
    assert!(response.text().await.unwrap().contains("Verification Failed"));
}

#[tokio::test]
async fn empty_search_shows_only_the_form() {
    let base = dashboard().await;
    let response = reqwest::get(format!("{}/verify", base)).await.unwrap();
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("Batch ID or QR code"));
    assert!(!body.contains("Verification Failed"));
}
