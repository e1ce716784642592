#![allow(clippy::unwrap_used)]
// Integration tests for `ArdoqClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aqsync_api::types::{BatchComponent, BatchRequest, BulkDeleteRequest, FieldType, NewField};
use aqsync_api::{ArdoqClient, Error, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ArdoqClient) {
    let server = MockServer::start().await;
    let transport = TransportConfig {
        rate_limit: None,
        ..TransportConfig::default()
    };
    let token: secrecy::SecretString = "s3cret".to_string().into();
    let client = ArdoqClient::from_token(&server.uri(), "acme", &token, &transport).unwrap();
    (server, client)
}

fn component_json(id: &str, custom_id: &str) -> serde_json::Value {
    json!({
        "_id": id,
        "_version": 1,
        "rootWorkspace": "ws1",
        "name": format!("Component {custom_id}"),
        "description": null,
        "type": "Service",
        "typeId": "p1",
        "parent": null,
        "customId": custom_id,
        "ardoq": { "entity-type": "component" }
    })
}

// ── Request envelope ────────────────────────────────────────────────

#[tokio::test]
async fn test_every_request_carries_token_and_org() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/model/m1"))
        .and(header("Authorization", "Token token=s3cret"))
        .and(query_param("org", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "m1",
            "name": "Services",
            "root": {},
            "referenceTypes": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let model = client.get_model("m1").await.unwrap();
    assert_eq!(model.id, "m1");
}

// ── Workspaces ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_aggregated_workspace() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/workspace/ws1/aggregated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "ws1",
            "name": "Platform",
            "componentModel": "m1",
            "components": [component_json("c1", "api"), component_json("c2", "db")],
            "references": [{
                "_id": "r1",
                "type": 2,
                "rootWorkspace": "ws1",
                "targetWorkspace": "ws1",
                "source": "c1",
                "target": "c2",
                "customId": "api-db"
            }]
        })))
        .mount(&server)
        .await;

    let ws = client.get_aggregated_workspace("ws1").await.unwrap();
    assert_eq!(ws.component_model, "m1");
    assert_eq!(ws.components.len(), 2);
    assert_eq!(ws.references[0].type_id, 2);
    assert_eq!(ws.references[0].order, None);
}

// ── Models ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_model_puts_full_model() {
    let (server, client) = setup().await;

    let stored = json!({
        "_id": "m1",
        "_version": 4,
        "name": "Services",
        "root": { "p1": { "id": "p1", "name": "Service", "index": 0, "level": 1, "children": {} } },
        "referenceTypes": { "1": { "id": 1, "name": "Calls", "line": "solid", "lineEnding": "both" } },
        "category": "other"
    });

    Mock::given(method("PUT"))
        .and(path("/api/model/m1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&stored))
        .expect(1)
        .mount(&server)
        .await;

    let model: aqsync_api::types::Model = serde_json::from_value(stored).unwrap();
    let updated = client.update_model(&model).await.unwrap();
    assert_eq!(updated.version, Some(4));
    assert_eq!(updated.extra.get("category"), Some(&json!("other")));
}

// ── Fields ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_fields_includes_common() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/field"))
        .and(query_param("includeCommon", "true"))
        .and(query_param("org", "acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "_id": "f1",
            "name": "customId",
            "label": "Integration entity id",
            "type": "Text",
            "model": "m1",
            "global": true
        }])))
        .mount(&server)
        .await;

    let fields = client.get_fields().await.unwrap();
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].field_type, FieldType::Text);
    assert_eq!(fields[0].global, Some(true));
}

#[tokio::test]
async fn test_create_field_posts_definition() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/field"))
        .and(body_json(json!({
            "type": "Text",
            "name": "owner",
            "label": "Owner",
            "model": "m1",
            "description": null,
            "global": true,
            "globalref": true
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "_id": "f9",
            "name": "owner",
            "label": "Owner",
            "type": "Text",
            "model": "m1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let field = client
        .create_field(&NewField {
            field_type: FieldType::Text,
            name: "owner".into(),
            label: "Owner".into(),
            model: "m1".into(),
            description: None,
            global: true,
            globalref: true,
        })
        .await
        .unwrap();
    assert_eq!(field.id, "f9");
}

// ── Graph ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_batch_create_returns_assigned_ids() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "components": { "api": "c100" },
            "references": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = BatchRequest::create(
        vec![BatchComponent {
            batch_id: "api".into(),
            custom_id: "api".into(),
            root_workspace: "ws1".into(),
            type_id: "p1".into(),
            name: "API".into(),
            description: None,
            parent: None,
            fields: serde_json::Map::new(),
        }],
        vec![],
    );
    let created = client.batch_create(&request).await.unwrap();
    assert_eq!(created.components.get("api").map(String::as_str), Some("c100"));
    assert!(created.references.is_empty());
}

#[tokio::test]
async fn test_update_component_round_trips_custom_fields() {
    let (server, client) = setup().await;

    let mut body = component_json("c1", "api");
    body["owner-team"] = json!("platform");

    Mock::given(method("PUT"))
        .and(path("/api/component/c1"))
        .and(body_json(&body))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(1)
        .mount(&server)
        .await;

    let component: aqsync_api::types::Component = serde_json::from_value(body).unwrap();
    let updated = client.update_component(&component).await.unwrap();
    assert_eq!(updated, component);
}

#[tokio::test]
async fn test_bulk_delete_sends_body_and_reports_cascade() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/component"))
        .and(body_json(json!({ "componentIds": ["c1"], "requestId": "run-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "clientRequestId": "run-1",
            "componentIds": ["c1"],
            "referenceIds": ["r1", "r2"],
            "updatedTags": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let deleted = client
        .bulk_delete_components(&BulkDeleteRequest {
            component_ids: vec!["c1".into()],
            request_id: Some("run-1".into()),
        })
        .await
        .unwrap();
    assert_eq!(deleted.reference_ids, vec!["r1", "r2"]);
    assert_eq!(deleted.client_request_id.as_deref(), Some("run-1"));
}

#[tokio::test]
async fn test_delete_reference_accepts_no_content() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/reference/r9"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.delete_reference("r9").await.unwrap();
}

// ── Error handling ──────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/model/m1"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_model("m1").await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_api_error_keeps_request_context() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/component/c1"))
        .respond_with(ResponseTemplate::new(422).set_body_string("typeId is invalid"))
        .mount(&server)
        .await;

    let component: aqsync_api::types::Component =
        serde_json::from_value(component_json("c1", "api")).unwrap();
    let err = client.update_component(&component).await.unwrap_err();

    match err {
        Error::Api {
            method,
            url,
            status,
            request_body,
            response_body,
        } => {
            assert_eq!(method, "PUT");
            assert!(url.contains("/api/component/c1"), "url was {url}");
            assert_eq!(status, 422);
            assert!(request_body.unwrap().contains("\"customId\":\"api\""));
            assert_eq!(response_body, "typeId is invalid");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_is_classified() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/workspace/missing/aggregated"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let err = client
        .get_aggregated_workspace("missing")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_transient());
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/field"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.get_fields().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>oops</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}
