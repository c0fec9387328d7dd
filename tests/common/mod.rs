use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use resource_sdk::{
    common_routes, mounted_resource_routes, parse_config, resolve, AppState, BroadcastEventSink,
    MemoryRepository,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const MODEL: &str = r#"{
    "route": {"prefix": "/api"},
    "entities": [
        {"name": "Order", "fields": [
            {"name": "reference", "kind": "string", "rules": {"required": true}},
            {"name": "status", "kind": "string", "default": "draft", "rules": {"allowed": ["draft", "paid"]}}
        ]},
        {"name": "Tag", "fields": [{"name": "label", "kind": "string"}]},
        {"name": "OrderItem", "fields": [
            {"name": "order", "kind": {"relation": "Order"}, "rules": {"required": true}},
            {"name": "quantity", "kind": "integer", "default": 1, "rules": {"minimum": 1}},
            {"name": "tags", "kind": {"relations": "Tag"}, "default": []}
        ]}
    ]
}"#;

pub struct TestApp {
    pub router: Router,
    pub events: BroadcastEventSink,
}

pub fn app() -> TestApp {
    let model = Arc::new(resolve(&parse_config(MODEL).unwrap()).unwrap());
    let events = BroadcastEventSink::new(64);
    let state = AppState::new(
        model,
        Arc::new(MemoryRepository::new(20)),
        Arc::new(events.clone()),
    );
    TestApp {
        router: common_routes().merge(mounted_resource_routes(state, 64 * 1024)),
        events,
    }
}

impl TestApp {
    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Two orders, three items: items 1 and 2 belong to order 1, item 3 to order 2.
    pub async fn seed(&self) {
        for reference in ["A-1", "B-2"] {
            let (status, _) = self
                .send(Method::POST, "/api/orders", Some(serde_json::json!({"reference": reference})))
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }
        for (order, quantity) in [(1, 2), (1, 3), (2, 4)] {
            let (status, _) = self
                .send(
                    Method::POST,
                    &format!("/api/orders/{}/order-items", order),
                    Some(serde_json::json!({"order": {"id": order}, "quantity": quantity})),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }
    }
}
