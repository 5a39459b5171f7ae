//! HttpClient against an in-process mock of the metadata service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use serde_json::{json, Value};

use metadata_client::{
    ClientError, CreateLinkSchemaBody, CreateProxyInstanceBody, DeleteProxyInstancesBody,
    HttpClient, HttpClientConfig, MetadataClient,
};
use metadata_types::{
    DatasetId, InstanceId, ModelCreateParams, PropertyCreateParams, RecordValue, RecordValues,
    SchemaId,
};

#[derive(Debug, Clone)]
struct Recorded {
    method: String,
    path: String,
    authorization: Option<String>,
    accept: Option<String>,
    body: String,
}

impl Recorded {
    fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Clone, Default)]
struct MockService {
    requests: Arc<Mutex<Vec<Recorded>>>,
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
}

impl MockService {
    fn respond(&self, method: &str, path: &str, status: u16, body: impl Into<String>) {
        self.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            (status, body.into()),
        );
    }

    fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn only_request(&self) -> Recorded {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected one request, got {requests:?}");
        requests[0].clone()
    }
}

async fn handle(
    State(mock): State<MockService>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method: method.to_string(),
        path: uri.path().to_string(),
        authorization: header("authorization"),
        accept: header("accept"),
        body,
    };
    let key = (recorded.method.clone(), recorded.path.clone());
    mock.requests.lock().unwrap().push(recorded);

    let (status, body) = mock
        .responses
        .lock()
        .unwrap()
        .get(&key)
        .cloned()
        .unwrap_or((200, r#"{"name": "", "id": "default-id"}"#.to_string()));
    (StatusCode::from_u16(status).unwrap(), body)
}

async fn start() -> (MockService, HttpClient) {
    let mock = MockService::default();
    let app = Router::new().fallback(handle).with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let api = format!("http://{addr}");
    let api2 = format!("http://{addr}/v2");
    let client = HttpClient::new(HttpClientConfig::new(api, api2, "session-token")).unwrap();
    (mock, client)
}

fn dataset() -> DatasetId {
    DatasetId::from("N:dataset:1234")
}

#[tokio::test]
async fn create_model_posts_to_concepts_with_auth() {
    let (mock, client) = start().await;
    mock.respond(
        "POST",
        "/models/datasets/N:dataset:1234/concepts",
        201,
        r#"{"name": "subject", "id": "m-subject"}"#,
    );

    let params = ModelCreateParams {
        name: "subject".into(),
        display_name: "Subject".into(),
        ..Default::default()
    };
    let id = client.create_model(&dataset(), &params).await.unwrap();
    assert_eq!(id, SchemaId::from("m-subject"));

    let request = mock.only_request();
    assert_eq!(request.method, "POST");
    assert_eq!(request.authorization.as_deref(), Some("Bearer session-token"));
    assert_eq!(request.accept.as_deref(), Some("application/json"));
    assert_eq!(
        request.json(),
        json!({"name": "subject", "displayName": "Subject", "description": "", "locked": false})
    );
}

#[tokio::test]
async fn create_properties_puts_the_property_list() {
    let (mock, client) = start().await;
    mock.respond(
        "PUT",
        "/models/datasets/N:dataset:1234/concepts/m-1/properties",
        200,
        r#"[{"name": "name", "id": "p-1"}]"#,
    );

    let props = vec![PropertyCreateParams::new("name", "Name", json!("String"))];
    let ids = client
        .create_properties(&dataset(), &SchemaId::from("m-1"), &props)
        .await
        .unwrap();
    assert_eq!(ids, vec!["p-1".to_string()]);

    let body = mock.only_request().json();
    assert_eq!(body[0]["name"], "name");
    assert_eq!(body[0]["dataType"], "String");
}

#[tokio::test]
async fn create_and_update_record_paths() {
    let (mock, client) = start().await;
    mock.respond(
        "POST",
        "/models/datasets/N:dataset:1234/concepts/m-1/instances",
        201,
        r#"{"id": "r-new"}"#,
    );

    let values = RecordValues::from_iter([RecordValue::new("name", "Alice")]);
    let created = client
        .create_record(&dataset(), &SchemaId::from("m-1"), &values)
        .await
        .unwrap();
    assert_eq!(created, InstanceId::from("r-new"));

    client
        .update_record(
            &dataset(),
            &SchemaId::from("m-1"),
            &InstanceId::from("r-7"),
            &values,
        )
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].json(), json!({"values": [{"name": "name", "value": "Alice"}]}));
    assert_eq!(requests[1].method, "PUT");
    assert_eq!(
        requests[1].path,
        "/models/datasets/N:dataset:1234/concepts/m-1/instances/r-7"
    );
}

#[tokio::test]
async fn delete_records_decodes_partial_failures() {
    let (mock, client) = start().await;
    mock.respond(
        "DELETE",
        "/models/datasets/N:dataset:1234/concepts/m-1/instances",
        200,
        r#"{"success": ["r-1", "r-3"], "errors": [["r-2", "record is locked"]]}"#,
    );

    let ids: Vec<InstanceId> = ["r-1", "r-2", "r-3"].into_iter().map(InstanceId::from).collect();
    let response = client
        .delete_records(&dataset(), &SchemaId::from("m-1"), &ids)
        .await
        .unwrap();

    assert!(response.has_failures());
    assert_eq!(response.errors[0].0, InstanceId::from("r-2"));
    assert_eq!(mock.only_request().json(), json!(["r-1", "r-2", "r-3"]));
}

#[tokio::test]
async fn link_endpoints() {
    let (mock, client) = start().await;
    mock.respond(
        "POST",
        "/models/datasets/N:dataset:1234/concepts/m-sample/linked",
        201,
        r#"{"name": "derived_from", "id": "link-1"}"#,
    );

    let body = CreateLinkSchemaBody {
        name: "derived_from".into(),
        display_name: "Derived From".into(),
        to: SchemaId::from("m-subject"),
        position: 2,
    };
    let link_id = client
        .create_link_schema(&dataset(), &SchemaId::from("m-sample"), &body)
        .await
        .unwrap();
    assert_eq!(link_id, SchemaId::from("link-1"));

    client
        .delete_link_instance(
            &dataset(),
            &SchemaId::from("m-sample"),
            &InstanceId::from("r-1"),
            &InstanceId::from("li-9"),
        )
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(
        requests[0].json(),
        json!({"name": "derived_from", "displayName": "Derived From", "to": "m-subject", "position": 2})
    );
    assert_eq!(requests[1].method, "DELETE");
    assert_eq!(
        requests[1].path,
        "/models/datasets/N:dataset:1234/concepts/m-sample/instances/r-1/linked/li-9"
    );
}

#[tokio::test]
async fn proxy_endpoints() {
    let (mock, client) = start().await;

    client
        .create_proxy_relationship_schema(&dataset())
        .await
        .unwrap();
    client
        .create_proxy_instance(
            &dataset(),
            &CreateProxyInstanceBody::new(InstanceId::from("r-1"), "N:package:1"),
        )
        .await
        .unwrap();
    client
        .delete_proxy_instances(
            &dataset(),
            &DeleteProxyInstancesBody::new(InstanceId::from("r-1"), vec![InstanceId::from("px-1")]),
        )
        .await
        .unwrap();

    let requests = mock.requests();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].path, "/models/datasets/N:dataset:1234/relationships");
    assert_eq!(requests[0].json()["name"], "belongs_to");
    assert_eq!(
        requests[1].path,
        "/models/datasets/N:dataset:1234/proxy/package/instances"
    );
    assert_eq!(
        requests[1].json()["targets"][0]["linkTarget"]["ConceptInstance"]["id"],
        "r-1"
    );
    assert_eq!(requests[2].method, "DELETE");
    assert_eq!(
        requests[2].path,
        "/models/datasets/N:dataset:1234/proxy/package/instances/bulk"
    );
    assert_eq!(
        requests[2].json(),
        json!({"sourceRecordId": "r-1", "proxyInstanceIds": ["px-1"]})
    );
}

#[tokio::test]
async fn get_integration_uses_the_second_host() {
    let (mock, client) = start().await;
    mock.respond(
        "GET",
        "/v2/integrations/int-42",
        200,
        r#"{"uuid": "int-42", "applicationId": 7, "datasetNodeId": "N:dataset:1234", "packageIds": []}"#,
    );

    let integration = client.get_integration("int-42").await.unwrap();
    assert_eq!(integration.dataset_node_id, dataset());
    assert_eq!(integration.application_id, 7);
    assert_eq!(mock.only_request().method, "GET");
}

#[tokio::test]
async fn non_success_status_carries_status_and_body() {
    let (mock, client) = start().await;
    mock.respond(
        "DELETE",
        "/models/datasets/N:dataset:1234/concepts/m-1",
        409,
        "model has records",
    );

    let err = client
        .delete_model(&dataset(), &SchemaId::from("m-1"))
        .await
        .unwrap_err();
    match &err {
        ClientError::Status { status, body, .. } => {
            assert_eq!(*status, 409);
            assert_eq!(body, "model has records");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(err.to_string().contains("/concepts/m-1 returned 409"));
}

#[tokio::test]
async fn undecodable_response_is_a_decode_error() {
    let (mock, client) = start().await;
    mock.respond(
        "POST",
        "/models/datasets/N:dataset:1234/concepts",
        200,
        "not json",
    );

    let err = client
        .create_model(&dataset(), &ModelCreateParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn create_without_an_id_is_an_error() {
    let (mock, client) = start().await;
    mock.respond("POST", "/models/datasets/N:dataset:1234/concepts", 200, "{}");
    mock.respond(
        "POST",
        "/models/datasets/N:dataset:1234/concepts/m-1/instances",
        200,
        r#"{"name": "", "id": ""}"#,
    );

    let err = client
        .create_model(&dataset(), &ModelCreateParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingId { .. }), "{err:?}");
    assert!(err.to_string().ends_with("/concepts returned no id"), "{err}");

    let values = RecordValues::from_iter([RecordValue::new("name", "Alice")]);
    let err = client
        .create_record(&dataset(), &SchemaId::from("m-1"), &values)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingId { .. }), "{err:?}");
}

#[tokio::test]
async fn update_record_tolerates_a_response_without_an_id() {
    let (mock, client) = start().await;
    mock.respond(
        "PUT",
        "/models/datasets/N:dataset:1234/concepts/m-1/instances/r-1",
        200,
        "{}",
    );

    let values = RecordValues::from_iter([RecordValue::new("name", "Alice")]);
    client
        .update_record(
            &dataset(),
            &SchemaId::from("m-1"),
            &InstanceId::from("r-1"),
            &values,
        )
        .await
        .unwrap();
}
