use learnhub_core::model::curriculum::{ClassLevel, Curriculum, HierarchyLevel, HierarchyNode};
use learnhub_core::remote::{AuthRemote, ContentRemote, LoginRequest};
use learnhub_core::{CoreConfig, HttpApiClient, RemoteError};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server_uri: &str, token: Option<&str>) -> HttpApiClient {
    let config = CoreConfig {
        api_base_url: format!("{server_uri}/v1"),
        ..CoreConfig::default()
    };
    HttpApiClient::new(&config)
        .unwrap()
        .with_token(token.map(str::to_string))
}

async fn blocking<T, F>(call: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(call).await.unwrap()
}

fn grade_four() -> serde_json::Value {
    json!({
        "id": "grade-4",
        "name": "Grade 4",
        "curriculum": "cbc",
        "description": "Upper primary",
        "order": 4
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_classes_sends_bearer_token_and_decodes_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/classes"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([grade_four()])))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let classes = blocking(move || client_for(&uri, Some("tok-123")).fetch_classes())
        .await
        .unwrap();

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].id, "grade-4");
    assert_eq!(classes[0].curriculum, Curriculum::Cbc);
}

#[tokio::test(flavor = "multi_thread")]
async fn nested_lists_use_parent_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/classes/grade-4/subjects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "sci-4",
            "class_id": "grade-4",
            "name": "Science"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/subtopics/plants-parts/contents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (subjects, contents) = blocking(move || {
        let api = client_for(&uri, None);
        (api.fetch_subjects("grade-4"), api.fetch_contents("plants-parts"))
    })
    .await;

    let subjects = subjects.unwrap();
    assert_eq!(subjects[0].name, "Science");
    assert_eq!(subjects[0].description, "");
    assert!(contents.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn error_status_carries_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/topics/missing/subtopics"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Topic not found" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/subjects/sci-4/topics"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let uri = server.uri();
    let (missing, unavailable) = blocking(move || {
        let api = client_for(&uri, None);
        (api.fetch_subtopics("missing"), api.fetch_topics("sci-4"))
    })
    .await;

    let err = missing.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(
        err,
        RemoteError::Status {
            status: 404,
            message: "Topic not found".to_string()
        }
    );
    match unavailable.unwrap_err() {
        RemoteError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/classes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = blocking(move || client_for(&uri, None).fetch_classes()).await;
    assert!(matches!(result, Err(RemoteError::Decode(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_posts_credentials_and_returns_session_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/login"))
        .and(body_json(json!({ "email": "wanjiku@example.co.ke", "password": "secret1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {
                "id": "u-1",
                "name": "Wanjiku",
                "email": "wanjiku@example.co.ke",
                "role": "student"
            },
            "token": "tok-abc"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/logout"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let (login, logout) = blocking(move || {
        let api = client_for(&uri, None);
        let login = api.login(&LoginRequest {
            email: "wanjiku@example.co.ke".to_string(),
            password: "secret1".to_string(),
        });
        (login, api.logout("tok-abc"))
    })
    .await;

    let response = login.unwrap();
    assert_eq!(response.token, "tok-abc");
    assert_eq!(response.user.school, None);
    logout.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn node_writes_target_collection_paths() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/classes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(grade_four()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/classes/grade-4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(grade_four()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/classes/grade-4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let node = HierarchyNode::Class(ClassLevel {
        id: "grade-4".to_string(),
        name: "Grade 4".to_string(),
        curriculum: Curriculum::Cbc,
        description: String::new(),
        order: 4,
    });
    let uri = server.uri();
    let (created, updated, deleted) = blocking(move || {
        let api = client_for(&uri, Some("teacher-token"));
        (
            api.create_node(&node),
            api.update_node(&node),
            api.delete_node(HierarchyLevel::Class, "grade-4"),
        )
    })
    .await;

    match created.unwrap() {
        HierarchyNode::Class(class) => assert_eq!(class.description, "Upper primary"),
        other => panic!("unexpected node: {other:?}"),
    }
    assert_eq!(updated.unwrap().id(), "grade-4");
    deleted.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backend_is_a_network_error() {
    let result = blocking(|| client_for("http://127.0.0.1:9", None).fetch_classes()).await;
    assert!(matches!(result, Err(RemoteError::Network(_))));
}
