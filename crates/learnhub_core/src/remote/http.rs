//! REST/JSON client for the LearnHub backend.
//!
//! # Responsibility
//! - Issue blocking HTTP calls for auth and curriculum endpoints.
//! - Attach the bearer token of the active session when present.
//!
//! # Invariants
//! - Non-2xx statuses become `RemoteError::Status` with the server's
//!   `message` (or `error`) field when the body carries one.
//! - Callers run these methods off the UI thread; they block until the
//!   response or the configured timeout.

use super::{
    AuthRemote, AuthResponse, ContentRemote, LoginRequest, RegisterRequest, RemoteError,
    RemoteResult,
};
use crate::config::CoreConfig;
use crate::model::curriculum::{
    ClassLevel, Content, HierarchyLevel, HierarchyNode, Subject, Subtopic, Topic,
};
use log::{debug, warn};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Instant;

const MAX_ERROR_MESSAGE_CHARS: usize = 200;

pub struct HttpApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpApiClient {
    /// Builds a client from core configuration.
    pub fn new(config: &CoreConfig) -> RemoteResult<Self> {
        let base_url = Url::parse(config.api_base_url.trim()).map_err(|err| {
            RemoteError::Network(format!(
                "invalid api base url `{}`: {err}",
                config.api_base_url
            ))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RemoteError::Network(format!(
                "api base url `{base_url}` cannot carry paths"
            )));
        }

        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("learnhub-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(map_transport_error)?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    /// Returns a client that sends `Authorization: Bearer <token>`.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|value| !value.trim().is_empty());
        self
    }

    /// Resolves path segments against the base URL, percent-encoding each one.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.client.request(method, self.endpoint(segments));
        match self.token.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn execute(&self, label: &str, builder: RequestBuilder) -> RemoteResult<Response> {
        let started_at = Instant::now();
        let response = builder.send().map_err(|err| {
            warn!(
                "event=http_request module=remote status=error endpoint={label} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
            map_transport_error(err)
        })?;

        let status = response.status();
        debug!(
            "event=http_request module=remote status=done endpoint={label} http_status={} duration_ms={}",
            status.as_u16(),
            started_at.elapsed().as_millis()
        );

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        Err(RemoteError::Status {
            status: status.as_u16(),
            message: error_message_from_body(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> RemoteResult<T> {
        let label = segments.join("/");
        let response = self.execute(&label, self.request(Method::GET, segments))?;
        decode(response)
    }

    fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> RemoteResult<T> {
        let label = format!("{} {}", method, segments.join("/"));
        let response = self.execute(&label, self.request(method, segments).json(body))?;
        decode(response)
    }

    fn send_empty(&self, method: Method, segments: &[&str]) -> RemoteResult<()> {
        let label = format!("{} {}", method, segments.join("/"));
        self.execute(&label, self.request(method, segments))?;
        Ok(())
    }

    fn write_node(&self, method: Method, node: &HierarchyNode) -> RemoteResult<HierarchyNode> {
        let collection = node.level().collection();
        let id = node.id().to_string();
        let segments: Vec<&str> = if method == Method::POST {
            vec![collection]
        } else {
            vec![collection, id.as_str()]
        };

        match node {
            HierarchyNode::Class(value) => self
                .send_json::<_, ClassLevel>(method, &segments, value)
                .map(HierarchyNode::Class),
            HierarchyNode::Subject(value) => self
                .send_json::<_, Subject>(method, &segments, value)
                .map(HierarchyNode::Subject),
            HierarchyNode::Topic(value) => self
                .send_json::<_, Topic>(method, &segments, value)
                .map(HierarchyNode::Topic),
            HierarchyNode::Subtopic(value) => self
                .send_json::<_, Subtopic>(method, &segments, value)
                .map(HierarchyNode::Subtopic),
            HierarchyNode::Content(value) => self
                .send_json::<_, Content>(method, &segments, value)
                .map(HierarchyNode::Content),
        }
    }
}

impl AuthRemote for HttpApiClient {
    fn login(&self, request: &LoginRequest) -> RemoteResult<AuthResponse> {
        self.send_json(Method::POST, &["auth", "login"], request)
    }

    fn register(&self, request: &RegisterRequest) -> RemoteResult<AuthResponse> {
        self.send_json(Method::POST, &["auth", "register"], request)
    }

    fn logout(&self, token: &str) -> RemoteResult<()> {
        let builder = self
            .client
            .request(Method::POST, self.endpoint(&["auth", "logout"]))
            .bearer_auth(token);
        self.execute("auth/logout", builder)?;
        Ok(())
    }
}

impl ContentRemote for HttpApiClient {
    fn fetch_classes(&self) -> RemoteResult<Vec<ClassLevel>> {
        self.get_json(&["classes"])
    }

    fn fetch_subjects(&self, class_id: &str) -> RemoteResult<Vec<Subject>> {
        self.get_json(&["classes", class_id, "subjects"])
    }

    fn fetch_topics(&self, subject_id: &str) -> RemoteResult<Vec<Topic>> {
        self.get_json(&["subjects", subject_id, "topics"])
    }

    fn fetch_subtopics(&self, topic_id: &str) -> RemoteResult<Vec<Subtopic>> {
        self.get_json(&["topics", topic_id, "subtopics"])
    }

    fn fetch_contents(&self, subtopic_id: &str) -> RemoteResult<Vec<Content>> {
        self.get_json(&["subtopics", subtopic_id, "contents"])
    }

    fn create_node(&self, node: &HierarchyNode) -> RemoteResult<HierarchyNode> {
        self.write_node(Method::POST, node)
    }

    fn update_node(&self, node: &HierarchyNode) -> RemoteResult<HierarchyNode> {
        self.write_node(Method::PUT, node)
    }

    fn delete_node(&self, level: HierarchyLevel, id: &str) -> RemoteResult<()> {
        self.send_empty(Method::DELETE, &[level.collection(), id])
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> RemoteResult<T> {
    response
        .json::<T>()
        .map_err(|err| RemoteError::Decode(err.to_string()))
}

fn map_transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout
    } else if err.is_decode() {
        RemoteError::Decode(err.to_string())
    } else {
        RemoteError::Network(err.to_string())
    }
}

/// Extracts `message` or `error` from a JSON error body, else the trimmed raw text.
pub(crate) fn error_message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let message = match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(*key).and_then(|field| field.as_str()))
            .map(str::to_string)
            .unwrap_or_else(|| trimmed.to_string()),
        Err(_) => trimmed.to_string(),
    };

    Some(message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect())
}
