//! Firestore REST document store
//!
//! Talks to the hosted document database over its v1 REST API. Plain JSON
//! field maps are encoded into Firestore's typed value format on the way out
//! and decoded on the way back, so the repository never sees the wire shape.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::{Document, DocumentStore, FieldOp, Fields, Query, Update};
use crate::error::{Result, StoreError};

/// Firestore REST base URL
pub const API_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Client-side pacing: 10 requests per second
const RATE_LIMIT_PER_SECOND: u32 = 10;

/// Page size for collection listing
const LIST_PAGE_SIZE: usize = 300;

/// Retry-After fallback when a 429 carries no header.
///
/// The value only feeds the error message, it does not steer retries.
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Firestore REST client implementing [`DocumentStore`]
pub struct FirestoreStore {
    http: HttpClient,
    base_url: String,
    project_id: String,
    api_key: Option<String>,
    id_token: Option<String>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<RawDocument>,
}

impl FirestoreStore {
    /// Create a new Firestore client for a project.
    ///
    /// `base_url` overrides the public endpoint, for emulators and tests.
    pub fn new(
        project_id: &str,
        api_key: Option<String>,
        id_token: Option<String>,
        base_url: Option<&str>,
    ) -> std::result::Result<Self, StoreError> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            base_url: base_url
                .unwrap_or(API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            project_id: project_id.to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            id_token: id_token.filter(|t| !t.is_empty()),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Resource name of the documents root, as used inside request bodies
    fn documents_name(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.documents_name(), suffix)
    }

    /// Send a request with pacing and credentials applied.
    async fn send(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> std::result::Result<Response, StoreError> {
        self.rate_limiter.until_ready().await;
        debug!("firestore: {} {}", method, url);

        let mut request = self.http.request(method, url).query(query);
        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key)]);
        }
        if let Some(ref token) = self.id_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    /// Parse a successful response, or map its status to a store error.
    async fn read_json<T: DeserializeOwned>(response: Response) -> std::result::Result<T, StoreError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse response: {}", e)));
        }
        Err(status_error(response).await)
    }

    async fn list_all(&self, collection: &str) -> std::result::Result<Vec<Document>, StoreError> {
        let url = self.url(&format!("/{}", collection));
        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self.send(Method::GET, &url, &query, None).await?;
            let page: ListResponse = Self::read_json(response).await?;
            for raw in page.documents {
                docs.push(decode_document(raw)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!("firestore: listed {} documents in {}", docs.len(), collection);
        Ok(docs)
    }

    async fn run_query(
        &self,
        collection: &str,
        query: &Query,
    ) -> std::result::Result<Vec<Document>, StoreError> {
        let body = structured_query(collection, query);
        let response = self
            .send(Method::POST, &self.url(":runQuery"), &[], Some(&body))
            .await?;
        let items: Vec<RunQueryItem> = Self::read_json(response).await?;

        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(decode_document)
            .collect()
    }
}

/// Build a `runQuery` body for a single-field filter and ordering.
fn structured_query(collection: &str, query: &Query) -> Value {
    let mut structured = Map::new();
    structured.insert("from".to_string(), json!([{ "collectionId": collection }]));

    if let Some((field, value)) = &query.filter {
        structured.insert(
            "where".to_string(),
            json!({
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(Some(field), value),
                }
            }),
        );
    }

    if let Some(field) = &query.order_desc {
        structured.insert(
            "orderBy".to_string(),
            json!([{ "field": { "fieldPath": field }, "direction": "DESCENDING" }]),
        );
    }

    json!({ "structuredQuery": structured })
}

/// Build a `commit` body carrying one atomic write for `update`.
fn commit_body(document_name: &str, update: &Update) -> Value {
    let mut fields = Map::new();
    let mut mask = Vec::new();
    let mut transforms = Vec::new();

    for op in &update.ops {
        match op {
            FieldOp::Set(field, value) => {
                fields.insert(field.clone(), encode_value(Some(field), value));
                mask.push(Value::String(field.clone()));
            }
            FieldOp::Append(field, values) => {
                let encoded: Vec<Value> = values.iter().map(|v| encode_value(None, v)).collect();
                transforms.push(json!({
                    "fieldPath": field,
                    "appendMissingElements": { "values": encoded },
                }));
            }
        }
    }

    let mut write = json!({
        "update": { "name": document_name, "fields": fields },
        "updateMask": { "fieldPaths": mask },
        "currentDocument": { "exists": true },
    });
    if !transforms.is_empty() {
        write["updateTransforms"] = Value::Array(transforms);
    }

    json!({ "writes": [write] })
}

/// Map a non-success response to a store error
async fn status_error(response: Response) -> StoreError {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
        StatusCode::FORBIDDEN => StoreError::Forbidden,
        StatusCode::NOT_FOUND => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Document not found".to_string());
            StoreError::NotFound(msg)
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            StoreError::RateLimit(Duration::from_secs(retry_after))
        }
        StatusCode::BAD_REQUEST
        | StatusCode::CONFLICT
        | StatusCode::PRECONDITION_FAILED
        | StatusCode::UNPROCESSABLE_ENTITY => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Bad request".to_string());
            StoreError::BadRequest(msg)
        }
        status if status.is_server_error() => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Server error: {}", status));
            StoreError::ServerError(msg)
        }
        _ => StoreError::InvalidResponse(format!("Unexpected status code: {}", status)),
    }
}

/// Whether a string field should travel as a native timestamp
fn is_timestamp_field(field: &str) -> bool {
    field.ends_with("At")
}

/// Encode a plain JSON value into Firestore's typed value format.
///
/// `field` is the enclosing field name. RFC 3339 strings in `*At` fields are
/// sent as `timestampValue` so the store can order on them.
pub fn encode_value(field: Option<&str>, value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => {
            let is_timestamp = field.is_some_and(is_timestamp_field)
                && chrono::DateTime::parse_from_rfc3339(s).is_ok();
            if is_timestamp {
                json!({ "timestampValue": s })
            } else {
                json!({ "stringValue": s })
            }
        }
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(|v| encode_value(None, v)).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Encode a field map
pub fn encode_fields(fields: &Fields) -> Map<String, Value> {
    fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(Some(k), v)))
        .collect()
}

/// Decode a Firestore typed value into plain JSON.
pub fn decode_value(value: &Value) -> std::result::Result<Value, StoreError> {
    let obj = value
        .as_object()
        .ok_or_else(|| StoreError::InvalidResponse(format!("Expected typed value, got {}", value)))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| StoreError::InvalidResponse("Empty typed value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or(false))),
        "integerValue" => {
            let parsed = match inner {
                Value::String(s) => s.parse::<i64>().ok(),
                Value::Number(n) => n.as_i64(),
                _ => None,
            };
            parsed
                .map(Value::from)
                .ok_or_else(|| StoreError::InvalidResponse(format!("Bad integerValue: {}", inner)))
        }
        "doubleValue" => Ok(inner
            .as_f64()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" | "geoPointValue" => {
            Ok(inner.clone())
        }
        "arrayValue" => {
            let items: Vec<Value> = match inner.get("values").and_then(Value::as_array) {
                Some(values) => values
                    .iter()
                    .map(decode_value)
                    .collect::<std::result::Result<_, _>>()?,
                None => Vec::new(),
            };
            Ok(Value::Array(items))
        }
        "mapValue" => {
            let fields = match inner.get("fields").and_then(Value::as_object) {
                Some(fields) => decode_fields(fields)?,
                None => Map::new(),
            };
            Ok(Value::Object(fields))
        }
        other => Err(StoreError::InvalidResponse(format!(
            "Unsupported value type: {}",
            other
        ))),
    }
}

/// Decode a typed field map
pub fn decode_fields(fields: &Map<String, Value>) -> std::result::Result<Fields, StoreError> {
    fields
        .iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

fn decode_document(raw: RawDocument) -> std::result::Result<Document, StoreError> {
    let id = raw
        .name
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| StoreError::InvalidResponse(format!("Bad document name: {}", raw.name)))?
        .to_string();
    Ok(Document {
        id,
        fields: decode_fields(&raw.fields)?,
    })
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let docs = if query.filter.is_none() && query.order_desc.is_none() {
            self.list_all(collection).await?
        } else {
            self.run_query(collection, query).await?
        };
        Ok(docs)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let url = self.url(&format!("/{}/{}", collection, id));
        let response = self.send(Method::GET, &url, &[], None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let raw: RawDocument = Self::read_json(response).await?;
        Ok(Some(decode_document(raw)?))
    }

    async fn create(&self, collection: &str, fields: Fields) -> Result<String> {
        let url = self.url(&format!("/{}", collection));
        let body = json!({ "fields": encode_fields(&fields) });
        let response = self.send(Method::POST, &url, &[], Some(&body)).await?;
        let raw: RawDocument = Self::read_json(response).await?;
        let doc = decode_document(raw)?;
        debug!("firestore: created {}/{}", collection, doc.id);
        Ok(doc.id)
    }

    async fn update(&self, collection: &str, id: &str, update: &Update) -> Result<()> {
        let name = format!("{}/{}/{}", self.documents_name(), collection, id);
        let body = commit_body(&name, update);
        let response = self
            .send(Method::POST, &self.url(":commit"), &[], Some(&body))
            .await?;
        let _: Value = Self::read_json(response).await?;
        Ok(())
    }
}
