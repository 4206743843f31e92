//! Resource client for the clinic backend.
//!
//! Every mutating call runs the request body through
//! [`prepare_payload`](crate::engine::prepare::prepare_payload) before it is
//! handed to the [`Transport`]. Read responses are returned as the backend
//! formatted them.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::error::{ApiError, TransportError};
use crate::domain::resource::{ListQuery, Operation, Resource};
use crate::engine::prepare::prepare_payload;
use crate::util::time::{NormalizeOptions, local_day_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

/// Executes one HTTP exchange.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request)
    }
}

/// `{ "_id": ... }` returned by a successful create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedId {
    #[serde(rename = "_id")]
    pub id: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient<T> {
    transport: T,
    base_url: String,
    options: NormalizeOptions,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T, base_url: impl Into<String>, options: NormalizeOptions) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            options,
        }
    }

    pub fn options(&self) -> NormalizeOptions {
        self.options
    }

    /// `GET <collection>[?filters]`.
    pub fn list(&self, resource: Resource, query: &ListQuery) -> Result<Vec<Value>, ApiError> {
        if let Some(key) = query.unsupported_key(resource) {
            return Err(ApiError::InvalidFilter {
                resource,
                key: key.to_string(),
            });
        }
        let path = format!("{}{}", resource.path(), query.to_query_string());
        let value = self.execute(resource, HttpMethod::Get, &path, None)?;
        match value {
            Some(value) => Ok(serde_json::from_value(value)?),
            None => Ok(Vec::new()),
        }
    }

    /// Appointments whose `date_time` falls inside one local calendar day.
    pub fn appointments_on(&self, day: NaiveDate) -> Result<Vec<Value>, ApiError> {
        let (date_from, date_to) = local_day_bounds(day, self.options.zone)?;
        let query = ListQuery::new()
            .with("date_from", date_from)
            .with("date_to", date_to);
        self.list(Resource::Appointments, &query)
    }

    /// `GET <collection>/<id>`.
    pub fn get(&self, resource: Resource, id: &str) -> Result<Value, ApiError> {
        let path = item_path(resource, id)?;
        self.execute(resource, HttpMethod::Get, &path, None)?
            .ok_or(ApiError::EmptyResponse { resource })
    }

    /// `POST <collection>` with a prepared body.
    pub fn create<B: Serialize + ?Sized>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<CreatedId, ApiError> {
        let prepared = self.prepare(resource, body)?;
        let value = self
            .execute(resource, HttpMethod::Post, &resource.path(), Some(prepared))?
            .ok_or(ApiError::EmptyResponse { resource })?;
        let created: CreatedId = serde_json::from_value(value)?;
        debug!(resource = %resource, id = %created.id, "created");
        Ok(created)
    }

    /// Create, then fetch the stored document back.
    pub fn create_and_fetch<B: Serialize + ?Sized>(
        &self,
        resource: Resource,
        body: &B,
    ) -> Result<Value, ApiError> {
        let created = self.create(resource, body)?;
        self.get(resource, &created.id)
    }

    /// `PATCH <collection>/<id>` with a prepared partial body. A `204`
    /// yields `None`.
    pub fn update<B: Serialize + ?Sized>(
        &self,
        resource: Resource,
        id: &str,
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        ensure_supported(resource, Operation::Update)?;
        let path = item_path(resource, id)?;
        let prepared = self.prepare(resource, body)?;
        self.execute(resource, HttpMethod::Patch, &path, Some(prepared))
    }

    /// `DELETE <collection>/<id>`, no body.
    pub fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
        ensure_supported(resource, Operation::Delete)?;
        let path = item_path(resource, id)?;
        self.execute(resource, HttpMethod::Delete, &path, None)?;
        Ok(())
    }

    fn prepare<B: Serialize + ?Sized>(&self, resource: Resource, body: &B) -> Result<Value, ApiError> {
        let value = serde_json::to_value(body)?;
        Ok(prepare_payload(value, resource.date_fields(), self.options)?)
    }

    fn execute(
        &self,
        resource: Resource,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Option<Value>, ApiError> {
        let body = body.map(|value| serde_json::to_string(&value)).transpose()?;
        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers: vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Accept".to_string(), "application/json".to_string()),
            ],
            body,
        };

        debug!(method = method.as_str(), url = %request.url, "sending request");
        let response = self.transport.send(&request).inspect_err(|error| {
            warn!(resource = %resource, method = method.as_str(), %error, "transport failed");
        })?;

        if !(200..300).contains(&response.status) {
            warn!(
                resource = %resource,
                method = method.as_str(),
                status = response.status,
                "request rejected"
            );
            return Err(TransportError::Status {
                status: response.status,
                status_text: response.status_text,
                body: response.body,
            }
            .into());
        }

        if response.status == 204 {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&response.body)?))
    }
}

fn ensure_supported(resource: Resource, operation: Operation) -> Result<(), ApiError> {
    if resource.supports(operation) {
        Ok(())
    } else {
        Err(ApiError::Unsupported {
            resource,
            operation,
        })
    }
}

fn item_path(resource: Resource, id: &str) -> Result<String, ApiError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ApiError::MissingId { resource });
    }
    // byte_serialize escapes a literal `+` as `%2B`, so every remaining `+`
    // stands for a space, which a path segment must carry as `%20`.
    let encoded = url::form_urlencoded::byte_serialize(id.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    Ok(format!("{}/{}", resource.path(), encoded))
}
