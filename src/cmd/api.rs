use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::info;

use crate::api::{ApiClient, Transport};
use crate::domain::error::ApiError;
use crate::domain::resource::{ListQuery, Resource};

/// One resource-client call as requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiAction {
    List { query: ListQuery },
    AppointmentsOn { date: NaiveDate },
    Get { id: String },
    Create { body: Value, fetch: bool },
    Update { id: String, body: Value },
    Delete { id: String },
}

impl ApiAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::List { .. } => "list",
            Self::AppointmentsOn { .. } => "today",
            Self::Get { .. } => "get",
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// Run `action` against `resource` and shape the result for stdout.
pub fn run<T: Transport>(
    client: &ApiClient<T>,
    resource: Resource,
    action: ApiAction,
) -> Result<Value, ApiError> {
    info!(resource = %resource, action = action.name(), "api call");
    match action {
        ApiAction::List { query } => Ok(Value::Array(client.list(resource, &query)?)),
        ApiAction::AppointmentsOn { date } => Ok(Value::Array(client.appointments_on(date)?)),
        ApiAction::Get { id } => client.get(resource, &id),
        ApiAction::Create { body, fetch: true } => client.create_and_fetch(resource, &body),
        ApiAction::Create { body, fetch: false } => {
            Ok(serde_json::to_value(client.create(resource, &body)?)?)
        }
        ApiAction::Update { id, body } => {
            Ok(client.update(resource, &id, &body)?.unwrap_or(Value::Null))
        }
        ApiAction::Delete { id } => {
            client.delete(resource, &id)?;
            Ok(json!({"deleted": id}))
        }
    }
}
