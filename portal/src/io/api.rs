//! REST client for the HR backend.
//!
//! The [`PortalApi`] trait decouples list controllers and CLI commands from
//! the HTTP transport. [`ApiClient`] talks to the real backend; tests use an
//! in-memory implementation.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::core::types::{Contract, ContractDraft, Employee, EmployeeDraft, EmployeeQuery};
use crate::io::config::ApiConfig;

/// Message used when a failure carries no structured error body.
pub const GENERIC_FAILURE: &str = "Request failed";

/// Network or server failure from a backend call.
///
/// `Display` is the human-readable message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct RequestError {
    pub message: String,
    /// HTTP status when the server answered.
    pub status: Option<u16>,
    /// Per-field messages from the error body, if any.
    pub validation_errors: BTreeMap<String, String>,
    /// Free-form `details` from the error body.
    pub details: Option<Value>,
}

/// Error payload returned by the backend: `{"error": "...", "validation_errors": {...}}`.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    #[serde(default)]
    validation_errors: Option<BTreeMap<String, String>>,
    #[serde(default)]
    details: Option<Value>,
}

impl RequestError {
    /// Failure without a usable response body.
    pub fn generic(status: Option<u16>) -> Self {
        Self {
            message: GENERIC_FAILURE.to_string(),
            status,
            validation_errors: BTreeMap::new(),
            details: None,
        }
    }

    /// Build the error for a non-success response, preferring the body's
    /// `error` field over the generic message.
    pub fn from_body(status: Option<u16>, body: &str) -> Self {
        let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
        let message = parsed
            .error
            .map(|msg| msg.trim().to_string())
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        Self {
            message,
            status,
            validation_errors: parsed.validation_errors.unwrap_or_default(),
            details: parsed.details.filter(|details| !details.is_null()),
        }
    }
}

/// Backend operations used by the portal.
pub trait PortalApi: Send + Sync {
    fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, RequestError>;
    fn create_employee(&self, draft: &EmployeeDraft) -> Result<Employee, RequestError>;
    fn update_employee(&self, id: i64, draft: &EmployeeDraft) -> Result<Employee, RequestError>;
    fn delete_employee(&self, id: i64) -> Result<(), RequestError>;

    fn list_contracts(&self) -> Result<Vec<Contract>, RequestError>;
    fn create_contract(&self, draft: &ContractDraft) -> Result<Contract, RequestError>;
    fn update_contract(&self, id: i64, draft: &ContractDraft) -> Result<Contract, RequestError>;
    fn delete_contract(&self, id: i64) -> Result<(), RequestError>;
}

/// Blocking HTTP client configured from an explicit [`ApiConfig`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("invalid header name {name:?}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("invalid value for header {name}"))?;
            headers.insert(name, value);
        }
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .context("build http client")?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, RequestError> {
        let response = request.send().map_err(|err| {
            warn!(err = %err, timeout = err.is_timeout(), "request not completed");
            RequestError::generic(err.status().map(|s| s.as_u16()))
        })?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        let err = RequestError::from_body(Some(status.as_u16()), &body);
        warn!(status = status.as_u16(), message = %err.message, "request rejected");
        Err(err)
    }

    fn json<T: DeserializeOwned>(response: Response) -> Result<T, RequestError> {
        let status = response.status().as_u16();
        response.json::<T>().map_err(|err| {
            warn!(err = %err, "response body did not decode");
            RequestError::generic(Some(status))
        })
    }

    /// GET a list endpoint. A body that is not a JSON array is treated as empty.
    fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, RequestError> {
        let response = self.send(self.client.get(self.url(path)).query(query))?;
        let status = response.status().as_u16();
        let body: Value = Self::json(response)?;
        if !body.is_array() {
            warn!(path, "list response was not an array; treating as empty");
            return Ok(Vec::new());
        }
        serde_json::from_value(body).map_err(|err| {
            warn!(path, err = %err, "list items did not decode");
            RequestError::generic(Some(status))
        })
    }

    fn post<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        Self::json(self.send(self.client.post(self.url(path)).json(body))?)
    }

    fn patch<B, T>(&self, path: &str, body: &B) -> Result<T, RequestError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        Self::json(self.send(self.client.patch(self.url(path)).json(body))?)
    }

    fn delete(&self, path: &str) -> Result<u16, RequestError> {
        let response = self.send(self.client.delete(self.url(path)))?;
        Ok(response.status().as_u16())
    }
}

/// Query-string pairs for an employee list request.
pub fn employee_query_params(query: &EmployeeQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("page", query.page.to_string()),
        ("size", query.size.to_string()),
    ];
    if let Some(text) = &query.search_text {
        params.push(("searchText", text.clone()));
    }
    if query.expiring_this_month {
        params.push(("expiringThisMonth", "true".to_string()));
    }
    if let Some(kind) = query.contract_type {
        params.push(("contractType", kind.as_str().to_string()));
    }
    params
}

impl PortalApi for ApiClient {
    #[instrument(skip(self), fields(page = query.page, size = query.size))]
    fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, RequestError> {
        let employees: Vec<Employee> = self.get_list("/employees", &employee_query_params(query))?;
        debug!(count = employees.len(), "employees fetched");
        Ok(employees)
    }

    #[instrument(skip_all)]
    fn create_employee(&self, draft: &EmployeeDraft) -> Result<Employee, RequestError> {
        self.post("/employees", draft)
    }

    #[instrument(skip(self, draft))]
    fn update_employee(&self, id: i64, draft: &EmployeeDraft) -> Result<Employee, RequestError> {
        self.patch(&format!("/employees/{id}"), draft)
    }

    #[instrument(skip(self))]
    fn delete_employee(&self, id: i64) -> Result<(), RequestError> {
        let status = self.delete(&format!("/employees/{id}"))?;
        debug!(status, "employee deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    fn list_contracts(&self) -> Result<Vec<Contract>, RequestError> {
        let contracts: Vec<Contract> = self.get_list("/contracts", &[])?;
        debug!(count = contracts.len(), "contracts fetched");
        Ok(contracts)
    }

    #[instrument(skip_all)]
    fn create_contract(&self, draft: &ContractDraft) -> Result<Contract, RequestError> {
        self.post("/contracts", draft)
    }

    #[instrument(skip(self, draft))]
    fn update_contract(&self, id: i64, draft: &ContractDraft) -> Result<Contract, RequestError> {
        self.patch(&format!("/contracts/{id}"), draft)
    }

    #[instrument(skip(self))]
    fn delete_contract(&self, id: i64) -> Result<(), RequestError> {
        let status = self.delete(&format!("/contracts/{id}"))?;
        debug!(status, "contract deleted");
        Ok(())
    }
}
