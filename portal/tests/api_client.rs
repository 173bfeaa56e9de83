//! `ApiClient` against an in-process HTTP backend.
//!
//! Verifies query-string encoding, error-body handling, and that the list
//! controller and commands work unchanged over real HTTP.

mod support;

use axum::http::StatusCode;
use serde_json::json;

use hr_portal::commands::{self, ListRequest};
use hr_portal::core::controller::RenderState;
use hr_portal::core::types::{ContractKind, EmployeeQuery};
use hr_portal::io::api::{ApiClient, GENERIC_FAILURE, PortalApi, RequestError};
use hr_portal::io::config::ApiConfig;
use hr_portal::test_support::{contract_draft, employee_draft};

use support::FakeBackend;

fn client(backend: &FakeBackend) -> ApiClient {
    ApiClient::new(&ApiConfig::with_base_url(&backend.base_url)).expect("client")
}

#[test]
fn list_sends_filters_as_query_params() {
    let backend = FakeBackend::with_employees(3);
    let api = client(&backend);
    let query = EmployeeQuery {
        search_text: Some("No2".to_string()),
        expiring_this_month: true,
        contract_type: Some(ContractKind::FullTime),
        page: 1,
        size: 10,
    };

    let rows = api.list_employees(&query).expect("list");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].full_name(), "Person No2");

    let state = backend.state();
    let params = &state.employee_queries[0];
    assert_eq!(params.get("page").map(String::as_str), Some("1"));
    assert_eq!(params.get("size").map(String::as_str), Some("10"));
    assert_eq!(params.get("searchText").map(String::as_str), Some("No2"));
    assert_eq!(params.get("expiringThisMonth").map(String::as_str), Some("true"));
    assert_eq!(params.get("contractType").map(String::as_str), Some("full-time"));
}

#[test]
fn unfiltered_list_omits_filter_params() {
    let backend = FakeBackend::with_employees(1);
    let api = client(&backend);
    let (controller, notice) = commands::list_employees(&api, 10, &ListRequest::default());
    assert!(notice.is_none());
    assert!(matches!(controller.render(), RenderState::Populated(rows) if rows.len() == 1));

    let state = backend.state();
    let mut keys: Vec<&String> = state.employee_queries[0].keys().collect();
    keys.sort();
    assert_eq!(keys, vec!["page", "size"]);
}

#[test]
fn non_array_list_body_is_empty() {
    let backend = FakeBackend::with_employees(5);
    backend.state().list_override = Some(json!({ "content": [] }));
    let api = client(&backend);

    let (controller, _) = commands::list_employees(&api, 10, &ListRequest::default());
    assert_eq!(controller.render(), &RenderState::Empty);
    assert!(!controller.pagination_view().visible);
}

#[test]
fn error_body_message_reaches_caller() {
    let backend = FakeBackend::start();
    backend.state().reject_next = Some((
        StatusCode::CONFLICT,
        json!({ "error": "Email already in use", "validation_errors": { "email": "taken" } }),
    ));
    let api = client(&backend);

    let err = api
        .create_employee(&employee_draft("Jordan", "Lee"))
        .expect_err("rejected");
    assert_eq!(err.message, "Email already in use");
    assert_eq!(err.status, Some(409));
    assert_eq!(err.validation_errors.get("email").map(String::as_str), Some("taken"));
}

#[test]
fn error_without_body_uses_generic_message() {
    let backend = FakeBackend::start();
    backend.state().reject_next = Some((StatusCode::INTERNAL_SERVER_ERROR, json!("boom")));
    let api = client(&backend);

    let err: RequestError = api.delete_employee(1).expect_err("rejected");
    assert_eq!(err.message, GENERIC_FAILURE);
    assert_eq!(err.status, Some(500));
}

#[test]
fn unreachable_backend_is_generic_failure() {
    let api = ApiClient::new(&ApiConfig::with_base_url("http://127.0.0.1:9")).expect("client");
    let err = api.list_contracts().expect_err("unreachable");
    assert_eq!(err.message, GENERIC_FAILURE);
}

#[test]
fn configured_headers_are_sent() {
    let backend = FakeBackend::start();
    let mut config = ApiConfig::with_base_url(&backend.base_url);
    config
        .headers
        .insert("X-Tenant".to_string(), "acme".to_string());
    let api = ApiClient::new(&config).expect("client");

    api.list_employees(&EmployeeQuery {
        search_text: None,
        expiring_this_month: false,
        contract_type: None,
        page: 1,
        size: 5,
    })
    .expect("list");
    assert_eq!(backend.state().last_tenant.as_deref(), Some("acme"));
}

#[test]
fn create_update_delete_round_trip() {
    let backend = FakeBackend::start();
    let api = client(&backend);

    let (employee, _) = commands::save_employee(&api, None, employee_draft("Jordan", "Lee"))
        .expect("create employee");
    let id = employee.id.expect("id");
    let (updated, _) = commands::save_employee(&api, Some(id), employee_draft("Jordan", "Park"))
        .expect("update employee");
    assert_eq!(updated.last_name, "Park");

    let (contract, _) = commands::save_contract(&api, None, contract_draft(id)).expect("contract");
    assert_eq!(contract.employee_id, id);
    assert_eq!(api.list_contracts().expect("contracts").len(), 1);

    commands::delete_employee(&api, id).expect("delete");
    assert!(api.list_contracts().expect("contracts").is_empty());
    assert!(backend.state().employees.is_empty());
}

#[test]
fn paging_over_http_steps_back_from_empty_page() {
    let backend = FakeBackend::with_employees(10);
    let api = client(&backend);
    let request = ListRequest {
        page: 2,
        ..ListRequest::default()
    };

    let (controller, _) = commands::list_employees(&api, 10, &request);
    assert_eq!(controller.pagination().current_page, 1);
    let pages: Vec<String> = backend
        .state()
        .employee_queries
        .iter()
        .map(|params| params["page"].clone())
        .collect();
    assert_eq!(pages, vec!["1", "2", "1"]);
}
