//! Test-only builders for records and an in-memory backend.

use std::sync::Mutex;

use crate::core::types::{Contract, ContractDraft, Employee, EmployeeDraft, EmployeeQuery};
use crate::io::api::{PortalApi, RequestError};

/// Deterministic employee with a derived email.
pub fn employee(id: i64, first: &str, last: &str) -> Employee {
    Employee {
        id: Some(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}.{}@example.com", first.to_lowercase(), last.to_lowercase()),
        mobile_number: format!("04000000{:02}", id % 100),
        address: None,
    }
}

/// `count` employees with ids `1..=count`.
pub fn employees(count: usize) -> Vec<Employee> {
    (1..=count as i64)
        .map(|id| employee(id, "Person", &format!("No{id}")))
        .collect()
}

/// Valid draft with only the required fields set.
pub fn employee_draft(first: &str, last: &str) -> EmployeeDraft {
    EmployeeDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: None,
        mobile_number: "0400000000".to_string(),
        address: None,
    }
}

/// Permanent full-time contract starting 2024-01-01.
pub fn contract(id: i64, employee_id: i64) -> Contract {
    Contract {
        id: Some(id),
        employee_id,
        contract_type: "Permanent".to_string(),
        start_date: "2024-01-01".to_string(),
        end_date: None,
        full_time: true,
        hours_per_week: Some(40),
    }
}

/// Valid permanent full-time draft for `employee_id`.
pub fn contract_draft(employee_id: i64) -> ContractDraft {
    ContractDraft {
        employee_id,
        start_date: "2024-01-01".to_string(),
        ..ContractDraft::default()
    }
}

#[derive(Debug, Default)]
struct Store {
    employees: Vec<Employee>,
    contracts: Vec<Contract>,
    next_id: i64,
    queries: Vec<EmployeeQuery>,
    mutations: usize,
    fail_next: Option<String>,
}

impl Store {
    fn take_failure(&mut self) -> Result<(), RequestError> {
        match self.fail_next.take() {
            Some(message) => Err(RequestError {
                message,
                status: Some(500),
                validation_errors: Default::default(),
                details: None,
            }),
            None => Ok(()),
        }
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

fn not_found(noun: &str, id: i64) -> RequestError {
    RequestError {
        message: format!("{noun} {id} not found"),
        status: Some(404),
        validation_errors: Default::default(),
        details: None,
    }
}

/// In-memory [`PortalApi`] that pages, searches by name, and records queries.
///
/// Expiring and contract-kind filters are recorded but not applied.
#[derive(Debug, Default)]
pub struct InMemoryApi {
    store: Mutex<Store>,
}

impl InMemoryApi {
    /// Backend seeded with [`employees`]`(count)`.
    pub fn with_employees(count: usize) -> Self {
        let api = Self::default();
        {
            let mut store = api.lock();
            store.employees = employees(count);
            store.next_id = count as i64;
        }
        api
    }

    /// Make the next call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.lock().fail_next = Some(message.to_string());
    }

    /// Every employee list query received, in order.
    pub fn employee_queries(&self) -> Vec<EmployeeQuery> {
        self.lock().queries.clone()
    }

    /// Number of create/update/delete calls that reached the store.
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    pub fn employee_count(&self) -> usize {
        self.lock().employees.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn employee_from_draft(id: i64, draft: &EmployeeDraft) -> Employee {
    Employee {
        id: Some(id),
        first_name: draft.first_name.clone(),
        last_name: draft.last_name.clone(),
        email: draft.email.clone().unwrap_or_else(|| {
            format!(
                "{}.{}@example.com",
                draft.first_name.to_lowercase(),
                draft.last_name.to_lowercase()
            )
        }),
        mobile_number: draft.mobile_number.clone(),
        address: draft.address.clone(),
    }
}

fn contract_from_draft(id: i64, draft: &ContractDraft) -> Contract {
    Contract {
        id: Some(id),
        employee_id: draft.employee_id,
        contract_type: draft.contract_type.clone(),
        start_date: draft.start_date.clone(),
        end_date: draft.end_date.clone(),
        full_time: draft.full_time,
        hours_per_week: draft.hours_per_week,
    }
}

impl PortalApi for InMemoryApi {
    fn list_employees(&self, query: &EmployeeQuery) -> Result<Vec<Employee>, RequestError> {
        let mut store = self.lock();
        store.queries.push(query.clone());
        store.take_failure()?;
        let needle = query.search_text.as_deref().map(str::to_lowercase);
        let matching: Vec<Employee> = store
            .employees
            .iter()
            .filter(|e| match &needle {
                Some(needle) => e.full_name().to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();
        let size = query.size.max(1) as usize;
        let start = (query.page.max(1) as usize - 1) * size;
        Ok(matching.into_iter().skip(start).take(size).collect())
    }

    fn create_employee(&self, draft: &EmployeeDraft) -> Result<Employee, RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        store.mutations += 1;
        let id = store.allocate_id();
        let employee = employee_from_draft(id, draft);
        store.employees.push(employee.clone());
        Ok(employee)
    }

    fn update_employee(&self, id: i64, draft: &EmployeeDraft) -> Result<Employee, RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        store.mutations += 1;
        let slot = store
            .employees
            .iter_mut()
            .find(|e| e.id == Some(id))
            .ok_or_else(|| not_found("Employee", id))?;
        *slot = employee_from_draft(id, draft);
        Ok(slot.clone())
    }

    fn delete_employee(&self, id: i64) -> Result<(), RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        store.mutations += 1;
        let before = store.employees.len();
        store.employees.retain(|e| e.id != Some(id));
        if store.employees.len() == before {
            return Err(not_found("Employee", id));
        }
        store.contracts.retain(|c| c.employee_id != id);
        Ok(())
    }

    fn list_contracts(&self) -> Result<Vec<Contract>, RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        Ok(store.contracts.clone())
    }

    fn create_contract(&self, draft: &ContractDraft) -> Result<Contract, RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        store.mutations += 1;
        let id = store.allocate_id();
        let contract = contract_from_draft(id, draft);
        store.contracts.push(contract.clone());
        Ok(contract)
    }

    fn update_contract(&self, id: i64, draft: &ContractDraft) -> Result<Contract, RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        store.mutations += 1;
        let slot = store
            .contracts
            .iter_mut()
            .find(|c| c.id == Some(id))
            .ok_or_else(|| not_found("Contract", id))?;
        *slot = contract_from_draft(id, draft);
        Ok(slot.clone())
    }

    fn delete_contract(&self, id: i64) -> Result<(), RequestError> {
        let mut store = self.lock();
        store.take_failure()?;
        store.mutations += 1;
        let before = store.contracts.len();
        store.contracts.retain(|c| c.id != Some(id));
        if store.contracts.len() == before {
            return Err(not_found("Contract", id));
        }
        Ok(())
    }
}
