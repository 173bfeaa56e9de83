//! One-shot CLI command implementations.
//!
//! Each command drives the same core state machines as the interactive
//! session, dispatching their requested effects synchronously.

use std::io::Write;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use crate::core::controller::{ListController, ListEvent, RenderState, Step};
use crate::core::display::{self, CONTRACTS_EMPTY};
use crate::core::editor::{Editor, EditorEvent, EditorStep, Mutation, delete_outcome};
use crate::core::filter::{FilterEvent, FilterState};
use crate::core::types::{
    Contract, ContractDraft, Employee, EmployeeDraft, Notice, NoticeLevel,
};
use crate::core::validation::FormDraft;
use crate::io::api::{PortalApi, RequestError};

/// Upper bound on pages walked when collecting every employee or seeking a
/// requested page.
pub const MAX_PAGES: u32 = 1_000;

/// Filters and target page for `employees list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListRequest {
    pub search: Option<String>,
    pub expiring: bool,
    pub full_time: bool,
    pub part_time: bool,
    pub page: u32,
}

impl ListRequest {
    /// Page to walk to, clamped to `1..=MAX_PAGES`.
    pub fn target_page(&self) -> u32 {
        self.page.clamp(1, MAX_PAGES)
    }

    /// Filter-bar events equivalent to these options, in control order.
    pub fn filter_events(&self) -> Vec<FilterEvent> {
        let mut events = Vec::new();
        if self.expiring {
            events.push(FilterEvent::Expiring);
        }
        if self.full_time {
            events.push(FilterEvent::FullTime);
        }
        if self.part_time {
            events.push(FilterEvent::PartTime);
        }
        if let Some(text) = &self.search {
            events.push(FilterEvent::Search(text.clone()));
        }
        events
    }
}

/// Dispatch fetches until the controller settles, returning the final step.
pub fn settle(api: &dyn PortalApi, controller: &mut ListController, mut step: Step) -> Step {
    while let Some(ticket) = step.fetch.take() {
        debug!(seq = ticket.seq, page = ticket.query.page, "dispatching fetch");
        let event = match api.list_employees(&ticket.query) {
            Ok(items) => ListEvent::FetchSucceeded { ticket, items },
            Err(err) => ListEvent::FetchFailed {
                ticket,
                message: err.message,
            },
        };
        step = controller.apply(event);
    }
    step
}

/// Load one employee page under the requested filters.
///
/// Returns the settled controller; a failed fetch leaves it in the error state.
pub fn list_employees(
    api: &dyn PortalApi,
    page_size: u32,
    request: &ListRequest,
) -> (ListController, Option<Notice>) {
    let mut controller = ListController::new(page_size);
    let mut step = controller.apply(ListEvent::Mount);
    for event in request.filter_events() {
        step = controller.apply(ListEvent::Filter(event));
    }
    let mut step = settle(api, &mut controller, step);

    // Walk forward one confirmed page at a time so the estimate never jumps
    // past data that was actually seen. Each page costs one request.
    while controller.pagination().current_page < request.target_page() {
        let before = controller.pagination().current_page;
        let next = controller.apply(ListEvent::NextPage);
        if next.fetch.is_none() {
            break;
        }
        step = settle(api, &mut controller, next);
        if controller.pagination().current_page <= before {
            break;
        }
    }
    (controller, step.notice)
}

/// Employee list screen: active filters, rows, and pager.
pub fn employee_screen(controller: &ListController) -> String {
    let mut lines = Vec::new();
    let chips = controller.filters().chips();
    if !chips.is_empty() {
        lines.push(format!("Filters: {}", chips.join(", ")));
    }
    lines.push(display::employee_list_body(controller.render()));
    let view = controller.pagination_view();
    if view.visible {
        lines.push(view.render_line());
    }
    lines.join("\n")
}

pub fn write_employee_screen(out: &mut dyn Write, controller: &ListController) -> Result<()> {
    writeln!(out, "{}", employee_screen(controller))?;
    Ok(())
}

/// `✓ message` or `✗ message`.
pub fn notice_line(notice: &Notice) -> String {
    let mark = match notice.level {
        NoticeLevel::Success => "✓",
        NoticeLevel::Error => "✗",
    };
    format!("{mark} {}", notice.message)
}

pub fn write_notice(out: &mut dyn Write, notice: &Notice) -> Result<()> {
    writeln!(out, "{}", notice_line(notice))?;
    Ok(())
}

/// Collect every employee by walking pages until a short page.
pub fn fetch_all_employees(
    api: &dyn PortalApi,
    page_size: u32,
) -> Result<Vec<Employee>, RequestError> {
    let filters = FilterState::default();
    let mut all = Vec::new();
    for page in 1..=MAX_PAGES {
        let batch = api.list_employees(&filters.query(page, page_size))?;
        let short = batch.len() < page_size as usize;
        all.extend(batch);
        if short {
            return Ok(all);
        }
    }
    warn!(max_pages = MAX_PAGES, "stopped collecting employees at page limit");
    Ok(all)
}

/// List contracts, naming each contract's employee when possible.
pub fn list_contracts(api: &dyn PortalApi, page_size: u32, out: &mut dyn Write) -> Result<()> {
    let contracts = api.list_contracts().context("load contracts")?;
    let employees = fetch_all_employees(api, page_size).unwrap_or_else(|err| {
        warn!(err = %err, "employee names unavailable");
        Vec::new()
    });
    if contracts.is_empty() {
        writeln!(out, "{CONTRACTS_EMPTY}")?;
        return Ok(());
    }
    for contract in &contracts {
        writeln!(out, "{}", display::contract_row(contract, &employees))?;
    }
    Ok(())
}

/// Run one create/update through the editor state machine.
///
/// Validation failures surface as `ValidationError` before any request is
/// sent. The editor is dropped afterwards; retrying a kept draft is the
/// interactive browser's job.
fn submit<D, T>(
    target: Option<i64>,
    draft: D,
    send: impl FnOnce(&Mutation<D>) -> Result<T, RequestError>,
) -> Result<(T, Notice)>
where
    D: FormDraft,
{
    let mut editor = Editor::default();
    editor.apply(match target {
        Some(id) => EditorEvent::OpenEdit(id, draft),
        None => EditorEvent::OpenNew(draft),
    });
    let step = editor.apply(EditorEvent::Submit);
    if let Some(invalid) = step.invalid {
        return Err(invalid.into());
    }
    let mutation = step
        .mutation
        .context("editor produced no mutation for a valid draft")?;
    match send(&mutation) {
        Ok(saved) => {
            let EditorStep { notice, .. } = editor.apply(EditorEvent::Succeeded);
            let notice = notice.unwrap_or_else(|| Notice::success("Saved"));
            Ok((saved, notice))
        }
        Err(err) => {
            editor.apply(EditorEvent::Failed(err.message.clone()));
            Err(err.into())
        }
    }
}

/// Create (`target == None`) or update an employee.
pub fn save_employee(
    api: &dyn PortalApi,
    target: Option<i64>,
    draft: EmployeeDraft,
) -> Result<(Employee, Notice)> {
    let (employee, notice) = submit(target, draft, |mutation| match mutation {
        Mutation::Create(draft) => api.create_employee(draft),
        Mutation::Update(id, draft) => api.update_employee(*id, draft),
    })?;
    info!(id = ?employee.id, updated = target.is_some(), "employee saved");
    Ok((employee, notice))
}

/// Create (`target == None`) or update a contract.
pub fn save_contract(
    api: &dyn PortalApi,
    target: Option<i64>,
    draft: ContractDraft,
) -> Result<(Contract, Notice)> {
    let (contract, notice) = submit(target, draft, |mutation| match mutation {
        Mutation::Create(draft) => api.create_contract(draft),
        Mutation::Update(id, draft) => api.update_contract(*id, draft),
    })?;
    info!(id = ?contract.id, updated = target.is_some(), "contract saved");
    Ok((contract, notice))
}

/// Field overrides for an employee update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    /// `Some("")` clears the address.
    pub address: Option<String>,
}

impl EmployeeChanges {
    pub fn apply_to(self, mut draft: EmployeeDraft) -> EmployeeDraft {
        if let Some(first_name) = self.first_name {
            draft.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            draft.last_name = last_name;
        }
        if let Some(email) = self.email {
            draft.email = Some(email);
        }
        if let Some(mobile_number) = self.mobile_number {
            draft.mobile_number = mobile_number;
        }
        if let Some(address) = self.address {
            draft.address = Some(address);
        }
        draft
    }
}

/// Field overrides for a contract update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractChanges {
    pub employee_id: Option<i64>,
    pub contract_type: Option<String>,
    pub start_date: Option<String>,
    /// `Some("")` clears the end date.
    pub end_date: Option<String>,
    pub full_time: Option<bool>,
    pub hours_per_week: Option<u32>,
}

impl ContractChanges {
    pub fn apply_to(self, mut draft: ContractDraft) -> ContractDraft {
        if let Some(employee_id) = self.employee_id {
            draft.employee_id = employee_id;
        }
        if let Some(contract_type) = self.contract_type {
            draft.contract_type = contract_type;
        }
        if let Some(start_date) = self.start_date {
            draft.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            draft.end_date = Some(end_date);
        }
        if let Some(full_time) = self.full_time {
            draft.full_time = full_time;
        }
        if let Some(hours) = self.hours_per_week {
            draft.hours_per_week = Some(hours);
        }
        draft
    }
}

/// Look up one employee; the backend has no single-record endpoint.
pub fn find_employee(api: &dyn PortalApi, page_size: u32, id: i64) -> Result<Employee> {
    fetch_all_employees(api, page_size)
        .context("load employees")?
        .into_iter()
        .find(|employee| employee.id == Some(id))
        .ok_or_else(|| anyhow!("employee #{id} not found"))
}

pub fn find_contract(api: &dyn PortalApi, id: i64) -> Result<Contract> {
    api.list_contracts()
        .context("load contracts")?
        .into_iter()
        .find(|contract| contract.id == Some(id))
        .ok_or_else(|| anyhow!("contract #{id} not found"))
}

/// Update an employee, starting from the stored record.
pub fn update_employee(
    api: &dyn PortalApi,
    page_size: u32,
    id: i64,
    changes: EmployeeChanges,
) -> Result<(Employee, Notice)> {
    let current = find_employee(api, page_size, id)?;
    let draft = changes.apply_to(EmployeeDraft::from(&current));
    save_employee(api, Some(id), draft)
}

/// Update a contract, starting from the stored record.
pub fn update_contract(
    api: &dyn PortalApi,
    id: i64,
    changes: ContractChanges,
) -> Result<(Contract, Notice)> {
    let current = find_contract(api, id)?;
    let draft = changes.apply_to(ContractDraft::from(&current));
    save_contract(api, Some(id), draft)
}

/// Delete an employee (and, on the backend, its contracts).
pub fn delete_employee(api: &dyn PortalApi, id: i64) -> Result<Notice> {
    finish_delete("employee", api.delete_employee(id))
}

pub fn delete_contract(api: &dyn PortalApi, id: i64) -> Result<Notice> {
    finish_delete("contract", api.delete_contract(id))
}

fn finish_delete(noun: &str, result: Result<(), RequestError>) -> Result<Notice> {
    result?;
    info!(noun, "deleted");
    let step: EditorStep<()> = delete_outcome(noun, Ok(()));
    Ok(step
        .notice
        .unwrap_or_else(|| Notice::success(format!("{noun} deleted"))))
}

/// True when the controller settled on rows or an empty first page.
pub fn is_settled_ok(controller: &ListController) -> bool {
    matches!(
        controller.render(),
        RenderState::Populated(_) | RenderState::Empty
    )
}
