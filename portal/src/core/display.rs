//! Text rendering for list rows and render states.

use crate::core::controller::RenderState;
use crate::core::types::{Contract, Employee};

pub const EMPLOYEES_EMPTY: &str = "No employees found. Add your first employee.";
pub const CONTRACTS_EMPTY: &str = "No contracts found. Add your first contract.";
pub const EMPLOYEES_ERROR: &str = "Error loading employees. Please try again.";
pub const EMPLOYEES_LOADING: &str = "Loading…";
pub const DELETE_EMPLOYEE_WARNING: &str = "This will also delete all contracts for this employee.";

/// Name of the employee with `id`, or `#id` when it is not in `employees`.
pub fn employee_name(employees: &[Employee], id: i64) -> String {
    employees
        .iter()
        .find(|employee| employee.id == Some(id))
        .map(Employee::full_name)
        .unwrap_or_else(|| format!("#{id}"))
}

/// `Permanent • Full-time • 2024-01-01 → ongoing`
pub fn contract_summary(contract: &Contract) -> String {
    let kind = if contract.full_time {
        "Full-time"
    } else {
        "Part-time"
    };
    format!(
        "{} • {} • {} → {}",
        contract.contract_type,
        kind,
        contract.start_date,
        contract.end_date.as_deref().unwrap_or("ongoing")
    )
}

pub fn contract_hours(contract: &Contract) -> String {
    match contract.hours_per_week {
        Some(hours) => format!("{hours} hours/week"),
        None => "hours not set".to_string(),
    }
}

/// Multi-line row for one employee.
pub fn employee_row(employee: &Employee) -> String {
    let id = employee
        .id
        .map(|id| format!("#{id}"))
        .unwrap_or_else(|| "#?".to_string());
    let mut row = format!("{id:>5}  {}\n       {}", employee.full_name(), employee.email);
    if let Some(address) = employee.address.as_deref().filter(|a| !a.is_empty()) {
        row.push_str("\n       ");
        row.push_str(address);
    }
    row
}

/// Multi-line row for one contract, naming its employee from `employees`.
pub fn contract_row(contract: &Contract, employees: &[Employee]) -> String {
    let id = contract
        .id
        .map(|id| format!("#{id}"))
        .unwrap_or_else(|| "#?".to_string());
    format!(
        "{id:>5}  {}\n       {}\n       {}",
        employee_name(employees, contract.employee_id),
        contract_summary(contract),
        contract_hours(contract)
    )
}

/// Body text for the employee list in `state`.
pub fn employee_list_body(state: &RenderState) -> String {
    match state {
        RenderState::Idle => String::new(),
        RenderState::Loading => EMPLOYEES_LOADING.to_string(),
        RenderState::Error(_) => EMPLOYEES_ERROR.to_string(),
        RenderState::Empty => EMPLOYEES_EMPTY.to_string(),
        RenderState::Populated(rows) => rows
            .iter()
            .map(employee_row)
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{contract, employee};

    #[test]
    fn employee_name_falls_back_to_id() {
        let employees = vec![employee(1, "Jordan", "Lee")];
        assert_eq!(employee_name(&employees, 1), "Jordan Lee");
        assert_eq!(employee_name(&employees, 9), "#9");
    }

    #[test]
    fn contract_summary_marks_open_ended() {
        let mut c = contract(1, 1);
        assert_eq!(
            contract_summary(&c),
            "Permanent • Full-time • 2024-01-01 → ongoing"
        );
        c.contract_type = "Contract".to_string();
        c.full_time = false;
        c.end_date = Some("2024-06-30".to_string());
        assert_eq!(
            contract_summary(&c),
            "Contract • Part-time • 2024-01-01 → 2024-06-30"
        );
    }

    #[test]
    fn contract_hours_line() {
        let mut c = contract(1, 1);
        assert_eq!(contract_hours(&c), "40 hours/week");
        c.hours_per_week = None;
        assert_eq!(contract_hours(&c), "hours not set");
    }

    #[test]
    fn list_body_per_render_state() {
        assert_eq!(employee_list_body(&RenderState::Empty), EMPLOYEES_EMPTY);
        assert_eq!(
            employee_list_body(&RenderState::Error("x".to_string())),
            EMPLOYEES_ERROR
        );
        let body = employee_list_body(&RenderState::Populated(vec![employee(3, "Kim", "Park")]));
        assert!(body.contains("#3"));
        assert!(body.contains("Kim Park"));
    }
}
