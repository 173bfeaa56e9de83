//! Form-boundary validation for employee and contract drafts.
//!
//! Runs before any request is sent. A draft that fails here never reaches the
//! API client.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::types::{ContractDraft, EmployeeDraft, FULL_TIME_HOURS, PERMANENT};

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {noun}: {}", join_errors(.errors))]
pub struct ValidationError {
    pub noun: &'static str,
    pub errors: Vec<FieldError>,
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// A draft that can be validated and normalized before submission.
pub trait FormDraft: Clone {
    /// Lower-case resource name used in messages ("employee").
    const NOUN: &'static str;

    /// Apply the form's derived-field rules.
    fn normalized(self) -> Self;

    fn validate(&self) -> Vec<FieldError>;

    /// Normalize, then validate.
    fn checked(self) -> Result<Self, ValidationError> {
        let draft = self.normalized();
        let errors = draft.validate();
        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(ValidationError {
                noun: Self::NOUN,
                errors,
            })
        }
    }
}

impl FormDraft for EmployeeDraft {
    const NOUN: &'static str = "employee";

    fn normalized(mut self) -> Self {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.mobile_number = self.mobile_number.trim().to_string();
        self.email = non_blank(self.email);
        self.address = non_blank(self.address);
        self
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.first_name.trim().is_empty() {
            errors.push(FieldError::new("firstName", "First name is required"));
        }
        if self.last_name.trim().is_empty() {
            errors.push(FieldError::new("lastName", "Last name is required"));
        }
        if let Some(email) = &self.email {
            if !EMAIL_RE.is_match(email) {
                errors.push(FieldError::new("email", "Invalid email"));
            }
        }
        if self.mobile_number.trim().is_empty() {
            errors.push(FieldError::new("mobileNumber", "Mobile number is required"));
        }
        errors
    }
}

impl FormDraft for ContractDraft {
    const NOUN: &'static str = "contract";

    fn normalized(self) -> Self {
        normalize_contract(self)
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.employee_id < 0 {
            errors.push(FieldError::new("employeeId", "Employee is required"));
        }
        if self.contract_type.trim().is_empty() {
            errors.push(FieldError::new("contractType", "Contract type is required"));
        }
        if !is_iso_date(&self.start_date) {
            errors.push(FieldError::new("startDate", "YYYY-MM-DD"));
        }
        if let Some(end) = &self.end_date {
            if !is_iso_date(end) {
                errors.push(FieldError::new("endDate", "YYYY-MM-DD"));
            }
        }
        errors
    }
}

/// Derived-field rules: permanent contracts have no end date and full-time
/// contracts are fixed at 40 hours per week.
pub fn normalize_contract(mut draft: ContractDraft) -> ContractDraft {
    draft.contract_type = draft.contract_type.trim().to_string();
    draft.end_date = non_blank(draft.end_date);
    if draft.contract_type == PERMANENT {
        draft.end_date = None;
    }
    if draft.full_time {
        draft.hours_per_week = Some(FULL_TIME_HOURS);
    }
    draft
}

/// `YYYY-MM-DD` naming a real calendar day.
pub fn is_iso_date(value: &str) -> bool {
    if !DATE_RE.is_match(value) {
        return false;
    }
    let mut parts = value.split('-').map(|part| part.parse::<u32>().unwrap_or(0));
    let (Some(year), Some(month), Some(day)) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    (1..=12).contains(&month) && day >= 1 && day <= days_in_month(year, month)
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{contract_draft, employee_draft};

    #[test]
    fn valid_employee_passes() {
        let draft = employee_draft("Jordan", "Lee");
        assert!(draft.validate().is_empty());
    }

    #[test]
    fn employee_reports_every_missing_field() {
        let draft = EmployeeDraft {
            email: Some("not-an-email".to_string()),
            ..EmployeeDraft::default()
        };
        let fields: Vec<&str> = draft.validate().iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["firstName", "lastName", "email", "mobileNumber"]);
    }

    #[test]
    fn blank_optional_employee_fields_become_none() {
        let mut draft = employee_draft("  Ana ", "Diaz");
        draft.email = Some("  ".to_string());
        draft.address = Some(String::new());
        let checked = draft.checked().expect("valid");
        assert_eq!(checked.first_name, "Ana");
        assert_eq!(checked.email, None);
        assert_eq!(checked.address, None);
    }

    #[test]
    fn permanent_contract_drops_end_date() {
        let mut draft = contract_draft(1);
        draft.end_date = Some("2025-12-31".to_string());
        let normalized = normalize_contract(draft);
        assert_eq!(normalized.end_date, None);
    }

    #[test]
    fn fixed_term_contract_keeps_end_date() {
        let mut draft = contract_draft(1);
        draft.contract_type = "Contract".to_string();
        draft.end_date = Some("2025-12-31".to_string());
        assert_eq!(
            normalize_contract(draft).end_date.as_deref(),
            Some("2025-12-31")
        );
    }

    #[test]
    fn full_time_forces_forty_hours() {
        let mut draft = contract_draft(1);
        draft.hours_per_week = Some(12);
        assert_eq!(normalize_contract(draft).hours_per_week, Some(40));

        let mut part_time = contract_draft(1);
        part_time.full_time = false;
        part_time.hours_per_week = Some(12);
        assert_eq!(normalize_contract(part_time).hours_per_week, Some(12));
    }

    #[test]
    fn contract_date_format_is_checked() {
        let mut draft = contract_draft(1);
        draft.contract_type = "Contract".to_string();
        draft.start_date = "01/02/2024".to_string();
        draft.end_date = Some("2024-02-30".to_string());
        let err = draft.checked().expect_err("invalid dates");
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["startDate", "endDate"]);
        assert!(err.to_string().starts_with("invalid contract: startDate: YYYY-MM-DD"));
    }

    #[test]
    fn iso_date_handles_leap_years() {
        assert!(is_iso_date("2024-02-29"));
        assert!(!is_iso_date("2023-02-29"));
        assert!(!is_iso_date("1900-02-29"));
        assert!(is_iso_date("2000-02-29"));
        assert!(!is_iso_date("2024-13-01"));
        assert!(!is_iso_date("2024-1-01"));
    }

    #[test]
    fn negative_employee_id_is_rejected() {
        let draft = contract_draft(-1);
        assert_eq!(draft.validate()[0].field, "employeeId");
    }
}
