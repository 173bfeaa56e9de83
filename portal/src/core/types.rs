//! Shared record types for employees and contracts.
//!
//! Records are owned by the backend; the client only holds ephemeral copies of
//! the current page. Field names serialize in camelCase to match the REST API.

use serde::{Deserialize, Serialize};

/// Hours per week fixed for every full-time contract.
pub const FULL_TIME_HOURS: u32 = 40;

/// Contract type that never carries an end date.
pub const PERMANENT: &str = "Permanent";

/// Contract types offered by the contract form.
pub const CONTRACT_TYPES: [&str; 2] = [PERMANENT, "Contract"];

/// Employee as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    /// May be generated by the backend when omitted on create.
    #[serde(default)]
    pub email: String,
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Employee {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Request body for creating or updating an employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeDraft {
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub mobile_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl From<&Employee> for EmployeeDraft {
    fn from(employee: &Employee) -> Self {
        Self {
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: Some(employee.email.clone()).filter(|email| !email.is_empty()),
            mobile_number: employee.mobile_number.clone(),
            address: employee.address.clone(),
        }
    }
}

/// Employment contract as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Foreign key to [`Employee::id`].
    pub employee_id: i64,
    pub contract_type: String,
    /// `YYYY-MM-DD`.
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    pub full_time: bool,
    #[serde(default)]
    pub hours_per_week: Option<u32>,
}

/// Request body for creating or updating a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDraft {
    pub employee_id: i64,
    pub contract_type: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub full_time: bool,
    pub hours_per_week: Option<u32>,
}

impl Default for ContractDraft {
    fn default() -> Self {
        Self {
            employee_id: 0,
            contract_type: PERMANENT.to_string(),
            start_date: String::new(),
            end_date: None,
            full_time: true,
            hours_per_week: Some(FULL_TIME_HOURS),
        }
    }
}

impl From<&Contract> for ContractDraft {
    fn from(contract: &Contract) -> Self {
        Self {
            employee_id: contract.employee_id,
            contract_type: contract.contract_type.clone(),
            start_date: contract.start_date.clone(),
            end_date: contract.end_date.clone(),
            full_time: contract.full_time,
            hours_per_week: contract.hours_per_week,
        }
    }
}

/// Contract-type filter sent with employee list requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContractKind {
    FullTime,
    PartTime,
}

impl ContractKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContractKind::FullTime => "full-time",
            ContractKind::PartTime => "part-time",
        }
    }
}

/// Filter and page parameters for one employee list request.
///
/// Equality is exact: two queries are the same request only if every field
/// matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeQuery {
    pub search_text: Option<String>,
    pub expiring_this_month: bool,
    pub contract_type: Option<ContractKind>,
    /// 1-based page index.
    pub page: u32,
    pub size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient notification (toast) surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}
