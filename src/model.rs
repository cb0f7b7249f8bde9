//! Typed rows returned by the repositories.
//!
//! Plain rows (`Department`, `Role`, `Employee`) mirror one table and are
//! what `create`, `get`, `update_*` and `delete` return. Detail rows carry
//! the joined columns used for display.

use serde::{Deserialize, Serialize};

/// Primary key type of every table
pub type Id = i32;

/// One row of `department`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub id: Id,
    pub name: String,
}

/// One row of `role`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: Id,
    pub title: String,
    pub salary: f64,
    pub department_id: Option<Id>,
}

/// A role joined with its department name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleDetail {
    pub id: Id,
    pub title: String,
    pub salary: f64,
    pub department_id: Option<Id>,
    pub department: Option<String>,
}

/// One row of `employee`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub role_id: Option<Id>,
    pub manager_id: Option<Id>,
    pub salary: f64,
}

impl Employee {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// An employee joined with role, department and manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDetail {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub role_id: Option<Id>,
    pub manager_id: Option<Id>,
    pub salary: f64,
    pub title: Option<String>,
    pub department: Option<String>,
    pub manager_first_name: Option<String>,
    pub manager_last_name: Option<String>,
}

impl EmployeeDetail {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Manager's "first last" name, `None` when no manager is linked
    #[must_use]
    pub fn manager_name(&self) -> Option<String> {
        match (&self.manager_first_name, &self.manager_last_name) {
            (None, None) => None,
            (first, last) => {
                let name = format!(
                    "{} {}",
                    first.as_deref().unwrap_or_default(),
                    last.as_deref().unwrap_or_default()
                );
                Some(name.trim().to_string())
            }
        }
    }
}

/// Values for a new employee row
#[derive(Debug, Clone, PartialEq)]
pub struct NewEmployee {
    pub first_name: String,
    pub last_name: String,
    pub role_id: Option<Id>,
    pub manager_id: Option<Id>,
    pub salary: f64,
}
