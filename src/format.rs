//! Presentation Formatter
//!
//! Pure mapping from repository rows to labelled display rows, and the
//! table rendering used by the controller. No database access.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::model::{Department, EmployeeDetail, RoleDetail};

/// Placeholder for a missing manager
pub const NONE_LABEL: &str = "None";

/// Department as shown in the department table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct DepartmentRow {
    #[tabled(rename = "ID")]
    pub id: i32,
    #[tabled(rename = "Name")]
    pub name: String,
}

/// Role as shown in the role table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct RoleRow {
    #[tabled(rename = "ID")]
    pub id: i32,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Salary")]
    pub salary: String,
    #[tabled(rename = "Department")]
    pub department: String,
}

/// Employee as shown in the employee table
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct EmployeeRow {
    #[tabled(rename = "ID")]
    pub id: i32,
    #[tabled(rename = "First Name")]
    pub first_name: String,
    #[tabled(rename = "Last Name")]
    pub last_name: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Department")]
    pub department: String,
    #[tabled(rename = "Employee Salary")]
    pub salary: String,
    #[tabled(rename = "Manager")]
    pub manager: String,
}

#[must_use]
pub fn departments(rows: &[Department]) -> Vec<DepartmentRow> {
    rows.iter().map(|d| DepartmentRow { id: d.id, name: d.name.clone() }).collect()
}

#[must_use]
pub fn roles(rows: &[RoleDetail]) -> Vec<RoleRow> {
    rows.iter()
        .map(|r| RoleRow {
            id: r.id,
            title: r.title.clone(),
            salary: currency(r.salary),
            department: r.department.clone().unwrap_or_default(),
        })
        .collect()
}

#[must_use]
pub fn employees(rows: &[EmployeeDetail]) -> Vec<EmployeeRow> {
    rows.iter()
        .map(|e| EmployeeRow {
            id: e.id,
            first_name: e.first_name.clone(),
            last_name: e.last_name.clone(),
            title: e.title.clone().unwrap_or_default(),
            department: e.department.clone().unwrap_or_default(),
            salary: currency(e.salary),
            manager: e.manager_name().unwrap_or_else(|| NONE_LABEL.to_string()),
        })
        .collect()
}

/// Render display rows as a console table
#[must_use]
pub fn table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows).with(Style::modern()).to_string()
}

/// Format an amount as US dollars: `$1,234,567.89`, `-$5.00`
///
/// Non-finite amounts render as `$0.00`.
#[must_use]
pub fn currency(amount: f64) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let fixed = format!("{:.2}", amount.abs());
    let (digits, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn employee(manager: Option<(&str, &str)>) -> EmployeeDetail {
        EmployeeDetail {
            id: 2,
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            role_id: Some(1),
            manager_id: manager.map(|_| 1),
            salary: 95000.5,
            title: Some("Engineer".to_string()),
            department: Some("Engineering".to_string()),
            manager_first_name: manager.map(|m| m.0.to_string()),
            manager_last_name: manager.map(|m| m.1.to_string()),
        }
    }

    #[test]
    fn test_currency() {
        assert_eq!(currency(80000.0), "$80,000.00");
        assert_eq!(currency(50000.5), "$50,000.50");
        assert_eq!(currency(1_234_567.891), "$1,234,567.89");
        assert_eq!(currency(999.999), "$1,000.00");
        assert_eq!(currency(0.0), "$0.00");
        assert_eq!(currency(12.3), "$12.30");
        assert_eq!(currency(-5.0), "-$5.00");
        assert_eq!(currency(f64::NAN), "$0.00");
        assert_eq!(currency(-0.001), "$0.00");
        assert_eq!(currency(9_999_999_999.99), "$9,999,999,999.99");
        assert_eq!(currency(1e20), "$100,000,000,000,000,000,000.00");
        assert_eq!(currency(2e17), "$200,000,000,000,000,000.00");
    }

    #[test]
    fn test_employee_row_with_manager() {
        let rows = employees(&[employee(Some(("Ada", "Lovelace")))]);
        assert_eq!(
            rows,
            vec![EmployeeRow {
                id: 2,
                first_name: "Grace".to_string(),
                last_name: "Hopper".to_string(),
                title: "Engineer".to_string(),
                department: "Engineering".to_string(),
                salary: "$95,000.50".to_string(),
                manager: "Ada Lovelace".to_string(),
            }]
        );
    }

    #[test]
    fn test_employee_row_without_manager() {
        let rows = employees(&[employee(None)]);
        assert_eq!(rows[0].manager, "None");
    }

    #[test]
    fn test_role_row_without_department() {
        let rows = roles(&[RoleDetail {
            id: 4,
            title: "Intern".to_string(),
            salary: 20000.0,
            department_id: None,
            department: None,
        }]);
        assert_eq!(rows[0].salary, "$20,000.00");
        assert_eq!(rows[0].department, "");
    }

    #[test]
    fn test_table_has_headers_and_values() {
        let rendered = table(&departments(&[Department { id: 1, name: "Sales".to_string() }]));
        assert!(rendered.contains("ID"));
        assert!(rendered.contains("Name"));
        assert!(rendered.contains("Sales"));
    }
}
