//! Employee repository.
//!
//! Listings join role, department and the employee's manager (a self-join on
//! `employee`). The manager's first and last name are returned separately
//! and composed by the formatter, so a missing manager stays `NULL` rather
//! than becoming a blank string.

use crate::engine::{Database, SqlParam};
use crate::error::{Result, TrackerError};
use crate::model::{Employee, EmployeeDetail, Id, NewEmployee};
use crate::repo::{Sort, SortKey};

/// Plain `employee` columns, salary read back as a float on every engine
const RETURNING: &str = "RETURNING id, first_name, last_name, role_id, manager_id, \
                         CAST(salary AS DOUBLE PRECISION) AS salary";

const DETAIL_SELECT: &str = "
    SELECT employee.id AS id, employee.first_name AS first_name,
           employee.last_name AS last_name, employee.role_id AS role_id,
           employee.manager_id AS manager_id,
           CAST(employee.salary AS DOUBLE PRECISION) AS salary,
           role.title AS title, department.name AS department,
           manager.first_name AS manager_first_name,
           manager.last_name AS manager_last_name
    FROM employee
    LEFT JOIN role ON employee.role_id = role.id
    LEFT JOIN department ON role.department_id = department.id
    LEFT JOIN employee manager ON employee.manager_id = manager.id";

/// Sortable employee columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EmployeeSort {
    #[default]
    Id,
    FirstName,
    LastName,
    Title,
    Department,
    Salary,
}

impl SortKey for EmployeeSort {
    const ALL: &'static [Self] = &[
        Self::Id,
        Self::FirstName,
        Self::LastName,
        Self::Title,
        Self::Department,
        Self::Salary,
    ];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::FirstName => "first_name",
            Self::LastName => "last_name",
            Self::Title => "title",
            Self::Department => "department",
            Self::Salary => "salary",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "employee.id",
            Self::FirstName => "employee.first_name",
            Self::LastName => "employee.last_name",
            Self::Title => "role.title",
            Self::Department => "department.name",
            Self::Salary => "employee.salary",
        }
    }

    fn nullable(self) -> bool {
        matches!(self, Self::Title | Self::Department)
    }
}

/// Operations on the `employee` table
pub struct Employees<'a, D> {
    db: &'a D,
}

impl<'a, D: Database> Employees<'a, D> {
    pub const fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Every employee with role, department and manager
    pub async fn list(&self, sort: Sort<EmployeeSort>) -> Result<Vec<EmployeeDetail>> {
        let sql = format!("{DETAIL_SELECT} {}", sort.order_by());
        self.db.query(&sql, &[]).await?.decode()
    }

    /// Direct reports of one manager
    pub async fn list_by_manager(
        &self,
        manager_id: Id,
        sort: Sort<EmployeeSort>,
    ) -> Result<Vec<EmployeeDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE employee.manager_id = $1 {}", sort.order_by());
        self.db.query(&sql, &[SqlParam::Int(manager_id)]).await?.decode()
    }

    /// Employees whose role belongs to one department
    pub async fn list_by_department(
        &self,
        department_id: Id,
        sort: Sort<EmployeeSort>,
    ) -> Result<Vec<EmployeeDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE department.id = $1 {}", sort.order_by());
        self.db.query(&sql, &[SqlParam::Int(department_id)]).await?.decode()
    }

    /// One employee by id, plain columns only
    pub async fn get(&self, id: Id) -> Result<Option<Employee>> {
        self.db
            .query(
                "SELECT id, first_name, last_name, role_id, manager_id,
                        CAST(salary AS DOUBLE PRECISION) AS salary
                 FROM employee WHERE id = $1",
                &[SqlParam::Int(id)],
            )
            .await?
            .decode_first()
    }

    /// One employee with role, department and manager
    pub async fn get_detail(&self, id: Id) -> Result<Option<EmployeeDetail>> {
        let sql = format!("{DETAIL_SELECT} WHERE employee.id = $1");
        self.db.query(&sql, &[SqlParam::Int(id)]).await?.decode_first()
    }

    /// Insert an employee; `salary` must already be validated as positive
    pub async fn create(&self, employee: &NewEmployee) -> Result<Employee> {
        let sql = format!(
            "INSERT INTO employee (first_name, last_name, role_id, manager_id, salary)
             VALUES ($1, $2, $3, $4, CAST($5 AS DOUBLE PRECISION)) {RETURNING}"
        );
        let params = [
            SqlParam::from(employee.first_name.as_str()),
            SqlParam::from(employee.last_name.as_str()),
            SqlParam::from(employee.role_id),
            SqlParam::from(employee.manager_id),
            SqlParam::Float(employee.salary),
        ];
        let row = self.db.query(&sql, &params).await?.decode_first()?;
        row.ok_or_else(|| TrackerError::database("INSERT returned no row"))
    }

    /// Change the first name, `None` when the id matched nothing
    pub async fn update_first_name(&self, id: Id, first_name: &str) -> Result<Option<Employee>> {
        let sql = format!("UPDATE employee SET first_name = $1 WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[first_name.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Change the last name, `None` when the id matched nothing
    pub async fn update_last_name(&self, id: Id, last_name: &str) -> Result<Option<Employee>> {
        let sql = format!("UPDATE employee SET last_name = $1 WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[last_name.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Assign a role, or clear it with `None`
    pub async fn update_role(&self, id: Id, role_id: Option<Id>) -> Result<Option<Employee>> {
        let sql = format!("UPDATE employee SET role_id = $1 WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[role_id.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Link (or with `None`, unlink) a manager; cycles are not rejected here
    pub async fn update_manager(&self, id: Id, manager_id: Option<Id>) -> Result<Option<Employee>> {
        let sql = format!("UPDATE employee SET manager_id = $1 WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[manager_id.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Set the salary; `salary` must already be validated
    pub async fn update_salary(&self, id: Id, salary: f64) -> Result<Option<Employee>> {
        let sql = format!(
            "UPDATE employee SET salary = CAST($1 AS DOUBLE PRECISION) WHERE id = $2 {RETURNING}"
        );
        self.db.query(&sql, &[salary.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Delete an employee, returning its last values
    ///
    /// Direct reports keep existing; their manager link is cleared by the schema.
    pub async fn delete(&self, id: Id) -> Result<Option<Employee>> {
        let sql = format!("DELETE FROM employee WHERE id = $1 {RETURNING}");
        self.db.query(&sql, &[SqlParam::Int(id)]).await?.decode_first()
    }
}
