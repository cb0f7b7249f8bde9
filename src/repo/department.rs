//! Department repository and budget aggregate.

use crate::engine::{Database, SqlParam};
use crate::error::{Result, TrackerError};
use crate::model::{Department, Id};
use crate::repo::{Sort, SortKey};

const COLUMNS: &str = "department.id AS id, department.name AS name";

/// Sortable department columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepartmentSort {
    #[default]
    Id,
    Name,
}

impl SortKey for DepartmentSort {
    const ALL: &'static [Self] = &[Self::Id, Self::Name];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "department.id",
            Self::Name => "department.name",
        }
    }
}

/// Operations on the `department` table
pub struct Departments<'a, D> {
    db: &'a D,
}

#[derive(serde::Deserialize)]
struct BudgetRow {
    total_budget: Option<f64>,
}

impl<'a, D: Database> Departments<'a, D> {
    pub const fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Every department in the requested order
    pub async fn list(&self, sort: Sort<DepartmentSort>) -> Result<Vec<Department>> {
        let sql = format!("SELECT {COLUMNS} FROM department {}", sort.order_by());
        self.db.query(&sql, &[]).await?.decode()
    }

    /// One department by id, `None` when it does not exist
    pub async fn get(&self, id: Id) -> Result<Option<Department>> {
        let sql = format!("SELECT {COLUMNS} FROM department WHERE department.id = $1");
        self.db.query(&sql, &[SqlParam::Int(id)]).await?.decode_first()
    }

    /// Insert a department and return it with its generated id
    pub async fn create(&self, name: &str) -> Result<Department> {
        let row = self
            .db
            .query("INSERT INTO department (name) VALUES ($1) RETURNING id, name", &[name.into()])
            .await?
            .decode_first()?;
        row.ok_or_else(|| TrackerError::database("INSERT returned no row"))
    }

    /// Rename a department, `None` when the id matched nothing
    pub async fn update_name(&self, id: Id, name: &str) -> Result<Option<Department>> {
        self.db
            .query(
                "UPDATE department SET name = $1 WHERE id = $2 RETURNING id, name",
                &[name.into(), SqlParam::Int(id)],
            )
            .await?
            .decode_first()
    }

    /// Delete a department, returning its last values
    ///
    /// Fails with a database error while roles still reference it.
    pub async fn delete(&self, id: Id) -> Result<Option<Department>> {
        self.db
            .query("DELETE FROM department WHERE id = $1 RETURNING id, name", &[SqlParam::Int(id)])
            .await?
            .decode_first()
    }

    /// Sum of the salaries of every employee whose role belongs to the department
    ///
    /// A department without employees has a budget of 0.
    pub async fn budget(&self, id: Id) -> Result<f64> {
        let row: Option<BudgetRow> = self
            .db
            .query(
                "SELECT SUM(CAST(employee.salary AS DOUBLE PRECISION)) AS total_budget
                 FROM employee
                 INNER JOIN role ON employee.role_id = role.id
                 WHERE role.department_id = $1",
                &[SqlParam::Int(id)],
            )
            .await?
            .decode_first()?;

        Ok(row.and_then(|r| r.total_budget).unwrap_or(0.0))
    }
}
