//! Role repository.

use crate::engine::{Database, SqlParam};
use crate::error::{Result, TrackerError};
use crate::model::{Id, Role, RoleDetail};
use crate::repo::{Sort, SortKey};

/// Plain `role` columns, salary read back as a float on every engine
const RETURNING: &str =
    "RETURNING id, title, CAST(salary AS DOUBLE PRECISION) AS salary, department_id";

const DETAIL_SELECT: &str = "
    SELECT role.id AS id, role.title AS title,
           CAST(role.salary AS DOUBLE PRECISION) AS salary,
           role.department_id AS department_id, department.name AS department
    FROM role
    LEFT JOIN department ON role.department_id = department.id";

/// Sortable role columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleSort {
    #[default]
    Id,
    Title,
    Salary,
    Department,
}

impl SortKey for RoleSort {
    const ALL: &'static [Self] = &[Self::Id, Self::Title, Self::Salary, Self::Department];

    fn key(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Salary => "salary",
            Self::Department => "department",
        }
    }

    fn column(self) -> &'static str {
        match self {
            Self::Id => "role.id",
            Self::Title => "role.title",
            Self::Salary => "role.salary",
            Self::Department => "department.name",
        }
    }

    fn nullable(self) -> bool {
        self == Self::Department
    }
}

/// Operations on the `role` table
pub struct Roles<'a, D> {
    db: &'a D,
}

impl<'a, D: Database> Roles<'a, D> {
    pub const fn new(db: &'a D) -> Self {
        Self { db }
    }

    /// Every role with its department name
    pub async fn list(&self, sort: Sort<RoleSort>) -> Result<Vec<RoleDetail>> {
        let sql = format!("{DETAIL_SELECT} {}", sort.order_by());
        self.db.query(&sql, &[]).await?.decode()
    }

    /// One role by id, without the joined department name
    pub async fn get(&self, id: Id) -> Result<Option<Role>> {
        self.db
            .query(
                "SELECT id, title, CAST(salary AS DOUBLE PRECISION) AS salary, department_id
                 FROM role WHERE id = $1",
                &[SqlParam::Int(id)],
            )
            .await?
            .decode_first()
    }

    /// Insert a role; `salary` must already be validated as positive
    pub async fn create(&self, title: &str, salary: f64, department_id: Option<Id>) -> Result<Role> {
        let sql = format!(
            "INSERT INTO role (title, salary, department_id)
             VALUES ($1, CAST($2 AS DOUBLE PRECISION), $3) {RETURNING}"
        );
        let row = self
            .db
            .query(&sql, &[title.into(), salary.into(), department_id.into()])
            .await?
            .decode_first()?;
        row.ok_or_else(|| TrackerError::database("INSERT returned no row"))
    }

    /// Retitle a role, `None` when the id matched nothing
    pub async fn update_title(&self, id: Id, title: &str) -> Result<Option<Role>> {
        let sql = format!("UPDATE role SET title = $1 WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[title.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Set a role's salary; `salary` must already be validated
    pub async fn update_salary(&self, id: Id, salary: f64) -> Result<Option<Role>> {
        let sql =
            format!("UPDATE role SET salary = CAST($1 AS DOUBLE PRECISION) WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[salary.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Move a role to another department, or detach it with `None`
    pub async fn update_department(&self, id: Id, department_id: Option<Id>) -> Result<Option<Role>> {
        let sql = format!("UPDATE role SET department_id = $1 WHERE id = $2 {RETURNING}");
        self.db.query(&sql, &[department_id.into(), SqlParam::Int(id)]).await?.decode_first()
    }

    /// Delete a role, returning its last values
    ///
    /// Fails with a database error while employees still hold the role.
    pub async fn delete(&self, id: Id) -> Result<Option<Role>> {
        let sql = format!("DELETE FROM role WHERE id = $1 {RETURNING}");
        self.db.query(&sql, &[SqlParam::Int(id)]).await?.decode_first()
    }
}
