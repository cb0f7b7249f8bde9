//! Interactive Controller
//!
//! [`App::run`] shows the main menu, runs the chosen action and loops until
//! "Exit" is chosen. Each action is a short linear sequence: fetch fresh
//! rows, prompt, call one repository operation, print the result.
//!
//! Not-found and database errors are printed as one line and the menu is
//! shown again. Fatal errors (prompt or console failures) end the loop.

use std::fmt::Display;
use std::io::Write;

use tabled::Tabled;
use tracing::{info, warn};

use crate::engine::Database;
use crate::error::{Result, TrackerError};
use crate::format::{self, NONE_LABEL};
use crate::model::{Department, EmployeeDetail, Id, NewEmployee, RoleDetail};
use crate::prompt::Prompter;
use crate::repo::{
    Departments, DepartmentSort, EmployeeSort, Employees, RoleSort, Roles, Sort, SortKey,
    SortOrder,
};

const BANNER: &str = r"
+------------------------------------------------+
|                                                |
|              E M P L O Y E E                   |
|              T R A C K E R                     |
|                                                |
+------------------------------------------------+
";

const BACK: &str = "Back";
const EMPLOYEE_FIELDS: [&str; 6] = ["First Name", "Last Name", "Role", "Manager", "Salary", BACK];
const ROLE_FIELDS: [&str; 4] = ["Title", "Salary", "Department", BACK];
const DEPARTMENT_FIELDS: [&str; 2] = ["Name", BACK];

/// One entry of the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    ViewEmployees,
    ViewEmployeesByManager,
    ViewEmployeesByDepartment,
    AddEmployee,
    UpdateEmployee,
    DeleteEmployee,
    ViewRoles,
    AddRole,
    UpdateRole,
    DeleteRole,
    ViewDepartments,
    AddDepartment,
    UpdateDepartment,
    DeleteDepartment,
    ViewDepartmentBudget,
    Exit,
}

impl MenuAction {
    /// Menu order
    pub const ALL: [Self; 16] = [
        Self::ViewEmployees,
        Self::ViewEmployeesByManager,
        Self::ViewEmployeesByDepartment,
        Self::AddEmployee,
        Self::UpdateEmployee,
        Self::DeleteEmployee,
        Self::ViewRoles,
        Self::AddRole,
        Self::UpdateRole,
        Self::DeleteRole,
        Self::ViewDepartments,
        Self::AddDepartment,
        Self::UpdateDepartment,
        Self::DeleteDepartment,
        Self::ViewDepartmentBudget,
        Self::Exit,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ViewEmployees => "View All Employees",
            Self::ViewEmployeesByManager => "View Employees by Manager",
            Self::ViewEmployeesByDepartment => "View Employees by Department",
            Self::AddEmployee => "Add Employee",
            Self::UpdateEmployee => "Update Employee Info",
            Self::DeleteEmployee => "Delete Employee",
            Self::ViewRoles => "View All Roles",
            Self::AddRole => "Add Role",
            Self::UpdateRole => "Update Role Info",
            Self::DeleteRole => "Delete Role",
            Self::ViewDepartments => "View All Departments",
            Self::AddDepartment => "Add Department",
            Self::UpdateDepartment => "Update Department Info",
            Self::DeleteDepartment => "Delete Department",
            Self::ViewDepartmentBudget => "View Department Budget",
            Self::Exit => "Exit",
        }
    }

    /// Menu group heading, `None` for "Exit"
    #[must_use]
    pub const fn group(self) -> Option<&'static str> {
        match self {
            Self::ViewEmployees
            | Self::ViewEmployeesByManager
            | Self::ViewEmployeesByDepartment
            | Self::AddEmployee
            | Self::UpdateEmployee
            | Self::DeleteEmployee => Some("Employees"),
            Self::ViewRoles | Self::AddRole | Self::UpdateRole | Self::DeleteRole => Some("Roles"),
            Self::ViewDepartments
            | Self::AddDepartment
            | Self::UpdateDepartment
            | Self::DeleteDepartment
            | Self::ViewDepartmentBudget => Some("Departments"),
            Self::Exit => None,
        }
    }

    /// Text shown for this entry in the main menu
    #[must_use]
    pub fn menu_item(self) -> String {
        match self.group() {
            Some(group) => format!("[{group}] {}", self.label()),
            None => self.label().to_string(),
        }
    }
}

/// How an action ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Done,
    Back,
}

/// Exclusive upper bound of a salary, the range of a `DECIMAL(12, 2)` column
pub const MAX_SALARY: f64 = 10_000_000_000.0;

/// Parse a salary answer: numeric, strictly positive and below [`MAX_SALARY`]
pub fn parse_salary(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(value) if value > 0.0 && value < MAX_SALARY => Ok(value),
        _ => Err(TrackerError::validation("Please enter a valid salary")),
    }
}

/// Parse a required text answer: trimmed and non-empty
pub fn parse_required(input: &str) -> Result<String> {
    let value = input.trim();
    if value.is_empty() {
        Err(TrackerError::validation("Please enter a value"))
    } else {
        Ok(value.to_string())
    }
}

fn found<T>(row: Option<T>, entity: &str, id: Id) -> Result<T> {
    row.ok_or_else(|| TrackerError::not_found(format!("{entity} {id} was not found")))
}

/// The menu loop over one database handle
pub struct App<'a, D, P, W> {
    db: &'a D,
    prompter: P,
    out: W,
}

impl<'a, D: Database, P: Prompter, W: Write> App<'a, D, P, W> {
    pub const fn new(db: &'a D, prompter: P, out: W) -> Self {
        Self { db, prompter, out }
    }

    /// Run until "Exit" is chosen or a fatal error occurs
    pub async fn run(&mut self) -> Result<()> {
        self.say(BANNER)?;
        let items: Vec<String> = MenuAction::ALL.iter().map(|a| a.menu_item()).collect();

        loop {
            let idx = self.prompter.select("What would you like to do?", &items)?;
            let Some(action) = MenuAction::ALL.get(idx).copied() else {
                warn!(idx, "menu selection out of range");
                self.say("Error: Menu selection out of range")?;
                continue;
            };

            if action == MenuAction::Exit {
                info!("exit selected");
                return Ok(());
            }

            match self.dispatch(action).await {
                Ok(Step::Back) => continue,
                Ok(Step::Done) => {}
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!(action = action.label(), code = err.error_code(), "action failed: {err}");
                    self.say(format_args!("Error: {}", err.message()))?;
                }
            }

            self.prompter.pause()?;
        }
    }

    async fn dispatch(&mut self, action: MenuAction) -> Result<Step> {
        match action {
            MenuAction::ViewEmployees => self.view_employees().await,
            MenuAction::ViewEmployeesByManager => self.view_employees_by_manager().await,
            MenuAction::ViewEmployeesByDepartment => self.view_employees_by_department().await,
            MenuAction::AddEmployee => self.add_employee().await,
            MenuAction::UpdateEmployee => self.update_employee().await,
            MenuAction::DeleteEmployee => self.delete_employee().await,
            MenuAction::ViewRoles => self.view_roles().await,
            MenuAction::AddRole => self.add_role().await,
            MenuAction::UpdateRole => self.update_role().await,
            MenuAction::DeleteRole => self.delete_role().await,
            MenuAction::ViewDepartments => self.view_departments().await,
            MenuAction::AddDepartment => self.add_department().await,
            MenuAction::UpdateDepartment => self.update_department().await,
            MenuAction::DeleteDepartment => self.delete_department().await,
            MenuAction::ViewDepartmentBudget => self.view_department_budget().await,
            MenuAction::Exit => Ok(Step::Back),
        }
    }

    const fn employees(&self) -> Employees<'a, D> {
        Employees::new(self.db)
    }

    const fn roles(&self) -> Roles<'a, D> {
        Roles::new(self.db)
    }

    const fn departments(&self) -> Departments<'a, D> {
        Departments::new(self.db)
    }

    // ------------------------------------------------------------------
    // Employees
    // ------------------------------------------------------------------

    async fn view_employees(&mut self) -> Result<Step> {
        let sort = self.prompt_sort::<EmployeeSort>()?;
        let rows = self.employees().list(sort).await?;
        self.show_table(&format::employees(&rows), "No employees found.")?;
        Ok(Step::Done)
    }

    async fn view_employees_by_manager(&mut self) -> Result<Step> {
        let everyone = self.employees().list(Sort::default()).await?;
        let Some(manager) = self.pick("Select manager:", &everyone, EmployeeDetail::full_name)?
        else {
            self.say("No employees found.")?;
            return Ok(Step::Done);
        };

        let sort = self.prompt_sort::<EmployeeSort>()?;
        let rows = self.employees().list_by_manager(manager.id, sort).await?;
        let empty = format!("{} has no direct reports.", manager.full_name());
        self.show_table(&format::employees(&rows), &empty)?;
        Ok(Step::Done)
    }

    async fn view_employees_by_department(&mut self) -> Result<Step> {
        let departments = self.departments().list(Sort::default()).await?;
        let Some(department) =
            self.pick("Select department:", &departments, |d: &Department| d.name.clone())?
        else {
            self.say("No departments found.")?;
            return Ok(Step::Done);
        };

        let sort = self.prompt_sort::<EmployeeSort>()?;
        let rows = self.employees().list_by_department(department.id, sort).await?;
        let empty = format!("No employees found in {}.", department.name);
        self.show_table(&format::employees(&rows), &empty)?;
        Ok(Step::Done)
    }

    async fn add_employee(&mut self) -> Result<Step> {
        let first_name = self.prompt_text("Enter first name:")?;
        let last_name = self.prompt_text("Enter last name:")?;

        let roles = self.roles().list(Sort::default()).await?;
        let role_id = self.pick_optional("Select role:", &roles, |r| r.title.clone(), |r| r.id)?;

        let everyone = self.employees().list(Sort::default()).await?;
        let manager_id =
            self.pick_optional("Select manager:", &everyone, EmployeeDetail::full_name, |e| e.id)?;

        let salary = self.prompt_salary("Enter salary:")?;

        let created = self
            .employees()
            .create(&NewEmployee { first_name, last_name, role_id, manager_id, salary })
            .await?;

        info!(id = created.id, "employee added");
        self.say(format_args!("Added employee {} successfully.", created.full_name()))?;
        Ok(Step::Done)
    }

    async fn update_employee(&mut self) -> Result<Step> {
        let everyone = self.employees().list(Sort::default()).await?;
        if everyone.is_empty() {
            self.say("No employees found.")?;
            return Ok(Step::Done);
        }
        self.show_table(&format::employees(&everyone), "")?;

        let Some(target) =
            self.pick("Select employee to update:", &everyone, EmployeeDetail::full_name)?
        else {
            return Ok(Step::Done);
        };
        let id = target.id;

        let updated = match self.choose("Select the field to update:", &EMPLOYEE_FIELDS)? {
            "First Name" => {
                let value = self.prompt_text("Enter new first name:")?;
                self.employees().update_first_name(id, &value).await?
            }
            "Last Name" => {
                let value = self.prompt_text("Enter new last name:")?;
                self.employees().update_last_name(id, &value).await?
            }
            "Role" => {
                let roles = self.roles().list(Sort::default()).await?;
                let role_id =
                    self.pick_optional("Select new role:", &roles, |r| r.title.clone(), |r| r.id)?;
                self.employees().update_role(id, role_id).await?
            }
            "Manager" => {
                let others: Vec<&EmployeeDetail> = everyone.iter().filter(|e| e.id != id).collect();
                let manager_id = self.pick_optional(
                    "Select new manager:",
                    &others,
                    |e| e.full_name(),
                    |e| e.id,
                )?;
                self.employees().update_manager(id, manager_id).await?
            }
            "Salary" => {
                let salary = self.prompt_salary("Enter new salary:")?;
                self.employees().update_salary(id, salary).await?
            }
            _ => return Ok(Step::Back),
        };

        let employee = found(updated, "Employee", id)?;
        info!(id = employee.id, "employee updated");
        self.say(format_args!("Updated employee {} successfully.", employee.full_name()))?;
        Ok(Step::Done)
    }

    async fn delete_employee(&mut self) -> Result<Step> {
        let everyone = self.employees().list(Sort::default()).await?;
        if everyone.is_empty() {
            self.say("No employees found.")?;
            return Ok(Step::Done);
        }
        self.show_table(&format::employees(&everyone), "")?;

        let Some(target) =
            self.pick("Select employee to delete:", &everyone, EmployeeDetail::full_name)?
        else {
            return Ok(Step::Done);
        };
        let id = target.id;

        if !self.prompter.confirm("Are you sure you want to delete this employee?")? {
            return Ok(Step::Done);
        }

        let deleted = found(self.employees().delete(id).await?, "Employee", id)?;
        info!(id, "employee deleted");
        self.say(format_args!("Deleted employee {} successfully.", deleted.full_name()))?;
        Ok(Step::Done)
    }

    // ------------------------------------------------------------------
    // Roles
    // ------------------------------------------------------------------

    async fn view_roles(&mut self) -> Result<Step> {
        let sort = self.prompt_sort::<RoleSort>()?;
        let rows = self.roles().list(sort).await?;
        self.show_table(&format::roles(&rows), "No roles found.")?;
        Ok(Step::Done)
    }

    async fn add_role(&mut self) -> Result<Step> {
        let title = self.prompt_text("Enter role title:")?;
        let salary = self.prompt_salary("Enter role salary:")?;

        let departments = self.departments().list(Sort::default()).await?;
        let department_id =
            self.pick_optional("Select department:", &departments, |d| d.name.clone(), |d| d.id)?;

        let created = self.roles().create(&title, salary, department_id).await?;
        info!(id = created.id, "role added");
        self.say(format_args!("Added role {} successfully.", created.title))?;
        Ok(Step::Done)
    }

    async fn update_role(&mut self) -> Result<Step> {
        let roles = self.roles().list(Sort::default()).await?;
        if roles.is_empty() {
            self.say("No roles found.")?;
            return Ok(Step::Done);
        }
        self.show_table(&format::roles(&roles), "")?;

        let Some(target) =
            self.pick("Select role to update:", &roles, |r: &RoleDetail| r.title.clone())?
        else {
            return Ok(Step::Done);
        };
        let id = target.id;

        let updated = match self.choose("Select the field to update:", &ROLE_FIELDS)? {
            "Title" => {
                let value = self.prompt_text("Enter new title:")?;
                self.roles().update_title(id, &value).await?
            }
            "Salary" => {
                let salary = self.prompt_salary("Enter new salary:")?;
                self.roles().update_salary(id, salary).await?
            }
            "Department" => {
                let departments = self.departments().list(Sort::default()).await?;
                let department_id = self.pick_optional(
                    "Select new department:",
                    &departments,
                    |d| d.name.clone(),
                    |d| d.id,
                )?;
                self.roles().update_department(id, department_id).await?
            }
            _ => return Ok(Step::Back),
        };

        let role = found(updated, "Role", id)?;
        info!(id = role.id, "role updated");
        self.say(format_args!("Updated role {} successfully.", role.title))?;
        Ok(Step::Done)
    }

    async fn delete_role(&mut self) -> Result<Step> {
        let roles = self.roles().list(Sort::default()).await?;
        if roles.is_empty() {
            self.say("No roles found.")?;
            return Ok(Step::Done);
        }
        self.show_table(&format::roles(&roles), "")?;

        let Some(target) =
            self.pick("Select role to delete:", &roles, |r: &RoleDetail| r.title.clone())?
        else {
            return Ok(Step::Done);
        };
        let id = target.id;

        if !self.prompter.confirm("Are you sure you want to delete this role?")? {
            return Ok(Step::Done);
        }

        let deleted = found(self.roles().delete(id).await?, "Role", id)?;
        info!(id, "role deleted");
        self.say(format_args!("Deleted role {} successfully.", deleted.title))?;
        Ok(Step::Done)
    }

    // ------------------------------------------------------------------
    // Departments
    // ------------------------------------------------------------------

    async fn view_departments(&mut self) -> Result<Step> {
        let sort = self.prompt_sort::<DepartmentSort>()?;
        let rows = self.departments().list(sort).await?;
        self.show_table(&format::departments(&rows), "No departments found.")?;
        Ok(Step::Done)
    }

    async fn add_department(&mut self) -> Result<Step> {
        let name = self.prompt_text("Enter department name:")?;
        let created = self.departments().create(&name).await?;
        info!(id = created.id, "department added");
        self.say(format_args!("Added department {} successfully.", created.name))?;
        Ok(Step::Done)
    }

    async fn update_department(&mut self) -> Result<Step> {
        let departments = self.departments().list(Sort::default()).await?;
        if departments.is_empty() {
            self.say("No departments found.")?;
            return Ok(Step::Done);
        }
        self.show_table(&format::departments(&departments), "")?;

        let Some(target) =
            self.pick("Select department to update:", &departments, |d: &Department| d.name.clone())?
        else {
            return Ok(Step::Done);
        };
        let id = target.id;

        if self.choose("Select the field to update:", &DEPARTMENT_FIELDS)? != "Name" {
            return Ok(Step::Back);
        }
        let name = self.prompt_text("Enter new name:")?;

        let department = found(self.departments().update_name(id, &name).await?, "Department", id)?;
        info!(id = department.id, "department updated");
        self.say(format_args!("Updated department {} successfully.", department.name))?;
        Ok(Step::Done)
    }

    async fn delete_department(&mut self) -> Result<Step> {
        let departments = self.departments().list(Sort::default()).await?;
        if departments.is_empty() {
            self.say("No departments found.")?;
            return Ok(Step::Done);
        }
        self.show_table(&format::departments(&departments), "")?;

        let Some(target) =
            self.pick("Select department to delete:", &departments, |d: &Department| d.name.clone())?
        else {
            return Ok(Step::Done);
        };
        let id = target.id;

        if !self.prompter.confirm("Are you sure you want to delete this department?")? {
            return Ok(Step::Done);
        }

        let deleted = found(self.departments().delete(id).await?, "Department", id)?;
        info!(id, "department deleted");
        self.say(format_args!("Deleted department {} successfully.", deleted.name))?;
        Ok(Step::Done)
    }

    async fn view_department_budget(&mut self) -> Result<Step> {
        let departments = self.departments().list(Sort::default()).await?;
        let Some(target) = self.pick(
            "Select department to view budget:",
            &departments,
            |d: &Department| d.name.clone(),
        )?
        else {
            self.say("No departments found.")?;
            return Ok(Step::Done);
        };

        let budget = self.departments().budget(target.id).await?;
        self.say(format_args!(
            "Total Utilized Budget of {}: {}",
            target.name,
            format::currency(budget)
        ))?;
        Ok(Step::Done)
    }

    // ------------------------------------------------------------------
    // Prompt helpers
    // ------------------------------------------------------------------

    fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn show_table<T: Tabled>(&mut self, rows: &[T], empty: &str) -> Result<()> {
        if rows.is_empty() {
            self.say(empty)
        } else {
            self.say(format::table(rows))
        }
    }

    /// Pick one item; `None` only when `items` is empty
    fn pick<'t, T>(
        &mut self,
        prompt: &str,
        items: &'t [T],
        label: impl Fn(&T) -> String,
    ) -> Result<Option<&'t T>> {
        if items.is_empty() {
            return Ok(None);
        }
        let labels: Vec<String> = items.iter().map(label).collect();
        let idx = self.prompter.select(prompt, &labels)?;
        Ok(items.get(idx))
    }

    /// Pick one item's id or the trailing "None" choice
    fn pick_optional<T>(
        &mut self,
        prompt: &str,
        items: &[T],
        label: impl Fn(&T) -> String,
        id: impl Fn(&T) -> Id,
    ) -> Result<Option<Id>> {
        let mut labels: Vec<String> = items.iter().map(label).collect();
        labels.push(NONE_LABEL.to_string());
        let idx = self.prompter.select(prompt, &labels)?;
        Ok(items.get(idx).map(id))
    }

    fn choose(&mut self, prompt: &str, options: &[&'static str]) -> Result<&'static str> {
        let labels: Vec<String> = options.iter().map(|o| (*o).to_string()).collect();
        let idx = self.prompter.select(prompt, &labels)?;
        Ok(options.get(idx).copied().unwrap_or(BACK))
    }

    /// Trimmed, non-empty text; re-prompts until valid
    fn prompt_text(&mut self, prompt: &str) -> Result<String> {
        loop {
            let answer = self.prompter.input(prompt)?;
            match parse_required(&answer) {
                Ok(value) => return Ok(value),
                Err(err) => self.say(err.message())?,
            }
        }
    }

    /// Positive numeric salary; re-prompts until valid
    fn prompt_salary(&mut self, prompt: &str) -> Result<f64> {
        loop {
            let answer = self.prompter.input(prompt)?;
            match parse_salary(&answer) {
                Ok(salary) => return Ok(salary),
                Err(err) => self.say(err.message())?,
            }
        }
    }

    fn prompt_sort<K: SortKey>(&mut self) -> Result<Sort<K>> {
        let keys: Vec<String> = K::ALL.iter().map(|k| k.key().to_string()).collect();
        let key = self.prompter.select("Sort by:", &keys)?;
        let orders: Vec<String> = SortOrder::ALL.iter().map(|o| o.as_sql().to_string()).collect();
        let order = self.prompter.select("Order:", &orders)?;

        Ok(Sort::new(
            K::ALL.get(key).copied().unwrap_or_default(),
            SortOrder::ALL.get(order).copied().unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_salary_validation() {
        assert_eq!(parse_salary("50000").unwrap(), 50000.0);
        assert_eq!(parse_salary("50000.50").unwrap(), 50000.5);
        assert_eq!(parse_salary(" 72000 ").unwrap(), 72000.0);

        assert_eq!(parse_salary("9999999999.99").unwrap(), 9_999_999_999.99);

        for bad in ["-5", "abc", "", "0", "NaN", "inf", "1e20", "10000000000"] {
            let err = parse_salary(bad).unwrap_err();
            assert!(matches!(err, TrackerError::Validation(_)), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_required_text_is_trimmed() {
        assert_eq!(parse_required("  Ada \n").unwrap(), "Ada");
        assert!(matches!(parse_required("   "), Err(TrackerError::Validation(_))));
    }

    #[test]
    fn test_menu_items_are_grouped() {
        assert_eq!(MenuAction::AddEmployee.menu_item(), "[Employees] Add Employee");
        assert_eq!(MenuAction::ViewDepartmentBudget.menu_item(), "[Departments] View Department Budget");
        assert_eq!(MenuAction::Exit.menu_item(), "Exit");
        assert_eq!(MenuAction::ALL.last(), Some(&MenuAction::Exit));
    }

    #[test]
    fn test_found_reports_missing_rows() {
        let err = found::<()>(None, "Role", 4).unwrap_err();
        assert_eq!(err.message(), "Role 4 was not found");
        assert!(!err.is_fatal());
    }
}
