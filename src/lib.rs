//! Emptrack - Interactive Employee Tracker
//!
//! Emptrack manages a small organizational dataset (departments, roles,
//! employees) stored in `PostgreSQL` or `SQLite`. A user picks actions from
//! a menu, answers prompts, and the tool runs one parameterized statement
//! per action and prints the result as a table.
//!
//! # Architecture
//! Controller -> Repository -> Database handle -> rows -> Formatter -> console.
//! Exactly one statement is in flight at a time.
//!
//! # Module Organization
//! - [`error`] - Error types and handling
//! - [`config`] - Connection settings from the environment
//! - [`engine`] - Database trait, engines and the process-wide handle
//! - [`model`] - Typed rows
//! - [`repo`] - Department, role and employee repositories
//! - [`format`] - Display rows, currency and table rendering
//! - [`prompt`] - Prompt abstraction and terminal implementation
//! - [`app`] - The interactive menu loop

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod model;
pub mod prompt;
pub mod repo;

// Re-export commonly used types for convenience
pub use app::{App, MenuAction};
pub use config::{load_dotenv, resolve_connection, resolve_connection_with};
pub use engine::{acquire, ConnectionConfig, Database, DatabaseType, Handle, QueryResult, SqlParam};
pub use error::{Result, TrackerError};
pub use model::{Department, Employee, EmployeeDetail, Id, NewEmployee, Role, RoleDetail};
pub use prompt::{Prompter, TerminalPrompter};
pub use repo::{Departments, Employees, Roles, Sort, SortKey, SortOrder};
