//! Entity Repositories
//!
//! One repository per table. Each is a thin borrow of the shared
//! [`Database`](crate::engine::Database) handle and exposes flat
//! query/mutation operations against its own table, plus read-only joins to
//! related tables for display.
//!
//! # Sorting
//! Sort columns are never taken from user text. A [`SortKey`] enum maps
//! each user-facing key to a fixed column identifier; unknown keys parse to
//! the entity's `id` key.

pub mod department;
pub mod employee;
pub mod role;

pub use department::{DepartmentSort, Departments};
pub use employee::{EmployeeSort, Employees};
pub use role::{RoleSort, Roles};

/// A sortable column of one entity
pub trait SortKey: Copy + Default + PartialEq + 'static {
    /// Every key, in the order offered to the user
    const ALL: &'static [Self];

    /// User-facing name (`"first_name"`, `"salary"`, ...)
    fn key(self) -> &'static str;

    /// Fully qualified column identifier spliced into `ORDER BY`
    fn column(self) -> &'static str;

    /// Whether the column comes from an outer join and may be `NULL`
    fn nullable(self) -> bool {
        false
    }

    /// Parse a user-facing key, falling back to the default (`id`) key
    #[must_use]
    fn parse(key: &str) -> Self {
        Self::ALL.iter().copied().find(|k| k.key() == key).unwrap_or_default()
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const ALL: [Self; 2] = [Self::Asc, Self::Desc];

    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Parse `ASC`/`DESC` (case-insensitive), anything else is ascending
    #[must_use]
    pub fn parse(order: &str) -> Self {
        if order.trim().eq_ignore_ascii_case("desc") {
            Self::Desc
        } else {
            Self::Asc
        }
    }
}

/// A validated sort request
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Sort<K> {
    pub key: K,
    pub order: SortOrder,
}

impl<K: SortKey> Sort<K> {
    #[must_use]
    pub const fn new(key: K, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// Parse user-facing key and order strings through the allow-list
    #[must_use]
    pub fn parse(key: &str, order: &str) -> Self {
        Self { key: K::parse(key), order: SortOrder::parse(order) }
    }

    /// `ORDER BY` clause built only from allow-listed identifiers
    ///
    /// Non-id sorts get an ascending id tie-breaker. Nullable keys put
    /// `NULL` last in both directions so every engine orders alike.
    #[must_use]
    pub fn order_by(&self) -> String {
        let id = K::default();
        if self.key == id {
            format!("ORDER BY {} {}", id.column(), self.order.as_sql())
        } else {
            let nulls = if self.key.nullable() { " NULLS LAST" } else { "" };
            format!(
                "ORDER BY {} {}{nulls}, {} ASC",
                self.key.column(),
                self.order.as_sql(),
                id.column()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_key_falls_back_to_id() {
        let sort = Sort::<EmployeeSort>::parse("salary; DROP TABLE employee", "DESC");
        assert_eq!(sort.key, EmployeeSort::Id);
        assert_eq!(sort.order_by(), "ORDER BY employee.id DESC");
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Asc);
    }

    #[test]
    fn test_joined_keys_sort_nulls_last() {
        let sort = Sort::new(RoleSort::Department, SortOrder::Asc);
        assert_eq!(sort.order_by(), "ORDER BY department.name ASC NULLS LAST, role.id ASC");

        let sort = Sort::new(EmployeeSort::Title, SortOrder::Desc);
        assert_eq!(sort.order_by(), "ORDER BY role.title DESC NULLS LAST, employee.id ASC");

        let sort = Sort::new(EmployeeSort::LastName, SortOrder::Asc);
        assert_eq!(sort.order_by(), "ORDER BY employee.last_name ASC, employee.id ASC");
    }

    #[test]
    fn test_tie_breaker_for_non_id_keys() {
        let sort = Sort::new(RoleSort::Salary, SortOrder::Desc);
        assert_eq!(sort.order_by(), "ORDER BY role.salary DESC, role.id ASC");
    }

    #[test]
    fn test_every_key_round_trips_through_parse() {
        for key in DepartmentSort::ALL {
            assert_eq!(DepartmentSort::parse(key.key()), *key);
        }
        for key in RoleSort::ALL {
            assert_eq!(RoleSort::parse(key.key()), *key);
        }
        for key in EmployeeSort::ALL {
            assert_eq!(EmployeeSort::parse(key.key()), *key);
        }
    }

    #[test]
    fn test_columns_are_qualified_identifiers() {
        let columns = DepartmentSort::ALL
            .iter()
            .map(|k| k.column())
            .chain(RoleSort::ALL.iter().map(|k| k.column()))
            .chain(EmployeeSort::ALL.iter().map(|k| k.column()));
        for column in columns {
            assert!(column.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.'));
        }
    }
}
