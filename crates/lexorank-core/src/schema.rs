use std::collections::{BTreeMap, BTreeSet};

///
/// Schema
///
/// Caller-supplied description of one collection's table, consulted once at
/// registration to validate the configured rank and group fields.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Schema {
    table: String,
    columns: BTreeSet<String>,
    associations: BTreeMap<String, String>,
}

impl Schema {
    #[must_use]
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.insert(name.into());
        self
    }

    /// Declare a belongs-to style association and the column holding its key.
    #[must_use]
    pub fn association(mut self, name: impl Into<String>, foreign_key: impl Into<String>) -> Self {
        let foreign_key = foreign_key.into();
        self.columns.insert(foreign_key.clone());
        self.associations.insert(name.into(), foreign_key);
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn column_exists(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    #[must_use]
    pub fn resolve_association_foreign_key(&self, name: &str) -> Option<&str> {
        self.associations.get(name).map(String::as_str)
    }
}

///
/// TESTS
///
