//! Declared dataset columns and their scalar types
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::operator::OperatorClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Number,
    Boolean,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Number => "number",
            ColumnType::Boolean => "boolean",
        }
    }

    /// Operators this column type may be compared with
    pub fn operator_class(&self) -> OperatorClass {
        match self {
            ColumnType::String => OperatorClass::String,
            ColumnType::Number => OperatorClass::Number,
            ColumnType::Boolean => OperatorClass::Boolean,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown column type '{0}', expected one of: string, number, boolean")]
pub struct UnknownColumnType(pub String);

impl FromStr for ColumnType {
    type Err = UnknownColumnType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "text" => Ok(ColumnType::String),
            "number" | "num" | "numeric" => Ok(ColumnType::Number),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            _ => Err(UnknownColumnType(s.to_string())),
        }
    }
}

/// One declared column, as it appears in a schema file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

/// Known columns plus their declared types.
///
/// Names keep their declared case. Both lookups are case-insensitive, so a
/// column declared as `RACe` answers to `race` and `RACE`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSchema {
    names: Vec<String>,
    types: HashMap<String, ColumnType>,
}

impl ColumnSchema {
    /// Build from an ordered name list and a type map keyed by lowercase name
    pub fn new<N, S>(names: N, types: HashMap<String, ColumnType>) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            types,
        }
    }

    pub fn from_columns(columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        let mut schema = Self::default();
        for column in columns {
            schema.insert(column.name, column.column_type);
        }
        schema
    }

    /// Parse `{"columns": [{"name": "age", "type": "number"}, ...]}`
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct SchemaFile {
            columns: Vec<ColumnDef>,
        }

        let file: SchemaFile = serde_json::from_str(json)?;
        Ok(Self::from_columns(file.columns))
    }

    pub fn insert(&mut self, name: impl Into<String>, column_type: ColumnType) {
        let name = name.into();
        self.types.insert(name.to_lowercase(), column_type);
        if self.resolve(&name).is_none() {
            self.names.push(name);
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Declared spelling of `column`, matched case-insensitively
    pub fn resolve(&self, column: &str) -> Option<&str> {
        let lower = column.to_lowercase();
        self.names
            .iter()
            .find(|name| name.to_lowercase() == lower)
            .map(String::as_str)
    }

    /// Declared type of `column`: exact lowercase key first, then a
    /// case-insensitive scan for maps built with mixed-case keys
    pub fn column_type(&self, column: &str) -> Option<ColumnType> {
        let lower = column.to_lowercase();
        self.types.get(&lower).copied().or_else(|| {
            self.types
                .iter()
                .find(|(key, _)| key.to_lowercase() == lower)
                .map(|(_, ty)| *ty)
        })
    }
}
