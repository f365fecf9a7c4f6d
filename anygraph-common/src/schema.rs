//! Dataset schema types and the provider contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One column of a tabular dataset, as surfaced to the LLM prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name exactly as it appears in the dataset header
    pub name: String,

    /// Datatype label (e.g. "int64", "float64", "object")
    pub datatype: String,

    /// Representative value from the first rows, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_value: Option<String>,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            datatype: datatype.into(),
            example_value: None,
        }
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example_value = Some(example.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Schema backend error: {0}")]
    Backend(String),
}

/// How a persistence layer supplies dataset schemas.
///
/// The execution core is schema-agnostic; schemas only feed prompt
/// construction. Implementations typically sit on top of whatever store
/// registered the dataset URL in the first place.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// Ordered columns for a registered dataset URL.
    async fn get_columns(&self, dataset_url: &str) -> Result<Vec<ColumnInfo>, SchemaError>;
}

/// Fixed in-memory schema, for tests and one-shot CLI runs.
#[derive(Debug, Clone, Default)]
pub struct StaticSchemaProvider {
    columns: Vec<ColumnInfo>,
}

impl StaticSchemaProvider {
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self { columns }
    }
}

#[async_trait]
impl SchemaProvider for StaticSchemaProvider {
    async fn get_columns(&self, _dataset_url: &str) -> Result<Vec<ColumnInfo>, SchemaError> {
        Ok(self.columns.clone())
    }
}
