//! Record schemas
//!
//! Schemas are TOML documents listing record types:
//!
//! ```toml
//! [[record]]
//! name = "Node"
//! tag = "Node"
//!
//! [[record.field]]
//! name = "children"
//! type = "list[Node]"
//! default = []
//! ```

use crate::error::{ConvcacheError, ConvcacheResult};
use crate::types::expr::TypeExpr;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;
use tracing::debug;

/// Key carrying a record's tag in encoded JSON
pub const TAG_KEY: &str = "_type_";

/// A set of record definitions that type expressions may refer to
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, rename = "record")]
    records: Vec<RecordDef>,
}

/// A record type: a JSON object with named, typed fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDef {
    /// Type name used in type expressions
    pub name: String,

    /// Discriminator written to [`TAG_KEY`] on encode and required by check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    /// Also accept a JSON array of field values, in field order
    #[serde(default)]
    pub positional: bool,

    /// Fields in declaration order
    #[serde(default, rename = "field")]
    pub fields: Vec<FieldDef>,
}

/// A single record field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,

    #[serde(rename = "type")]
    pub ty: TypeExpr,

    /// JSON value used when the field is missing; fields without one are required
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl FieldDef {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

impl Schema {
    /// Build a schema from record definitions, validating it
    pub fn new(records: Vec<RecordDef>) -> ConvcacheResult<Self> {
        let schema = Self { records };
        schema.validate()?;
        Ok(schema)
    }

    /// Parse and validate a schema from TOML text
    pub fn from_toml(content: &str) -> ConvcacheResult<Self> {
        let schema: Schema = toml::from_str(content)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Load a schema file
    pub async fn load(path: &Path) -> ConvcacheResult<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ConvcacheError::io(format!("reading schema from {}", path.display()), e))?;

        let schema: Schema = toml::from_str(&content).map_err(|e| ConvcacheError::SchemaInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        schema.validate()?;

        debug!(
            "Loaded {} record(s) from {}",
            schema.records.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Look up a record by name
    pub fn record(&self, name: &str) -> Option<&RecordDef> {
        self.records.iter().find(|record| record.name == name)
    }

    pub fn records(&self) -> &[RecordDef] {
        &self.records
    }

    /// Check that names are unique, every referenced record exists, and no
    /// field of a tagged record shadows the tag key
    pub fn validate(&self) -> ConvcacheResult<()> {
        let mut names = HashSet::new();
        for record in &self.records {
            if !names.insert(record.name.as_str()) {
                return Err(ConvcacheError::DuplicateDefinition(record.name.clone()));
            }
            if record.name.parse::<TypeExpr>().ok() != Some(TypeExpr::named(&record.name)) {
                return Err(ConvcacheError::TypeSyntax {
                    input: record.name.clone(),
                    reason: "not usable as a record name".to_string(),
                });
            }
        }

        for record in &self.records {
            let mut fields = HashSet::new();
            for field in &record.fields {
                if !fields.insert(field.name.as_str()) {
                    return Err(ConvcacheError::DuplicateDefinition(format!(
                        "{}.{}",
                        record.name, field.name
                    )));
                }
                if record.tag.is_some() && field.name == TAG_KEY {
                    return Err(ConvcacheError::ReservedField {
                        record: record.name.clone(),
                        field: field.name.clone(),
                    });
                }
                if let Some(missing) = field
                    .ty
                    .references()
                    .into_iter()
                    .find(|name| !names.contains(name))
                {
                    return Err(ConvcacheError::UnknownType(missing.to_string()));
                }
            }
        }

        Ok(())
    }
}
