//! Declared output schema
//!
//! The schema is data, not a Rust type: the set of systems (and therefore the
//! keys of `annotations` and `system_outputs`) differs per configuration.

use serde_json::{json, Map, Value};

use crate::config::ConfigSpec;
use crate::error::{RoseError, RoseResult};

/// Scalar value type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dtype {
    String,
    Int64,
    Float32,
}

impl Dtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dtype::String => "string",
            Dtype::Int64 => "int64",
            Dtype::Float32 => "float32",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Dtype::String => value.is_string(),
            Dtype::Int64 => value.is_i64() || value.is_u64(),
            Dtype::Float32 => value.is_number(),
        }
    }
}

/// A node of the schema tree
#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Value(Dtype),
    Sequence(Box<Feature>),
    /// Ordered named fields
    Struct(Vec<(String, Feature)>),
}

impl Feature {
    pub fn sequence(inner: Feature) -> Self {
        Feature::Sequence(Box::new(inner))
    }

    /// Look up a direct child of a struct node
    pub fn field(&self, name: &str) -> Option<&Feature> {
        match self {
            Feature::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, f)| f),
            _ => None,
        }
    }

    /// Render in the conventional dataset-features JSON shape
    pub fn to_json(&self) -> Value {
        match self {
            Feature::Value(dtype) => json!({ "dtype": dtype.as_str(), "_type": "Value" }),
            Feature::Sequence(inner) => json!({ "feature": inner.to_json(), "_type": "Sequence" }),
            Feature::Struct(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, f)| (name.clone(), f.to_json()))
                    .collect(),
            ),
        }
    }

    fn validate_at(&self, value: &Value, path: &str) -> RoseResult<()> {
        if value.is_null() {
            return Ok(());
        }

        match self {
            Feature::Value(dtype) => {
                if dtype.accepts(value) {
                    Ok(())
                } else {
                    Err(mismatch(path, dtype.as_str()))
                }
            }
            Feature::Sequence(inner) => {
                let items = value.as_array().ok_or_else(|| mismatch(path, "sequence"))?;
                for (i, item) in items.iter().enumerate() {
                    inner.validate_at(item, &format!("{}[{}]", path, i))?;
                }
                Ok(())
            }
            Feature::Struct(fields) => {
                let object = value.as_object().ok_or_else(|| mismatch(path, "struct"))?;
                validate_fields(fields, object, path)
            }
        }
    }
}

fn mismatch(path: &str, expected: &str) -> RoseError {
    RoseError::Schema {
        path: if path.is_empty() {
            "<root>".to_string()
        } else {
            path.to_string()
        },
        expected: expected.to_string(),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn validate_fields(
    fields: &[(String, Feature)],
    object: &Map<String, Value>,
    path: &str,
) -> RoseResult<()> {
    for (key, value) in object {
        let child = join_path(path, key);
        let feature = fields
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, f)| f)
            .ok_or_else(|| mismatch(&child, "no such field"))?;
        feature.validate_at(value, &child)?;
    }
    Ok(())
}

/// Top-level schema of one configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Features {
    fields: Vec<(String, Feature)>,
}

impl Features {
    /// Build the schema for a configuration
    pub fn for_config(spec: &ConfigSpec) -> Self {
        let score = score_record(spec);

        let annotations = Feature::Struct(
            spec.systems
                .iter()
                .map(|s| (s.to_string(), score.clone()))
                .collect(),
        );
        let system_outputs = Feature::Struct(
            spec.summary_systems()
                .map(|s| (s.to_string(), Feature::Value(Dtype::String)))
                .collect(),
        );

        let mut fields = vec![
            ("source".to_string(), Feature::Value(Dtype::String)),
            ("reference".to_string(), Feature::Value(Dtype::String)),
        ];
        if spec.has_reference_acus() {
            fields.push((
                "reference_acus".to_string(),
                Feature::sequence(Feature::Value(Dtype::String)),
            ));
        }
        fields.push(("count_id".to_string(), Feature::Value(Dtype::Int64)));
        fields.push(("example_id".to_string(), Feature::Value(Dtype::String)));
        fields.push(("annotations".to_string(), annotations));
        fields.push(("system_outputs".to_string(), system_outputs));

        Self { fields }
    }

    /// Field names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, f)| f)
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, f)| (name.clone(), f.to_json()))
                .collect(),
        )
    }

    /// Check that a produced record conforms to this schema
    ///
    /// Absent and null fields are accepted; unknown fields are not.
    pub fn validate(&self, record: &Map<String, Value>) -> RoseResult<()> {
        validate_fields(&self.fields, record, "")
    }
}

/// Per-system score record shape
fn score_record(spec: &ConfigSpec) -> Feature {
    let labels = Feature::sequence(Feature::Value(Dtype::Int64));
    let float = Feature::Value(Dtype::Float32);

    let mut fields = Vec::new();
    if spec.protocol {
        let judgment = if spec.gpt3 { Dtype::Float32 } else { Dtype::Int64 };
        for name in ["prior", "ref_based", "ref_free"] {
            fields.push((name.to_string(), Feature::Value(judgment)));
        }
    }
    fields.push(("acu_labels".to_string(), labels));
    fields.push(("acu".to_string(), float.clone()));
    fields.push(("normalized_acu".to_string(), float));

    Feature::Struct(fields)
}
