use serde_json::Value;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::error::OpwaitError;
use crate::operation::Operation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Tree,
}

#[derive(Tabled)]
struct OperationRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "DONE")]
    done: bool,
    #[tabled(rename = "STATUS")]
    status: &'static str,
    #[tabled(rename = "ERROR")]
    error: String,
}

impl From<&Operation> for OperationRow {
    fn from(op: &Operation) -> Self {
        Self {
            name: op.name.clone(),
            done: op.done,
            status: op.state_label(),
            error: op.error.as_ref().map(|s| s.message.clone()).unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "FIELD")]
    field: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

pub fn render_operation(op: &Operation, format: OutputFormat) -> Result<String, OpwaitError> {
    match format {
        OutputFormat::Table => Ok(operations_table(std::slice::from_ref(op))),
        _ => render_value(&serde_json::to_value(op)?, format),
    }
}

pub fn render_operations(ops: &[Operation], format: OutputFormat) -> Result<String, OpwaitError> {
    match format {
        OutputFormat::Table => Ok(operations_table(ops)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(ops)?),
        OutputFormat::Tree => {
            let mut root = Tree::new("operations".to_string());
            for op in ops {
                root.push(value_tree(&op.name, &serde_json::to_value(op)?));
            }
            Ok(root.to_string())
        }
    }
}

pub fn render_value(value: &Value, format: OutputFormat) -> Result<String, OpwaitError> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Tree => {
            let label = value
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("result");
            Ok(value_tree(label, value).to_string())
        }
        OutputFormat::Table => Ok(fields_table(value)),
    }
}

fn operations_table(ops: &[Operation]) -> String {
    let rows: Vec<OperationRow> = ops.iter().map(OperationRow::from).collect();
    Table::new(rows).with(Style::blank()).to_string()
}

fn fields_table(value: &Value) -> String {
    let rows: Vec<FieldRow> = match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| FieldRow {
                field: k.clone(),
                value: scalar_text(v),
            })
            .collect(),
        other => vec![FieldRow {
            field: "value".to_string(),
            value: scalar_text(other),
        }],
    };
    Table::new(rows).with(Style::blank()).to_string()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_tree(label: &str, value: &Value) -> Tree<String> {
    let mut tree = Tree::new(label.to_string());
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                tree.push(child(k, v));
            }
        }
        Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                tree.push(child(&format!("[{}]", i), v));
            }
        }
        scalar => {
            tree.push(Tree::new(scalar_text(scalar)));
        }
    }
    tree
}

fn child(key: &str, value: &Value) -> Tree<String> {
    match value {
        Value::Object(_) | Value::Array(_) => value_tree(key, value),
        scalar => Tree::new(format!("{}: {}", key, scalar_text(scalar))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::Status;

    fn sample_ops() -> Vec<Operation> {
        vec![
            Operation {
                name: "projects/p/locations/l/operations/a".to_string(),
                done: true,
                response: Some(serde_json::json!({})),
                ..Default::default()
            },
            Operation {
                name: "projects/p/locations/l/operations/b".to_string(),
                done: true,
                error: Some(Status {
                    code: 5,
                    message: "disk not found".to_string(),
                    details: vec![],
                }),
                ..Default::default()
            },
            Operation {
                name: "projects/p/locations/l/operations/c".to_string(),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn test_operations_table_has_headers_and_states() {
        let out = render_operations(&sample_ops(), OutputFormat::Table).unwrap();
        assert!(out.contains("NAME"));
        assert!(out.contains("STATUS"));
        assert!(out.contains("SUCCEEDED"));
        assert!(out.contains("FAILED"));
        assert!(out.contains("RUNNING"));
        assert!(out.contains("disk not found"));
    }

    #[test]
    fn test_operations_json_is_array() {
        let out = render_operations(&sample_ops(), OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_operation_json_uses_camel_case_wire_names() {
        let op = &sample_ops()[1];
        let out = render_operation(op, OutputFormat::Json).unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["error"]["code"], 5);
        assert_eq!(parsed["done"], true);
    }

    #[test]
    fn test_value_tree_nests_objects() {
        let value = serde_json::json!({
            "name": "projects/p/things/t",
            "labels": {"env": "prod"},
            "zones": ["a", "b"]
        });
        let out = render_value(&value, OutputFormat::Tree).unwrap();
        assert!(out.starts_with("projects/p/things/t"));
        assert!(out.contains("env: prod"));
        assert!(out.contains("[1]: b"));
    }

    #[test]
    fn test_scalar_value_tree() {
        let out = render_value(&serde_json::json!("READY"), OutputFormat::Tree).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "result");
        assert!(lines[1].ends_with("READY"));
    }

    #[test]
    fn test_fields_table() {
        let value = serde_json::json!({"name": "t", "state": "ACTIVE"});
        let out = render_value(&value, OutputFormat::Table).unwrap();
        assert!(out.contains("FIELD"));
        assert!(out.contains("ACTIVE"));
    }

    #[test]
    fn test_null_result_renders() {
        let out = render_value(&Value::Null, OutputFormat::Json).unwrap();
        assert_eq!(out, "null");
    }
}
