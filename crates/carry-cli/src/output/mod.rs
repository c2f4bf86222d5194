pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a scalar JSON value as plain text.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Flatten nested objects and arrays into `(path, text)` pairs.
///
/// Objects extend the path with `.key`, arrays with `[i]`.
pub(crate) fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, val, out);
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                flatten(&format!("{prefix}[{i}]"), val, out);
            }
        }
        _ => out.push((prefix.to_string(), format_scalar(value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested() {
        let value = json!({
            "lp_distribution": "46400000",
            "calculations": { "gp_catchup": "800000" },
            "tiers": [{ "tier": "return_of_capital" }],
            "base_case_position": [2, 1]
        });
        let mut out = Vec::new();
        flatten("", &value, &mut out);
        assert!(out.iter().any(|(k, v)| k == "lp_distribution" && v == "46400000"));
        assert!(out.iter().any(|(k, v)| k == "calculations.gp_catchup" && v == "800000"));
        assert!(out.iter().any(|(k, v)| k == "tiers[0].tier" && v == "return_of_capital"));
        assert!(out.iter().any(|(k, v)| k == "base_case_position[1]" && v == "1"));
    }
}
