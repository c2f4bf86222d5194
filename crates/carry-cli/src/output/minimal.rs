use serde_json::Value;

use super::format_scalar;

/// Headline fields, in priority order. The first group present is printed
/// tab-separated on one line.
const HEADLINES: &[&[&str]] = &[
    &["lp_distribution", "gp_distribution"],
    &["base_case_value"],
];

/// Print just the key answer values from the output.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for group in HEADLINES {
            let values: Vec<String> = group
                .iter()
                .filter_map(|k| map.get(*k))
                .filter(|v| !v.is_null())
                .map(format_scalar)
                .collect();
            if !values.is_empty() {
                println!("{}", values.join("\t"));
                return;
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_scalar(val));
            return;
        }
    }

    println!("{}", format_scalar(result_obj));
}
