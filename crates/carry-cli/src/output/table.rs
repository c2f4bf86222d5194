use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_scalar};

/// Format output as tables using the tabled crate.
///
/// Scalars and nested objects of the `result` section go into one
/// field/value table. Arrays of objects (waterfall tiers) and arrays of rows
/// (sensitivity matrix) get a table of their own.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_table(result, map),
            _ => print_field_table(map),
        },
        _ => println!("{}", format_scalar(value)),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    let mut scalars = Map::new();
    let mut sections: Vec<(&str, &Vec<Value>)> = Vec::new();

    for (key, val) in result {
        match val {
            Value::Array(arr)
                if !arr.is_empty() && arr.iter().all(|v| v.is_object() || v.is_array()) =>
            {
                sections.push((key.as_str(), arr));
            }
            Value::Array(arr) => {
                let joined: Vec<String> = arr.iter().map(format_scalar).collect();
                scalars.insert(key.clone(), Value::String(joined.join(", ")));
            }
            _ => {
                scalars.insert(key.clone(), val.clone());
            }
        }
    }

    print_field_table(&scalars);

    for (name, rows) in sections {
        println!("\n{}:", name);
        if name == "matrix" {
            print_matrix(rows, result);
        } else {
            print_object_rows(rows);
        }
    }

    // Print warnings if any
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_field_table(map: &Map<String, Value>) {
    let mut rows = Vec::new();
    flatten("", &Value::Object(map.clone()), &mut rows);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (field, val) in rows {
        builder.push_record([field, val]);
    }
    println!("{}", Table::from(builder));
}

fn print_object_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    println!("{}", Table::from(builder));
}

/// Sensitivity grid: variable_1 values down the side, variable_2 across the top.
fn print_matrix(rows: &[Value], result: &Map<String, Value>) {
    let axis = |key: &str| -> Vec<String> {
        result
            .get(key)
            .and_then(Value::as_array)
            .map(|a| a.iter().map(format_scalar).collect())
            .unwrap_or_default()
    };
    let row_labels = axis("variable_1_values");
    let col_labels = axis("variable_2_values");
    let corner = format!(
        "{} \\ {}",
        result.get("variable_1_name").map(format_scalar).unwrap_or_default(),
        result.get("variable_2_name").map(format_scalar).unwrap_or_default()
    );

    let mut builder = Builder::default();
    let mut header = vec![corner];
    header.extend(col_labels);
    builder.push_record(header);

    for (i, row) in rows.iter().enumerate() {
        let mut record = vec![row_labels.get(i).cloned().unwrap_or_default()];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_scalar));
        }
        builder.push_record(record);
    }
    println!("{}", Table::from(builder));
}
