use serde_json::Value;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

use crate::model::Record;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// Render rows as a table; columns follow the first row's field order
pub fn records_table(rows: &[Record]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };

    let columns: Vec<&String> = first.keys().collect();
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.to_string()));
    for row in rows {
        builder.push_record(columns.iter().map(|c| cell(row.get(c.as_str()))));
    }

    builder.build().with(Style::rounded()).to_string()
}

/// Two-column table for a single record or a set of named values
pub fn kv_table<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a Value)>) -> String {
    let rows: Vec<TableRow> = pairs
        .into_iter()
        .map(|(field, value)| TableRow { field: field.to_string(), value: cell(Some(value)) })
        .collect();
    if rows.is_empty() {
        return String::new();
    }

    Table::new(&rows).with(Style::rounded()).to_string()
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn renders_headers_and_blank_nulls() {
        let mut row = Record::new();
        row.insert("team_id".into(), json!(1));
        row.insert("team_name".into(), json!("Real Betis"));
        row.insert("coach".into(), Value::Null);

        let table = records_table(&[row]);
        assert!(table.contains("team_name"));
        assert!(table.contains("Real Betis"));
        assert!(!table.contains("null"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(records_table(&[]).is_empty());
        assert!(kv_table(Vec::<(&str, &Value)>::new()).is_empty());
    }
}
