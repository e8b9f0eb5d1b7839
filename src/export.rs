use crate::storage::Collection;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Txt => "txt",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Txt => "text/plain",
        }
    }

    pub fn render(self, records: &[Value]) -> String {
        match self {
            Self::Csv => to_csv(records),
            Self::Txt => to_txt(records),
        }
    }
}

/// Maps the `:type` path segment to a collection; `None` for anything else.
pub fn export_collection(kind: &str) -> Option<Collection> {
    match kind {
        "visitors" => Some(Collection::Visitors),
        "loan" => Some(Collection::LoanLeads),
        "debt" => Some(Collection::DebtLeads),
        "contact" => Some(Collection::ContactLeads),
        _ => None,
    }
}

pub fn file_name(collection: Collection, format: ExportFormat) -> String {
    format!("{}.{}", collection.file_stem(), format.extension())
}

/// Columns come from the first record's keys.
pub fn to_csv(records: &[Value]) -> String {
    let Some(Value::Object(first)) = records.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut rows = Vec::with_capacity(records.len() + 1);
    rows.push(
        headers
            .iter()
            .map(|h| h.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );
    for record in records {
        let row = headers
            .iter()
            .map(|header| csv_cell(record.get(header.as_str())))
            .collect::<Vec<_>>()
            .join(",");
        rows.push(row);
    }
    rows.join("\n")
}

fn csv_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return String::new(),
        Some(Value::String(s)) => s.clone(),
        // Nested values are JSON-encoded.
        Some(other) => other.to_string(),
    };
    if text.contains(',') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

pub fn to_txt(records: &[Value]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let mut lines = vec![format!("=== Record {} ===", index + 1)];
            if let Value::Object(fields) = record {
                for (key, value) in fields {
                    lines.push(format!("{key}: {}", txt_value(value)));
                }
            }
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn txt_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
