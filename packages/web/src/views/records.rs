//! Generic table for backend list endpoints whose rows are shown as-is.

use api::{ApiError, SecureClient};
use dioxus::prelude::*;
use serde_json::Value;
use ui::Loader;

/// Fetch a JSON array, treating an empty body as no rows.
pub(crate) async fn fetch_rows(client: &SecureClient, path: &str) -> Result<Vec<Value>, ApiError> {
    let rows: Option<Vec<Value>> = client.get_json(path).await?;
    Ok(rows.unwrap_or_default())
}

/// Display text for `row[key]`; `key` may be a dotted path.
pub(crate) fn cell(row: &Value, key: &str) -> String {
    let value = key.split('.').try_fold(row, |value, part| value.get(part));
    match value {
        None | Some(Value::Null) => "-".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Loads `path` and renders the listed `(label, key)` columns.
#[component]
pub(crate) fn RecordTable(
    title: String,
    path: String,
    columns: Vec<(String, String)>,
    #[props(default = "Nothing here yet.".to_string())] empty: String,
) -> Element {
    let app = ui::use_app();
    let rows = use_resource(move || {
        let client = app.client.clone();
        let path = path.clone();
        async move { fetch_rows(&client, &path).await }
    });

    let content = match &*rows.read() {
        None => rsx! { Loader {} },
        Some(Err(e)) => rsx! {
            div { class: "alert alert-error", "Could not load data: {e}" }
        },
        Some(Ok(rows)) if rows.is_empty() => rsx! {
            p { class: "muted", "{empty}" }
        },
        Some(Ok(rows)) => {
            let body: Vec<(String, Vec<String>)> = rows
                .iter()
                .enumerate()
                .map(|(index, row)| {
                    let cells = columns.iter().map(|(_, key)| cell(row, key)).collect();
                    ((index + 1).to_string(), cells)
                })
                .collect();
            rsx! {
                table {
                    thead {
                        tr {
                            th { "#" }
                            for (label, _) in columns.iter() {
                                th { "{label}" }
                            }
                        }
                    }
                    tbody {
                        for (number, cells) in body {
                            tr {
                                td { "{number}" }
                                for text in cells {
                                    td { "{text}" }
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    rsx! {
        div {
            class: "record-table",
            h2 { "{title}" }
            {content}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_formats_values() {
        let row = json!({"carName": "Corolla", "amount": 42, "owner": {"email": "o@example.com"}, "paidAt": null});
        assert_eq!(cell(&row, "carName"), "Corolla");
        assert_eq!(cell(&row, "amount"), "42");
        assert_eq!(cell(&row, "owner.email"), "o@example.com");
        assert_eq!(cell(&row, "paidAt"), "-");
        assert_eq!(cell(&row, "missing"), "-");
    }
}
