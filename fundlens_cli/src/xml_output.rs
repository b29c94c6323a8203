use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::Serialize;
use std::io::Cursor;

/// Child element name for the members of an array field.
fn singular(field: &str) -> &str {
    match field {
        "items" => "item",
        "races" => "race",
        "top_fundraisers" => "fundraiser",
        "breakdowns" => "breakdown",
        "rows" | "by_contribution_type" | "by_election_year" | "by_contributor_state" => "row",
        "candidates" => "candidate",
        "committees" => "committee",
        "contributors" => "contributor",
        _ => field,
    }
}

/// Recursively write a serde_json::Value as XML elements. Nulls are omitted.
fn write_value<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    value: &serde_json::Value,
) -> Result<(), quick_xml::Error> {
    match value {
        serde_json::Value::Null => {}
        serde_json::Value::Bool(b) => {
            write_text(writer, tag, if *b { "true" } else { "false" })?;
        }
        serde_json::Value::Number(n) => {
            write_text(writer, tag, &n.to_string())?;
        }
        serde_json::Value::String(s) => {
            write_text(writer, tag, s)?;
        }
        serde_json::Value::Array(arr) => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            let child_tag = singular(tag);
            for item in arr {
                write_value(writer, child_tag, item)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
        serde_json::Value::Object(map) => {
            writer.write_event(Event::Start(BytesStart::new(tag)))?;
            for (key, val) in map {
                write_value(writer, key, val)?;
            }
            writer.write_event(Event::End(BytesEnd::new(tag)))?;
        }
    }
    Ok(())
}

fn write_text<W: std::io::Write>(
    writer: &mut Writer<W>,
    tag: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn document<F>(body: F) -> anyhow::Result<String>
where
    F: FnOnce(&mut Writer<Cursor<Vec<u8>>>) -> Result<(), quick_xml::Error>,
{
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    body(&mut writer)?;
    let buf = writer.into_inner().into_inner();
    Ok(String::from_utf8(buf)?)
}

/// Serialize a slice of records as `<root_tag><item_tag>...</item_tag></root_tag>`.
pub fn items_to_xml<T: Serialize>(
    root_tag: &str,
    item_tag: &str,
    items: &[T],
) -> anyhow::Result<String> {
    let values = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    document(|writer| {
        if values.is_empty() {
            writer.write_event(Event::Empty(BytesStart::new(root_tag)))?;
            return Ok(());
        }
        writer.write_event(Event::Start(BytesStart::new(root_tag)))?;
        for val in &values {
            write_value(writer, item_tag, val)?;
        }
        writer.write_event(Event::End(BytesEnd::new(root_tag)))?;
        Ok(())
    })
}

/// Serialize one value (a record, a stats object, a summary) under `root_tag`.
pub fn value_to_xml<T: Serialize>(root_tag: &str, value: &T) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    document(|writer| write_value(writer, root_tag, &value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_xml_wellformed() {
        let items = vec![json!({"id": 1, "name": "Jane Smith", "office": "H"})];
        let xml = items_to_xml("candidates", "candidate", &items).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<candidates>"));
        assert!(xml.contains("<candidate>"));
        assert!(xml.contains("<id>1</id>"));
        assert!(xml.contains("<name>Jane Smith</name>"));
        assert!(xml.contains("</candidates>"));
    }

    #[test]
    fn test_null_fields_omitted() {
        let items = vec![json!({"id": 1, "state": null})];
        let xml = items_to_xml("candidates", "candidate", &items).unwrap();
        assert!(!xml.contains("<state>"));
    }

    #[test]
    fn test_empty_items_produce_self_closing_root() {
        let xml = items_to_xml::<serde_json::Value>("contributions", "contribution", &[]).unwrap();
        assert!(xml.contains("<contributions/>"));
        assert!(!xml.contains("</contributions>"));
    }

    #[test]
    fn test_nested_arrays_use_singular_children() {
        let summary = json!({
            "state": "MD",
            "races": [{"office": "H", "top_fundraisers": [{"id": 1}]}]
        });
        let xml = value_to_xml("state_summary", &summary).unwrap();
        assert!(xml.contains("<races>"));
        assert!(xml.contains("<race>"));
        assert!(xml.contains("<fundraiser>"));
    }

    #[test]
    fn test_xml_special_chars_escaped() {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        write_value(
            &mut writer,
            "employer",
            &serde_json::Value::String("Smith & Sons <LLC>".to_string()),
        )
        .unwrap();
        let xml = String::from_utf8(writer.into_inner().into_inner()).unwrap();
        assert!(xml.contains("&amp;"));
        assert!(xml.contains("&lt;LLC&gt;"));
    }
}
