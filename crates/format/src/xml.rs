//! `xml` encoder: `<table><row><col name="...">value</col>...</row>...</table>`
//! (§4.9), built with `quick_xml::Writer` since the column set is dynamic
//! per table and doesn't fit a single `#[derive(Serialize)]` shape.

use dh_domain::TableResult;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::writer::Writer;
use std::io::Cursor;

use crate::cell::to_display_string;

pub fn render(table: &TableResult) -> dh_domain::Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_event(&mut writer, Event::Start(BytesStart::new("table")))?;
    for row in &table.rows {
        write_event(&mut writer, Event::Start(BytesStart::new("row")))?;
        for (col, cell) in table.columns.iter().zip(row) {
            let mut elem = BytesStart::new("col");
            elem.push_attribute(("name", col.name.as_str()));
            write_event(&mut writer, Event::Start(elem))?;
            let text = to_display_string(cell);
            if !text.is_empty() {
                write_event(&mut writer, Event::Text(BytesText::new(&text)))?;
            }
            write_event(&mut writer, Event::End(BytesEnd::new("col")))?;
        }
        write_event(&mut writer, Event::End(BytesEnd::new("row")))?;
    }
    write_event(&mut writer, Event::End(BytesEnd::new("table")))?;

    let bytes = writer.into_inner().into_inner();
    String::from_utf8(bytes).map_err(|e| dh_domain::CoreError::internal(format!("xml output was not valid utf-8: {e}")))
}

fn write_event(writer: &mut Writer<Cursor<Vec<u8>>>, event: Event) -> dh_domain::Result<()> {
    writer
        .write_event(event)
        .map_err(|e| dh_domain::CoreError::internal(format!("xml write failed: {e}")))
}
