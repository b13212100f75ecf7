// Spreadsheet export - selected consultations as a minimal OOXML workbook
//
// An .xlsx file is a zip of XML parts; the workbook here carries a single
// inline-string worksheet plus the few parts Excel requires, so no
// spreadsheet dependency is needed beyond the zip container.

use std::io::{Cursor, Write};

use chrono::{DateTime, NaiveDate, Utc};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};
use crate::models::Consultation;

/// Export column schema, in order, with the sheet widths the team is used to.
pub const COLUMNS: [(&str, f64); 14] = [
    ("ID", 28.0),
    ("Name", 20.0),
    ("Contact", 15.0),
    ("State", 15.0),
    ("District", 15.0),
    ("Interested In", 15.0),
    ("NEET Score", 12.0),
    ("Preferred Country", 18.0),
    ("Preferred Counsellor", 20.0),
    ("Call Status", 15.0),
    ("Called By", 20.0),
    ("Last Called At", 20.0),
    ("Call Notes", 30.0),
    ("Submitted At", 20.0),
];

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Consultations" sheetId="1" r:id="rId1"/></sheets></workbook>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 1 = bold on a light grey fill, used for the header row.
const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="2"><font><sz val="11"/><name val="Calibri"/></font><font><b/><sz val="11"/><name val="Calibri"/></font></fonts><fills count="3"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill><fill><patternFill patternType="solid"><fgColor rgb="FFE0E0E0"/><bgColor indexed="64"/></patternFill></fill></fills><borders count="1"><border/></borders><cellStyleXfs count="1"><xf/></cellStyleXfs><cellXfs count="2"><xf xfId="0"/><xf fontId="1" fillId="2" applyFont="1" applyFill="1" xfId="0"/></cellXfs></styleSheet>"#;

/// Writes the selected records as an .xlsx workbook and returns its bytes.
/// An empty selection is a user-visible, non-fatal error.
pub fn export_xlsx(records: &[&Consultation]) -> Result<Vec<u8>> {
    if records.is_empty() {
        return Err(Error::EmptySelection);
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, body) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", ROOT_RELS),
        ("xl/workbook.xml", WORKBOOK),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS),
        ("xl/styles.xml", STYLES),
    ] {
        zip.start_file(name, opts)?;
        zip.write_all(body.as_bytes())?;
    }

    zip.start_file("xl/worksheets/sheet1.xml", opts)?;
    zip.write_all(sheet_xml(records).as_bytes())?;

    let cursor = zip.finish()?;
    tracing::info!("exported {} consultations to workbook", records.len());
    Ok(cursor.into_inner())
}

/// `<prefix>_<start>_to_<end>.xlsx` for a date range, otherwise
/// `<prefix>_<date>.xlsx` stamped with the given day.
pub fn export_filename(
    prefix: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    match (start, end) {
        (Some(start), Some(end)) => format!("{}_{}_to_{}.xlsx", prefix, start, end),
        _ => format!("{}_{}.xlsx", prefix, today),
    }
}

fn sheet_xml(records: &[&Consultation]) -> String {
    let mut xml = String::with_capacity(1024 + records.len() * 512);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    xml.push_str("<cols>");
    for (index, (_, width)) in COLUMNS.iter().enumerate() {
        xml.push_str(&format!(
            r#"<col min="{n}" max="{n}" width="{w}" customWidth="1"/>"#,
            n = index + 1,
            w = width
        ));
    }
    xml.push_str("</cols><sheetData>");

    xml.push_str("<row>");
    for (header, _) in COLUMNS {
        push_cell(&mut xml, header, true);
    }
    xml.push_str("</row>");

    for record in records {
        xml.push_str("<row>");
        for value in row_values(record) {
            push_cell(&mut xml, &value, false);
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn row_values(record: &Consultation) -> [String; 14] {
    [
        record.id.clone(),
        record.name.clone(),
        record.contact.clone(),
        record.state.clone(),
        record.district_label().to_string(),
        record.interested_in_label().to_string(),
        record.neet_score.clone().unwrap_or_default(),
        record.display_country().to_string(),
        record.counsellor_label().to_string(),
        record.effective_status().as_str().to_string(),
        record.called_by.clone().unwrap_or_default(),
        localized(record.last_called_at),
        record.call_notes.clone().unwrap_or_default(),
        localized(record.submitted_at),
    ]
}

fn push_cell(xml: &mut String, value: &str, header: bool) {
    let style = if header { r#" s="1""# } else { "" };
    xml.push_str(&format!(
        r#"<c t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
        style,
        xml_escape(value)
    ));
}

fn localized(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|t| t.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_default()
}

fn xml_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
