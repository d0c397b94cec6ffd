//! CSV and JSON exports of the element and form records

use crate::crawler::{ElementRecord, FormRecord};
use crate::output::traits::{ExportData, ExportTarget};
use crate::ExportResult;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CTA_CSV_COLUMNS: [&str; 8] = [
    "page_url",
    "page_name",
    "element_type",
    "text",
    "id_or_class",
    "link",
    "screenshot_local",
    "screenshot_url",
];

pub const FORM_CSV_COLUMNS: [&str; 9] = [
    "page_url",
    "page_name",
    "form_id_or_class",
    "method",
    "action",
    "inputs",
    "submit_buttons",
    "form_screenshot_local",
    "form_screenshot_url",
];

/// Writes records under a fixed header row, even when there are none
fn write_csv<T: Serialize>(path: &Path, columns: &[&str], records: &[T]) -> ExportResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(columns)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// `cta_tracking_map.csv`
pub struct CtaCsv;

impl ExportTarget for CtaCsv {
    fn name(&self) -> &'static str {
        "CTA CSV"
    }

    fn file_name(&self) -> &'static str {
        "cta_tracking_map.csv"
    }

    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()> {
        write_csv(path, &CTA_CSV_COLUMNS, &data.crawl.elements)
    }
}

/// `form_tracking_map.csv`
pub struct FormCsv;

impl ExportTarget for FormCsv {
    fn name(&self) -> &'static str {
        "form CSV"
    }

    fn file_name(&self) -> &'static str {
        "form_tracking_map.csv"
    }

    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()> {
        write_csv(path, &FORM_CSV_COLUMNS, &data.crawl.forms)
    }
}

#[derive(Serialize)]
struct RecordsDocument<'a> {
    ctas: &'a [ElementRecord],
    forms: &'a [FormRecord],
}

/// `cta_form_tracking_map.json`
pub struct RecordsJson;

impl ExportTarget for RecordsJson {
    fn name(&self) -> &'static str {
        "combined JSON"
    }

    fn file_name(&self) -> &'static str {
        "cta_form_tracking_map.json"
    }

    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()> {
        let document = RecordsDocument {
            ctas: &data.crawl.elements,
            forms: &data.crawl.forms,
        };
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
        Ok(())
    }
}
