//! Spreadsheet exports
//!
//! - `cta_sdr_export.xlsx`: the solution design reference sheet analysts fill
//!   in with their tracking variables
//! - `user_flows.xlsx`: one rendered flow per row
//!
//! Every cell is written as a plain string so URLs never turn into links.

use crate::output::traits::{ExportData, ExportTarget};
use crate::ExportResult;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::Path;

pub const SDR_COLUMNS: [&str; 11] = [
    "Page URL",
    "Page Name",
    "CTA Text",
    "Element Type",
    "ID / Class",
    "Destination Link",
    "Screenshot (Web URL)",
    "Tracking Variable (eVar/prop)",
    "Event (eventX)",
    "Data Layer Trigger?",
    "Notes",
];

pub const FLOW_COLUMN: &str = "User Flow";

fn write_header(worksheet: &mut Worksheet, columns: &[&str]) -> ExportResult<()> {
    let bold = Format::new().set_bold();
    for (col, title) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }
    Ok(())
}

/// `cta_sdr_export.xlsx`
pub struct SdrWorkbook;

impl ExportTarget for SdrWorkbook {
    fn name(&self) -> &'static str {
        "SDR workbook"
    }

    fn file_name(&self) -> &'static str {
        "cta_sdr_export.xlsx"
    }

    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_header(worksheet, &SDR_COLUMNS)?;

        for (i, record) in data.crawl.elements.iter().enumerate() {
            let row = (i + 1) as u32;
            let cells = [
                record.page_url.as_str(),
                record.page_name.as_str(),
                record.text.as_str(),
                record.element_type.as_str(),
                record.id_or_class.as_str(),
                record.link.as_deref().unwrap_or_default(),
                record.screenshot_url.as_deref().unwrap_or_default(),
            ];
            for (col, value) in cells.iter().enumerate() {
                worksheet.write_string(row, col as u16, *value)?;
            }
            // the analyst columns stay blank
        }

        worksheet.set_column_width(0, 50)?;
        worksheet.set_column_width(2, 30)?;
        worksheet.set_column_width(5, 50)?;
        workbook.save(path)?;
        Ok(())
    }
}

/// `user_flows.xlsx`
pub struct FlowWorkbook;

impl ExportTarget for FlowWorkbook {
    fn name(&self) -> &'static str {
        "flow workbook"
    }

    fn file_name(&self) -> &'static str {
        "user_flows.xlsx"
    }

    fn write(&self, data: &ExportData<'_>, path: &Path) -> ExportResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        write_header(worksheet, &[FLOW_COLUMN])?;

        for (i, flow) in data.flows.iter().enumerate() {
            worksheet.write_string((i + 1) as u32, 0, flow.to_string())?;
        }

        worksheet.set_column_width(0, 120)?;
        workbook.save(path)?;
        Ok(())
    }
}
