//! Encoders for the flattened record table
//!
//! - CSV: header row of the column union, empty cells for missing fields
//! - JSON: array of objects, every column present, `null` for missing fields,
//!   two-space indentation, non-ASCII written literally
//! - XLSX: a single worksheet with a header row
//!
//! Image lists are written as a JSON array string in CSV and XLSX cells.

use crate::output::{OutputFormat, WriteResult};
use crate::record::{FieldValue, Table};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes `table` to `path` in the given format
pub fn encode_table(table: &Table, format: OutputFormat, path: &Path) -> WriteResult<()> {
    match format {
        OutputFormat::Csv => write_csv(table, path),
        OutputFormat::Json => write_json(table, path),
        OutputFormat::Xlsx => write_xlsx(table, path),
    }
}

fn write_csv(table: &Table, path: &Path) -> WriteResult<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);

    if !table.columns.is_empty() {
        writer.write_record(&table.columns)?;
    }
    for row in &table.rows {
        writer.write_record(table.cells(row).map(cell_text))?;
    }

    writer.flush()?;
    Ok(())
}

fn write_json(table: &Table, path: &Path) -> WriteResult<()> {
    let records: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let object: Map<String, Value> = table
                .columns
                .iter()
                .zip(table.cells(row))
                .map(|(name, value)| (name.to_string(), json_value(value)))
                .collect();
            Value::Object(object)
        })
        .collect();

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, &records)?;
    writer.flush()?;
    Ok(())
}

fn write_xlsx(table: &Table, path: &Path) -> WriteResult<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (col, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, value) in table.cells(row).enumerate() {
            if !matches!(value, FieldValue::Null) {
                worksheet.write_string(row_num, col as u16, cell_text(value))?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn cell_text(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => String::new(),
        FieldValue::Text(text) => text.clone(),
        FieldValue::List(items) => serde_json::to_string(items).unwrap_or_default(),
    }
}

fn json_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Text(text) => Value::String(text.clone()),
        FieldValue::List(items) => {
            Value::Array(items.iter().cloned().map(Value::String).collect())
        }
    }
}
