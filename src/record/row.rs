//! Flattening records into tabular rows
//!
//! The output schema is the union of fields across all records, in the order
//! each field is first seen. A summary-only item contributes
//! `asin, title, url, price`; an enriched item adds the detail fields, with
//! the detail `title` and `price` replacing the summary values; a failed item
//! adds an `error` marker.

use crate::record::{EnrichedRecord, Enrichment, SearchResultItem};

static NULL: FieldValue = FieldValue::Null;

/// One cell value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Text(String),
    List(Vec<String>),
}

impl From<Option<String>> for FieldValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

impl From<&Option<String>> for FieldValue {
    fn from(value: &Option<String>) -> Self {
        value.clone().into()
    }
}

/// A flat, ordered field mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(&'static str, FieldValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing an earlier value under the same name in place
    pub fn set(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Field names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|(n, _)| *n)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Anything the result writer can serialize
pub trait Tabular {
    fn to_row(&self) -> Row;
}

impl Tabular for SearchResultItem {
    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.set("asin", FieldValue::Text(self.id.clone()));
        row.set("title", &self.title);
        row.set("url", FieldValue::Text(self.url.clone()));
        row.set("price", &self.price);
        row
    }
}

impl Tabular for EnrichedRecord {
    fn to_row(&self) -> Row {
        let mut row = self.item.to_row();
        match &self.enrichment {
            Enrichment::Detail(detail) => {
                row.set("title", &detail.title);
                row.set("price", &detail.price);
                row.set("rating", &detail.rating);
                row.set("review_count", &detail.review_count);
                row.set("availability", &detail.availability);
                row.set("images", FieldValue::List(detail.images.clone()));
            }
            Enrichment::Failure(reason) => {
                row.set("error", FieldValue::Text(reason.as_str().to_string()));
            }
        }
        row
    }
}

/// Rows plus the union of their columns
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub columns: Vec<&'static str>,
    pub rows: Vec<Row>,
}

impl Table {
    /// Flattens records, collecting columns in first-seen order
    pub fn from_records<T: Tabular>(records: &[T]) -> Self {
        let rows: Vec<Row> = records.iter().map(Tabular::to_row).collect();
        let mut columns: Vec<&'static str> = Vec::new();
        for row in &rows {
            for name in row.names() {
                if !columns.contains(&name) {
                    columns.push(name);
                }
            }
        }
        Self { columns, rows }
    }

    /// Cells of `row` aligned with `columns`; absent fields are `Null`
    pub fn cells<'a>(&'a self, row: &'a Row) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.columns
            .iter()
            .map(move |name| row.get(name).unwrap_or(&NULL))
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
