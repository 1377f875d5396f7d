//! Spreadsheet import planning.
//!
//! Turning a workbook into contacts happens in two phases. Phase one runs
//! here without touching storage: rows that repeat a phone number already
//! seen earlier in the same file are dropped, and each surviving row is
//! turned into an [`ImportRow`] with its contact key and attribute bag.
//! Phase two (key already stored, empty attribute bag) needs the database
//! and is driven by the import service.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::constants::{GENERATED_KEY_SHOP_CHARS, IMPORT_PREVIEW_ROWS, NULL_TOKENS};
use crate::contact::{Attributes, Contact, ContactStatus};
use crate::error::CrmError;

/// CRM fields with dedicated handling; everything else lands in `data`.
pub const PHONE_FIELD: &str = "phone";
pub const PHONE2_FIELD: &str = "phone2";
pub const CUSTOMER_NAME_FIELD: &str = "customer_name";
pub const STATUS_FIELD: &str = "status";
pub const SHOP_NAME_FIELD: &str = "shop_name";

/// `Some(trimmed)` unless the cell is blank or one of the null tokens.
#[must_use]
pub fn normalize_cell(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if NULL_TOKENS.contains(&lowered.as_str()) {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

/// `{crm_field: spreadsheet_column}` as sent by the client, in the order given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMapping {
    fields: Vec<(String, String)>,
}

impl ColumnMapping {
    /// Parse the JSON form. Blank column names are dropped.
    pub fn parse(json: &str) -> Result<Self, CrmError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| CrmError::InvalidMapping(e.to_string()))?;
        let object = value
            .as_object()
            .ok_or_else(|| CrmError::InvalidMapping("expected a JSON object".to_owned()))?;
        let mut fields = Vec::with_capacity(object.len());
        for (field, column) in object {
            match column {
                serde_json::Value::String(column) if !column.trim().is_empty() => {
                    fields.push((field.trim().to_owned(), column.trim().to_owned()));
                },
                serde_json::Value::String(_) | serde_json::Value::Null => {},
                other => {
                    return Err(CrmError::InvalidMapping(format!(
                        "column for '{field}' must be a string, got {other}"
                    )));
                },
            }
        }
        Ok(Self { fields })
    }

    #[must_use]
    pub fn from_pairs<F: Into<String>, C: Into<String>>(pairs: impl IntoIterator<Item = (F, C)>) -> Self {
        Self { fields: pairs.into_iter().map(|(f, c)| (f.into(), c.into())).collect() }
    }

    #[must_use]
    pub fn column_for(&self, field: &str) -> Option<&str> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(f, c)| (f.as_str(), c.as_str()))
    }
}

/// First worksheet of a workbook: trimmed headers and normalized cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sheet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl Sheet {
    /// Build from stringified cells. Short rows are padded, long ones truncated.
    #[must_use]
    pub fn new(header: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns: Vec<String> = header.into_iter().map(|h| h.trim().to_owned()).collect();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|row| {
                let mut cells: Vec<Option<String>> =
                    row.iter().take(width).map(|c| normalize_cell(c)).collect();
                cells.resize(width, None);
                cells
            })
            .collect();
        Self { columns, rows }
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// Suggested CRM field for a spreadsheet header, or `""` when none fits.
#[must_use]
pub fn suggest_field(column: &str) -> &'static str {
    match column.trim().to_lowercase().as_str() {
        "shop name" | "shopname" | "shop_name" | "business name" => SHOP_NAME_FIELD,
        "customer name" | "customername" | "customer_name" | "name" | "client name"
        | "owner name" => CUSTOMER_NAME_FIELD,
        "street" | "address" | "location" | "addr" => "address",
        "phone number" | "phone_number" | "phone" | "mobile" | "contact" | "contact number" => {
            PHONE_FIELD
        },
        "city" => "city",
        "state" => "state",
        "status" => STATUS_FIELD,
        "category" | "type" | "classification" => "category",
        _ => "",
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImportPreview {
    pub columns: Vec<String>,
    /// First rows keyed by column; null tokens become `null`
    pub sample_data: Vec<serde_json::Map<String, serde_json::Value>>,
    pub suggested_mapping: BTreeMap<String, String>,
}

impl ImportPreview {
    #[must_use]
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let sample_data = sheet
            .rows
            .iter()
            .take(IMPORT_PREVIEW_ROWS)
            .map(|row| {
                sheet
                    .columns
                    .iter()
                    .zip(row)
                    .map(|(col, cell)| {
                        let value = cell.clone().map_or(serde_json::Value::Null, serde_json::Value::String);
                        (col.clone(), value)
                    })
                    .collect()
            })
            .collect();
        let suggested_mapping = sheet
            .columns
            .iter()
            .map(|col| (col.clone(), suggest_field(col).to_owned()))
            .collect();
        Self { columns: sheet.columns.clone(), sample_data, suggested_mapping }
    }
}

/// One row that survived in-file de-duplication.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportRow {
    /// 1-based position among surviving rows
    pub index: usize,
    /// Phone number, or a generated key when the row has none
    pub key: String,
    pub customer_name: Option<String>,
    pub data: Attributes,
}

impl ImportRow {
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.data.is_empty()
    }

    /// Contact for this row. A mapped `status` value moves out of `data`.
    #[must_use]
    pub fn into_contact(mut self, now: DateTime<Utc>) -> Contact {
        let status = match self.data.remove(STATUS_FIELD) {
            Some(serde_json::Value::String(raw)) => ContactStatus::parse_lenient(&raw),
            _ => ContactStatus::None,
        };
        Contact {
            id: crate::new_id(),
            phone: self.key,
            customer_name: self.customer_name,
            status,
            data: self.data,
            created_at: now,
            updated_at: now,
            last_call_at: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportPlan {
    pub original_rows: usize,
    pub file_duplicates_removed: usize,
    pub rows: Vec<ImportRow>,
}

/// Key for a row without a phone number: `<shop>_<n>` or `contact_<n>`.
#[must_use]
pub fn generated_key(shop_name: Option<&str>, index: usize) -> String {
    match shop_name.map(str::trim).filter(|s| !s.is_empty()) {
        Some(shop) => {
            let clean: String = shop
                .chars()
                .map(|c| if c == ' ' || c == '-' { '_' } else { c })
                .take(GENERATED_KEY_SHOP_CHARS)
                .collect();
            format!("{clean}_{index}")
        },
        None => format!("contact_{index}"),
    }
}

/// Phase one: drop in-file phone duplicates and shape each remaining row.
#[must_use]
pub fn plan_import(sheet: &Sheet, mapping: &ColumnMapping) -> ImportPlan {
    let phone_idx = mapping.column_for(PHONE_FIELD).and_then(|c| sheet.column_index(c));
    let phone2_idx = mapping.column_for(PHONE2_FIELD).and_then(|c| sheet.column_index(c));
    let name_idx = mapping.column_for(CUSTOMER_NAME_FIELD).and_then(|c| sheet.column_index(c));
    let data_columns: Vec<(&str, usize)> = mapping
        .iter()
        .filter(|(field, _)| ![PHONE_FIELD, PHONE2_FIELD, CUSTOMER_NAME_FIELD].contains(field))
        .filter_map(|(field, column)| sheet.column_index(column).map(|idx| (field, idx)))
        .collect();

    // A missing phone is itself a key: only the first phone-less row survives.
    let mut seen_phones: HashSet<Option<String>> = HashSet::new();
    let mut plan = ImportPlan { original_rows: sheet.rows.len(), ..ImportPlan::default() };

    for row in &sheet.rows {
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i).cloned().flatten());
        let phone = cell(phone_idx);
        if phone_idx.is_some() && !seen_phones.insert(phone.clone()) {
            plan.file_duplicates_removed += 1;
            continue;
        }

        let index = plan.rows.len() + 1;
        let mut data = Attributes::new();
        for &(field, idx) in &data_columns {
            if let Some(value) = cell(Some(idx)) {
                data.insert(field.to_owned(), serde_json::Value::String(value));
            }
        }
        if let Some(phone2) = cell(phone2_idx) {
            data.insert(PHONE2_FIELD.to_owned(), serde_json::Value::String(phone2));
        }
        let key = phone.unwrap_or_else(|| {
            let shop = data.get(SHOP_NAME_FIELD).and_then(serde_json::Value::as_str);
            generated_key(shop, index)
        });
        plan.rows.push(ImportRow { index, key, customer_name: cell(name_idx), data });
    }
    tracing::debug!(
        original = plan.original_rows,
        file_duplicates = plan.file_duplicates_removed,
        candidates = plan.rows.len(),
        "import planned"
    );
    plan
}

/// Outcome counters of an import run.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    /// `db_duplicates + empty_data_skipped`
    pub skipped: usize,
    pub file_duplicates_removed: usize,
    pub db_duplicates: usize,
    pub empty_data_skipped: usize,
    pub total_processed: usize,
    pub original_excel_rows: usize,
}

impl ImportReport {
    #[must_use]
    pub fn for_plan(plan: &ImportPlan) -> Self {
        Self {
            file_duplicates_removed: plan.file_duplicates_removed,
            total_processed: plan.rows.len(),
            original_excel_rows: plan.original_rows,
            ..Self::default()
        }
    }

    pub fn record_db_duplicate(&mut self) {
        self.db_duplicates += 1;
        self.skipped += 1;
    }

    pub fn record_empty(&mut self) {
        self.empty_data_skipped += 1;
        self.skipped += 1;
    }

    /// Activity-log details line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Imported {} contacts, skipped {} (duplicates: {}, empty: {}, file duplicates removed: {})",
            self.imported,
            self.skipped,
            self.db_duplicates,
            self.empty_data_skipped,
            self.file_duplicates_removed
        )
    }
}
