// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Measurement tables for Gen1 devices.
//!
//! Gen1 meters report their readings under `/status` as
//! `meters_<phase>_<measure>` (plugs, 1PM, 2.5) or `emeters_<phase>_<measure>`
//! (EM, 3EM). These are laid out as columns of an `AC` table, suffixed with
//! the phase letter on three-phase devices. The device temperature goes into
//! a separate `Service` table.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::field::PropertyField;

/// Name of the field holding the device temperature.
pub const TEMPERATURE_FIELD: &str = "status_temperature";

static METER_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^status_(?:e?meters)_(\d+)_([a-z_]+)$").expect("valid meter field regex")
});

/// Column names per meter measure.
static MEASURES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("power", "Wirkleistung"),
        ("current", "Strom"),
        ("voltage", "Spannung"),
        ("total", "Leistung_VerbrauchGesamt"),
        ("total_returned", "Leistung_EinspeisungGesamt"),
        ("pf", "PowerFactor"),
    ])
});

/// Column suffixes per phase index.
const PHASES: [&str; 3] = ["_R", "_S", "_T"];

/// Value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    /// Numeric measurement.
    Number,
}

/// A named table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Column name, e.g. `Wirkleistung_R`.
    pub name: String,
    /// Value type.
    pub column_type: ColumnType,
}

/// A cell referring to the field that provides its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCell {
    /// Field name the value is read from.
    pub field: String,
}

/// A single-row table of measurements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    name: String,
    columns: Vec<(TableColumn, TableCell)>,
}

impl Table {
    /// Creates an empty table.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the columns with their first-row cells.
    #[must_use]
    pub fn columns(&self) -> &[(TableColumn, TableCell)] {
        &self.columns
    }

    /// Returns the column fed by `field`, if any.
    #[must_use]
    pub fn column_for(&self, field: &str) -> Option<&TableColumn> {
        self.columns
            .iter()
            .find(|(_, cell)| cell.field == field)
            .map(|(column, _)| column)
    }

    fn push_number(&mut self, column: impl Into<String>, field: &str) {
        self.columns.push((
            TableColumn {
                name: column.into(),
                column_type: ColumnType::Number,
            },
            TableCell {
                field: field.to_string(),
            },
        ));
    }
}

/// Builds the `AC` and `Service` tables from Gen1 status fields.
///
/// Returns an empty list when no field matched at all; otherwise the `AC`
/// table comes first, followed by `Service` if the temperature is reported.
#[must_use]
pub fn project_gen1<'a, I>(fields: I) -> Vec<Table>
where
    I: IntoIterator<Item = &'a PropertyField>,
{
    let mut ac = Table::new("AC");
    let mut service: Option<Table> = None;

    for field in fields {
        let name = field.name();
        if name == TEMPERATURE_FIELD {
            service
                .get_or_insert_with(|| Table::new("Service"))
                .push_number("Temperatur", name);
        } else if let Some(column) = meter_column(name) {
            ac.push_number(column, name);
        }
    }

    if ac.columns.is_empty() && service.is_none() {
        return Vec::new();
    }

    let mut tables = vec![ac];
    tables.extend(service);
    tables
}

fn meter_column(field: &str) -> Option<String> {
    let caps = METER_FIELD.captures(field)?;
    let measure = MEASURES.get(&caps[2])?;
    let suffix = caps[1]
        .parse::<usize>()
        .ok()
        .and_then(|phase| PHASES.get(phase))
        .copied()
        .unwrap_or("");
    Some(format!("{measure}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldType;

    fn fields(names: &[&str]) -> Vec<PropertyField> {
        names
            .iter()
            .map(|n| PropertyField::new(*n, FieldType::Number))
            .collect()
    }

    #[test]
    fn no_matching_fields_gives_no_tables() {
        assert!(project_gen1(&fields(&[])).is_empty());
        assert!(project_gen1(&fields(&["status_uptime", "status_wifi_sta_rssi"])).is_empty());
    }

    #[test]
    fn three_phase_emeter_columns() {
        let tables = project_gen1(&fields(&[
            "status_emeters_0_power",
            "status_emeters_1_voltage",
            "status_emeters_2_pf",
            "status_emeters_0_total_returned",
        ]));

        assert_eq!(tables.len(), 1);
        let ac = &tables[0];
        assert_eq!(ac.name(), "AC");
        assert_eq!(ac.column_for("status_emeters_0_power").unwrap().name, "Wirkleistung_R");
        assert_eq!(ac.column_for("status_emeters_1_voltage").unwrap().name, "Spannung_S");
        assert_eq!(ac.column_for("status_emeters_2_pf").unwrap().name, "PowerFactor_T");
        assert_eq!(
            ac.column_for("status_emeters_0_total_returned").unwrap().name,
            "Leistung_EinspeisungGesamt_R"
        );
    }

    #[test]
    fn phase_beyond_three_has_no_suffix() {
        let tables = project_gen1(&fields(&["status_meters_3_power"]));
        assert_eq!(tables[0].columns()[0].0.name, "Wirkleistung");
    }

    #[test]
    fn unknown_measures_are_ignored() {
        let tables = project_gen1(&fields(&["status_meters_0_overpower", "status_meters_0_is_valid"]));
        assert!(tables.is_empty());
    }

    #[test]
    fn temperature_goes_to_service_table() {
        let tables = project_gen1(&fields(&["status_temperature", "status_meters_0_power"]));

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name(), "AC");
        assert_eq!(tables[1].name(), "Service");
        assert_eq!(tables[1].columns()[0].0.name, "Temperatur");
        assert_eq!(tables[1].columns()[0].1.field, "status_temperature");
        assert_eq!(tables[1].columns()[0].0.column_type, ColumnType::Number);
    }

    #[test]
    fn settings_meters_are_not_status_meters() {
        assert!(project_gen1(&fields(&["settings_meters_0_power"])).is_empty());
    }
}
