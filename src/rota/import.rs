use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

use super::{
    export::DATE_HEADER,
    model::{Employee, ShiftType},
    records::{FlatShiftRecord, ShiftTimes},
};
use crate::errors::RosterError;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedRow {
    pub date: NaiveDate,
    /// 與 `ImportedTable::employee_names` 同順序
    pub shifts: Vec<ShiftType>,
}

/// An uploaded "who works when" sheet: a date column followed by one column per
/// employee, named by display name or by numeric id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedTable {
    pub employee_names: Vec<String>,
    pub rows: Vec<ImportedRow>,
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
}

pub fn parse_table(data: &[u8]) -> Result<ImportedTable, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    let mut columns = headers.iter();
    match columns.next() {
        Some(first) if first.eq_ignore_ascii_case(DATE_HEADER) => {}
        _ => {
            return Err(RosterError::MalformedImport(format!(
                "first column must be `{}`",
                DATE_HEADER
            )))
        }
    }
    let employee_names: Vec<String> = columns.map(str::to_string).collect();

    let mut seen_names = HashSet::new();
    for name in &employee_names {
        if name.is_empty() || !seen_names.insert(name.to_lowercase()) {
            return Err(RosterError::MalformedImport(format!(
                "employee column `{}` is empty or repeated",
                name
            )));
        }
    }

    let mut rows = Vec::new();
    let mut seen_dates = HashSet::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        // header 是第 1 行
        let line = line + 2;

        let raw_date = record.get(0).unwrap_or_default();
        let date = parse_date(raw_date).ok_or_else(|| {
            RosterError::MalformedImport(format!("line {}: invalid date `{}`", line, raw_date))
        })?;
        if !seen_dates.insert(date) {
            return Err(RosterError::MalformedImport(format!(
                "line {}: date {} appears twice",
                line, date
            )));
        }

        let shifts = record
            .iter()
            .skip(1)
            .map(|cell| {
                cell.parse::<ShiftType>().map_err(|err| {
                    RosterError::MalformedImport(format!("line {}: {}", line, err))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        rows.push(ImportedRow { date, shifts });
    }

    rows.sort_by_key(|row| row.date);

    Ok(ImportedTable {
        employee_names,
        rows,
    })
}

impl ImportedTable {
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|row| row.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|row| row.date)
    }

    /// Inclusive day count between the first and last row.
    pub fn day_span(&self) -> Option<u32> {
        let days = (self.last_date()? - self.first_date()?).num_days();
        u32::try_from(days + 1).ok()
    }

    fn resolve<'a>(name: &str, directory: &'a [Employee]) -> Option<&'a Employee> {
        directory
            .iter()
            .find(|e| e.name.trim().eq_ignore_ascii_case(name))
            .or_else(|| {
                let id = name.parse::<i64>().ok()?;
                directory.iter().find(|e| e.id.0 == id)
            })
    }

    /// Column names with no matching employee in `directory`. These accounts
    /// have to exist before the table can become records.
    pub fn missing_employees(&self, directory: &[Employee]) -> Vec<String> {
        self.employee_names
            .iter()
            .filter(|name| Self::resolve(name, directory).is_none())
            .cloned()
            .collect()
    }

    /// Fails when two columns resolve to the same employee, which would give
    /// that employee two shifts on one day.
    pub fn check_columns(&self, directory: &[Employee]) -> Result<(), RosterError> {
        let mut seen = HashMap::new();
        for name in &self.employee_names {
            let Some(employee) = Self::resolve(name, directory) else {
                continue;
            };
            if let Some(first) = seen.insert(employee.id, name) {
                return Err(RosterError::MalformedImport(format!(
                    "columns `{}` and `{}` are both employee {}",
                    first, name, employee.id
                )));
            }
        }
        Ok(())
    }

    pub fn to_records(
        &self,
        directory: &[Employee],
        branch: &str,
        times: &ShiftTimes,
        note: &str,
    ) -> Result<Vec<FlatShiftRecord>, RosterError> {
        let employees = self
            .employee_names
            .iter()
            .map(|name| {
                Self::resolve(name, directory)
                    .ok_or_else(|| RosterError::UnknownEmployeeName(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::new();
        for row in &self.rows {
            for (employee, shift) in employees.iter().zip(&row.shifts) {
                let Some(window) = times.window(*shift) else {
                    continue;
                };
                records.push(FlatShiftRecord {
                    employee_id: employee.id,
                    employee_name: employee.name.clone(),
                    date: row.date,
                    start_time: window.start,
                    end_time: window.end,
                    shift_type: *shift,
                    branch: branch.to_string(),
                    note: note.to_string(),
                });
            }
        }

        Ok(records)
    }
}
