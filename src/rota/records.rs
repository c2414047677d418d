use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{
    generator::coverage_warnings,
    model::{nth_day, DailySchedule, Employee, EmployeeId, RosterSchedule, ShiftType},
};
use crate::errors::RosterError;

/// Role given to employees rebuilt from stored rows only.
pub const DETACHED_ROLE: &str = "former";

/// 一筆儲存用的班表紀錄。off 不會有紀錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatShiftRecord {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub shift_type: ShiftType,
    pub branch: String,
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftWindow {
    pub start: NaiveTime,
    /// night 的 end 落在隔天
    pub end: NaiveTime,
}

impl ShiftWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Parses `HH:MM-HH:MM`.
    pub fn parse(value: &str) -> Option<Self> {
        let (start, end) = value.split_once('-')?;
        Some(Self {
            start: NaiveTime::parse_from_str(start.trim(), "%H:%M").ok()?,
            end: NaiveTime::parse_from_str(end.trim(), "%H:%M").ok()?,
        })
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end <= self.start
    }
}

/// Wall-clock times written for each working shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftTimes {
    pub morning: ShiftWindow,
    pub afternoon: ShiftWindow,
    pub night: ShiftWindow,
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

impl Default for ShiftTimes {
    fn default() -> Self {
        Self {
            morning: ShiftWindow::new(hm(7, 30), hm(15, 30)),
            afternoon: ShiftWindow::new(hm(15, 30), hm(22, 30)),
            night: ShiftWindow::new(hm(22, 30), hm(7, 30)),
        }
    }
}

impl ShiftTimes {
    pub fn window(&self, shift: ShiftType) -> Option<ShiftWindow> {
        match shift {
            ShiftType::Morning => Some(self.morning),
            ShiftType::Afternoon => Some(self.afternoon),
            ShiftType::Night => Some(self.night),
            ShiftType::Off => None,
        }
    }
}

/// One record per working (day, employee) cell.
pub fn to_records(
    schedule: &RosterSchedule,
    branch: &str,
    times: &ShiftTimes,
    note: &str,
) -> Vec<FlatShiftRecord> {
    let mut records = Vec::new();

    for day in &schedule.days {
        for (employee, shift) in schedule.employees.iter().zip(&day.shifts) {
            let Some(window) = times.window(*shift) else {
                continue;
            };
            records.push(FlatShiftRecord {
                employee_id: employee.id,
                employee_name: employee.name.clone(),
                date: day.date,
                start_time: window.start,
                end_time: window.end,
                shift_type: *shift,
                branch: branch.to_string(),
                note: note.to_string(),
            });
        }
    }

    records
}

/// A stored row whose shift label could not be read. Its cell comes back as
/// off, so the row is reported next to the schedule instead of being dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadableShift {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    pub date: NaiveDate,
    pub shift_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconstruction {
    pub schedule: RosterSchedule,
    /// 已不在目前名單、只靠紀錄中的姓名還原的員工
    pub detached: Vec<Employee>,
    pub unreadable: Vec<UnreadableShift>,
}

/// Rebuilds a schedule for `day_count` days from stored rows.
///
/// Anyone without a row on a day is off that day. Rows for employees missing from
/// `roster` are kept: such employees are appended after the roster using the name
/// stored on the row.
pub fn from_records(
    records: &[FlatShiftRecord],
    roster: &[Employee],
    start: NaiveDate,
    day_count: u32,
) -> Result<Reconstruction, RosterError> {
    if day_count == 0 {
        return Err(RosterError::InvalidDayCount(day_count));
    }
    let end = nth_day(start, day_count - 1)?;

    let mut employees = roster.to_vec();
    let mut detached = Vec::new();
    let mut index_of: HashMap<EmployeeId, usize> = employees
        .iter()
        .enumerate()
        .map(|(i, e)| (e.id, i))
        .collect();

    let in_range: Vec<&FlatShiftRecord> = records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .collect();
    if in_range.len() != records.len() {
        tracing::warn!(
            "ignored {} stored shift(s) outside {}..={}",
            records.len() - in_range.len(),
            start,
            end
        );
    }

    for record in &in_range {
        if !index_of.contains_key(&record.employee_id) {
            let employee = Employee {
                id: record.employee_id,
                name: record.employee_name.clone(),
                role: DETACHED_ROLE.to_string(),
                avatar: None,
            };
            index_of.insert(employee.id, employees.len());
            employees.push(employee.clone());
            detached.push(employee);
        }
    }

    let mut days: Vec<DailySchedule> = (0..day_count)
        .map(|offset| {
            Ok(DailySchedule {
                date: nth_day(start, offset)?,
                shifts: vec![ShiftType::Off; employees.len()],
                warnings: vec![],
            })
        })
        .collect::<Result<_, RosterError>>()?;

    let mut filled = HashSet::new();
    for record in in_range {
        let offset = (record.date - start).num_days() as usize;
        let index = index_of[&record.employee_id];
        if !filled.insert((offset, index)) {
            tracing::warn!(
                "employee {} has more than one stored shift on {}, keeping the first",
                record.employee_id,
                record.date
            );
            continue;
        }
        days[offset].shifts[index] = record.shift_type;
    }

    for day in &mut days {
        day.warnings = coverage_warnings(day.date, &day.counts());
    }

    if !detached.is_empty() {
        tracing::info!(
            "{} stored employee(s) are no longer on the roster",
            detached.len()
        );
    }

    Ok(Reconstruction {
        schedule: RosterSchedule { employees, days },
        detached,
        unreadable: Vec::new(),
    })
}

/// What the store holds for a range: nothing at all, or a saved roster in which
/// missing rows mean off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoredRange {
    NotGenerated,
    Saved(Reconstruction),
}

impl StoredRange {
    pub fn load(
        records: &[FlatShiftRecord],
        unreadable: Vec<UnreadableShift>,
        roster: &[Employee],
        start: NaiveDate,
        day_count: u32,
    ) -> Result<Self, RosterError> {
        if records.is_empty() && unreadable.is_empty() {
            // 沒有任何紀錄代表這段期間還沒排班，不是全員 off
            return Ok(Self::NotGenerated);
        }

        let mut rebuilt = from_records(records, roster, start, day_count)?;
        if !unreadable.is_empty() {
            tracing::warn!(
                "{} stored shift(s) from {} have an unreadable label and load as off",
                unreadable.len(),
                start
            );
        }
        rebuilt.unreadable = unreadable;

        Ok(Self::Saved(rebuilt))
    }
}
