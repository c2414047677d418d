use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, str::FromStr};

use super::generator::coverage_warnings;
use crate::errors::RosterError;

/// 員工在排班中的識別碼，對應 users.id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub i64);

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// 只用於顯示
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Employee {
    pub fn new(id: i64, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: EmployeeId(id),
            name: name.into(),
            role: role.into(),
            avatar: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShiftType {
    Morning,
    Afternoon,
    Night,
    Off,
}

impl ShiftType {
    pub const ALL: [ShiftType; 4] = [
        ShiftType::Morning,
        ShiftType::Afternoon,
        ShiftType::Night,
        ShiftType::Off,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Morning => "morning",
            ShiftType::Afternoon => "afternoon",
            ShiftType::Night => "night",
            ShiftType::Off => "off",
        }
    }

    pub fn is_working(&self) -> bool {
        !matches!(self, ShiftType::Off)
    }

    /// 手動編輯用的循環: off -> morning -> afternoon -> night -> off
    pub fn next_in_edit_cycle(&self) -> ShiftType {
        match self {
            ShiftType::Off => ShiftType::Morning,
            ShiftType::Morning => ShiftType::Afternoon,
            ShiftType::Afternoon => ShiftType::Night,
            ShiftType::Night => ShiftType::Off,
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShiftType {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "morning" | "m" => Ok(Self::Morning),
            "afternoon" | "a" => Ok(Self::Afternoon),
            "night" | "n" => Ok(Self::Night),
            "off" | "o" | "" => Ok(Self::Off),
            other => Err(RosterError::UnknownShiftLabel(other.to_string())),
        }
    }
}

/// Per-shift headcount for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShiftCounts {
    pub morning: usize,
    pub afternoon: usize,
    pub night: usize,
    pub off: usize,
}

impl ShiftCounts {
    pub fn tally<'a>(shifts: impl IntoIterator<Item = &'a ShiftType>) -> Self {
        shifts.into_iter().fold(Self::default(), |mut counts, shift| {
            counts.add(*shift);
            counts
        })
    }

    pub fn add(&mut self, shift: ShiftType) {
        match shift {
            ShiftType::Morning => self.morning += 1,
            ShiftType::Afternoon => self.afternoon += 1,
            ShiftType::Night => self.night += 1,
            ShiftType::Off => self.off += 1,
        }
    }

    pub fn get(&self, shift: ShiftType) -> usize {
        match shift {
            ShiftType::Morning => self.morning,
            ShiftType::Afternoon => self.afternoon,
            ShiftType::Night => self.night,
            ShiftType::Off => self.off,
        }
    }

    pub fn working(&self) -> usize {
        self.morning + self.afternoon + self.night
    }
}

/// One calendar day. `shifts[i]` is the assignment of `RosterSchedule::employees[i]`,
/// so every employee sits in exactly one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub shifts: Vec<ShiftType>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl DailySchedule {
    pub fn counts(&self) -> ShiftCounts {
        ShiftCounts::tally(&self.shifts)
    }

    /// employee 索引，依 roster 順序
    pub fn bucket(&self, shift: ShiftType) -> impl Iterator<Item = usize> + '_ {
        self.shifts
            .iter()
            .enumerate()
            .filter(move |(_, s)| **s == shift)
            .map(|(index, _)| index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSchedule {
    pub employees: Vec<Employee>,
    pub days: Vec<DailySchedule>,
}

impl RosterSchedule {
    pub fn start_date(&self) -> Option<NaiveDate> {
        self.days.first().map(|day| day.date)
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.days.last().map(|day| day.date)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    pub fn employee_index(&self, id: EmployeeId) -> Option<usize> {
        self.employees.iter().position(|employee| employee.id == id)
    }

    pub fn shift_of(&self, day_index: usize, id: EmployeeId) -> Option<ShiftType> {
        let index = self.employee_index(id)?;
        self.days.get(day_index)?.shifts.get(index).copied()
    }

    pub fn bucket(&self, day_index: usize, shift: ShiftType) -> Vec<&Employee> {
        self.days
            .get(day_index)
            .map(|day| {
                day.bucket(shift)
                    .filter_map(|i| self.employees.get(i))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Re-checks a schedule that came back from a client before it is edited or saved.
    pub fn validate(&self) -> Result<(), RosterError> {
        let mut seen = HashSet::new();
        for employee in &self.employees {
            if !seen.insert(employee.id) {
                return Err(RosterError::MalformedSchedule(format!(
                    "employee {} listed twice",
                    employee.id
                )));
            }
        }

        let mut expected_date = self.start_date();
        for (index, day) in self.days.iter().enumerate() {
            if day.shifts.len() != self.employees.len() {
                return Err(RosterError::MalformedSchedule(format!(
                    "day {} has {} assignments for {} employees",
                    index,
                    day.shifts.len(),
                    self.employees.len()
                )));
            }
            if Some(day.date) != expected_date {
                return Err(RosterError::MalformedSchedule(format!(
                    "day {} is {}, dates must be contiguous",
                    index, day.date
                )));
            }
            expected_date = day.date.checked_add_signed(Duration::days(1));
        }

        Ok(())
    }

    /// 重新計算每天的 coverage warning，不信任 client 送來的內容
    pub fn refresh_warnings(&mut self) {
        for day in &mut self.days {
            day.warnings = coverage_warnings(day.date, &day.counts());
        }
    }

    pub fn day_views(&self) -> Vec<DayView> {
        self.days
            .iter()
            .map(|day| {
                let pick = |shift| {
                    day.bucket(shift)
                        .filter_map(|i| self.employees.get(i).cloned())
                        .collect::<Vec<_>>()
                };
                DayView {
                    date: day.date,
                    morning: pick(ShiftType::Morning),
                    afternoon: pick(ShiftType::Afternoon),
                    night: pick(ShiftType::Night),
                    off: pick(ShiftType::Off),
                    warnings: day.warnings.clone(),
                }
            })
            .collect()
    }
}

/// 前端顯示用：每天四個 bucket
#[derive(Debug, Clone, Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub morning: Vec<Employee>,
    pub afternoon: Vec<Employee>,
    pub night: Vec<Employee>,
    pub off: Vec<Employee>,
    pub warnings: Vec<String>,
}

/// `start + offset` days, or an error when the calendar overflows.
pub fn nth_day(start: NaiveDate, offset: u32) -> Result<NaiveDate, RosterError> {
    start
        .checked_add_signed(Duration::days(offset as i64))
        .ok_or(RosterError::DateOutOfRange(start, offset))
}
