use chrono::NaiveDate;
use serde::Serialize;

use super::{
    generator::coverage_warnings,
    model::{EmployeeId, RosterSchedule, ShiftCounts},
};

/// 員工之間總班數允許的最大差距
pub const MAX_TOTAL_SPREAD: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeTotals {
    pub employee_id: EmployeeId,
    pub name: String,
    pub morning: usize,
    pub afternoon: usize,
    pub night: usize,
    pub off: usize,
    /// 不含 off
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTotals {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counts: ShiftCounts,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FairnessStats {
    pub per_employee: Vec<EmployeeTotals>,
    pub per_day: Vec<DayTotals>,
    pub variance_ok: bool,
    pub min_total: usize,
    pub max_total: usize,
    pub warnings: Vec<String>,
}

impl FairnessStats {
    pub fn spread(&self) -> usize {
        self.max_total - self.min_total
    }
}

/// Recomputes every statistic from the cells, coverage warnings included.
/// Nothing is taken from the warnings stored on the days, so the numbers always
/// match the schedule as it stands.
pub fn analyze(schedule: &RosterSchedule) -> FairnessStats {
    let mut per_employee_counts = vec![ShiftCounts::default(); schedule.employees.len()];
    let mut per_day = Vec::with_capacity(schedule.days.len());

    for day in &schedule.days {
        for (index, shift) in day.shifts.iter().enumerate() {
            if let Some(counts) = per_employee_counts.get_mut(index) {
                counts.add(*shift);
            }
        }
        let counts = day.counts();
        per_day.push(DayTotals {
            date: day.date,
            counts,
            warnings: coverage_warnings(day.date, &counts),
        });
    }

    let per_employee: Vec<EmployeeTotals> = schedule
        .employees
        .iter()
        .zip(per_employee_counts)
        .map(|(employee, counts)| EmployeeTotals {
            employee_id: employee.id,
            name: employee.name.clone(),
            morning: counts.morning,
            afternoon: counts.afternoon,
            night: counts.night,
            off: counts.off,
            total: counts.working(),
        })
        .collect();

    let min_total = per_employee.iter().map(|t| t.total).min().unwrap_or(0);
    let max_total = per_employee.iter().map(|t| t.total).max().unwrap_or(0);
    let variance_ok = max_total - min_total <= MAX_TOTAL_SPREAD;

    let mut warnings = Vec::new();
    if !variance_ok {
        warnings.push(format!(
            "Fairness variance exceeded: totals range {}..={} (max spread {})",
            min_total, max_total, MAX_TOTAL_SPREAD
        ));
    }

    FairnessStats {
        per_employee,
        per_day,
        variance_ok,
        min_total,
        max_total,
        warnings,
    }
}
