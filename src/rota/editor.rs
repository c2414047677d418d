use super::{
    analyzer::{analyze, FairnessStats},
    generator::coverage_warnings,
    model::{EmployeeId, RosterSchedule, ShiftType},
};
use crate::errors::RosterError;

/// Moves one (day, employee) cell to the next state of
/// `off -> morning -> afternoon -> night -> off`. Only that cell changes; the
/// day's coverage warnings are re-evaluated so an edit that breaks coverage is
/// visible instead of rejected.
pub fn cycle_assignment(
    schedule: &mut RosterSchedule,
    day_index: usize,
    employee_id: EmployeeId,
) -> Result<ShiftType, RosterError> {
    let index = schedule
        .employee_index(employee_id)
        .ok_or(RosterError::UnknownEmployee(employee_id))?;
    let day_count = schedule.days.len();
    let day = schedule
        .days
        .get_mut(day_index)
        .ok_or(RosterError::DayOutOfRange(day_index, day_count))?;

    // 找不到就當作 off
    let current = day.shifts.get(index).copied().unwrap_or(ShiftType::Off);
    let next = current.next_in_edit_cycle();

    if index >= day.shifts.len() {
        day.shifts.resize(index + 1, ShiftType::Off);
    }
    day.shifts[index] = next;
    day.warnings = coverage_warnings(day.date, &day.counts());

    tracing::debug!(
        "employee {} on {}: {} -> {}",
        employee_id,
        day.date,
        current,
        next
    );

    Ok(next)
}

/// Single-owner editing session: a schedule plus statistics that are dropped on
/// every edit and rebuilt on the next read.
#[derive(Debug, Clone)]
pub struct RosterEditor {
    schedule: RosterSchedule,
    stats: Option<FairnessStats>,
}

impl RosterEditor {
    pub fn new(schedule: RosterSchedule) -> Self {
        Self {
            schedule,
            stats: None,
        }
    }

    pub fn schedule(&self) -> &RosterSchedule {
        &self.schedule
    }

    pub fn cycle(
        &mut self,
        day_index: usize,
        employee_id: EmployeeId,
    ) -> Result<ShiftType, RosterError> {
        let next = cycle_assignment(&mut self.schedule, day_index, employee_id)?;
        self.stats = None;
        Ok(next)
    }

    pub fn stats(&mut self) -> &FairnessStats {
        self.stats.get_or_insert_with(|| analyze(&self.schedule))
    }

    pub fn into_parts(mut self) -> (RosterSchedule, FairnessStats) {
        let stats = match self.stats.take() {
            Some(stats) => stats,
            None => analyze(&self.schedule),
        };
        (self.schedule, stats)
    }
}
