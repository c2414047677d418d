use chrono::NaiveDate;

use super::{
    model::{nth_day, DailySchedule, Employee, RosterSchedule, ShiftCounts},
    pattern::Crew,
};
use crate::errors::RosterError;

pub const DEFAULT_NIGHT_CREW_SIZE: usize = 7;
/// 一次最多排一年
pub const DEFAULT_MAX_DAYS: u32 = 366;
pub const REQUIRED_NIGHT: usize = 1;
pub const MAX_MORNING: usize = 3;
pub const MAX_AFTERNOON: usize = 3;

pub const NIGHT_VIOLATION: &str = "Strict NT Violation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// 前 N 位員工輪夜班，其餘只排日班
    pub night_crew_size: usize,
    /// 單次產生或讀取的天數上限
    pub max_days: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            night_crew_size: DEFAULT_NIGHT_CREW_SIZE,
            max_days: DEFAULT_MAX_DAYS,
        }
    }
}

impl GeneratorConfig {
    /// Rejects an empty range and one longer than `max_days`.
    pub fn check_day_count(&self, day_count: u32) -> Result<(), RosterError> {
        if day_count == 0 {
            return Err(RosterError::InvalidDayCount(day_count));
        }
        if day_count > self.max_days {
            return Err(RosterError::TooManyDays(day_count, self.max_days));
        }
        Ok(())
    }

    fn crew_of(&self, index: usize) -> (Crew, usize) {
        if index < self.night_crew_size {
            (Crew::NightEligible, index)
        } else {
            (Crew::DayOnly, index - self.night_crew_size)
        }
    }
}

/// Builds a roster of `day_count` days starting at `start`.
///
/// The first `night_crew_size` employees (input order) rotate through nights,
/// everybody else works days only. Crews smaller than the cycle simply leave
/// some cycle positions uncovered; that shows up as warnings, not errors.
pub fn generate(
    employees: &[Employee],
    start: NaiveDate,
    day_count: u32,
    config: &GeneratorConfig,
) -> Result<RosterSchedule, RosterError> {
    config.check_day_count(day_count)?;
    // 先確認最後一天不會溢位
    nth_day(start, day_count - 1)?;

    let crews: Vec<(Crew, usize)> = (0..employees.len()).map(|i| config.crew_of(i)).collect();

    tracing::debug!(
        "generating {} days from {} for {} employees (night crew {})",
        day_count,
        start,
        employees.len(),
        employees.len().min(config.night_crew_size)
    );

    let mut days = Vec::with_capacity(day_count as usize);
    for offset in 0..day_count {
        let date = nth_day(start, offset)?;
        let shifts: Vec<_> = crews
            .iter()
            .map(|(crew, crew_index)| crew.shift_on(*crew_index, offset as usize))
            .collect();
        let warnings = coverage_warnings(date, &ShiftCounts::tally(&shifts));

        days.push(DailySchedule {
            date,
            shifts,
            warnings,
        });
    }

    let warned = days.iter().filter(|day| !day.warnings.is_empty()).count();
    if warned > 0 {
        tracing::info!("roster from {} generated with warnings on {} day(s)", start, warned);
    }

    Ok(RosterSchedule {
        employees: employees.to_vec(),
        days,
    })
}

/// Advisory coverage rules for one day. Only maximums and the night count are
/// checked; there is no minimum staffing rule.
pub fn coverage_warnings(date: NaiveDate, counts: &ShiftCounts) -> Vec<String> {
    let mut warnings = Vec::new();

    if counts.night != REQUIRED_NIGHT {
        warnings.push(format!(
            "{}: {} night shift(s) on {}, expected exactly {}",
            NIGHT_VIOLATION, counts.night, date, REQUIRED_NIGHT
        ));
    }
    if counts.morning > MAX_MORNING {
        warnings.push(format!(
            "Morning overstaffed: {} on {} (max {})",
            counts.morning, date, MAX_MORNING
        ));
    }
    if counts.afternoon > MAX_AFTERNOON {
        warnings.push(format!(
            "Afternoon overstaffed: {} on {} (max {})",
            counts.afternoon, date, MAX_AFTERNOON
        ));
    }

    warnings
}
