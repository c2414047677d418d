use super::model::ShiftType;

pub const CYCLE_LEN: usize = 7;

/// 輪值夜班的固定 7 天循環，每個循環只有一個 night
pub const NIGHT_CYCLE: [ShiftType; CYCLE_LEN] = [
    ShiftType::Morning,
    ShiftType::Morning,
    ShiftType::Afternoon,
    ShiftType::Afternoon,
    ShiftType::Night,
    ShiftType::Off,
    ShiftType::Off,
];

/// 不上夜班的 7 天循環
pub const DAY_CYCLE: [ShiftType; CYCLE_LEN] = [
    ShiftType::Morning,
    ShiftType::Morning,
    ShiftType::Morning,
    ShiftType::Afternoon,
    ShiftType::Afternoon,
    ShiftType::Off,
    ShiftType::Off,
];

/// Which of the two cycles an employee follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crew {
    NightEligible,
    DayOnly,
}

impl Crew {
    pub fn cycle(&self) -> &'static [ShiftType; CYCLE_LEN] {
        match self {
            Crew::NightEligible => &NIGHT_CYCLE,
            Crew::DayOnly => &DAY_CYCLE,
        }
    }

    /// Phase offset for the `crew_index`-th member of this crew.
    ///
    /// Night crew members are staggered one day apart, so seven of them tile the
    /// cycle and exactly one is on nights each day. Day-only members are spread
    /// three days apart; this keeps two members' days off apart but is only a
    /// heuristic for larger day-only crews.
    pub fn phase_offset(&self, crew_index: usize) -> usize {
        match self {
            Crew::NightEligible => crew_index % CYCLE_LEN,
            Crew::DayOnly => (crew_index * 3) % CYCLE_LEN,
        }
    }

    /// Shift on absolute day `day` (0-based from the roster start).
    pub fn shift_on(&self, crew_index: usize, day: usize) -> ShiftType {
        let position = (day % CYCLE_LEN + self.phase_offset(crew_index)) % CYCLE_LEN;
        self.cycle()[position]
    }
}
