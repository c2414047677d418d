use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::rota::{
    analyzer::FairnessStats,
    model::{DayView, Employee, EmployeeId, RosterSchedule, ShiftType},
    records::Reconstruction,
};

#[derive(Deserialize)]
pub struct GenerateRequest {
    pub branch: String,
    pub start_date: NaiveDate,
    pub days: u32,
    /// 沒給的話從員工名單取該分店可排班的人
    #[serde(default)]
    pub employees: Option<Vec<Employee>>,
}

#[derive(Deserialize)]
pub struct ScheduleBody {
    pub schedule: RosterSchedule,
}

#[derive(Deserialize)]
pub struct EditRequest {
    pub schedule: RosterSchedule,
    pub day_index: usize,
    pub employee_id: EmployeeId,
}

#[derive(Deserialize)]
pub struct SaveRequest {
    pub branch: String,
    pub schedule: RosterSchedule,
    /// 覆寫會先刪除區間內的班表，必須明確確認
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub branch: String,
    pub start: NaiveDate,
    pub days: u32,
}

#[derive(Deserialize)]
pub struct SaveStatusQuery {
    pub branch: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Deserialize)]
pub struct ImportQuery {
    pub branch: String,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Serialize)]
pub struct RosterResponse {
    pub schedule: RosterSchedule,
    pub days: Vec<DayView>,
    pub stats: FairnessStats,
}

impl RosterResponse {
    pub fn new(schedule: RosterSchedule, stats: FairnessStats) -> Self {
        Self {
            days: schedule.day_views(),
            schedule,
            stats,
        }
    }
}

#[derive(Serialize)]
pub struct EditResponse {
    pub shift: ShiftType,
    #[serde(flatten)]
    pub roster: RosterResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveReport {
    pub branch: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub deleted: u64,
    pub inserted: u64,
}

#[derive(Serialize)]
pub struct SaveStatus {
    pub in_flight: bool,
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub created: Vec<Employee>,
    pub saved: SaveReport,
    pub roster: Reconstruction,
}
