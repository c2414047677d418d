use chrono::{NaiveDate, NaiveTime};
use sqlx::FromRow;

use crate::rota::{
    model::EmployeeId,
    records::{FlatShiftRecord, UnreadableShift},
};

/// shifts 資料表的一列
#[derive(Debug, FromRow)]
pub struct DbShift {
    pub employee_id: i64,
    pub employee_name: String,
    pub shift_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub shift_type: String,
    pub branch: String,
    pub note: String,
}

impl DbShift {
    /// 班別字串無法辨識時回傳 `UnreadableShift`，由呼叫端回報
    pub fn into_record(self) -> Result<FlatShiftRecord, UnreadableShift> {
        let shift_type = match self.shift_type.parse() {
            Ok(shift_type) => shift_type,
            Err(_) => {
                return Err(UnreadableShift {
                    employee_id: EmployeeId(self.employee_id),
                    employee_name: self.employee_name,
                    date: self.shift_date,
                    shift_type: self.shift_type,
                })
            }
        };

        Ok(FlatShiftRecord {
            employee_id: EmployeeId(self.employee_id),
            employee_name: self.employee_name,
            date: self.shift_date,
            start_time: self.start_time,
            end_time: self.end_time,
            shift_type,
            branch: self.branch,
            note: self.note,
        })
    }
}
