use super::model::RosterSchedule;
use crate::errors::RosterError;

pub const DATE_HEADER: &str = "date";

/// Renders one row per date and one column per employee, cells holding the shift
/// label. `import::parse_table` reads the same layout back.
pub fn to_csv(schedule: &RosterSchedule) -> Result<String, RosterError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let header = std::iter::once(DATE_HEADER)
        .chain(schedule.employees.iter().map(|e| e.name.as_str()));
    writer.write_record(header)?;

    for day in &schedule.days {
        let date = day.date.format("%Y-%m-%d").to_string();
        let row = std::iter::once(date.as_str()).chain(day.shifts.iter().map(|s| s.label()));
        writer.write_record(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| RosterError::Export(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| RosterError::Export(err.to_string()))
}
