use std::{collections::HashSet, sync::Mutex};

use crate::{
    config::AppConfig,
    errors::{AppError, RosterError, SaveError},
    repositories::{
        employees::EmployeeDirectory,
        shifts::{ShiftRange, ShiftStore},
    },
    rota::{
        analyzer::analyze,
        generator::generate,
        import::ImportedTable,
        model::{nth_day, RosterSchedule},
        records::{from_records, to_records, FlatShiftRecord, StoredRange},
    },
    services::accounts,
    structs::{
        employees::NewEmployee,
        roster::{GenerateRequest, ImportResponse, RangeQuery, RosterResponse, SaveReport},
    },
};

/// Role given to accounts created by an import.
pub const IMPORTED_ROLE: &str = "staff";

/// Date ranges with a save currently running. A second save that overlaps one of
/// them on the same branch is refused until the first finishes.
#[derive(Debug, Default)]
pub struct SaveGuard {
    in_flight: Mutex<Vec<ShiftRange>>,
}

impl SaveGuard {
    fn ranges(&self) -> std::sync::MutexGuard<'_, Vec<ShiftRange>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn try_begin(&self, range: ShiftRange) -> Result<SaveTicket<'_>, SaveError> {
        let mut ranges = self.ranges();
        if let Some(busy) = ranges.iter().find(|busy| busy.overlaps(&range)) {
            return Err(SaveError::InFlight {
                branch: busy.branch.clone(),
                start: busy.start,
                end: busy.end,
            });
        }
        ranges.push(range.clone());

        Ok(SaveTicket { guard: self, range })
    }

    pub fn is_in_flight(&self, range: &ShiftRange) -> bool {
        self.ranges().iter().any(|busy| busy.overlaps(range))
    }
}

/// Held while a save runs; dropping it releases the range.
#[derive(Debug)]
pub struct SaveTicket<'a> {
    guard: &'a SaveGuard,
    range: ShiftRange,
}

impl Drop for SaveTicket<'_> {
    fn drop(&mut self) {
        let mut ranges = self.guard.ranges();
        if let Some(index) = ranges.iter().position(|busy| *busy == self.range) {
            ranges.remove(index);
        }
    }
}

fn validate_records(range: &ShiftRange, records: &[FlatShiftRecord]) -> Result<(), SaveError> {
    let mut keys = HashSet::new();
    for record in records {
        if record.branch != range.branch || !range.contains(record.date) {
            return Err(SaveError::InvalidRecord(format!(
                "shift of employee {} on {} ({}) is outside {} {}..={}",
                record.employee_id,
                record.date,
                record.branch,
                range.branch,
                range.start,
                range.end
            )));
        }
        if !keys.insert((record.employee_id, record.date, record.start_time)) {
            return Err(SaveError::InvalidRecord(format!(
                "employee {} has two shifts starting {} on {}",
                record.employee_id, record.start_time, record.date
            )));
        }
    }
    Ok(())
}

/// Replaces every stored shift of `range` with `records`.
///
/// The store gives no transaction across the two steps. A failed delete leaves
/// the old roster untouched (`DeleteFailed`); a failed insert after a successful
/// delete leaves the range empty (`PartialOverwrite`) and is not rolled back.
pub async fn overwrite_range<S>(
    store: &S,
    guard: &SaveGuard,
    range: ShiftRange,
    records: &[FlatShiftRecord],
    confirmed: bool,
) -> Result<SaveReport, SaveError>
where
    S: ShiftStore + ?Sized,
{
    if !confirmed {
        return Err(SaveError::NotConfirmed {
            branch: range.branch,
            start: range.start,
            end: range.end,
        });
    }
    validate_records(&range, records)?;

    let _ticket = guard.try_begin(range.clone())?;
    replace_range(store, range, records).await
}

/// Delete then insert. The caller holds the `SaveTicket` for `range` and has
/// already validated `records`.
async fn replace_range<S>(
    store: &S,
    range: ShiftRange,
    records: &[FlatShiftRecord],
) -> Result<SaveReport, SaveError>
where
    S: ShiftStore + ?Sized,
{
    let deleted = store.delete_shifts_in_range(&range).await.map_err(|err| {
        tracing::warn!("delete of {} {}..={} failed: {}", range.branch, range.start, range.end, err);
        SaveError::DeleteFailed(err)
    })?;
    tracing::debug!("deleted {} shift(s) of {} {}..={}", deleted, range.branch, range.start, range.end);

    let inserted = match store.bulk_insert_shifts(records).await {
        Ok(inserted) => inserted,
        Err(source) => {
            tracing::error!(
                "{} {}..={} is empty: {} shift(s) deleted, insert of {} failed: {}",
                range.branch,
                range.start,
                range.end,
                deleted,
                records.len(),
                source
            );
            return Err(SaveError::PartialOverwrite { deleted, source });
        }
    };

    tracing::info!(
        "saved {} {}..={}: {} deleted, {} inserted",
        range.branch,
        range.start,
        range.end,
        deleted,
        inserted
    );

    Ok(SaveReport {
        branch: range.branch,
        start: range.start,
        end: range.end,
        deleted,
        inserted,
    })
}

/// Serializes a client-held schedule and overwrites its date range.
pub async fn save_schedule<S>(
    store: &S,
    guard: &SaveGuard,
    config: &AppConfig,
    branch: &str,
    schedule: &RosterSchedule,
    confirmed: bool,
) -> Result<SaveReport, AppError>
where
    S: ShiftStore + ?Sized,
{
    schedule.validate()?;
    let day_count = u32::try_from(schedule.day_count()).unwrap_or(u32::MAX);
    config.generator.check_day_count(day_count)?;
    let (Some(start), Some(end)) = (schedule.start_date(), schedule.end_date()) else {
        return Err(RosterError::InvalidDayCount(0).into());
    };

    let records = to_records(schedule, branch, &config.shift_times, &config.record_note);
    let range = ShiftRange::new(branch, start, end);

    Ok(overwrite_range(store, guard, range, &records, confirmed).await?)
}

pub async fn generate_roster<D>(
    directory: &D,
    config: &AppConfig,
    request: GenerateRequest,
) -> Result<RosterResponse, AppError>
where
    D: EmployeeDirectory + ?Sized,
{
    let employees = match request.employees {
        Some(employees) => employees,
        None => {
            directory
                .schedulable_employees(&request.branch, &config.schedulable_roles)
                .await?
        }
    };

    let schedule = generate(&employees, request.start_date, request.days, &config.generator)?;
    let stats = analyze(&schedule);
    if !stats.variance_ok {
        tracing::info!(
            "roster for {} from {} exceeds fairness spread ({}..={})",
            request.branch,
            request.start_date,
            stats.min_total,
            stats.max_total
        );
    }

    Ok(RosterResponse::new(schedule, stats))
}

pub async fn load_range<S, D>(
    store: &S,
    directory: &D,
    config: &AppConfig,
    query: &RangeQuery,
) -> Result<StoredRange, AppError>
where
    S: ShiftStore + ?Sized,
    D: EmployeeDirectory + ?Sized,
{
    config.generator.check_day_count(query.days)?;
    let end = nth_day(query.start, query.days - 1)?;
    let range = ShiftRange::new(query.branch.as_str(), query.start, end);

    let stored = store.list_shifts_in_range(&range).await?;
    let roster = directory
        .schedulable_employees(&query.branch, &config.schedulable_roles)
        .await?;

    Ok(StoredRange::load(
        &stored.records,
        stored.unreadable,
        &roster,
        query.start,
        query.days,
    )?)
}

/// Creates accounts for columns that match no user of the branch, overwrites the
/// covered range with the imported shifts and returns the roster rebuilt from
/// them.
///
/// The range is claimed and every check that can fail on the sheet runs before
/// the first account is created. A store failure after that leaves the new
/// accounts in place; a retried import finds them by name.
pub async fn import_table<S, D>(
    store: &S,
    directory: &D,
    guard: &SaveGuard,
    config: &AppConfig,
    branch: &str,
    table: &ImportedTable,
    confirmed: bool,
) -> Result<ImportResponse, AppError>
where
    S: ShiftStore + ?Sized,
    D: EmployeeDirectory + ?Sized,
{
    let (Some(start), Some(end), Some(days)) =
        (table.first_date(), table.last_date(), table.day_span())
    else {
        return Err(RosterError::MalformedImport("no rows".to_string()).into());
    };
    config.generator.check_day_count(days)?;
    let range = ShiftRange::new(branch, start, end);

    // 先確認，避免沒確認就建立帳號
    if !confirmed {
        return Err(SaveError::NotConfirmed {
            branch: range.branch,
            start,
            end,
        }
        .into());
    }
    let _ticket = guard.try_begin(range.clone())?;

    let mut roster = directory
        .schedulable_employees(branch, &config.schedulable_roles)
        .await?;

    // 不在排班名單的既有帳號（其他職務、停用）也算存在，不重複建立
    let mut known = roster.clone();
    let unmatched = table.missing_employees(&known);
    if !unmatched.is_empty() {
        for employee in directory.find_by_names(branch, &unmatched).await? {
            if known.iter().all(|k| k.id != employee.id) {
                known.push(employee);
            }
        }
    }
    table.check_columns(&known)?;

    let mut created = Vec::new();
    for name in table.missing_employees(&known) {
        let employee = directory
            .create_employee(NewEmployee {
                name,
                role: IMPORTED_ROLE.to_string(),
                branch: branch.to_string(),
                password_hash: accounts::placeholder_password_hash()?,
            })
            .await?;
        tracing::info!("created employee {} ({}) from import", employee.name, employee.id);
        created.push(employee.clone());
        known.push(employee.clone());
        roster.push(employee);
    }

    let records = table.to_records(&known, branch, &config.shift_times, &config.record_note)?;
    validate_records(&range, &records)?;
    let saved = replace_range(store, range, &records).await?;
    let rebuilt = from_records(&records, &roster, start, days)?;

    Ok(ImportResponse {
        created,
        saved,
        roster: rebuilt,
    })
}
