//! Tests for importing an uploaded roster sheet.

use staff_rota::{
    errors::{AppError, RosterError, SaveError},
    repositories::shifts::ShiftRange,
    rota::{
        export::to_csv,
        generator::{generate, GeneratorConfig},
        import::parse_table,
        model::{Employee, EmployeeId, ShiftType},
    },
    services::roster::{import_table, SaveGuard, IMPORTED_ROLE},
};

use crate::util::{
    memory::{MemoryDirectory, MemoryShiftStore},
    setup::{config, date, staff},
};

/// Tests that an exported sheet imports back to the same cells.
///
/// Expected: no accounts created, every cell restored
#[tokio::test]
async fn exported_sheet_imports_back() {
    let employees = staff("E", 1, 7);
    let schedule = generate(&employees, date(2025, 3, 1), 14, &GeneratorConfig::default()).unwrap();
    let sheet = to_csv(&schedule).unwrap();

    let directory = MemoryDirectory::new("north", employees);
    let store = MemoryShiftStore::default();
    let table = parse_table(sheet.as_bytes()).unwrap();

    let response = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        true,
    )
    .await
    .unwrap();

    assert!(response.created.is_empty());
    assert_eq!(response.saved.inserted, 70);
    for (original, restored) in schedule.days.iter().zip(&response.roster.schedule.days) {
        assert_eq!(original.shifts, restored.shifts);
    }
}

/// Tests that unknown columns become new employee accounts.
///
/// Expected: one account created, its shifts stored under the new id
#[tokio::test]
async fn unknown_columns_create_employees() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 2));
    let store = MemoryShiftStore::default();
    let table = parse_table(
        b"date,E0,E1,Dana\n2025-03-01,m,a,n\n2025-03-02,off,m,n\n",
    )
    .unwrap();

    let response = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        true,
    )
    .await
    .unwrap();

    assert_eq!(response.created.len(), 1);
    let dana = &response.created[0];
    assert_eq!(dana.name, "Dana");
    assert_eq!(dana.role, IMPORTED_ROLE);
    assert_eq!(directory.len(), 3);

    let nights: Vec<_> = store
        .rows()
        .into_iter()
        .filter(|r| r.shift_type == ShiftType::Night)
        .collect();
    assert_eq!(nights.len(), 2);
    assert!(nights.iter().all(|r| r.employee_id == dana.id));
    assert_eq!(
        response.roster.schedule.shift_of(1, dana.id),
        Some(ShiftType::Night)
    );
}

/// Tests that an unconfirmed import has no side effects.
///
/// Expected: NotConfirmed, no accounts, no rows
#[tokio::test]
async fn unconfirmed_import_creates_nothing() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 1));
    let store = MemoryShiftStore::default();
    let table = parse_table(b"date,E0,Newcomer\n2025-03-01,m,a\n").unwrap();

    let result = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        false,
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::SaveError(SaveError::NotConfirmed { .. }))
    ));
    assert_eq!(directory.len(), 1);
    assert!(store.rows().is_empty());
}

/// Tests an import with a header but no rows.
///
/// Expected: roster error
#[tokio::test]
async fn empty_sheet_is_rejected() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 1));
    let store = MemoryShiftStore::default();
    let table = parse_table(b"date,E0\n").unwrap();

    let result = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        true,
    )
    .await;

    assert!(matches!(result, Err(AppError::RosterError(_))));
}

/// Tests an import that overlaps a save still running on the same branch.
///
/// Expected: InFlight, no account created until the range is free
#[tokio::test]
async fn import_during_save_creates_no_accounts() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 1));
    let store = MemoryShiftStore::default();
    let guard = SaveGuard::default();
    let table = parse_table(b"date,E0,Newcomer\n2025-03-10,m,a\n").unwrap();

    let running = guard
        .try_begin(ShiftRange::new("north", date(2025, 3, 1), date(2025, 3, 31)))
        .unwrap();
    let result =
        import_table(&store, &directory, &guard, &config(), "north", &table, true).await;

    assert!(matches!(
        result,
        Err(AppError::SaveError(SaveError::InFlight { .. }))
    ));
    assert_eq!(directory.len(), 1);

    drop(running);
    let response = import_table(&store, &directory, &guard, &config(), "north", &table, true)
        .await
        .unwrap();
    assert_eq!(response.created.len(), 1);
    assert_eq!(directory.len(), 2);
    assert!(!guard.is_in_flight(&ShiftRange::new("north", date(2025, 3, 10), date(2025, 3, 10))));
}

/// Tests that users outside the schedulable roles are matched, not recreated.
///
/// Expected: no account created, the manager's shifts stored under their id
#[tokio::test]
async fn existing_non_schedulable_user_is_not_duplicated() {
    let directory = MemoryDirectory::new(
        "north",
        vec![Employee::new(1, "E0", "staff"), Employee::new(2, "E1", "manager")],
    );
    let store = MemoryShiftStore::default();
    let table = parse_table(b"date,E0,e1\n2025-03-01,m,n\n").unwrap();

    let response = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        true,
    )
    .await
    .unwrap();

    assert!(response.created.is_empty());
    assert_eq!(directory.len(), 2);
    assert!(store
        .rows()
        .iter()
        .any(|r| r.employee_id == EmployeeId(2) && r.shift_type == ShiftType::Night));
    // 不在排班名單，以 detached 身分還原
    assert_eq!(response.roster.detached.len(), 1);
    assert_eq!(response.roster.detached[0].id, EmployeeId(2));
}

/// Tests that a sheet naming one employee twice is rejected up front.
///
/// Expected: malformed import, no account created, nothing stored
#[tokio::test]
async fn duplicate_columns_fail_before_accounts_are_created() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 1));
    let store = MemoryShiftStore::default();
    // "1" 是 E0 的 id
    let table = parse_table(b"date,E0,1,Newbie\n2025-03-01,m,a,n\n").unwrap();

    let result = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        true,
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::RosterError(RosterError::MalformedImport(_)))
    ));
    assert_eq!(directory.len(), 1);
    assert!(store.rows().is_empty());
}

/// Tests a sheet spanning more days than one roster may hold.
///
/// Expected: TooManyDays, no account created
#[tokio::test]
async fn sheet_longer_than_limit_is_rejected() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 1));
    let store = MemoryShiftStore::default();
    let table = parse_table(b"date,E0,Newbie\n2025-01-01,m,a\n2026-06-01,a,m\n").unwrap();

    let result = import_table(
        &store,
        &directory,
        &Default::default(),
        &config(),
        "north",
        &table,
        true,
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::RosterError(RosterError::TooManyDays(_, 366)))
    ));
    assert_eq!(directory.len(), 1);
}

