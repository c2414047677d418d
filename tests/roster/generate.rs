//! Tests for roster generation through the service layer.

use staff_rota::{
    errors::{AppError, RosterError},
    rota::{
        analyzer::analyze,
        generator::{generate, GeneratorConfig, NIGHT_VIOLATION},
        model::ShiftType,
    },
    services::roster::generate_roster,
    structs::roster::GenerateRequest,
};

use crate::util::{
    memory::MemoryDirectory,
    setup::{config, date, staff},
};

/// Tests that every employee lands in exactly one bucket each day.
///
/// Verifies membership across night-eligible and day-only crews for a full
/// month with a roster larger than the night crew.
///
/// Expected: 31 days, 10 cells per day, buckets partition the roster
#[test]
fn every_employee_in_exactly_one_bucket() {
    let employees = staff("E", 1, 10);
    let schedule = generate(&employees, date(2025, 3, 1), 31, &GeneratorConfig::default()).unwrap();

    assert_eq!(schedule.day_count(), 31);
    for day_index in 0..schedule.day_count() {
        let mut seen: Vec<_> = ShiftType::ALL
            .iter()
            .flat_map(|shift| schedule.bucket(day_index, *shift))
            .map(|e| e.id)
            .collect();
        seen.sort();
        let mut expected: Vec<_> = employees.iter().map(|e| e.id).collect();
        expected.sort();
        assert_eq!(seen, expected);
    }
}

/// Tests the one-night-per-day guarantee of a full night crew.
///
/// Expected: no Strict NT Violation warnings for any length of at least 7 days
#[test]
fn seven_night_crew_covers_every_night() {
    for days in [7, 28, 30, 31, 45] {
        let schedule =
            generate(&staff("E", 1, 7), date(2024, 2, 1), days, &GeneratorConfig::default())
                .unwrap();
        for day in &schedule.days {
            assert_eq!(day.counts().night, 1);
            assert!(day.warnings.iter().all(|w| !w.starts_with(NIGHT_VIOLATION)));
        }
    }
}

/// Tests that generation is deterministic.
///
/// Expected: identical JSON for identical input
#[test]
fn identical_input_gives_identical_output() {
    let employees = staff("E", 1, 9);
    let first = generate(&employees, date(2025, 3, 1), 31, &GeneratorConfig::default()).unwrap();
    let second = generate(&employees, date(2025, 3, 1), 31, &GeneratorConfig::default()).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

/// Tests the fairness of whole weeks.
///
/// Expected: spread 0 whenever the day count is a multiple of 7
#[test]
fn whole_weeks_are_perfectly_fair() {
    for weeks in 1..=5 {
        let schedule = generate(
            &staff("E", 1, 7),
            date(2025, 3, 1),
            weeks * 7,
            &GeneratorConfig::default(),
        )
        .unwrap();
        let stats = analyze(&schedule);
        assert_eq!(stats.max_total - stats.min_total, 0);
        assert!(stats.variance_ok);
    }
}

/// Tests the concrete first week of a seven-person crew.
///
/// Verifies each employee visits all seven cycle positions exactly once.
///
/// Expected: E4 on nights day 0, E3 day 1, ..., each employee 2/2/1/2
#[test]
fn first_week_walks_every_cycle_position() {
    let schedule =
        generate(&staff("E", 1, 7), date(2025, 3, 1), 7, &GeneratorConfig::default()).unwrap();

    let night_names: Vec<_> = (0..7)
        .map(|d| schedule.bucket(d, ShiftType::Night)[0].name.clone())
        .collect();
    assert_eq!(night_names, vec!["E4", "E3", "E2", "E1", "E0", "E6", "E5"]);

    for totals in analyze(&schedule).per_employee {
        assert_eq!(
            (totals.morning, totals.afternoon, totals.night, totals.off),
            (2, 2, 1, 2)
        );
    }
}

/// Tests the two-person day-only crew.
///
/// Expected: offsets 0 and 3 into DAY_CYCLE, never a night
#[test]
fn day_only_pair_never_works_nights() {
    let mut employees = staff("E", 1, 7);
    employees.extend(staff("D", 100, 2));
    let schedule = generate(&employees, date(2025, 3, 1), 7, &GeneratorConfig::default()).unwrap();

    let d0: Vec<_> = schedule.days.iter().map(|day| day.shifts[7]).collect();
    let d1: Vec<_> = schedule.days.iter().map(|day| day.shifts[8]).collect();
    use ShiftType::*;
    assert_eq!(d0, vec![Morning, Morning, Morning, Afternoon, Afternoon, Off, Off]);
    assert_eq!(d1, vec![Afternoon, Afternoon, Off, Off, Morning, Morning, Morning]);
    assert!(!d0.contains(&Night) && !d1.contains(&Night));
}

/// Tests that the service pulls the branch roster from the directory.
///
/// Expected: only schedulable employees of the branch are rostered
#[tokio::test]
async fn service_uses_directory_when_no_employees_given() {
    let mut employees = staff("E", 1, 7);
    employees[6].role = "manager".to_string();
    let directory = MemoryDirectory::new("north", employees);

    let response = generate_roster(
        &directory,
        &config(),
        GenerateRequest {
            branch: "north".to_string(),
            start_date: date(2025, 3, 1),
            days: 7,
            employees: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(response.schedule.employees.len(), 6);
    assert_eq!(response.days.len(), 7);
    assert_eq!(response.stats.per_employee.len(), 6);
}

/// Tests that a zero-day request is rejected.
///
/// Expected: error, nothing generated
#[tokio::test]
async fn service_rejects_zero_days() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 7));
    let result = generate_roster(
        &directory,
        &config(),
        GenerateRequest {
            branch: "north".to_string(),
            start_date: date(2025, 3, 1),
            days: 0,
            employees: None,
        },
    )
    .await;

    assert!(result.is_err());
}

/// Tests a request for far more days than one roster may hold.
///
/// Expected: TooManyDays before any day is built
#[tokio::test]
async fn service_rejects_day_count_above_limit() {
    let directory = MemoryDirectory::new("north", staff("E", 1, 7));
    let result = generate_roster(
        &directory,
        &config(),
        GenerateRequest {
            branch: "north".to_string(),
            start_date: date(2025, 3, 1),
            days: 90_000_000,
            employees: None,
        },
    )
    .await;

    assert!(matches!(
        result,
        Err(AppError::RosterError(RosterError::TooManyDays(90_000_000, 366)))
    ));
}

