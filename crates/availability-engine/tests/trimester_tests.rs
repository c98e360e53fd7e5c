//! Tests for month → trimester resolution.

use availability_engine::{resolve_trimester, AvailabilityError, Trimester, TrimesterCalendar};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn default_calendar_partitions_twelve_months() {
    let calendar = TrimesterCalendar::default();
    let resolved: Vec<Trimester> = (1..=12).map(|m| calendar.resolve(date(2026, m, 15))).collect();

    use Trimester::*;
    assert_eq!(
        resolved,
        vec![
            Spring, Spring, Spring, Spring, // Jan-Apr
            Summer, Summer, Summer, Summer, // May-Aug
            Fall, Fall, Fall, Fall, // Sep-Dec
        ]
    );
}

#[test]
fn every_trimester_is_non_empty() {
    let calendar = TrimesterCalendar::default();
    for trimester in Trimester::ALL {
        assert!(
            (1..=12).any(|m| calendar.resolve_month(m) == trimester),
            "{} has no months",
            trimester
        );
    }
}

#[test]
fn year_and_day_are_irrelevant() {
    assert_eq!(resolve_trimester(date(1999, 10, 1)), Trimester::Fall);
    assert_eq!(resolve_trimester(date(2040, 10, 31)), Trimester::Fall);
    assert_eq!(resolve_trimester(date(2024, 2, 29)), Trimester::Spring);
}

#[test]
fn custom_cutovers_move_boundaries() {
    let calendar = TrimesterCalendar::new(6, 8).unwrap();
    assert_eq!(calendar.resolve(date(2026, 5, 31)), Trimester::Spring);
    assert_eq!(calendar.resolve(date(2026, 6, 1)), Trimester::Summer);
    assert_eq!(calendar.resolve(date(2026, 7, 31)), Trimester::Summer);
    assert_eq!(calendar.resolve(date(2026, 8, 1)), Trimester::Fall);
}

#[test]
fn invalid_cutovers_are_rejected() {
    for (summer, fall) in [(1, 9), (9, 5), (5, 5), (5, 13), (0, 0)] {
        assert!(
            matches!(
                TrimesterCalendar::new(summer, fall),
                Err(AvailabilityError::InvalidConfig(_))
            ),
            "({}, {}) should be rejected",
            summer,
            fall
        );
    }
}

#[test]
fn trimester_names_parse_and_display() {
    assert_eq!("Fall".parse::<Trimester>().unwrap(), Trimester::Fall);
    assert_eq!(" summer ".parse::<Trimester>().unwrap(), Trimester::Summer);
    assert!("winter".parse::<Trimester>().is_err());
    assert_eq!(Trimester::Spring.to_string(), "spring");
}
