//! Tests for the window replace/clear/query store.

use availability_engine::{
    AvailabilityError, AvailabilityInterval, AvailabilityRecord, Owner, OwnerRef,
    WindowReplaceStore,
};
use chrono::{DateTime, Utc};

const X: Owner = Owner::Tutor(7);
const Y: Owner = Owner::Counselor(7);

fn t(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn iv(owner: Owner, start: &str, end: &str) -> AvailabilityInterval {
    AvailabilityInterval::new(owner, t(start), t(end), None).unwrap()
}

fn everything(store: &WindowReplaceStore, owner: Owner) -> Vec<AvailabilityInterval> {
    store.query(owner, DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
}

/// Store with X on Sun, Tue and Thu, and Y on Tue.
fn seeded() -> WindowReplaceStore {
    let mut store = WindowReplaceStore::new();
    store
        .replace(
            X,
            t("2026-10-11T00:00:00Z"),
            t("2026-10-16T00:00:00Z"),
            vec![
                iv(X, "2026-10-11T09:00:00Z", "2026-10-11T10:00:00Z"),
                iv(X, "2026-10-13T09:00:00Z", "2026-10-13T10:00:00Z"),
                iv(X, "2026-10-15T09:00:00Z", "2026-10-15T10:00:00Z"),
            ],
        )
        .unwrap();
    store
        .replace(
            Y,
            t("2026-10-13T00:00:00Z"),
            t("2026-10-14T00:00:00Z"),
            vec![iv(Y, "2026-10-13T09:00:00Z", "2026-10-13T10:00:00Z")],
        )
        .unwrap();
    store
}

#[test]
fn replace_preserves_other_owners_and_outside_intervals() {
    let mut store = seeded();
    let y_before = everything(&store, Y);

    // Window Mon 00:00 .. Wed 23:59
    store
        .replace(
            X,
            t("2026-10-12T00:00:00Z"),
            t("2026-10-14T23:59:00Z"),
            vec![iv(X, "2026-10-12T14:00:00Z", "2026-10-12T16:00:00Z")],
        )
        .unwrap();

    assert_eq!(everything(&store, Y), y_before, "owner Y must be untouched");
    assert_eq!(
        everything(&store, X),
        vec![
            iv(X, "2026-10-11T09:00:00Z", "2026-10-11T10:00:00Z"),
            iv(X, "2026-10-12T14:00:00Z", "2026-10-12T16:00:00Z"),
            iv(X, "2026-10-15T09:00:00Z", "2026-10-15T10:00:00Z"),
        ]
    );
}

#[test]
fn replace_merges_new_intervals() {
    let mut store = WindowReplaceStore::new();
    store
        .replace(
            X,
            t("2026-10-12T00:00:00Z"),
            t("2026-10-13T00:00:00Z"),
            vec![
                iv(X, "2026-10-12T11:00:00Z", "2026-10-12T12:00:00Z"),
                iv(X, "2026-10-12T10:00:00Z", "2026-10-12T11:00:00Z"),
            ],
        )
        .unwrap();

    assert_eq!(
        everything(&store, X),
        vec![iv(X, "2026-10-12T10:00:00Z", "2026-10-12T12:00:00Z")]
    );
}

#[test]
fn replace_rejects_empty_list_without_mutating() {
    let mut store = seeded();
    let before = everything(&store, X);

    let result = store.replace(
        X,
        t("2026-10-10T00:00:00Z"),
        t("2026-10-20T00:00:00Z"),
        vec![],
    );

    assert!(matches!(result, Err(AvailabilityError::InvalidReplace(_))));
    assert_eq!(everything(&store, X), before);
}

#[test]
fn replace_rejects_foreign_owner_without_mutating() {
    let mut store = seeded();
    let before = everything(&store, X);

    let result = store.replace(
        X,
        t("2026-10-10T00:00:00Z"),
        t("2026-10-20T00:00:00Z"),
        vec![
            iv(X, "2026-10-12T09:00:00Z", "2026-10-12T10:00:00Z"),
            iv(Y, "2026-10-12T11:00:00Z", "2026-10-12T12:00:00Z"),
        ],
    );

    assert!(matches!(
        result,
        Err(AvailabilityError::InvariantViolation(_))
    ));
    assert_eq!(everything(&store, X), before);
}

#[test]
fn inverted_window_is_rejected() {
    let mut store = seeded();
    let result = store.clear(X, t("2026-10-20T00:00:00Z"), t("2026-10-10T00:00:00Z"));
    assert!(matches!(result, Err(AvailabilityError::InvalidWindow(_))));
    assert_eq!(store.len(), 4);
}

#[test]
fn clear_removes_interval_touching_window_start() {
    let mut store = WindowReplaceStore::new();
    store
        .replace(
            X,
            t("2026-10-12T00:00:00Z"),
            t("2026-10-12T23:00:00Z"),
            vec![iv(X, "2026-10-12T09:00:00Z", "2026-10-12T10:00:00Z")],
        )
        .unwrap();

    // Window starts exactly where the interval ends.
    let removed = store
        .clear(X, t("2026-10-12T10:00:00Z"), t("2026-10-13T00:00:00Z"))
        .unwrap();

    assert_eq!(removed, 1);
    assert!(everything(&store, X).is_empty());
}

#[test]
fn clear_removes_interval_touching_window_end() {
    let mut store = WindowReplaceStore::new();
    store
        .replace(
            X,
            t("2026-10-12T00:00:00Z"),
            t("2026-10-13T00:00:00Z"),
            vec![iv(X, "2026-10-12T18:00:00Z", "2026-10-12T19:00:00Z")],
        )
        .unwrap();

    let removed = store
        .clear(X, t("2026-10-12T12:00:00Z"), t("2026-10-12T18:00:00Z"))
        .unwrap();
    assert_eq!(removed, 1);
}

#[test]
fn clear_keeps_intervals_strictly_outside() {
    let mut store = seeded();

    let removed = store
        .clear(X, t("2026-10-12T00:00:00Z"), t("2026-10-14T00:00:00Z"))
        .unwrap();

    assert_eq!(removed, 1);
    assert_eq!(
        everything(&store, X),
        vec![
            iv(X, "2026-10-11T09:00:00Z", "2026-10-11T10:00:00Z"),
            iv(X, "2026-10-15T09:00:00Z", "2026-10-15T10:00:00Z"),
        ]
    );
    assert_eq!(everything(&store, Y).len(), 1);
}

#[test]
fn clear_for_unknown_owner_is_a_no_op() {
    let mut store = seeded();
    let removed = store
        .clear(
            Owner::Tutor(99),
            t("2026-10-01T00:00:00Z"),
            t("2026-10-31T00:00:00Z"),
        )
        .unwrap();
    assert_eq!(removed, 0);
    assert_eq!(store.len(), 4);
}

#[test]
fn query_returns_overlapping_unmerged() {
    let mut store = WindowReplaceStore::new();
    // Different locations keep these two apart even though they are adjacent.
    store
        .replace(
            X,
            t("2026-10-12T00:00:00Z"),
            t("2026-10-13T00:00:00Z"),
            vec![
                AvailabilityInterval::new(
                    X,
                    t("2026-10-12T09:00:00Z"),
                    t("2026-10-12T10:00:00Z"),
                    Some(1),
                )
                .unwrap(),
                AvailabilityInterval::new(
                    X,
                    t("2026-10-12T10:00:00Z"),
                    t("2026-10-12T11:00:00Z"),
                    Some(2),
                )
                .unwrap(),
            ],
        )
        .unwrap();

    let found = store.query(X, t("2026-10-12T09:30:00Z"), t("2026-10-12T10:30:00Z"));
    assert_eq!(found.len(), 2);
    assert!(store
        .query(X, t("2026-10-12T12:00:00Z"), t("2026-10-12T13:00:00Z"))
        .is_empty());
}

#[test]
fn ingest_rejects_record_with_both_owners() {
    let mut store = seeded();
    let before = everything(&store, X);

    let records = vec![AvailabilityRecord {
        id: Some(1),
        slug: None,
        owner: OwnerRef {
            tutor: Some(7),
            counselor: Some(7),
        },
        start: t("2026-10-12T09:00:00Z"),
        end: t("2026-10-12T10:00:00Z"),
        location: None,
    }];
    let result = store.ingest(X, t("2026-10-10T00:00:00Z"), t("2026-10-20T00:00:00Z"), records);

    assert!(matches!(
        result,
        Err(AvailabilityError::InvariantViolation(_))
    ));
    assert_eq!(everything(&store, X), before);
}

#[test]
fn ingest_empty_clears_window() {
    let mut store = seeded();
    let stored = store
        .ingest(
            X,
            t("2026-10-10T00:00:00Z"),
            t("2026-10-20T00:00:00Z"),
            vec![],
        )
        .unwrap();
    assert!(stored.is_empty());
    assert!(everything(&store, X).is_empty());
    assert_eq!(everything(&store, Y).len(), 1);
}

#[test]
fn covers_spans_contiguous_intervals_across_locations() {
    let mut store = WindowReplaceStore::new();
    store
        .replace(
            X,
            t("2026-10-12T00:00:00Z"),
            t("2026-10-13T00:00:00Z"),
            vec![
                AvailabilityInterval::new(
                    X,
                    t("2026-10-12T09:00:00Z"),
                    t("2026-10-12T10:00:00Z"),
                    Some(1),
                )
                .unwrap(),
                AvailabilityInterval::new(
                    X,
                    t("2026-10-12T10:00:00Z"),
                    t("2026-10-12T12:00:00Z"),
                    Some(2),
                )
                .unwrap(),
                iv(X, "2026-10-12T13:00:00Z", "2026-10-12T14:00:00Z"),
            ],
        )
        .unwrap();

    assert!(store.covers(X, t("2026-10-12T09:30:00Z"), t("2026-10-12T11:30:00Z")));
    assert!(store.covers(X, t("2026-10-12T13:00:00Z"), t("2026-10-12T14:00:00Z")));
    assert!(!store.covers(X, t("2026-10-12T11:30:00Z"), t("2026-10-12T13:30:00Z")));
    assert!(!store.covers(X, t("2026-10-12T08:30:00Z"), t("2026-10-12T09:30:00Z")));
    assert!(!store.covers(Y, t("2026-10-12T09:30:00Z"), t("2026-10-12T09:45:00Z")));
}
