mod common;

use common::{secs, t, Fixture, FIVE_MIN, ONE_MIN};
use tfstore::storage::CursorOptions;
use tfstore::{Error, Timeframe};

#[test]
fn one_minute_range_excludes_upper_bound() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60, 120, 180]);

    let list = fx
        .reader()
        .get_in_data_range(t(0), t(180), ONE_MIN, None, None, false)
        .expect("range");
    assert_eq!(secs(&list), [0, 60, 120]);
}

#[test]
fn range_matches_brute_force_filter() {
    let fx = Fixture::btc();
    let times: Vec<u64> = (0..40).map(|i| i * 60).collect();
    fx.put_all(ONE_MIN, times.iter().copied());
    // Neighbouring series must never leak into a 1m range.
    fx.put_all(FIVE_MIN, [0, 300, 600]);

    let reader = fx.reader();
    for t0 in (0..2_500).step_by(170) {
        for t1 in (t0..2_600).step_by(230) {
            let list = reader
                .get_in_data_range(t(t0), t(t1), ONE_MIN, None, None, false)
                .expect("range");
            let expected: Vec<u64> = times
                .iter()
                .copied()
                .filter(|s| *s >= t0 && *s < t1)
                .collect();
            assert_eq!(secs(&list), expected, "range [{t0}, {t1})");
        }
    }
}

#[test]
fn reversed_range_fails() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60]);
    let err = fx
        .reader()
        .get_in_data_range(t(120), t(60), ONE_MIN, None, None, false)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRange { .. }));
}

#[test]
fn unlabelled_timeframe_fails() {
    let fx = Fixture::btc();
    let err = fx
        .reader()
        .get_in_data_range(t(0), t(60), Timeframe::from_secs(0), None, None, false)
        .unwrap_err();
    assert!(matches!(err, Error::UnknownTimeframe(_)));
}

#[test]
fn shared_snapshot_isolates_reads_from_writers() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60]);
    let reader = fx.reader();

    let txn = reader.snapshot().expect("snapshot");
    fx.put(ONE_MIN, 120);

    let pinned = reader
        .get_in_data_range(t(0), t(600), ONE_MIN, Some(txn.as_ref()), None, false)
        .expect("pinned");
    assert_eq!(secs(&pinned), [0, 60]);

    let fresh = reader
        .get_in_data_range(t(0), t(600), ONE_MIN, None, None, false)
        .expect("fresh");
    assert_eq!(secs(&fresh), [0, 60, 120]);
}

#[test]
fn shared_cursor_serves_consecutive_ranges() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60, 120, 180, 240]);
    let reader = fx.reader();

    let txn = reader.snapshot().expect("snapshot");
    let mut cursor = txn.cursor(CursorOptions::forward());

    let first = reader
        .get_in_data_range(t(0), t(120), ONE_MIN, Some(txn.as_ref()), Some(cursor.as_mut()), false)
        .expect("first");
    let second = reader
        .get_in_data_range(t(120), t(300), ONE_MIN, Some(txn.as_ref()), Some(cursor.as_mut()), false)
        .expect("second");

    assert_eq!(secs(&first), [0, 60]);
    assert_eq!(secs(&second), [120, 180, 240]);
}

#[test]
fn repeated_reads_are_identical() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, (0..10).map(|i| i * 60));
    let reader = fx.reader();

    let a = reader
        .get_in_data_range(t(60), t(420), ONE_MIN, None, None, false)
        .expect("a");
    let b = reader
        .get_in_data_range(t(60), t(420), ONE_MIN, None, None, false)
        .expect("b");
    assert_eq!(a, b);
}

#[test]
fn corrupt_key_under_prefix_is_fatal() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0]);
    let mut key = fx.state.codec().encode("1m", t(60));
    key.push(0);
    fx.store.put(key, vec![0; 8]).expect("put");

    let err = fx
        .reader()
        .get_in_data_range(t(0), t(120), ONE_MIN, None, None, false)
        .unwrap_err();
    assert!(matches!(err, Error::MalformedKey(_)));
}
