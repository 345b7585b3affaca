mod common;

use common::{t, Fixture, FIVE_MIN, ONE_HOUR, ONE_MIN};
use tfstore::asset::{AssetConfig, Checkpoint};
use tfstore::record::DataType;
use tfstore::Timeframe;

fn mark_base(fx: &Fixture, checkpoint: Option<u64>, consistent: bool) {
    fx.registry
        .set(
            "btc",
            ONE_MIN,
            Checkpoint {
                time: checkpoint.map(t),
                consistent,
            },
        )
        .expect("checkpoint");
}

#[test]
fn timeframe_without_data_is_stale() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60, 120]);
    mark_base(&fx, Some(120), true);

    assert!(!fx.reader().is_timeframe_index_up_to_date(FIVE_MIN).expect("check"));
}

#[test]
fn open_bucket_is_tolerated() {
    let fx = Fixture::btc();
    // Base has data through 540s; the 5m bucket starting at 300 is still open.
    fx.put_all(ONE_MIN, (0..10).map(|i| i * 60));
    fx.put_all(FIVE_MIN, [0, 300]);
    mark_base(&fx, Some(480), true);

    assert!(fx.reader().is_timeframe_index_up_to_date(FIVE_MIN).expect("check"));
}

#[test]
fn bucket_closing_exactly_at_frontier_is_stale() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, (0..=10).map(|i| i * 60));
    fx.put_all(FIVE_MIN, [0, 300]);
    mark_base(&fx, None, true);

    // frontier = 600 = 300 + 5m: the bucket [300, 600) is closed.
    assert!(!fx.reader().is_timeframe_index_up_to_date(FIVE_MIN).expect("check"));

    fx.put(FIVE_MIN, 600);
    assert!(fx.reader().is_timeframe_index_up_to_date(FIVE_MIN).expect("check"));
}

#[test]
fn checkpoint_ahead_of_base_data_moves_the_frontier() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60]);
    fx.put_all(FIVE_MIN, [0]);

    mark_base(&fx, None, true);
    assert!(fx.reader().is_timeframe_index_up_to_date(FIVE_MIN).expect("check"));

    mark_base(&fx, Some(900), true);
    assert!(!fx.reader().is_timeframe_index_up_to_date(FIVE_MIN).expect("check"));
}

#[test]
fn inconsistent_base_plans_nothing() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, (0..120).map(|i| i * 60));
    mark_base(&fx, Some(7_140), false);

    let plan = fx.reader().get_timeframe_to_reindex().expect("plan");
    assert!(plan.is_empty());
}

#[test]
fn unknown_base_consistency_plans_nothing() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, [0, 60]);
    assert!(fx.reader().get_timeframe_to_reindex().expect("plan").is_empty());
}

#[test]
fn plan_follows_registration_order() {
    let fifteen = Timeframe::from_mins(15);
    let fx = Fixture::new(
        AssetConfig::new("btc", DataType::Point).with_timeframes([ONE_HOUR, FIVE_MIN, fifteen]),
    );
    fx.put_all(ONE_MIN, (0..=120).map(|i| i * 60));
    fx.put_all(FIVE_MIN, (0..=24).map(|i| i * 300));
    fx.put_all(fifteen, [0]);
    mark_base(&fx, Some(7_200), true);

    let plan = fx.reader().get_timeframe_to_reindex().expect("plan");
    assert_eq!(plan, vec![ONE_HOUR, fifteen]);
}

#[test]
fn nothing_to_reindex_when_caught_up() {
    let fx = Fixture::btc();
    fx.put_all(ONE_MIN, (0..=60).map(|i| i * 60));
    fx.put_all(FIVE_MIN, (0..=12).map(|i| i * 300));
    fx.put_all(ONE_HOUR, [0, 3_600]);
    mark_base(&fx, Some(3_600), true);

    assert!(fx.reader().get_timeframe_to_reindex().expect("plan").is_empty());
}
