//! Unit tests for perf module.

use refboard::perf::{OperationStats, PerfStats, ScopedTimer, measure, measure_and_log};
use std::time::Duration;

#[test]
fn test_measure_returns_value_and_time() {
    let (value, elapsed) = measure(|| {
        std::thread::sleep(Duration::from_millis(2));
        7
    });
    assert_eq!(value, 7);
    assert!(elapsed >= 1.0);
}

#[test]
fn test_measure_and_log_passes_result_through() {
    let result: Result<u8, String> = measure_and_log("noop", 1_000.0, || Ok(3));
    assert_eq!(result, Ok(3));
}

#[test]
fn test_operation_stats() {
    let mut stats = OperationStats::default();
    stats.record(2.0);
    stats.record(4.0);
    assert_eq!(stats.count(), 2);
    assert_eq!(stats.average(), 3.0);
    assert_eq!(stats.max_ms(), 4.0);
}

#[test]
fn test_perf_stats_by_name() {
    let mut perf = PerfStats::new();
    perf.record("board_save", 10.0);
    perf.record("board_save", 20.0);
    perf.record("decode", 1.0);
    assert_eq!(perf.get("board_save").map(|s| s.count()), Some(2));
    assert!(perf.get("board_load").is_none());
    perf.reset();
    assert!(perf.get("decode").is_none());
}

#[test]
fn test_scoped_timer_elapsed() {
    let timer = ScopedTimer::new("test_scope", 10_000.0);
    std::thread::sleep(Duration::from_millis(1));
    assert!(timer.elapsed_ms() > 0.0);
    assert_eq!(timer.name(), "test_scope");
}
