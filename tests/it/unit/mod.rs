//! Unit tests for refboard.

mod codec_tests;
mod decode_queue_tests;
mod hit_testing_tests;
mod perf_tests;
mod placement_tests;
mod snapshot_tests;
mod zorder_tests;
