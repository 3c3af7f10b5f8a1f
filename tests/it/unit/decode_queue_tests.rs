//! Unit tests for the background decode queue.

use crate::helpers::{corrupt_png, png_bytes};
use refboard::decode_queue::{DecodeCompletion, DecodeQueue};
use refboard::{DropPayload, ImageCrateCodec};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Poll `drain` until `count` completions arrived or `timeout` passed.
/// Much faster than sleeping: returns as soon as the results are in.
fn wait_for_completions(queue: &mut DecodeQueue, count: usize, timeout: Duration) -> Vec<DecodeCompletion> {
    let start = Instant::now();
    let mut done = Vec::new();
    while start.elapsed() < timeout && done.len() < count {
        done.extend(queue.drain());
        std::thread::yield_now();
    }
    done
}

#[test]
fn test_queue_creation() {
    let queue = DecodeQueue::new(2, Arc::new(ImageCrateCodec));
    assert_eq!(queue.worker_count(), 2);
    assert!(!queue.has_pending());
    assert_eq!(queue.pending_count(), 0);
}

#[test]
fn test_background_decode_completes() {
    let mut queue = DecodeQueue::new(1, Arc::new(ImageCrateCodec));
    let ticket = queue.submit(DropPayload::bytes(png_bytes(5, 5), Some("image/png")));
    assert!(queue.is_pending(ticket));

    let done = wait_for_completions(&mut queue, 1, Duration::from_secs(5));
    assert_eq!(done.len(), 1, "decode should have completed");
    assert_eq!(done[0].ticket, ticket);
    assert_eq!(done[0].label, "pasted image/png");
    assert!(done[0].result.is_ok());
    assert!(!queue.is_pending(ticket));
}

#[test]
fn test_failures_are_isolated() {
    let mut queue = DecodeQueue::new(2, Arc::new(ImageCrateCodec));
    let tickets = [
        queue.submit(DropPayload::bytes(png_bytes(2, 2), None)),
        queue.submit(DropPayload::bytes(corrupt_png(), None)),
        queue.submit(DropPayload::bytes(png_bytes(3, 3), None)),
    ];
    let done = queue.drain_until_idle(Duration::from_secs(5));
    assert_eq!(done.len(), 3);
    let ok: Vec<_> = tickets
        .iter()
        .map(|t| done.iter().find(|c| c.ticket == *t).unwrap().result.is_ok())
        .collect();
    assert_eq!(ok, vec![true, false, true]);
}

#[test]
fn test_cancelled_ticket_never_delivered() {
    let mut queue = DecodeQueue::new(1, Arc::new(ImageCrateCodec));
    let keep = queue.submit(DropPayload::bytes(png_bytes(2, 2), None));
    let dropped = queue.submit(DropPayload::bytes(png_bytes(3, 3), None));
    assert!(queue.cancel(dropped));
    assert!(!queue.is_pending(dropped));

    let done = queue.drain_until_idle(Duration::from_secs(5));
    assert!(done.iter().all(|c| c.ticket != dropped));
    assert!(done.iter().any(|c| c.ticket == keep));
}

#[test]
fn test_cancel_all_then_drop_joins_workers() {
    let mut queue = DecodeQueue::new(2, Arc::new(ImageCrateCodec));
    for _ in 0..4 {
        queue.submit(DropPayload::bytes(png_bytes(16, 16), None));
    }
    queue.cancel_all();
    assert_eq!(queue.pending_count(), 0);
    assert!(queue.drain_until_idle(Duration::from_millis(200)).is_empty());
    drop(queue);
}
