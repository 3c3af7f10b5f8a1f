//! Background image decoding.
//!
//! Decoding a large file can take long enough to stall the interaction
//! loop, so drops and pastes can be handed to a small worker pool. Workers
//! never see the document: they read and decode a [`DropPayload`] and post
//! the result back on a channel. The interaction thread collects results
//! with [`DecodeQueue::drain`] and inserts them itself.
//!
//! Every submission gets a [`DecodeTicket`]. Cancelling a ticket discards
//! its result silently, whether the worker has started on it or not.

use crate::asset::{DecodedImage, DropPayload};
use crate::codec::ImageCodec;
use crate::constants::SLOW_DECODE_MS;
use crate::error::ImportError;
use crate::perf::{log_if_slow, measure};
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Handle for one submitted decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DecodeTicket(u64);

/// A finished decode, ready to be turned into an item.
pub struct DecodeCompletion {
    pub ticket: DecodeTicket,
    pub label: String,
    pub result: Result<DecodedImage, ImportError>,
    pub elapsed_ms: f64,
}

struct Job {
    ticket: DecodeTicket,
    payload: DropPayload,
}

pub struct DecodeQueue {
    job_tx: Option<Sender<Job>>,
    result_rx: Receiver<DecodeCompletion>,
    workers: Vec<JoinHandle<()>>,
    codec: Arc<dyn ImageCodec>,
    cancelled: Arc<Mutex<HashSet<DecodeTicket>>>,
    pending: HashSet<DecodeTicket>,
    inline_done: VecDeque<DecodeCompletion>,
    next_ticket: u64,
}

impl DecodeQueue {
    /// Start `workers` decode threads. With zero workers, decoding happens
    /// inside `submit` and results are still delivered through `drain`.
    pub fn new(workers: usize, codec: Arc<dyn ImageCodec>) -> Self {
        let (job_tx, job_rx) = mpsc::channel::<Job>();
        let (result_tx, result_rx) = mpsc::channel();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let cancelled = Arc::new(Mutex::new(HashSet::new()));

        let mut handles = Vec::with_capacity(workers);
        for i in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let result_tx = result_tx.clone();
            let codec = Arc::clone(&codec);
            let cancelled = Arc::clone(&cancelled);
            let spawned = std::thread::Builder::new()
                .name(format!("refboard-decode-{}", i))
                .spawn(move || worker_loop(job_rx, result_tx, codec, cancelled));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!(error = %e, "Failed to start decode worker"),
            }
        }
        debug!(workers = handles.len(), "Decode queue started");

        Self {
            job_tx: (!handles.is_empty()).then_some(job_tx),
            result_rx,
            workers: handles,
            codec,
            cancelled,
            pending: HashSet::new(),
            inline_done: VecDeque::new(),
            next_ticket: 1,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn submit(&mut self, payload: DropPayload) -> DecodeTicket {
        let ticket = DecodeTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending.insert(ticket);

        let job = Job { ticket, payload };
        let job = match &self.job_tx {
            Some(tx) => match tx.send(job) {
                Ok(()) => return ticket,
                // Every worker is gone; fall back to decoding here.
                Err(mpsc::SendError(job)) => job,
            },
            None => job,
        };
        let completion = run_job(job, self.codec.as_ref());
        self.inline_done.push_back(completion);
        ticket
    }

    /// Discard the result of `ticket`. Returns false if it was not pending.
    pub fn cancel(&mut self, ticket: DecodeTicket) -> bool {
        if !self.pending.remove(&ticket) {
            return false;
        }
        let before = self.inline_done.len();
        self.inline_done.retain(|c| c.ticket != ticket);
        if self.inline_done.len() == before {
            self.cancelled.lock().insert(ticket);
        }
        debug!(?ticket, "Decode cancelled");
        true
    }

    pub fn cancel_all(&mut self) {
        let tickets: Vec<DecodeTicket> = self.pending.iter().copied().collect();
        for ticket in tickets {
            self.cancel(ticket);
        }
    }

    pub fn is_pending(&self, ticket: DecodeTicket) -> bool {
        self.pending.contains(&ticket)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Collect every finished decode without blocking.
    pub fn drain(&mut self) -> Vec<DecodeCompletion> {
        let mut done: Vec<DecodeCompletion> = self.inline_done.drain(..).collect();
        while let Ok(completion) = self.result_rx.try_recv() {
            if let Some(completion) = self.accept(completion) {
                done.push(completion);
            }
        }
        for completion in &done {
            self.pending.remove(&completion.ticket);
        }
        done
    }

    /// Block until nothing is pending or `timeout` passes, then return
    /// everything collected.
    pub fn drain_until_idle(&mut self, timeout: Duration) -> Vec<DecodeCompletion> {
        let deadline = Instant::now() + timeout;
        let mut done = self.drain();
        while self.has_pending() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.result_rx.recv_timeout(remaining) {
                Ok(completion) => {
                    if let Some(completion) = self.accept(completion) {
                        self.pending.remove(&completion.ticket);
                        done.push(completion);
                    }
                }
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        done
    }

    fn accept(&mut self, completion: DecodeCompletion) -> Option<DecodeCompletion> {
        if self.cancelled.lock().remove(&completion.ticket) {
            return None;
        }
        self.pending.contains(&completion.ticket).then_some(completion)
    }
}

impl Drop for DecodeQueue {
    fn drop(&mut self) {
        self.job_tx.take();
        self.cancelled.lock().clear();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("Decode worker panicked");
            }
        }
    }
}

fn worker_loop(
    jobs: Arc<Mutex<Receiver<Job>>>,
    results: Sender<DecodeCompletion>,
    codec: Arc<dyn ImageCodec>,
    cancelled: Arc<Mutex<HashSet<DecodeTicket>>>,
) {
    loop {
        let job = jobs.lock().recv();
        let Ok(job) = job else {
            break;
        };
        if cancelled.lock().remove(&job.ticket) {
            continue;
        }
        if results.send(run_job(job, codec.as_ref())).is_err() {
            break;
        }
    }
}

fn run_job(job: Job, codec: &dyn ImageCodec) -> DecodeCompletion {
    let label = job.payload.label();
    let (result, elapsed_ms) = measure(|| DecodedImage::from_payload(job.payload, codec));
    log_if_slow("decode", elapsed_ms, SLOW_DECODE_MS);
    debug!(
        ticket = ?job.ticket,
        source = %label,
        ok = result.is_ok(),
        elapsed_ms = format!("{:.2}", elapsed_ms),
        "Decode finished"
    );
    DecodeCompletion {
        ticket: job.ticket,
        label,
        result,
        elapsed_ms,
    }
}
