//! Generic off-thread worker harness.
//!
//! A worker owns one thread that runs a job function for every request
//! received over a channel and pushes results onto a response channel. The
//! session polls responses without blocking. There is no cancellation:
//! superseded requests still run to completion and their responses are
//! dropped by version checks on the session side.

use codedock_core::SessionError;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often the worker thread re-checks the running flag while idle.
const IDLE_POLL: Duration = Duration::from_millis(10);

/// A worker thread processing requests of type `Req` into responses of
/// type `Resp`.
pub struct Worker<Req, Resp> {
    request_tx: Sender<Req>,
    response_rx: Receiver<Resp>,
    running: Arc<AtomicBool>,
}

impl<Req: Send + 'static, Resp: Send + 'static> Worker<Req, Resp> {
    /// Spawns a worker thread running `job` for every posted request.
    /// A job returning `None` produces no response (best-effort work).
    pub fn spawn<F>(name: &str, mut job: F) -> Self
    where
        F: FnMut(Req) -> Option<Resp> + Send + 'static,
    {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<Req>();
        let (response_tx, response_rx) = crossbeam_channel::unbounded::<Resp>();
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = running.clone();

        let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
            while thread_running.load(Ordering::SeqCst) {
                match request_rx.recv_timeout(IDLE_POLL) {
                    Ok(request) => {
                        if let Some(response) = job(request) {
                            if response_tx.send(response).is_err() {
                                break;
                            }
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        if let Err(e) = spawned {
            log::error!("failed to spawn worker thread: {}", e);
            running.store(false, Ordering::SeqCst);
        }

        Self {
            request_tx,
            response_rx,
            running,
        }
    }

    /// Posts a request. Fails when the worker has been terminated.
    pub fn post(&self, request: Req) -> Result<(), SessionError> {
        if !self.is_running() {
            return Err(SessionError::WorkerUnavailable);
        }
        self.request_tx
            .send(request)
            .map_err(|_| SessionError::WorkerUnavailable)
    }

    /// Tries to receive a response (non-blocking).
    pub fn try_recv(&self) -> Option<Resp> {
        self.response_rx.try_recv().ok()
    }

    /// Returns whether the worker thread is running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Terminates the worker. Idempotent; in-flight work finishes but no
    /// further requests are accepted.
    pub fn terminate(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

impl<Req, Resp> Drop for Worker<Req, Resp> {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn recv_with_timeout<Req, Resp>(worker: &Worker<Req, Resp>) -> Option<Resp>
    where
        Req: Send + 'static,
        Resp: Send + 'static,
    {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(resp) = worker.try_recv() {
                return Some(resp);
            }
            thread::sleep(Duration::from_millis(2));
        }
        None
    }

    #[test]
    fn test_job_runs_per_request() {
        let worker = Worker::spawn("double", |n: u32| Some(n * 2));

        worker.post(21).unwrap();
        assert_eq!(recv_with_timeout(&worker), Some(42));
    }

    #[test]
    fn test_none_result_produces_no_response() {
        let worker = Worker::spawn("evens", |n: u32| if n % 2 == 0 { Some(n) } else { None });

        worker.post(3).unwrap();
        worker.post(4).unwrap();
        // The odd request is swallowed; only the even one comes back.
        assert_eq!(recv_with_timeout(&worker), Some(4));
        assert!(worker.try_recv().is_none());
    }

    #[test]
    fn test_post_after_terminate_fails() {
        let worker: Worker<u32, u32> = Worker::spawn("noop", Some);

        worker.terminate();
        worker.terminate(); // idempotent
        assert!(!worker.is_running());
        assert!(matches!(
            worker.post(1),
            Err(SessionError::WorkerUnavailable)
        ));
    }
}
