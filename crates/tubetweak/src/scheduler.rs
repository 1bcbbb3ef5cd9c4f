//! Timers for deferred and periodic jobs.
//!
//! A scheduler never runs a job itself. It only arranges for a
//! [`PageEvent::Timer`] to reach the event loop later, which then runs the
//! job with full access to the app state.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::runtime::PageEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

pub trait Scheduler {
    /// Fire `job` once after `delay`.
    fn after(&self, delay: Duration, job: JobId);

    /// Fire `job` every `period`, first after one full period.
    fn every(&self, period: Duration, job: JobId);
}

/// Sleeps on the tokio timer and posts `Timer` events into the loop channel.
pub struct TokioScheduler {
    tx: mpsc::Sender<PageEvent>,
}

impl TokioScheduler {
    pub fn new(tx: mpsc::Sender<PageEvent>) -> Self {
        Self { tx }
    }
}

impl Scheduler for TokioScheduler {
    fn after(&self, delay: Duration, job: JobId) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(PageEvent::Timer(job)).await.is_err() {
                debug!("{}: event loop gone, dropping timer", job);
            }
        });
    }

    fn every(&self, period: Duration, job: JobId) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.send(PageEvent::Timer(job)).await.is_err() {
                    debug!("{}: event loop gone, stopping interval", job);
                    break;
                }
            }
        });
    }
}

/// One request recorded by [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub job: JobId,
    pub delay: Duration,
    pub repeat: bool,
}

/// Records requests instead of sleeping. The caller decides when a job
/// "fires" by calling `run_job` itself.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    requests: Rc<RefCell<Vec<Scheduled>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything requested so far.
    pub fn take(&self) -> Vec<Scheduled> {
        std::mem::take(&mut *self.requests.borrow_mut())
    }

    pub fn pending(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Scheduler for ManualScheduler {
    fn after(&self, delay: Duration, job: JobId) {
        self.requests.borrow_mut().push(Scheduled {
            job,
            delay,
            repeat: false,
        });
    }

    fn every(&self, period: Duration, job: JobId) {
        self.requests.borrow_mut().push(Scheduled {
            job,
            delay: period,
            repeat: true,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_scheduler_records_and_drains() {
        let sched = ManualScheduler::new();
        let handle = sched.clone();
        sched.after(Duration::from_millis(250), JobId(1));
        sched.every(Duration::from_secs(1), JobId(2));
        assert_eq!(handle.pending(), 2);

        let taken = handle.take();
        assert_eq!(
            taken,
            vec![
                Scheduled {
                    job: JobId(1),
                    delay: Duration::from_millis(250),
                    repeat: false
                },
                Scheduled {
                    job: JobId(2),
                    delay: Duration::from_secs(1),
                    repeat: true
                },
            ]
        );
        assert_eq!(sched.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_after_delay() {
        let (tx, mut rx) = mpsc::channel(8);
        let sched = TokioScheduler::new(tx);
        sched.after(Duration::from_millis(300), JobId(9));

        let start = tokio::time::Instant::now();
        match rx.recv().await {
            Some(PageEvent::Timer(job)) => assert_eq!(job, JobId(9)),
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_interval_skips_immediate_tick() {
        let (tx, mut rx) = mpsc::channel(8);
        let sched = TokioScheduler::new(tx);
        let start = tokio::time::Instant::now();
        sched.every(Duration::from_millis(100), JobId(3));

        for n in 1..=3u64 {
            assert!(matches!(rx.recv().await, Some(PageEvent::Timer(JobId(3)))));
            assert!(start.elapsed() >= Duration::from_millis(100 * n));
        }
    }
}
