//! Delayed-job scheduler backing the timeout supervisor.
//!
//! Jobs are delivered at-least-once and survive independently of the request
//! that scheduled them; handlers must therefore be safe to re-execute. The
//! queue is a min-heap ordered by run time, popped by the runner.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

use crate::session::SessionId;

pub const ONE_SEC_MS: u64 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum JobKind {
    /// Fires ~90s after creation: cancel the session if nobody claimed it.
    SearchTimeout,
    /// Fires ~60s after a claim: unstick a negotiation nobody resolved.
    NegotiationTimeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub run_at: u64,
    pub kind: JobKind,
    pub session: SessionId,
}

impl Ord for Job {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by run time.
        other
            .run_at
            .cmp(&self.run_at)
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| other.session.cmp(&self.session))
    }
}

impl PartialOrd for Job {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The job the runner is currently delivering into the schedule.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentJob(pub Job);

#[derive(Debug, Default, Resource)]
pub struct JobScheduler {
    now: u64,
    jobs: BinaryHeap<Job>,
}

impl JobScheduler {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn schedule_at(&mut self, run_at: u64, kind: JobKind, session: SessionId) {
        debug_assert!(run_at >= self.now, "job run time must be >= current time");
        self.jobs.push(Job {
            run_at,
            kind,
            session,
        });
    }

    pub fn schedule_in_secs(&mut self, delay_secs: u64, kind: JobKind, session: SessionId) {
        self.schedule_at(self.now + delay_secs * ONE_SEC_MS, kind, session);
    }

    /// Pops the next due job and advances the clock to its run time.
    pub fn pop_next(&mut self) -> Option<Job> {
        let job = self.jobs.pop()?;
        self.now = job.run_at;
        Some(job)
    }

    pub fn next_run_time(&self) -> Option<u64> {
        self.jobs.peek().map(|j| j.run_at)
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }
}
