//! Supervisor runner: pops due jobs from the scheduler and routes them into
//! the ECS. Job delivery happens here, outside the systems: each step pops
//! the next job, inserts it as [CurrentJob], then runs the schedule.

use bevy_ecs::prelude::{Schedule, World};

use crate::clock::{CurrentJob, JobScheduler};
use crate::systems::{negotiation_timeout_system, search_timeout_system};

/// Builds the supervisor schedule: every recovery system. Systems check the
/// current job's kind themselves, so unrelated jobs fall through.
pub fn supervisor_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems((search_timeout_system, negotiation_timeout_system));
    schedule
}

/// Runs one supervisor step: pops the next job, inserts it as [CurrentJob],
/// then runs the schedule. Returns `false` when no job was pending.
pub fn run_next_job(world: &mut World, schedule: &mut Schedule) -> bool {
    let job = match world.resource_mut::<JobScheduler>().pop_next() {
        Some(job) => job,
        None => return false,
    };
    world.insert_resource(CurrentJob(job));
    schedule.run(world);
    true
}

/// Drains the job queue (new jobs scheduled by handlers included) until it is
/// empty or `max_steps` is reached. Returns the number of jobs executed.
pub fn run_until_idle(world: &mut World, schedule: &mut Schedule, max_steps: usize) -> usize {
    let mut steps = 0;
    while steps < max_steps && run_next_job(world, schedule) {
        steps += 1;
    }
    steps
}
