//! Job table (spec §4.I): a fixed, monotonically-numbered table of
//! background/stopped jobs. Reaping happens by polling `waitpid(WNOHANG)` at
//! safe points (prompt display, `wait`, `jobs`) rather than from an async
//! signal handler, which keeps the reaper out of async-signal-safety
//! territory at the cost of not noticing a job's exit the instant it happens.

use crate::exec::process::{try_wait, Pid};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Running,
    Stopped,
    Done(i32),
}

#[derive(Debug, Clone)]
pub struct Job {
    pub id: u32,
    pub pgid: Pid,
    pub pids: Vec<Pid>,
    pub command: String,
    pub status: JobStatus,
}

#[derive(Debug, Default)]
pub struct JobTable {
    jobs: Vec<Job>,
    next_id: u32,
}

impl JobTable {
    pub fn new() -> Self {
        JobTable { jobs: Vec::new(), next_id: 1 }
    }

    pub fn add(&mut self, pgid: Pid, pids: Vec<Pid>, command: String) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.jobs.push(Job { id, pgid, pids, command, status: JobStatus::Running });
        id
    }

    pub fn get(&self, id: u32) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    pub fn last_id(&self) -> Option<u32> {
        self.jobs.iter().filter(|j| j.status == JobStatus::Running).map(|j| j.id).max()
    }

    pub fn list(&self) -> &[Job] {
        &self.jobs
    }

    pub fn last_pid(&self, id: u32) -> Option<Pid> {
        self.get(id).and_then(|j| j.pids.last().copied())
    }

    /// Polls every still-running job's member pids with `WNOHANG`, marking
    /// the job `Done` once all of its pids have been reaped.
    pub fn reap(&mut self) -> Vec<u32> {
        let mut finished = Vec::new();
        for job in self.jobs.iter_mut() {
            if job.status != JobStatus::Running {
                continue;
            }
            let mut last_status = 0;
            let mut all_done = true;
            for pid in &job.pids {
                match try_wait(*pid) {
                    Some(status) => last_status = status,
                    None => all_done = false,
                }
            }
            if all_done {
                job.status = JobStatus::Done(last_status);
                finished.push(job.id);
            }
        }
        finished
    }

    pub fn remove_done(&mut self) {
        self.jobs.retain(|j| !matches!(j.status, JobStatus::Done(_)));
    }
}
