//! Process execution (spec §4.H/§4.I/§4.J): real `fork`/`execvp`/`waitpid`
//! spawning, the job table, and the trap engine.

pub mod jobs;
pub mod process;
pub mod traps;
