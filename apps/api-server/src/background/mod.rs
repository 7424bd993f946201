//! Background jobs.

mod scheduler;

pub use scheduler::{Scheduler, SchedulerConfig, purge_expired_sessions, start_session_purge};
