//! Automation pipeline: readiness polling, remote target actions and the
//! single-flight job queue that drives them.

pub mod cdp;
mod config;
mod error;
mod job;
pub mod poller;
mod queue;
mod selectors;
mod target;

#[cfg(test)]
mod fakes;

pub use config::AutomationSettings;
pub use error::AutomationError;
pub use job::{JobExecutor, JobReport, JobRunner, JobStep};
pub use poller::{PollOutcome, PollPolicy, wait_until};
pub use queue::{AutomationQueue, QueueEvent, QueueSnapshot, QueueState, Submission};
pub use selectors::SelectorSet;
pub use target::{ActionResult, Intent, Probe, RemoteTarget, TargetProvider, TargetSpec};
