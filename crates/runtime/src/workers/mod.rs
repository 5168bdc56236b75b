//! Background workers driven by the runtime.
//!
//! Workers are crate-internal; clients talk to them through
//! [`crate::RuntimeHandle`].

mod bridge;
mod scheduler;

pub(crate) use bridge::{ChannelInput, PublishingObserver};
pub(crate) use scheduler::{Command, SchedulerWorker};
