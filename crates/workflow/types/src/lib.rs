//! Workflow Domain Types
//!
//! A workflow is an ordered sequence of typed steps. Order is execution
//! order. Every step is one of four variants:
//!
//! - **Trigger**: what starts the workflow (a schedule, an event, a
//!   manual button).
//! - **Action**: something the system does (send an email, open a task,
//!   call an API, update a record).
//! - **Condition**: a test against a data record that selects one of two
//!   owned branches (`trueSteps` / `falseSteps`).
//! - **Approval**: a gate that holds the workflow until enough authorized
//!   people have approved.
//!
//! Every variant carries a strongly-typed configuration selected by its
//! sub-type tag, so a config value always has exactly the shape of its
//! sub-type.
//!
//! The structural editing operations live in `workflow-engine`; this crate
//! only defines the vocabulary and its validity rules.

#![deny(unsafe_code)]

mod action;
mod actor;
mod approval;
mod condition;
mod errors;
mod step;
mod trigger;
mod workflow;

pub use action::*;
pub use actor::*;
pub use approval::*;
pub use condition::*;
pub use errors::*;
pub use step::*;
pub use trigger::*;
pub use workflow::*;
