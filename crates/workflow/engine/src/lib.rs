//! Workflow engine for association management
//!
//! - [`step_builder`]: structural editing of a workflow's step tree
//! - [`condition_evaluator`] and [`execution_planner`]: branch selection
//!   against a data record
//! - [`approval_gate`] and [`approval_service`]: multi-party approval
//!   gating, with optimistic concurrency on every decision
//! - [`store`]: async persistence seam, with an in-memory implementation
//!
//! Configuration is layered through the `config` crate ([`config`]);
//! logging goes through `tracing` ([`telemetry`]).

#![deny(unsafe_code)]

pub mod approval_gate;
pub mod approval_service;
pub mod condition_evaluator;
pub mod config;
pub mod execution_planner;
pub mod memory_store;
pub mod permissions;
pub mod step_builder;
pub mod store;
pub mod telemetry;

pub use approval_gate::{
    ApprovalGate, ApproverRelation, Authorization, DecisionOutcome, Denial, Grant,
};
pub use approval_service::{ApprovalService, DecisionRequest, PendingApproval};
pub use condition_evaluator::ConditionEvaluator;
pub use config::{ApprovalSettings, EngineConfig, LoggingConfig};
pub use execution_planner::{ExecutionPlan, ExecutionPlanner};
pub use memory_store::InMemoryWorkflowStore;
pub use permissions::{DenyAll, PermissionService, RolePermissions};
pub use step_builder::{MoveDirection, StepBuilder};
pub use store::WorkflowStore;
pub use telemetry::init_tracing;
