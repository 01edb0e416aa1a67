pub mod core;
pub mod permissions;

// Sandbox configuration and network allowlists
pub mod config;
pub mod network;

// Execution boundary and the skill adapter built on it
pub mod adapter;
pub mod interpreter;

// Audit trail for audited executions
pub mod audit;

// Optional components
pub mod logging;
