// ─────────────────────────────────────────────────────────────────────
// PRad Trace — Core Types
// Charged-particle tracing for synthetic proton radiography.
// License: MIT
// ─────────────────────────────────────────────────────────────────────
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod vector;
