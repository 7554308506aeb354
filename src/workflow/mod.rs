// ============================================================================
// Workflow Core - Generic State Machine Abstractions
// ============================================================================
//
// No order-specific code lives here.
//
// ============================================================================

pub mod aggregate;

pub use aggregate::Aggregate;
