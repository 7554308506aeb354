// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each domain area has its own subdirectory with:
// - Value objects
// - Events
// - Commands
// - Errors
// - Aggregate implementation
//
// This layer is completely separate from the actor and HTTP plumbing.
//
// ============================================================================

pub mod order;
