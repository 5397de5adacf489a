//! Integration test suite modules

mod blocked;
mod fallback;
mod idempotency;
mod scenarios;
