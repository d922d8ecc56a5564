//! Integration tests for the ergodicity simulation engine
//!
//! Tests are organized by topic:
//! - `recurrence` - Leveraged wealth recurrence properties
//! - `ensemble` - Synthetic multi-trial runs and aggregation
//! - `market` - Runs over historical price series
//! - `builder_dsl` - Builder DSL for fluent configuration

mod recurrence;
