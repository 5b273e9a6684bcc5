//! End to end tests for a deployed authorservice instance.
//! Run with `cargo test --features system_tests` against a running service.
