//! Test module for wisp-core
//!
//! Cross-module scenarios:
//! - Calculator behavior in global and keyword mode
//! - Query aggregation, routing and panic isolation
//! - Action publishing and invocation through the registry
//! - History search properties
//! - Configuration loading and launcher settings updates

#![allow(clippy::float_cmp)]

mod config_tests;
