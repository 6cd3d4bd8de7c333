//! Operator CLI for imagerank: record views, read counters and print the
//! most-viewed ranking against the configured Redis store.

#![allow(missing_docs)]

pub mod cli;
