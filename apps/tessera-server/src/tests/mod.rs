//! Handler-level tests against a real in-memory SQLite store.

mod admin;
mod common;
mod probes;
