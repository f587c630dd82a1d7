//! Integration tests for voxim crates.
//!
//! This crate contains end-to-end tests that exercise the type-erased
//! `Image` facade against the typed stores underneath it: value
//! semantics, copy-on-write accounting, typed access contracts and the
//! physical-space round trips.
