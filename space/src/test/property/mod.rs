//! Property-based tests for predicates and configuration resolution.
//!
//! Uses proptest to compare the resolver against brute-force filtering of
//! randomly generated small spaces.

mod resolver_props;
