//! Property-based tests for the search driver.
