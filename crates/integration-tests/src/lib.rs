//! Integration test support for the Arana storefront.
//!
//! The actual tests live in `tests/` and run against a live storefront
//! (and its shop backend); they are `#[ignore]`d by default.
