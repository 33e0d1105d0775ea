//! Domain vocabulary shared between the form menu controller and its hosts.

pub mod domain;
pub mod error;

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
