//! Scenario tests that run the engines together the way the binary does.

mod calendar_tests;
mod cli_tests;
