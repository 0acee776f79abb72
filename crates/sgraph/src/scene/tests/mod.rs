//! Scenario tests spanning several scene modules

mod clone_integration;
