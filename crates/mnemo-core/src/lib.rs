//! Business logic and repository trait definitions for mnemo.
//!
//! This crate defines the "ports" (repository traits, the provider trait)
//! that the infrastructure layer implements, plus the agent loop, context
//! management, skills, and the built-in tools. It depends only on
//! `mnemo-types` -- never on `mnemo-infra` or any HTTP/filesystem store.

pub mod agent;
pub mod llm;
pub mod memory;
pub mod repository;
pub mod skill;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;
