//! Skill system: prompt fragments appended to the system prompt when the
//! user's input calls for them.

pub mod registry;

pub use registry::{SkillRegistry, default_skills};
