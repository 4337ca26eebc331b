//! Interactive chat loop for mnemo.
//!
//! Reads lines with an async readline, dispatches slash commands, and runs
//! everything else as a conversation turn. Entry point:
//! `loop_runner::run_chat_loop`.

pub mod banner;
pub mod commands;
pub mod input;
pub mod loop_runner;
