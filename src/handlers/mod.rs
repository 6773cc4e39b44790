//! Front-end entry points: one-shot run and the interactive workspace.

pub mod edit;
pub mod run;
