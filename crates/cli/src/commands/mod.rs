pub mod agents;
pub mod files;
pub mod prompts;
