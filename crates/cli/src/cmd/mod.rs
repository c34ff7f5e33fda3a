mod generate;
mod rules;

pub use generate::{GenerateArgs, cmd_generate};
pub use rules::cmd_rules;
