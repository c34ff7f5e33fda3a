//! Implementation of the `modgraph rules` command.

use anyhow::{Context, Result};

use modgraph_lib::rule::RuleSet;

use crate::output::{OutputFormat, print_json, print_stat, symbols};

pub fn cmd_rules(format: OutputFormat) -> Result<()> {
  let rules = RuleSet::standard().context("Failed to register rules")?;

  if format.is_json() {
    let list: Vec<_> = rules
      .iter()
      .map(|(kind, rule)| {
        serde_json::json!({
          "name": kind.as_str(),
          "command": rule.command(),
          "description": rule.description(),
          "params": rule.params(),
        })
      })
      .collect();
    return print_json(&list);
  }

  for (kind, rule) in rules.iter() {
    println!("{} {}", symbols::ARROW, kind);
    print_stat("command", rule.command());
    print_stat("description", rule.description());
    let params: Vec<&str> = rule.params().iter().map(String::as_str).collect();
    print_stat("params", &params.join(", "));
  }
  Ok(())
}
