//! Typed argument sets, one per rule kind.
//!
//! Each struct carries exactly the parameters of its rule, so an action can
//! only be built with a complete argument set.

use std::collections::BTreeMap;

use crate::rule::RuleKind;

/// Arguments for one rule kind.
pub trait RuleArgs {
  const RULE: RuleKind;

  fn into_args(self) -> BTreeMap<String, String>;
}

fn to_map<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
  pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

#[derive(Debug, Clone)]
pub struct VendorArgs {
  pub work_dir: String,
  pub name: String,
}

impl RuleArgs for VendorArgs {
  const RULE: RuleKind = RuleKind::Vendor;

  fn into_args(self) -> BTreeMap<String, String> {
    to_map([("workDir", self.work_dir), ("name", self.name)])
  }
}

#[derive(Debug, Clone)]
pub struct CompileArgs {
  pub work_dir: String,
  pub output_path: String,
  pub pkg: String,
}

impl RuleArgs for CompileArgs {
  const RULE: RuleKind = RuleKind::Compile;

  fn into_args(self) -> BTreeMap<String, String> {
    to_map([
      ("workDir", self.work_dir),
      ("outputPath", self.output_path),
      ("pkg", self.pkg),
    ])
  }
}

#[derive(Debug, Clone)]
pub struct TestArgs {
  pub work_dir: String,
  pub out_path: String,
  pub test_pkg: String,
}

impl RuleArgs for TestArgs {
  const RULE: RuleKind = RuleKind::Test;

  fn into_args(self) -> BTreeMap<String, String> {
    to_map([
      ("workDir", self.work_dir),
      ("outPath", self.out_path),
      ("testPkg", self.test_pkg),
    ])
  }
}

#[derive(Debug, Clone)]
pub struct BundleArgs {
  pub work_dir: String,
  pub entry: String,
  pub should_obfuscate: bool,
  pub name: String,
}

impl RuleArgs for BundleArgs {
  const RULE: RuleKind = RuleKind::Bundle;

  fn into_args(self) -> BTreeMap<String, String> {
    to_map([
      ("workDir", self.work_dir),
      ("entry", self.entry),
      ("shouldObfuscate", self.should_obfuscate.to_string()),
      ("name", self.name),
    ])
  }
}
