//! Go binary modules with a test step.
//!
//! Emits, in order:
//!
//! 1. `vendor` (only with `vendor_first`): `go mod vendor` into
//!    `<dir>/vendor`, reading `<dir>/go.mod`. Optional, and its output becomes
//!    an implicit input of every later step so vendoring runs first.
//! 2. `test`: `go test` over build and test sources, writing the test log.
//! 3. `compile`: `go build` over build sources into `<out>/bin/<name>`.

use tracing::info;

use crate::action::{ActionBuilder, CompileArgs, TestArgs, VendorArgs};
use crate::classify::SourceClassifier;
use crate::consts::{GO_MOD_FILE, PROP_SRCS, VENDOR_DIR};
use crate::error::{ErrorSet, Validated};
use crate::pattern::{Excludes, merge_files};

use super::{GenerateActions, ModuleActions, ModuleContext, ModuleError, TestedBinaryProps};

impl GenerateActions for TestedBinaryProps {
  fn generate_actions(&self, ctx: &ModuleContext<'_>) -> Result<ModuleActions, ModuleError> {
    info!(module = %ctx.name, "adding build actions for go binary module");

    // Collect every pattern before deciding anything.
    let excludes = Excludes::compile(&self.srcs_exclude);
    let resolved = ctx.resolve_all(&self.srcs, &excludes.value, PROP_SRCS);
    let mut errors = excludes.errors;
    errors.extend(resolved.errors);
    let sets = Validated {
      value: resolved.value,
      errors,
    }
    .into_result()
    .map_err(|errors| ctx.invalid(errors))?;

    let files = merge_files(&sets);
    let classifier = SourceClassifier::new(ctx.config.test_suffix.as_str());
    let sources = classifier.classify(&files).map_err(|e| {
      let mut errors = ErrorSet::new();
      errors.push(PROP_SRCS, e);
      ctx.invalid(errors)
    })?;

    let work_dir = ctx.work_dir();
    let mut build_inputs = sources.build;
    let mut actions = Vec::with_capacity(3);

    if self.vendor_first {
      let vendor_dir = ctx.dir.join(VENDOR_DIR);
      let vendor = ActionBuilder::for_rule(
        ctx.rules,
        VendorArgs {
          work_dir: work_dir.clone(),
          name: ctx.name.to_string(),
        },
      )
      .and_then(|b| {
        b.output(&vendor_dir)
          .explicit(ctx.dir.join(GO_MOD_FILE))
          .optional(true)
          .description(format!("Vendor dependencies of {}", ctx.name))
          .build()
      })
      .map_err(|e| ctx.action_error(e))?;
      actions.push(vendor);
      build_inputs.push(vendor_dir);
    }

    let test_log = ctx.config.test_log_path(ctx.name);
    let test = ActionBuilder::for_rule(
      ctx.rules,
      TestArgs {
        work_dir: work_dir.clone(),
        out_path: test_log.to_string_lossy().into_owned(),
        test_pkg: self.test_pkg.clone(),
      },
    )
    .and_then(|b| {
      b.output(&test_log)
        .implicits(&build_inputs)
        .implicits(&sources.test)
        .description(format!("Test module {}", self.test_pkg))
        .build()
    })
    .map_err(|e| ctx.action_error(e))?;
    actions.push(test);

    let binary = ctx.config.binary_path(ctx.name);
    let compile = ActionBuilder::for_rule(
      ctx.rules,
      CompileArgs {
        work_dir,
        output_path: binary.to_string_lossy().into_owned(),
        pkg: self.pkg.clone(),
      },
    )
    .and_then(|b| {
      b.output(&binary)
        .implicits(&build_inputs)
        .description(format!("Build {} as Go binary", ctx.name))
        .build()
    })
    .map_err(|e| ctx.action_error(e))?;
    actions.push(compile);

    Ok(ModuleActions {
      actions,
      glob_deps: sets.into_iter().map(|s| s.dependency).collect(),
    })
  }
}
