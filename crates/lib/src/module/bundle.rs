//! Script bundle modules.

use std::path::Path;

use tracing::info;

use crate::action::{ActionBuilder, BundleArgs};
use crate::consts::{ENTRY_SEPARATOR, PROP_PATH, PROP_SRCS};
use crate::error::{ErrorSet, GenerateError, Validated};
use crate::pattern::{Excludes, containment_problem, merge_files};

use super::{GenerateActions, JsBundleProps, ModuleActions, ModuleContext, ModuleError};

impl GenerateActions for JsBundleProps {
  fn generate_actions(&self, ctx: &ModuleContext<'_>) -> Result<ModuleActions, ModuleError> {
    info!(module = %ctx.name, "adding build actions for js bundle module");

    // The bundle must land inside the output directory.
    let mut errors = ErrorSet::new();
    if let Some(problem) = containment_problem(Path::new(&self.path)) {
      errors.push(PROP_PATH, GenerateError::invalid_path(&self.path, problem));
    }

    let resolved = ctx.resolve_all(&self.srcs, &Excludes::none(), PROP_SRCS);
    errors.extend(resolved.errors);
    let sets = Validated {
      value: resolved.value,
      errors,
    }
    .into_result()
    .map_err(|errors| ctx.invalid(errors))?;

    let files = merge_files(&sets);

    // The bundler runs inside the module directory.
    let entry = files
      .iter()
      .map(|f| f.strip_prefix(ctx.dir).unwrap_or(f.as_path()))
      .map(Path::to_string_lossy)
      .collect::<Vec<_>>()
      .join(ENTRY_SEPARATOR);

    let out = ctx.config.bundle_path(Path::new(&self.path));
    let bundle = ActionBuilder::for_rule(
      ctx.rules,
      BundleArgs {
        work_dir: ctx.work_dir(),
        entry,
        should_obfuscate: self.obfuscate,
        name: ctx.name.to_string(),
      },
    )
    .and_then(|b| {
      b.output(&out)
        .implicits(&files)
        .description(format!("Js bundle of {}", ctx.name))
        .build()
    })
    .map_err(|e| ctx.action_error(e))?;

    Ok(ModuleActions {
      actions: vec![bundle],
      glob_deps: sets.into_iter().map(|s| s.dependency).collect(),
    })
  }
}
