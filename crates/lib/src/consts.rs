//! Fixed names and default values shared across the generator.

/// Default base directory for generated outputs.
pub const DEFAULT_OUTPUT_DIR: &str = "out";

/// Default filename suffix identifying Go test sources.
pub const DEFAULT_TEST_SUFFIX: &str = "_test.go";

/// File name of the test log written by a test action.
pub const TEST_LOG_FILE: &str = "out.txt";

/// Subdirectory of the output directory holding compiled binaries.
pub const BIN_DIR: &str = "bin";

/// Directory created by `go mod vendor`, relative to the module directory.
pub const VENDOR_DIR: &str = "vendor";

/// Module manifest consumed by the vendor step.
pub const GO_MOD_FILE: &str = "go.mod";

/// Separator placed between bundle entry points.
pub const ENTRY_SEPARATOR: &str = ",";

/// Property name for source patterns.
pub const PROP_SRCS: &str = "srcs";

/// Property name for source exclusion patterns.
pub const PROP_SRCS_EXCLUDE: &str = "srcs_exclude";

/// Property name for the module directory.
pub const PROP_DIR: &str = "dir";

/// Property name for the bundle output path.
pub const PROP_PATH: &str = "path";
