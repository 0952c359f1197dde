//! Routing from groups and tools to feature sets and result files.

pub mod feature_sets;
pub mod paths;
pub mod tool;

pub use feature_sets::resolve;
pub use paths::{origin_from_file_name, output_paths, path_for, OutputPaths, AGGREGATE_DIR};
pub use tool::{accepted_kinds_for, default_direction_for, Tool};
