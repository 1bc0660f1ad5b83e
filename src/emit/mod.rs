/// Output writers.
///
/// Every output is staged in a sibling `.tmp` file and only renamed to its
/// final name once fully written, so an aborted run never leaves a
/// truncated file under an output name.
mod atomic;
mod writers;

pub use atomic::{check_writable, AtomicCsvWriter};
pub use writers::{
    format_weight, write_normalized, write_resolution, write_resolved, write_run_outputs,
    write_unresolved,
};
