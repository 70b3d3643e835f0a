pub mod process;

pub use process::{run_process, script_name};
