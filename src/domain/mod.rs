pub mod error;
pub mod model;

pub use error::{RunnerError, SettingsError};
pub use model::{DownloadPhase, DownloadRequest, RunResult, DOWNLOADING_MESSAGE};
