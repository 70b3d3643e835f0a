use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    domain::{DownloadRequest, RunResult, RunnerError},
    runner::{run_process, script_name},
};

/// Runs the download script for a request off the UI thread.
#[derive(Debug, Clone)]
pub struct DownloadCoordinator {
    script_path: PathBuf,
}

impl DownloadCoordinator {
    pub fn new(script_path: PathBuf) -> Self {
        Self { script_path }
    }

    pub fn script_name(&self) -> String {
        script_name(&self.script_path)
    }

    /// Waits on the tokio blocking pool until the script exits.
    pub async fn run(&self, request: DownloadRequest) -> RunResult {
        let script = self.script_path.clone();
        let args = request.script_args();

        info!(script = %script.display(), url = %request.url, output = %request.output_pattern(), "Starting download");

        let outcome = tokio::task::spawn_blocking(move || run_process(&script, &args, true)).await;

        let result = match outcome {
            Ok(Ok(code)) => RunResult::from_exit_code(code),
            Ok(Err(RunnerError::NotFound { program })) => RunResult::NotFound(program),
            Ok(Err(RunnerError::Launch { source, .. } | RunnerError::Wait { source, .. })) => {
                RunResult::LaunchError(source.to_string())
            }
            Err(join_error) => RunResult::LaunchError(join_error.to_string()),
        };

        match &result {
            RunResult::Success => info!(url = %request.url, "Download finished"),
            other => warn!(url = %request.url, result = ?other, "Download did not succeed"),
        }

        result
    }
}
