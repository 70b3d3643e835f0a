use std::path::{is_separator, MAIN_SEPARATOR};

pub const DOWNLOADING_MESSAGE: &str = "Downloading...";
pub const SUCCESS_MESSAGE: &str = "Download completed successfully";
pub const FAILURE_MESSAGE: &str = "Download failed: an error occurred";

/// One click's worth of input for the external script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    /// Always ends with a path separator.
    pub destination_directory: String,
}

impl DownloadRequest {
    pub fn new(url: &str, destination_directory: &str) -> Self {
        Self {
            url: url.trim().to_string(),
            destination_directory: with_trailing_separator(destination_directory.trim()),
        }
    }

    /// `<dir>/*.mp3`; the script replaces `*` with the video title.
    pub fn output_pattern(&self) -> String {
        format!("{}*.mp3", self.destination_directory)
    }

    pub fn script_args(&self) -> Vec<String> {
        vec![self.url.clone(), self.output_pattern()]
    }
}

fn with_trailing_separator(dir: &str) -> String {
    if dir.ends_with(is_separator) {
        dir.to_string()
    } else {
        format!("{}{}", dir, MAIN_SEPARATOR)
    }
}

/// Outcome of a single script invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunResult {
    Success,
    Failure(i32),
    /// Carries the script name shown to the user.
    NotFound(String),
    LaunchError(String),
}

impl RunResult {
    pub fn from_exit_code(code: i32) -> Self {
        if code == 0 {
            Self::Success
        } else {
            Self::Failure(code)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn status_message(&self) -> String {
        match self {
            Self::Success => SUCCESS_MESSAGE.to_string(),
            Self::Failure(_) => FAILURE_MESSAGE.to_string(),
            Self::NotFound(script) => format!("{}: File not found", script),
            Self::LaunchError(reason) => {
                format!("Failed to run the download script: {}", reason)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadPhase {
    Idle,
    Downloading,
    Completed,
    Failed,
}
