use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::domain::RunnerError;

pub type Result<T> = std::result::Result<T, RunnerError>;

/// Exit code reported when the child was terminated without one (e.g. by a signal).
pub const NO_EXIT_CODE: i32 = -1;

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Name shown to the user for a script path: its file name, or the whole value.
pub fn script_name(program: &Path) -> String {
    program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string_lossy().into_owned())
}

/// Launch `program` with `args` and no console window.
///
/// With `wait` the call blocks until the process exits and returns its exit
/// code. Without it the child handle is released right after start and `0`
/// is returned.
pub fn run_process(program: &Path, args: &[String], wait: bool) -> Result<i32> {
    let name = script_name(program);
    let resolved = resolve_program(program).ok_or_else(|| RunnerError::NotFound {
        program: name.clone(),
    })?;

    let mut command = build_command(&resolved, args);
    command.stdin(Stdio::null());
    if wait {
        command.stdout(Stdio::piped()).stderr(Stdio::piped());
    } else {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    debug!(program = %resolved.display(), ?args, wait, "Starting external process");

    let child = command.spawn().map_err(|source| match source.kind() {
        ErrorKind::NotFound => RunnerError::NotFound {
            program: name.clone(),
        },
        _ => RunnerError::Launch {
            program: name.clone(),
            source,
        },
    })?;

    if !wait {
        debug!(pid = child.id(), "Detached from external process");
        drop(child);
        return Ok(0);
    }

    let output = child
        .wait_with_output()
        .map_err(|source| RunnerError::Wait {
            program: name.clone(),
            source,
        })?;

    log_stream(&name, "stdout", &output.stdout);
    log_stream(&name, "stderr", &output.stderr);

    Ok(output.status.code().unwrap_or(NO_EXIT_CODE))
}

/// Paths must exist on disk; bare names are looked up on `PATH`.
fn resolve_program(program: &Path) -> Option<PathBuf> {
    let has_directory = program.is_absolute() || program.components().count() > 1;
    if has_directory || program.is_file() {
        return program.is_file().then(|| program.to_path_buf());
    }
    which::which(program).ok()
}

#[cfg(windows)]
fn build_command(program: &Path, args: &[String]) -> Command {
    use std::os::windows::process::CommandExt;

    let is_binary = program
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("exe") || ext.eq_ignore_ascii_case("com"))
        .unwrap_or(false);

    let mut command = if is_binary {
        let mut command = Command::new(program);
        command.args(args);
        command
    } else {
        // Let the shell pick the file association (e.g. `.py`).
        let mut command = Command::new("cmd");
        command.arg("/C").raw_arg(cmd_line(program, args));
        command
    };
    command.creation_flags(CREATE_NO_WINDOW);
    command
}

/// Command text for `cmd /C`, wrapped in one outer quote pair so cmd strips
/// only that pair and the quoted program path survives spaces. `%` is
/// escaped outside the quotes so cmd never expands variables in arguments.
#[cfg(any(windows, test))]
fn cmd_line(program: &Path, args: &[String]) -> String {
    let mut line = quote_for_cmd(&program.to_string_lossy());
    for arg in args {
        line.push(' ');
        line.push_str(&quote_for_cmd(arg));
    }
    format!("\"{}\"", line)
}

#[cfg(any(windows, test))]
fn quote_for_cmd(value: &str) -> String {
    let escaped = value.replace('"', "%22").replace('%', "\"^%\"");
    format!("\"{}\"", escaped)
}

#[cfg(not(windows))]
fn build_command(program: &Path, args: &[String]) -> Command {
    let mut command = Command::new(program);
    command.args(args);
    command
}

fn log_stream(program: &str, stream: &str, bytes: &[u8]) {
    for line in String::from_utf8_lossy(bytes).lines() {
        debug!(program, stream, "{}", line);
    }
}
