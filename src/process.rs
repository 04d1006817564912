//! External tool invocation with combined output capture.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use crate::check::CheckError;
use crate::config::CommandSpec;

const CHUNK_SIZE: usize = 8 * 1024;

/// Everything a tool printed, plus how it exited.
#[derive(Debug)]
pub struct CapturedOutput {
    /// stdout and stderr interleaved in the order chunks arrived
    pub text: String,
    pub status: ExitStatus,
}

/// Run a command in `cwd` and capture both output streams into one buffer.
///
/// A non-zero exit status is not an error: the analyzer exits non-zero
/// whenever it reports diagnostics. Only failing to start the process or to
/// read its pipes is.
pub async fn capture(command: &CommandSpec, cwd: &Path) -> Result<CapturedOutput, CheckError> {
    log::debug!("running `{}` in {}", command, cwd.display());

    let mut child = Command::new(&command.program)
        .args(&command.args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| CheckError::Launch {
            program: command.program.clone(),
            source,
        })?;

    let capture_err = |source: std::io::Error| CheckError::Capture {
        program: command.program.clone(),
        source,
    };

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| capture_err(std::io::Error::other("stdout was not piped")))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| capture_err(std::io::Error::other("stderr was not piped")))?;

    let mut buffer = Vec::new();
    let mut out_chunk = vec![0u8; CHUNK_SIZE];
    let mut err_chunk = vec![0u8; CHUNK_SIZE];
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            read = stdout.read(&mut out_chunk), if out_open => {
                let n = read.map_err(capture_err)?;
                if n == 0 {
                    out_open = false;
                } else {
                    buffer.extend_from_slice(&out_chunk[..n]);
                }
            }
            read = stderr.read(&mut err_chunk), if err_open => {
                let n = read.map_err(capture_err)?;
                if n == 0 {
                    err_open = false;
                } else {
                    buffer.extend_from_slice(&err_chunk[..n]);
                }
            }
        }
    }

    let status = child.wait().await.map_err(capture_err)?;
    log::debug!("`{}` wrote {} bytes", command.program, buffer.len());

    Ok(CapturedOutput {
        text: String::from_utf8_lossy(&buffer).into_owned(),
        status,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh", &["-c", script])
    }

    fn block_on<F: std::future::Future>(future: F) -> F::Output {
        tokio::runtime::Runtime::new().unwrap().block_on(future)
    }

    #[test]
    fn test_captures_both_streams() {
        let temp = TempDir::new().unwrap();
        let out = block_on(capture(&sh("echo out; echo err 1>&2"), temp.path())).unwrap();
        assert!(out.text.contains("out\n"));
        assert!(out.text.contains("err\n"));
        assert!(out.status.success());
    }

    #[test]
    fn test_nonzero_exit_is_not_an_error() {
        let temp = TempDir::new().unwrap();
        let out = block_on(capture(&sh("echo finding; exit 3"), temp.path())).unwrap();
        assert_eq!(out.text, "finding\n");
        assert_eq!(out.status.code(), Some(3));
    }

    #[test]
    fn test_runs_in_cwd() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("marker.txt"), "here").unwrap();
        let out = block_on(capture(&sh("cat marker.txt"), temp.path())).unwrap();
        assert_eq!(out.text, "here");
    }

    #[test]
    fn test_missing_program_is_launch_error() {
        let temp = TempDir::new().unwrap();
        let cmd = CommandSpec::new("dartgate-no-such-tool", &[]);
        let err = block_on(capture(&cmd, temp.path())).unwrap_err();
        assert!(matches!(err, CheckError::Launch { .. }));
        assert!(err.to_string().starts_with("failed to run dartgate-no-such-tool"));
    }
}
