use std::ffi::OsString;
use std::io;
use std::process::{Output, Stdio};
use std::time::Duration;

use tokio::process::Command;

/// Max stderr bytes kept for logs and error messages.
const STDERR_TAIL_BYTES: usize = 2048;

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{tool} is not available: {source}")]
    Unavailable {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("{tool} did not finish within {}s", timeout.as_secs())]
    TimedOut { tool: String, timeout: Duration },

    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: String,
        stderr: String,
    },

    #[error("failed to run {tool}: {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// Run `tool` to completion under `timeout`.
///
/// stdin is closed and the child is killed if the returned future is dropped
/// (timeout or request cancellation). A non-zero exit is `ToolError::Failed`.
pub(crate) async fn run_tool(
    tool: &str,
    args: &[OsString],
    timeout: Duration,
    capture_stdout: bool,
) -> Result<Output, ToolError> {
    let mut command = Command::new(tool);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Err(_) => {
            return Err(ToolError::TimedOut {
                tool: tool.to_string(),
                timeout,
            })
        }
        Ok(Err(e))
            if matches!(
                e.kind(),
                io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied
            ) =>
        {
            return Err(ToolError::Unavailable {
                tool: tool.to_string(),
                source: e,
            })
        }
        Ok(Err(e)) => {
            return Err(ToolError::Io {
                tool: tool.to_string(),
                source: e,
            })
        }
        Ok(Ok(output)) => output,
    };

    if !output.status.success() {
        return Err(ToolError::Failed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: stderr_tail(&output.stderr),
        });
    }

    Ok(output)
}

fn stderr_tail(stderr: &[u8]) -> String {
    let start = stderr.len().saturating_sub(STDERR_TAIL_BYTES);
    String::from_utf8_lossy(&stderr[start..]).trim().to_string()
}
