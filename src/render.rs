use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::RunError;

const RENDERER: &str = "wkhtmltopdf";

/// Render `html` to a PDF at `output` by piping it through wkhtmltopdf.
/// Blocks until the renderer exits.
pub fn to_pdf(html: &str, output: &Path) -> Result<(), RunError> {
    let mut child = Command::new(RENDERER)
        .arg("--quiet")
        .arg("-")
        .arg(output)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RunError::Render {
            reason: format!("can't run {}: {}", RENDERER, e),
        })?;

    child
        .stdin
        .take()
        .ok_or_else(|| RunError::Render {
            reason: format!("{} stdin unavailable", RENDERER),
        })?
        .write_all(html.as_bytes())?;

    let result = child.wait_with_output()?;
    if !result.status.success() {
        return Err(RunError::Render {
            reason: format!(
                "{} exited with {}: {}",
                RENDERER,
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            ),
        });
    }
    Ok(())
}
