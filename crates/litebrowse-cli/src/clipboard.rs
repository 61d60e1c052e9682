//! System clipboard bridge through the platform's copy utility.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::debug;

/// Copy `text` to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> io::Result<()> {
    for (program, args) in TOOLS {
        match pipe_to(program, args, text) {
            Ok(()) => {
                debug!("Copied {} bytes with {}", text.len(), program);
                return Ok(());
            }
            // not installed, try the next one
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        "no clipboard utility found (install wl-copy, xclip, or xsel)",
    ))
}

type Tool = (&'static str, &'static [&'static str]);

#[cfg(target_os = "macos")]
const TOOLS: &[Tool] = &[("pbcopy", &[])];

#[cfg(windows)]
const TOOLS: &[Tool] = &[("cmd", &["/c", "clip"])];

#[cfg(not(any(target_os = "macos", windows)))]
const TOOLS: &[Tool] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Dropping stdin closes the pipe so the tool sees EOF.
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };

    // Always reap the child, even when the write failed.
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{} exited with {}", program, status)))
    }
}
