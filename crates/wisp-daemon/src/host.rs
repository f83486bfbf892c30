//! Host capabilities: clipboard, shell open, and the [`PluginApi`] handed to plugins.

use std::io::Write;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::JoinHandle;

use serde_json::json;
use tracing::{debug, warn};
use wisp_core::{PluginApi, TraceContext};
use wisp_rpc::methods;
use wisp_types::PlainQuery;

use crate::outbound::Outbound;

/// Spawn `program` detached from our stdio and reap it on a helper thread.
fn spawn_reaped(
    program: &str,
    args: &[&str],
) -> std::io::Result<JoinHandle<std::io::Result<ExitStatus>>> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let name = program.to_string();
    Ok(std::thread::spawn(move || {
        let result = child.wait();
        match &result {
            Ok(status) if !status.success() => debug!("{name} exited with {status}"),
            Ok(_) => {}
            Err(e) => warn!("Failed to wait for {name}: {e}"),
        }
        result
    }))
}

fn spawn_silent(program: &str, args: &[&str]) -> std::io::Result<()> {
    spawn_reaped(program, args).map(|_| ())
}

/// Write `text` to the stdin of `program` and wait for it to exit successfully.
fn pipe_to(program: &str, args: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("{program} exited with {status}")))
    }
}

/// Copy text to the clipboard with the platform's clipboard tool.
/// On Linux, tries `wl-copy` first and falls back to `xclip`.
///
/// # Errors
///
/// Returns the last tool's error if none of them copied the text.
pub fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    if cfg!(target_os = "macos") {
        return pipe_to("pbcopy", &[], text);
    }
    if cfg!(target_os = "windows") {
        return pipe_to("clip", &[], text);
    }

    match pipe_to("wl-copy", &[], text) {
        Ok(()) => Ok(()),
        Err(e) => {
            debug!("wl-copy failed ({e}), trying xclip");
            pipe_to("xclip", &["-selection", "clipboard"], text)
        }
    }
}

/// Opener program and arguments for `target`. The target is always passed as
/// a single argument and never goes through a shell.
fn open_command(target: &str) -> (&'static str, Vec<&str>) {
    if cfg!(target_os = "macos") {
        ("open", vec![target])
    } else if cfg!(target_os = "windows") {
        ("rundll32", vec!["url.dll,FileProtocolHandler", target])
    } else {
        ("xdg-open", vec![target])
    }
}

/// Open a URL or path with the desktop's default handler.
///
/// # Errors
///
/// Returns an error if the opener could not be spawned.
pub fn shell_open(target: &str) -> std::io::Result<()> {
    let (program, args) = open_command(target);
    spawn_silent(program, &args)
}

/// [`PluginApi`] backed by the bridge and the host clipboard
#[derive(Debug, Clone)]
pub struct HostApi {
    outbound: Outbound,
}

impl HostApi {
    #[must_use]
    pub fn new(outbound: Outbound) -> Self {
        Self { outbound }
    }
}

impl PluginApi for HostApi {
    fn change_query(&self, ctx: &TraceContext, query: PlainQuery) {
        let _span = ctx.span("change_query").entered();
        match serde_json::to_value(&query) {
            Ok(data) => {
                self.outbound.request_ui(methods::CHANGE_QUERY, data);
            }
            Err(e) => warn!("Failed to serialize query change: {e}"),
        }
    }

    fn copy_to_clipboard(&self, ctx: &TraceContext, text: &str) -> wisp_core::Result<()> {
        let _span = ctx.span("clipboard").entered();
        copy_to_clipboard(text)?;
        debug!("Copied {} bytes to clipboard", text.len());
        Ok(())
    }

    fn notify(&self, ctx: &TraceContext, message: &str) {
        let _span = ctx.span("notify").entered();
        self.outbound.request_ui(methods::SHOW_MESSAGE, json!(message));
    }
}
