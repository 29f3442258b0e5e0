//! Input sources: the console and a stack of running scripts.
//!
//! Lines come from the innermost running script while there is one, and
//! from the console otherwise. A script is identified by its canonical path;
//! starting a script already on the stack is rejected, since the nesting
//! could never end.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

struct ScriptFrame {
    path: PathBuf,
    lines: VecDeque<String>,
}

/// The console plus the scripts currently being executed.
pub struct InputStack<R> {
    console: Lines<R>,
    frames: Vec<ScriptFrame>,
}

impl<R> InputStack<R>
where
    R: AsyncBufRead + Unpin,
{
    /// Read from `console` until a script is pushed.
    pub fn new(console: R) -> Self {
        Self {
            console: console.lines(),
            frames: Vec::new(),
        }
    }

    /// Returns true while a script is the active source.
    pub fn in_script(&self) -> bool {
        !self.frames.is_empty()
    }

    /// Path of the active script.
    pub fn current_script(&self) -> Option<&Path> {
        self.frames.last().map(|f| f.path.as_path())
    }

    /// Number of scripts on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Start reading from the script at `path`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ScriptRecursion`] if the script is already running
    /// - [`ClientError::Script`] if it cannot be read
    pub async fn push_script(&mut self, path: &str) -> ClientResult<()> {
        let unreadable = |e: std::io::Error| ClientError::Script {
            path: PathBuf::from(path),
            reason: format!("cannot read script: {e}"),
        };
        let resolved = tokio::fs::canonicalize(path).await.map_err(unreadable)?;
        if self.frames.iter().any(|f| f.path == resolved) {
            return Err(ClientError::ScriptRecursion(resolved));
        }
        let text = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(unreadable)?;
        let lines = text
            .lines()
            .map(|l| l.trim_end_matches('\r').to_string())
            .collect();
        debug!(script = %resolved.display(), depth = self.frames.len() + 1, "script started");
        self.frames.push(ScriptFrame {
            path: resolved,
            lines,
        });
        Ok(())
    }

    /// Next command line.
    ///
    /// Finished scripts are popped on the way, so the parent source resumes.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConsoleClosed`] at the end of console input.
    pub async fn next_line(&mut self) -> ClientResult<String> {
        self.skip_finished_scripts();
        match self.frames.last_mut().and_then(|f| f.lines.pop_front()) {
            Some(line) => Ok(line),
            None => self.read_console().await,
        }
    }

    /// Pop scripts with no lines left.
    pub fn skip_finished_scripts(&mut self) {
        while let Some(frame) = self.frames.last() {
            if !frame.lines.is_empty() {
                break;
            }
            debug!(script = %frame.path.display(), "script finished");
            self.frames.pop();
        }
    }

    /// Next value for a form field.
    ///
    /// Unlike [`next_line`](Self::next_line) this never leaves the active
    /// script: a record cut off by the end of its script is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Script`] if the active script has no lines
    /// left, or [`ClientError::ConsoleClosed`] at the end of console input.
    pub async fn next_field(&mut self) -> ClientResult<String> {
        match self.frames.last_mut() {
            Some(frame) => frame.lines.pop_front().ok_or_else(|| ClientError::Script {
                path: frame.path.clone(),
                reason: "script ended in the middle of a record".to_string(),
            }),
            None => self.read_console().await,
        }
    }

    /// Abandon the active script, returning its path.
    pub fn abort_script(&mut self) -> Option<PathBuf> {
        self.frames.pop().map(|f| f.path)
    }

    /// Abandon every running script.
    pub fn clear_scripts(&mut self) {
        self.frames.clear();
    }

    async fn read_console(&mut self) -> ClientResult<String> {
        self.console
            .next_line()
            .await?
            .ok_or(ClientError::ConsoleClosed)
    }
}
