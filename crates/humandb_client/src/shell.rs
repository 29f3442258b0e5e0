//! The read-send-print loop.
//!
//! Each turn reads one command line, builds and sends its request, then
//! waits for the response and prints it. Mistakes in a command are reported
//! and the loop goes on; inside a script they abort that script. A lost
//! connection or a fatal error ends the loop and is returned to the caller.

use std::io::Write;

use humandb_protocol::{Channel, CommandKind, CommandRegistry, Response};
use tokio::io::{AsyncBufRead, AsyncRead, AsyncWrite};
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};
use crate::form::Form;
use crate::input::InputStack;
use crate::request::{build_request, split_line};

/// Prompt printed before every console command.
pub const COMMAND_PROMPT: &str = "$ ";

enum Step {
    Continue,
    Exit,
}

/// An interactive session over a console and an output.
pub struct Shell<R, W> {
    input: InputStack<R>,
    output: W,
    registry: CommandRegistry,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    /// Creates a shell reading commands from `console`.
    pub fn new(console: R, output: W) -> Self {
        Self {
            input: InputStack::new(console),
            output,
            registry: CommandRegistry::standard(),
        }
    }

    /// The output the shell writes to.
    pub fn output(&self) -> &W {
        &self.output
    }

    /// Print a line outside of the command loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    pub fn notice(&mut self, text: &str) -> ClientResult<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// Abandon every running script, as after a reconnect.
    pub fn clear_scripts(&mut self) {
        self.input.clear_scripts();
    }

    /// Run commands over `channel` until `exit`.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the session: a lost connection
    /// ([`ClientError::is_disconnect`]) or a fatal error
    /// ([`ClientError::is_fatal`]), including the end of console input.
    pub async fn run<S>(&mut self, channel: &mut Channel<S>) -> ClientResult<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        loop {
            match self.turn(channel).await {
                Ok(Step::Continue) => {}
                Ok(Step::Exit) => {
                    info!("session ended by exit");
                    return Ok(());
                }
                Err(err) if err.is_fatal() || err.is_disconnect() => return Err(err),
                Err(err) => self.report(&err)?,
            }
        }
    }

    async fn turn<S>(&mut self, channel: &mut Channel<S>) -> ClientResult<Step>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.input.skip_finished_scripts();
        let scripted = self.input.in_script();
        if !scripted {
            write!(self.output, "{COMMAND_PROMPT}")?;
            self.output.flush()?;
        }

        let line = self.input.next_line().await?;
        let Some((name, args)) = split_line(&line) else {
            return Ok(Step::Continue);
        };
        if scripted {
            writeln!(self.output, "{COMMAND_PROMPT}{}", line.trim())?;
        }

        let descriptor = *self
            .registry
            .lookup(name)
            .ok_or_else(|| ClientError::UnknownCommand(name.to_string()))?;
        let request = {
            let mut form = Form::new(&mut self.input, &mut self.output);
            build_request(&descriptor, &args, &mut form).await?
        };

        match descriptor.kind {
            CommandKind::ExecuteScript => self.input.push_script(args[0]).await?,
            CommandKind::Exit => {
                if let Err(err) = channel.send(&request).await {
                    debug!(error = %err, "exit not delivered");
                }
                return Ok(Step::Exit);
            }
            _ => {}
        }

        channel.send(&request).await?;
        match channel.receive::<Response>().await {
            Ok(response) => writeln!(self.output, "{}", response.render())?,
            Err(err) if err.is_envelope_error() => {
                writeln!(self.output, "Malformed response: {err}")?
            }
            Err(err) => return Err(err.into()),
        }
        Ok(Step::Continue)
    }

    fn report(&mut self, err: &ClientError) -> ClientResult<()> {
        match self.input.abort_script() {
            Some(path) => writeln!(self.output, "Script {} aborted: {err}", path.display())?,
            None => writeln!(self.output, "{err}")?,
        }
        Ok(())
    }
}
