use std::process::Command;

use crate::{Error, Result};

/// Captured result of an external command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code; -1 when the process was killed by a signal
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }
}

/// Runs external commands
pub trait ProcessRunner {
    /// Run `argv[0]` with the remaining arguments and wait for it
    fn run(&self, argv: &[String]) -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] spawning real processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, argv: &[String]) -> Result<ProcessOutput> {
        let command = argv.join(" ");
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::CommandSpawn {
                command,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        tracing::info!(%command, "Running command");
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|source| Error::CommandSpawn {
                command: command.clone(),
                source,
            })?;

        Ok(ProcessOutput {
            code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// Run a command and turn a non-zero exit into [`Error::CommandFailed`]
pub fn run_checked(runner: &dyn ProcessRunner, argv: &[String]) -> Result<ProcessOutput> {
    let output = runner.run(argv)?;
    if !output.success() {
        return Err(Error::CommandFailed {
            command: argv.join(" "),
            code: output.code,
            stderr: output.stderr.trim().to_string(),
        });
    }
    Ok(output)
}
