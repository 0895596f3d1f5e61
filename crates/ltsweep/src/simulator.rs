//! LTspice batch runner.
//!
//! LTspice has changed its batch command line between releases, so a run
//! tries an ordered list of flag variants and stops at the first one that
//! exits successfully. The circuit path is always the last argument and the
//! working directory is the circuit's parent, so the `.raw` and `.log`
//! artifacts land next to the circuit.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default LTspice install location on Windows.
pub const DEFAULT_EXECUTABLE: &str = r"C:\Program Files\ADI\LTspice\LTspice.exe";

/// Number of log lines reported when no waveform file was produced.
pub const LOG_TAIL_LINES: usize = 120;

fn default_executable() -> PathBuf {
    PathBuf::from(DEFAULT_EXECUTABLE)
}

fn default_variants() -> Vec<Vec<String>> {
    vec![
        vec!["-b".to_string()],
        vec!["-Run".to_string(), "-b".to_string()],
        vec!["-b".to_string(), "-Run".to_string()],
    ]
}

/// Configuration for the simulator driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Path to the LTspice executable.
    #[serde(default = "default_executable")]
    pub executable: PathBuf,
    /// Command prefix the executable is launched through (e.g. `["wine"]`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wrapper: Vec<String>,
    /// Flag lists tried in order.
    #[serde(default = "default_variants")]
    pub variants: Vec<Vec<String>>,
    /// Kill the simulator after this many seconds; `None` waits forever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            wrapper: Vec::new(),
            variants: default_variants(),
            timeout_secs: None,
        }
    }
}

/// Exit state and captured output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Exit code, `None` if the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl Completion {
    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn describe(&self) -> String {
        let code = self
            .code
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        format!(
            "returncode={code}\nstdout:\n{}\nstderr:\n{}",
            self.stdout, self.stderr
        )
    }
}

impl From<std::process::Output> for Completion {
    fn from(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Starts a process and waits for it.
pub trait Launcher {
    /// Run `command` (program first) in `cwd`.
    ///
    /// A spawn failure is an `Err`; a non-zero exit is a [`Completion`].
    fn launch(
        &self,
        command: &[OsString],
        cwd: &Path,
        timeout: Option<Duration>,
    ) -> Result<Completion>;
}

/// [`Launcher`] backed by [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(
        &self,
        command: &[OsString],
        cwd: &Path,
        timeout: Option<Duration>,
    ) -> Result<Completion> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| Error::Config("empty simulator command".to_string()))?;

        let child = Command::new(program)
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let output = match timeout {
            Some(timeout) => wait_with_timeout(child, timeout)?,
            None => child.wait_with_output()?,
        };
        Ok(output.into())
    }
}

/// Read a child pipe to the end on its own thread.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

fn join_drain(handle: JoinHandle<std::io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| Error::Config("output reader thread panicked".to_string()))?
        .map_err(Error::from)
}

/// Wait for a child process, killing it once `timeout` has elapsed.
///
/// Output is drained while waiting so a chatty child never blocks on a full
/// pipe.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> Result<std::process::Output> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);
    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(std::process::Output {
                status,
                stdout: join_drain(stdout)?,
                stderr: join_drain(stderr)?,
            });
        }

        if start.elapsed() > timeout {
            let _ = child.kill();
            let _ = child.wait();
            // Readers are detached; a surviving grandchild may still hold the pipes
            drop((stdout, stderr));
            return Err(Error::SimulatorTimeout(timeout.as_secs()));
        }
        std::thread::sleep(poll_interval);
    }
}

/// Runs circuits through LTspice in batch mode.
pub struct Simulator {
    config: SimulatorConfig,
    launcher: Box<dyn Launcher>,
}

impl Simulator {
    /// Simulator that launches real processes.
    pub fn new(config: SimulatorConfig) -> Self {
        Self::with_launcher(config, Box::new(SystemLauncher))
    }

    /// Simulator with a custom process launcher.
    pub fn with_launcher(config: SimulatorConfig, launcher: Box<dyn Launcher>) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Fail unless the configured executable exists.
    pub fn ensure_executable(&self) -> Result<()> {
        if self.config.executable.exists() {
            Ok(())
        } else {
            Err(Error::ExecutableNotFound {
                path: self.config.executable.clone(),
            })
        }
    }

    /// Full command lines, one per invocation variant.
    pub fn commands(&self, circuit: &Path) -> Vec<Vec<OsString>> {
        self.config
            .variants
            .iter()
            .map(|flags| {
                self.config
                    .wrapper
                    .iter()
                    .map(OsString::from)
                    .chain(std::iter::once(self.config.executable.clone().into_os_string()))
                    .chain(flags.iter().map(OsString::from))
                    .chain(std::iter::once(circuit.as_os_str().to_os_string()))
                    .collect()
            })
            .collect()
    }

    /// Simulate `circuit`, trying each invocation variant until one succeeds.
    pub fn run(&self, circuit: &Path) -> Result<()> {
        self.ensure_executable()?;

        let cwd = circuit
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let timeout = self.config.timeout_secs.map(Duration::from_secs);
        let commands = self.commands(circuit);

        let mut last_error = String::from("no invocation variants configured");
        for command in &commands {
            log::debug!("running {}", display_command(command).join(" "));
            match self.launcher.launch(command, cwd, timeout) {
                Ok(completion) if completion.success() => return Ok(()),
                Ok(completion) => last_error = completion.describe(),
                Err(e @ Error::SimulatorTimeout(_)) => return Err(e),
                Err(e) => last_error = e.to_string(),
            }
            log::debug!("invocation failed: {last_error}");
        }

        Err(Error::SimulationFailed {
            tried: commands.iter().map(|c| display_command(c)).collect(),
            last_error,
        })
    }
}

fn display_command(command: &[OsString]) -> Vec<String> {
    command
        .iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect()
}

/// Path of the waveform file for a simulated circuit, checked to exist.
///
/// Without a waveform file the tail of the simulator log is reported, if
/// there is one.
pub fn check_artifact(circuit: &Path) -> Result<PathBuf> {
    let raw = circuit.with_extension("raw");
    if raw.exists() {
        return Ok(raw);
    }

    let log = circuit.with_extension("log");
    if log.exists() {
        let text = ltsweep_raw::decode_text(&std::fs::read(&log)?);
        let lines: Vec<&str> = text.lines().collect();
        let tail = lines[lines.len().saturating_sub(LOG_TAIL_LINES)..].join("\n");
        return Err(Error::NoRawOutput { log, tail });
    }

    Err(Error::RawNotFound { path: raw })
}
