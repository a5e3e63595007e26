//! Start, stop, pause and inspect the external scheduler script.
//!
//! State lives in three files in the scheduler directory:
//! - `.scheduler.pid`: pid of the launched process (crash-recovery hint)
//! - `.pause`: advisory pause marker the scheduler itself checks
//! - `generator.log`: appended stdout/stderr of the scheduler
//!
//! A process launched by this supervisor is also kept as an in-memory
//! [`Child`] handle for the supervisor's lifetime. The PID file is only
//! trusted after a liveness probe: the pid must exist, must not be a
//! zombie, and its command line must mention the scheduler script.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::Utc;
use sysinfo::{Pid, ProcessStatus, Signal, System};

use quest_types::config::DashboardConfig;
use quest_types::dashboard::{ControlOutcome, SchedulerState};

pub const PID_FILE: &str = ".scheduler.pid";
pub const PAUSE_FILE: &str = ".pause";
pub const LOG_FILE: &str = "generator.log";

/// How long `stop` waits for a held child to exit after SIGTERM.
const STOP_GRACE: Duration = Duration::from_secs(3);

#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// One-shot commands of the control script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Dry-run generation.
    Test,
    /// Generate and publish a single article.
    Once,
}

impl ControlCommand {
    pub fn as_str(self) -> &'static str {
        match self {
            ControlCommand::Test => "test",
            ControlCommand::Once => "once",
        }
    }
}

pub struct SchedulerSupervisor {
    dir: PathBuf,
    program: String,
    scheduler_script: String,
    control_script: String,
    child: Mutex<Option<Child>>,
}

impl SchedulerSupervisor {
    pub fn new(
        dir: impl Into<PathBuf>,
        program: impl Into<String>,
        scheduler_script: impl Into<String>,
        control_script: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            program: program.into(),
            scheduler_script: scheduler_script.into(),
            control_script: control_script.into(),
            child: Mutex::new(None),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            config.scheduler_dir.clone(),
            config.program.clone(),
            config.scheduler_script.clone(),
            config.control_script.clone(),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pid_path(&self) -> PathBuf {
        self.dir.join(PID_FILE)
    }

    pub fn pause_path(&self) -> PathBuf {
        self.dir.join(PAUSE_FILE)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(LOG_FILE)
    }

    /// The recorded pid, if the PID file exists and parses.
    pub fn recorded_pid(&self) -> Option<u32> {
        fs::read_to_string(self.pid_path())
            .ok()
            .and_then(|s| s.trim().parse().ok())
    }

    /// The running scheduler's pid, if the liveness probe accepts it.
    pub fn running_pid(&self) -> Option<u32> {
        if let Some(pid) = self.held_child_pid() {
            return Some(pid);
        }
        self.recorded_pid()
            .filter(|pid| is_scheduler_process(*pid, &self.scheduler_script))
    }

    pub fn is_running(&self) -> bool {
        self.running_pid().is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.pause_path().exists()
    }

    pub fn state(&self) -> SchedulerState {
        if !self.is_running() {
            SchedulerState::Stopped
        } else if self.is_paused() {
            SchedulerState::Paused
        } else {
            SchedulerState::Running
        }
    }

    /// Launch the scheduler in the background, appending its output to the log.
    #[tracing::instrument(name = "scheduler.start", skip(self), fields(dir = %self.dir.display()))]
    pub fn start(&self) -> ControlOutcome {
        if self.is_running() {
            return ControlOutcome::failed("Already running");
        }

        match self.spawn_scheduler() {
            Ok(pid) => {
                tracing::info!(pid, "scheduler started");
                ControlOutcome::ok(format!("Started with PID {pid}"))
            }
            Err(e) => {
                tracing::warn!(error = %e, "scheduler start failed");
                ControlOutcome::failed(e.to_string())
            }
        }
    }

    fn spawn_scheduler(&self) -> Result<u32, SupervisorError> {
        let log_path = self.log_path();
        let io_err = |source| SupervisorError::Io {
            path: log_path.clone(),
            source,
        };
        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(io_err)?;
        let log_err = log.try_clone().map_err(io_err)?;

        let child = Command::new(&self.program)
            .arg(&self.scheduler_script)
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .stdout(log)
            .stderr(log_err)
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let pid = child.id();
        fs::write(self.pid_path(), pid.to_string()).map_err(|source| SupervisorError::Io {
            path: self.pid_path(),
            source,
        })?;

        if let Ok(mut held) = self.child.lock() {
            *held = Some(child);
        }
        Ok(pid)
    }

    /// Send SIGTERM to the scheduler and clear the PID file.
    #[tracing::instrument(name = "scheduler.stop", skip(self), fields(dir = %self.dir.display()))]
    pub async fn stop(&self) -> ControlOutcome {
        let pid_path = self.pid_path();
        let Some(pid) = self.running_pid() else {
            // A stale PID file is cleared either way.
            if pid_path.exists() {
                let _ = fs::remove_file(&pid_path);
            }
            return ControlOutcome::failed("Not running");
        };

        if !send_term(pid) {
            return ControlOutcome::failed(format!("Failed to signal PID {pid}"));
        }
        self.reap_held_child(pid).await;

        if let Err(e) = remove_if_exists(&pid_path) {
            return ControlOutcome::failed(e.to_string());
        }
        tracing::info!(pid, "scheduler stopped");
        ControlOutcome::ok("Stopped")
    }

    /// Write the pause marker. Does not check whether the scheduler runs.
    pub fn pause(&self) -> ControlOutcome {
        match fs::write(self.pause_path(), Utc::now().to_rfc3339()) {
            Ok(()) => ControlOutcome::ok("Paused"),
            Err(e) => ControlOutcome::failed(e.to_string()),
        }
    }

    pub fn resume(&self) -> ControlOutcome {
        match fs::remove_file(self.pause_path()) {
            Ok(()) => ControlOutcome::ok("Resumed"),
            Err(e) if e.kind() == ErrorKind::NotFound => ControlOutcome::failed("Not paused"),
            Err(e) => ControlOutcome::failed(e.to_string()),
        }
    }

    /// Last `lines` lines of the log, or `None` if nothing was logged yet.
    pub fn logs(&self, lines: usize) -> Result<Option<String>, SupervisorError> {
        let path = self.log_path();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(SupervisorError::Io { path, source }),
        };
        Ok(Some(tail(&content, lines)))
    }

    /// Run `<program> <control script> <command>` to completion and return
    /// its stdout followed by its stderr.
    #[tracing::instrument(name = "scheduler.control", skip_all, fields(command = command.as_str()))]
    pub async fn run_control(&self, command: ControlCommand) -> Result<String, SupervisorError> {
        let output = tokio::process::Command::new(&self.program)
            .arg(&self.control_script)
            .arg(command.as_str())
            .current_dir(&self.dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| SupervisorError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        tracing::debug!(status = %output.status, "control script finished");
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }

    fn held_child_pid(&self) -> Option<u32> {
        let mut held = self.child.lock().ok()?;
        let child = held.as_mut()?;
        match child.try_wait() {
            Ok(None) => Some(child.id()),
            // Exited (or unknown): drop the handle.
            _ => {
                *held = None;
                None
            }
        }
    }

    /// Wait out the grace period for a held child, polling without
    /// blocking the runtime, then kill it.
    async fn reap_held_child(&self, pid: u32) {
        let held = match self.child.lock() {
            Ok(mut held) => held.take().filter(|c| c.id() == pid),
            Err(_) => None,
        };
        let Some(mut child) = held else {
            return;
        };

        let deadline = Instant::now() + STOP_GRACE;
        while Instant::now() < deadline {
            match child.try_wait() {
                Ok(Some(_)) | Err(_) => return,
                Ok(None) => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
        tracing::warn!(pid, "scheduler ignored SIGTERM; killing");
        let _ = child.kill();
        let _ = child.wait();
    }
}

/// Liveness and identity probe for a recorded pid.
fn is_scheduler_process(pid: u32, script: &str) -> bool {
    let pid = Pid::from_u32(pid);
    let mut system = System::new();
    if !system.refresh_process(pid) {
        return false;
    }
    let Some(process) = system.process(pid) else {
        return false;
    };
    if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
        return false;
    }
    let cmd = process.cmd();
    // Unreadable command lines pass; readable ones must name the script.
    cmd.is_empty() || cmd.iter().any(|arg| arg.contains(script))
}

fn send_term(pid: u32) -> bool {
    let mut system = System::new();
    let pid = Pid::from_u32(pid);
    if !system.refresh_process(pid) {
        return false;
    }
    system
        .process(pid)
        .and_then(|p| p.kill_with(Signal::Term))
        .unwrap_or(false)
}

fn remove_if_exists(path: &Path) -> Result<(), SupervisorError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(SupervisorError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn tail(content: &str, lines: usize) -> String {
    let all: Vec<&str> = content.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
