//! Subprocess runner.
//!
//! Launches one external program, drains both of its output streams, and
//! blocks until it exits. Every call is single-shot: there is no retry, and
//! the only way a call ends early is the optional timeout.

use log::{error, warn};
use serde::Serialize;
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::config::HarnessConfig;
use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use crate::expectation::Stream;
use crate::logging;

/// How often a running child is polled while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured outcome of one invocation that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    /// Exit code, or `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Wall-clock time between spawn and exit.
    #[serde(serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Returns the captured text of one stream.
    pub fn stream(&self, stream: Stream) -> &str {
        match stream {
            Stream::Stdout => &self.stdout,
            Stream::Stderr => &self.stderr,
        }
    }

    pub fn describe_exit(&self) -> String {
        match self.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "termination by signal".to_string(),
        }
    }
}

fn serialize_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// Runs `program` with `args` and waits for it without any timeout.
///
/// A hang in the external process hangs the caller. Use [`Runner`] with a
/// timeout when that is not acceptable.
pub fn run<P, I, S>(program: P, args: I) -> CoreResult<InvocationResult>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Runner::new().run(program, args)
}

/// Configurable launcher for pipeline executables.
///
/// When an interpreter is set, the program path becomes the interpreter's
/// first argument (`python basic_pipelines/detection.py --input ...`).
#[derive(Debug, Clone, Default)]
pub struct Runner {
    interpreter: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl Runner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<PathBuf>) -> Self {
        self.interpreter = Some(interpreter.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Builds the command without spawning it.
    pub fn command<P, I, S>(&self, program: P, args: I) -> Command
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = match &self.interpreter {
            Some(interpreter) => {
                let mut cmd = Command::new(interpreter);
                cmd.arg(program.as_ref());
                cmd
            }
            None => Command::new(program.as_ref()),
        };
        cmd.args(args);
        cmd
    }

    /// Launches the program and blocks until it exits or the timeout fires.
    pub fn run<P, I, S>(&self, program: P, args: I) -> CoreResult<InvocationResult>
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = self.command(program, args);
        self.run_command(&mut cmd)
    }

    /// Runs an already-built command with this runner's timeout.
    ///
    /// The timeout covers the whole invocation: the child's exit and the end
    /// of both output streams. A helper process that keeps a pipe open after
    /// the child exits counts against it too.
    pub fn run_command(&self, cmd: &mut Command) -> CoreResult<InvocationResult> {
        logging::log_command(cmd);
        let launched = PathBuf::from(cmd.get_program());

        // With a timeout armed the child leads its own process group, so a
        // kill also reaches whatever it spawned.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            if self.timeout.is_some() {
                cmd.process_group(0);
            }
        }

        let start = Instant::now();
        let deadline = self.timeout.map(|timeout| start + timeout);
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("Failed to launch {}: {}", launched.display(), e);
                command_start_error(&launched, e)
            })?;

        // Both pipes are drained while waiting so a chatty child cannot block
        // on a full pipe.
        let (tx, rx) = mpsc::channel();
        if let Some(stdout) = child.stdout.take() {
            drain(Stream::Stdout, stdout, tx.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            drain(Stream::Stderr, stderr, tx.clone());
        }
        drop(tx);

        let status = match self.timeout {
            Some(timeout) => wait_until(&mut child, &launched, start + timeout, timeout)?,
            None => child
                .wait()
                .map_err(|e| command_wait_error(&launched, e))?,
        };
        let duration = start.elapsed();

        let Some((stdout, stderr)) = collect(&rx, deadline) else {
            let timeout = self.timeout.unwrap_or_default();
            warn!(
                "{} exited but its output stayed open past {}s",
                launched.display(),
                timeout.as_secs()
            );
            kill_process_group(&child, &launched);
            return Err(CoreError::Timeout {
                program: launched,
                timeout,
            });
        };

        let result = InvocationResult {
            exit_code: status.code(),
            stdout,
            stderr,
            duration,
        };
        logging::log_exit(&launched, &result);
        Ok(result)
    }
}

/// Reads `reader` to the end on its own thread and sends the bytes on `tx`.
fn drain<R: Read + Send + 'static>(stream: Stream, mut reader: R, tx: Sender<(Stream, Vec<u8>)>) {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buf) {
            warn!("Failed to read child {}: {}", stream, e);
        }
        // The receiver is gone only after a timeout.
        let _ = tx.send((stream, buf));
    });
}

/// Gathers both streams. Returns `None` if `deadline` passes first.
fn collect(rx: &Receiver<(Stream, Vec<u8>)>, deadline: Option<Instant>) -> Option<(String, String)> {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    loop {
        let received = match deadline {
            Some(deadline) => {
                rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
            }
            None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok((Stream::Stdout, bytes)) => stdout = bytes,
            Ok((Stream::Stderr, bytes)) => stderr = bytes,
            Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => return None,
        }
    }
    Some((
        String::from_utf8_lossy(&stdout).into_owned(),
        String::from_utf8_lossy(&stderr).into_owned(),
    ))
}

/// Polls the child until it exits; kills and reaps it once `deadline` passes.
///
/// On timeout the reader threads are left detached: a grandchild may still
/// hold the pipes open and joining them could block indefinitely.
fn wait_until(
    child: &mut Child,
    program: &Path,
    deadline: Instant,
    timeout: Duration,
) -> CoreResult<ExitStatus> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                let now = Instant::now();
                if now >= deadline {
                    warn!(
                        "Killing {} after {}s without exit",
                        program.display(),
                        timeout.as_secs()
                    );
                    kill_process_group(child, program);
                    if let Err(e) = child.kill() {
                        warn!("Failed to kill {}: {}", program.display(), e);
                    }
                    if let Err(e) = child.wait() {
                        warn!("Failed to reap {}: {}", program.display(), e);
                    }
                    return Err(CoreError::Timeout {
                        program: program.to_path_buf(),
                        timeout,
                    });
                }
                thread::sleep(POLL_INTERVAL.min(deadline - now));
            }
            Err(e) => return Err(command_wait_error(program, e)),
        }
    }
}

/// Sends SIGKILL to the process group led by `child`.
#[cfg(unix)]
fn kill_process_group(child: &Child, program: &Path) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(pgid) = i32::try_from(child.id()) else {
        return;
    };
    // ESRCH means every member has already exited.
    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group of {}: {}", program.display(), e),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_child: &Child, _program: &Path) {}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    // Scripts are run through `sh` rather than exec'd directly: a file
    // freshly written by one test thread can fail with ETXTBSY when another
    // thread forks at the same moment.
    fn write_script(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, format!("{}\n", body)).unwrap();
        path
    }

    fn sh() -> Runner {
        Runner::new().with_interpreter("sh")
    }

    #[test]
    fn test_run_captures_both_streams_and_exit_code() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "both.sh", "echo out; echo err >&2; exit 3");

        let result = run("sh", [script.as_os_str()]).unwrap();
        assert_eq!(result.exit_code, Some(3));
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(!result.success());
    }

    #[test]
    fn test_run_passes_arguments_in_order() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "args.sh", "for a in \"$@\"; do echo \"$a\"; done");

        let result = sh()
            .run(&script, ["--input", "invalid_path.mp4", "--unknown_arg"])
            .unwrap();
        assert!(result.success());
        assert_eq!(result.stdout, "--input\ninvalid_path.mp4\n--unknown_arg\n");
    }

    #[test]
    fn test_missing_executable_is_launch_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does_not_exist.py");

        let err = run(&missing, ["--input", "x"]).unwrap_err();
        assert!(err.is_launch_failure(), "unexpected error: {}", err);
    }

    #[test]
    fn test_non_executable_file_is_launch_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, "not a program").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let err = run(&path, Vec::<&str>::new()).unwrap_err();
        assert!(err.is_launch_failure(), "unexpected error: {}", err);
    }

    #[test]
    fn test_missing_interpreter_is_launch_error() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "ok.sh", "exit 0");

        let err = Runner::new()
            .with_interpreter(dir.path().join("no-such-interpreter"))
            .run(&script, Vec::<&str>::new())
            .unwrap_err();
        assert!(err.is_launch_failure());
    }

    #[test]
    fn test_process_reporting_error_is_not_launch_error() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            &dir,
            "fail.sh",
            "echo 'Error: No such file or directory'; exit 1",
        );

        let result = sh().run(&script, ["--input", "invalid_path.mp4"]).unwrap();
        assert_eq!(result.exit_code, Some(1));
        assert!(result.stdout.contains("No such file"));
    }

    #[test]
    fn test_interpreter_receives_script_as_first_argument() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "pipeline.sh", "echo \"$0 got: $*\"");

        let result = sh().run(&script, ["--unknown_arg"]).unwrap();
        assert_eq!(
            result.stdout,
            format!("{} got: --unknown_arg\n", script.display())
        );
    }

    #[test]
    fn test_timeout_kills_hanging_process() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "hang.sh", "exec sleep 30");

        let start = Instant::now();
        let err = sh()
            .with_timeout(Some(Duration::from_millis(300)))
            .run(&script, Vec::<&str>::new())
            .unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {}", err);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_timeout_covers_helper_holding_output_open() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "helper.sh", "sleep 8 &\necho started\nexit 0");

        let start = Instant::now();
        let err = sh()
            .with_timeout(Some(Duration::from_secs(1)))
            .run(&script, Vec::<&str>::new())
            .unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {}", err);
        assert!(
            start.elapsed() < Duration::from_secs(5),
            "took {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn test_timeout_kills_background_helpers() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("helper_survived");
        let script = write_script(
            &dir,
            "orphan.sh",
            &format!("(sleep 2; touch '{}') &\nexit 0", marker.display()),
        );

        let err = sh()
            .with_timeout(Some(Duration::from_millis(500)))
            .run(&script, Vec::<&str>::new())
            .unwrap_err();
        assert!(err.is_timeout(), "unexpected error: {}", err);

        thread::sleep(Duration::from_secs(3));
        assert!(!marker.exists());
    }

    #[test]
    fn test_detached_helper_does_not_delay_result() {
        let dir = TempDir::new().unwrap();
        let script = write_script(
            &dir,
            "detached.sh",
            "sleep 8 >/dev/null 2>&1 &\necho started\nexit 0",
        );

        let start = Instant::now();
        let result = sh()
            .with_timeout(Some(Duration::from_secs(5)))
            .run(&script, Vec::<&str>::new())
            .unwrap();
        assert_eq!(result.stdout, "started\n");
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_fast_process_finishes_within_timeout() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "fast.sh", "echo done");

        let result = sh()
            .with_timeout(Some(Duration::from_secs(30)))
            .run(&script, Vec::<&str>::new())
            .unwrap();
        assert_eq!(result.stdout, "done\n");
    }

    #[test]
    fn test_large_output_on_both_streams_is_captured() {
        let dir = TempDir::new().unwrap();
        // Well past a 64 KiB pipe buffer on each stream.
        let script = write_script(
            &dir,
            "chatty.sh",
            "i=0; while [ $i -lt 5000 ]; do echo \"stdout line $i padding padding\"; echo \"stderr line $i padding padding\" >&2; i=$((i+1)); done",
        );

        let result = sh()
            .with_timeout(Some(Duration::from_secs(60)))
            .run(&script, Vec::<&str>::new())
            .unwrap();
        assert_eq!(result.stdout.lines().count(), 5000);
        assert_eq!(result.stderr.lines().count(), 5000);
        assert!(result.stdout.ends_with("stdout line 4999 padding padding\n"));
    }

    #[test]
    fn test_stdin_is_closed() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "stdin.sh", "cat; echo eof");

        let result = sh()
            .with_timeout(Some(Duration::from_secs(10)))
            .run(&script, Vec::<&str>::new())
            .unwrap();
        assert_eq!(result.stdout, "eof\n");
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "stable.sh", "echo \"usage: stable.sh\" >&2; exit 2");

        let first = sh().run(&script, ["--unknown_arg"]).unwrap();
        let second = sh().run(&script, ["--unknown_arg"]).unwrap();
        assert_eq!(first.exit_code, second.exit_code);
        assert_eq!(first.stdout, second.stdout);
        assert_eq!(first.stderr, second.stderr);
    }

    #[test]
    fn test_signal_termination_has_no_exit_code() {
        let dir = TempDir::new().unwrap();
        let script = write_script(&dir, "killed.sh", "kill -9 $$");

        let result = sh().run(&script, Vec::<&str>::new()).unwrap();
        assert_eq!(result.exit_code, None);
        assert_eq!(result.describe_exit(), "termination by signal");
    }
}
