use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

/// One fully-specified worker invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

/// Process capabilities the supervisor needs. The native implementation
/// uses OS subprocesses; tests substitute a recording fake.
pub trait ProcessLauncher: Send + Sync {
    /// Start a detached loop that runs `worker`, sleeps `interval`, and
    /// repeats forever. Returns the loop's process (and process group) id.
    fn spawn_loop(&self, worker: &WorkerInvocation, interval: Duration) -> io::Result<u32>;

    /// Start a single detached worker run.
    fn spawn_once(&self, worker: &WorkerInvocation) -> io::Result<u32>;

    /// Ask every process in the group led by `pid` to terminate.
    fn terminate_group(&self, pid: u32) -> io::Result<()>;
}

/// `sh`-based launcher. Each spawned process leads its own process group
/// so the loop and any worker it is running can be signalled together.
#[derive(Debug, Default, Clone)]
pub struct ShellLauncher;

impl ShellLauncher {
    fn spawn_detached(mut cmd: Command) -> io::Result<u32> {
        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }
        let mut child = cmd.spawn()?;
        let pid = child.id();
        // Reap the child whenever it exits so it does not linger as a zombie
        // under a long-running server.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(pid)
    }
}

impl ProcessLauncher for ShellLauncher {
    fn spawn_loop(&self, worker: &WorkerInvocation, interval: Duration) -> io::Result<u32> {
        // The worker is passed as positional parameters ($0 "$@") so no
        // shell quoting of user-supplied arguments is needed.
        let script = format!(
            "while true; do \"$0\" \"$@\"; sleep {}; done",
            interval.as_secs().max(1)
        );
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(script)
            .arg(&worker.program)
            .args(&worker.args)
            .current_dir(&worker.cwd);
        Self::spawn_detached(cmd)
    }

    fn spawn_once(&self, worker: &WorkerInvocation) -> io::Result<u32> {
        let mut cmd = Command::new(&worker.program);
        cmd.args(&worker.args).current_dir(&worker.cwd);
        Self::spawn_detached(cmd)
    }

    #[cfg(unix)]
    fn terminate_group(&self, pid: u32) -> io::Result<()> {
        // killpg(0) and killpg(1) would hit our own group or init.
        let pgid = libc::pid_t::try_from(pid)
            .ok()
            .filter(|pgid| *pgid > 1)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, format!("refusing to signal pid {}", pid))
            })?;
        // SAFETY: killpg has no memory-safety preconditions.
        let rc = unsafe { libc::killpg(pgid, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(unix))]
    fn terminate_group(&self, _pid: u32) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "process groups are only supported on unix",
        ))
    }
}
