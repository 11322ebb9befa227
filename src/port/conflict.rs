use std::collections::HashSet;
use std::net::TcpListener;
use std::process::Command;

/// A host port that cannot be bound, with whatever owners could be found.
#[derive(Debug, Clone)]
pub struct PortConflict {
    pub port: u16,
    pub processes: Vec<ProcessInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub command: Option<String>,
}

impl PortConflict {
    /// Check if `port` is in use and look up who holds it.
    pub fn check(port: u16) -> Option<Self> {
        if Self::is_port_available(port) {
            return None;
        }
        Some(PortConflict {
            port,
            processes: Self::find_processes_on_port(port),
        })
    }

    /// Binding 127.0.0.1 can succeed on macOS while 0.0.0.0 is taken, so
    /// both must bind for the port to count as free.
    pub fn is_port_available(port: u16) -> bool {
        TcpListener::bind(("127.0.0.1", port)).is_ok()
            && TcpListener::bind(("0.0.0.0", port)).is_ok()
    }

    /// Human-readable owner, e.g. `process 'python3' (PID 4121)`.
    pub fn describe_holder(&self) -> Option<String> {
        let described: Vec<String> = self
            .processes
            .iter()
            .map(|p| match p.command.as_deref().map(str::trim) {
                Some(cmd) if !cmd.is_empty() && cmd != p.name => format!(
                    "process '{}' (PID {}: {})",
                    p.name,
                    p.pid,
                    truncate_command(cmd)
                ),
                _ => format!("process '{}' (PID {})", p.name, p.pid),
            })
            .collect();
        if described.is_empty() {
            None
        } else {
            Some(described.join(", "))
        }
    }

    fn find_processes_on_port(port: u16) -> Vec<ProcessInfo> {
        #[cfg(target_os = "linux")]
        {
            let mut processes = Self::find_processes_ss(port);
            let seen: HashSet<u32> = processes.iter().map(|p| p.pid).collect();
            processes.extend(
                Self::find_processes_lsof(port)
                    .into_iter()
                    .filter(|p| !seen.contains(&p.pid)),
            );
            processes
        }

        #[cfg(target_os = "macos")]
        {
            Self::find_processes_lsof(port)
        }

        #[cfg(not(any(target_os = "macos", target_os = "linux")))]
        {
            let _ = port;
            Vec::new()
        }
    }

    #[cfg(target_os = "linux")]
    fn find_processes_ss(port: u16) -> Vec<ProcessInfo> {
        let output = match Command::new("ss")
            .args(["-tlnp", &format!("sport = :{}", port)])
            .output()
        {
            Ok(o) if o.status.success() => o,
            _ => return Vec::new(),
        };

        parse_ss_output(&String::from_utf8_lossy(&output.stdout))
            .into_iter()
            .map(|pid| {
                let name = std::fs::read_to_string(format!("/proc/{}/comm", pid))
                    .map(|s| s.trim().to_string())
                    .unwrap_or_else(|_| "unknown".to_string());
                let command = std::fs::read_to_string(format!("/proc/{}/cmdline", pid))
                    .ok()
                    .map(|s| s.replace('\0', " ").trim().to_string());
                ProcessInfo { pid, name, command }
            })
            .collect()
    }

    fn find_processes_lsof(port: u16) -> Vec<ProcessInfo> {
        let output = match Command::new("lsof")
            .args(["-i", &format!(":{}", port), "-sTCP:LISTEN", "-P", "-n", "-F", "pc"])
            .output()
        {
            Ok(o) if o.status.success() => o,
            _ => return Vec::new(),
        };

        parse_lsof_output(&String::from_utf8_lossy(&output.stdout))
    }
}

const MAX_COMMAND_CHARS: usize = 60;

fn truncate_command(cmd: &str) -> String {
    if cmd.chars().count() <= MAX_COMMAND_CHARS {
        return cmd.to_string();
    }
    let head: String = cmd.chars().take(MAX_COMMAND_CHARS - 3).collect();
    format!("{}...", head)
}

/// Extract PIDs from `ss -tlnp` output (`users:(("python3",pid=42,fd=3))`).
fn parse_ss_output(stdout: &str) -> Vec<u32> {
    let mut seen = HashSet::new();
    stdout
        .lines()
        .skip(1)
        .flat_map(|line| line.split(|c| c == ',' || c == '(' || c == ')'))
        .filter_map(|part| part.strip_prefix("pid="))
        .filter_map(|pid| pid.parse::<u32>().ok())
        .filter(|pid| seen.insert(*pid))
        .collect()
}

/// Parse `lsof -F pc` field output: a `p<PID>` line starts each process
/// block and a `c<COMMAND>` line names it.
fn parse_lsof_output(stdout: &str) -> Vec<ProcessInfo> {
    let mut processes: Vec<ProcessInfo> = Vec::new();
    for line in stdout.lines() {
        if let Some(pid) = line.strip_prefix('p').and_then(|s| s.parse::<u32>().ok()) {
            if !processes.iter().any(|p| p.pid == pid) {
                processes.push(ProcessInfo {
                    pid,
                    name: "unknown".to_string(),
                    command: None,
                });
            }
        } else if let Some(command) = line.strip_prefix('c') {
            if let Some(last) = processes.last_mut() {
                if last.command.is_none() {
                    last.name = command.to_string();
                    last.command = Some(command.to_string());
                }
            }
        }
    }
    processes
}
