//! Echo probing through the platform `ping` utility.
//!
//! Going through the system binary keeps the sweep unprivileged: raw ICMP
//! sockets need root on Linux and macOS, `ping` does not.

use std::io::Read;
use std::net::Ipv4Addr;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

use crate::constants::{CHILD_POLL_INTERVAL, PROBE_DEADLINE_GRACE};
use crate::errors::SweepError;

lazy_static! {
    static ref TTL_PATTERN: Regex = Regex::new(r"(?i)\bttl[=:]\s*(\S+)").unwrap();
}

/// Sends one echo request and reports the TTL of the reply.
pub trait EchoProbe: Send + Sync {
    fn probe(&self, host: Ipv4Addr) -> Result<u32, SweepError>;
}

/// Extract the TTL from `ping` output.
///
/// Windows prints `TTL=128`, Linux and macOS print `ttl=64`.
pub fn parse_ttl(output: &str) -> Option<u32> {
    let captures = TTL_PATTERN.captures(output)?;
    captures.get(1)?.as_str().parse::<u32>().ok()
}

/// `EchoProbe` backed by the operating system's `ping` command.
#[derive(Debug, Clone)]
pub struct SystemPing {
    timeout: Duration,
}

impl SystemPing {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build_command(&self, host: Ipv4Addr) -> Command {
        let mut cmd = Command::new("ping");
        let millis = self.timeout.as_millis().max(1);

        if cfg!(windows) {
            cmd.arg("-n").arg("1").arg("-w").arg(millis.to_string());
        } else if cfg!(target_os = "macos") {
            // macOS takes -W in milliseconds
            cmd.arg("-c").arg("1").arg("-W").arg(millis.to_string());
        } else {
            // Linux iputils takes whole seconds
            let secs = ((millis + 999) / 1000).max(1);
            cmd.arg("-c").arg("1").arg("-W").arg(secs.to_string());
        }

        cmd.arg(host.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());
        cmd
    }
}

impl EchoProbe for SystemPing {
    fn probe(&self, host: Ipv4Addr) -> Result<u32, SweepError> {
        let mut child = self
            .build_command(host)
            .spawn()
            .map_err(|e| SweepError::probe(host, format!("failed to spawn ping: {}", e)))?;

        let deadline = self.timeout + PROBE_DEADLINE_GRACE;
        let status = wait_with_deadline(&mut child, deadline)
            .map_err(|reason| SweepError::probe(host, reason))?;

        let mut stdout = String::new();
        if let Some(mut pipe) = child.stdout.take() {
            pipe.read_to_string(&mut stdout)
                .map_err(|e| SweepError::probe(host, format!("unreadable ping output: {}", e)))?;
        }

        if !status.success() {
            return Err(SweepError::probe(host, format!("no reply ({})", status)));
        }

        let ttl = parse_ttl(&stdout)
            .ok_or_else(|| SweepError::probe(host, "reply carried no numeric TTL"))?;
        debug!("{} answered with TTL {}", host, ttl);
        Ok(ttl)
    }
}

/// Poll the child until it exits, killing it once `deadline` has passed.
fn wait_with_deadline(
    child: &mut Child,
    deadline: Duration,
) -> Result<std::process::ExitStatus, String> {
    let started = Instant::now();
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) if started.elapsed() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("timed out after {:?}", deadline));
            }
            Ok(None) => thread::sleep(CHILD_POLL_INTERVAL),
            Err(e) => return Err(format!("failed waiting for ping: {}", e)),
        }
    }
}
