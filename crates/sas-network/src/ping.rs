//! ICMP echo through the platform `ping` binary.
//!
//! Raw ICMP sockets need elevated privileges on most systems, so the probe
//! shells out to `ping` and reads the round-trip time and TTL back from its
//! output.

use async_trait::async_trait;
use log::{debug, warn};
use sas_core::PingReply;
use std::net::Ipv4Addr;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};

pub const DEFAULT_PING_TIMEOUT_SECS: u64 = 60;

pub const STATUS_SUCCESS: &str = "Success";
pub const STATUS_TIMED_OUT: &str = "TimedOut";
pub const STATUS_HOST_UNREACHABLE: &str = "DestinationHostUnreachable";
pub const STATUS_NETWORK_UNREACHABLE: &str = "DestinationNetworkUnreachable";
pub const STATUS_BAD_DESTINATION: &str = "BadDestination";

/// Sends a single echo request.
#[async_trait]
pub trait Pinger: Send + Sync {
    async fn send(&self, target: Ipv4Addr, timeout: Duration) -> PingReply;
}

/// [`Pinger`] backed by the operating system's `ping` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemPinger;

impl SystemPinger {
    fn command(target: Ipv4Addr, wait: Duration) -> Command {
        let mut cmd = Command::new("ping");
        #[cfg(target_os = "windows")]
        cmd.arg("-n").arg("1").arg("-w").arg(wait.as_millis().max(1).to_string());
        #[cfg(target_os = "macos")]
        cmd.arg("-c").arg("1").arg("-t").arg(wait.as_secs().max(1).to_string());
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        cmd.arg("-c").arg("1").arg("-W").arg(wait.as_secs().max(1).to_string());
        cmd.arg(target.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Pinger for SystemPinger {
    async fn send(&self, target: Ipv4Addr, wait: Duration) -> PingReply {
        let started = std::time::Instant::now();
        let guard = wait + Duration::from_secs(1);

        let output = match timeout(guard, Self::command(target, wait).output()).await {
            Ok(Ok(out)) => out,
            Ok(Err(e)) => {
                warn!("ping {}: could not run ping: {}", target, e);
                return PingReply::failed(format!("Ping failed: {}", e));
            }
            Err(_) => return PingReply::failed(STATUS_TIMED_OUT),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let ttl = parse_ttl(&stdout);

        // Windows exits 0 for "Destination host unreachable" replies, so a
        // TTL is required before the reply counts as an echo.
        if output.status.success() && ttl.is_some() {
            let rtt = parse_ping_time(&stdout)
                .unwrap_or_else(|| started.elapsed().as_millis() as f64);
            debug!("ping {}: rtt={}ms ttl={:?}", target, rtt, ttl);
            return PingReply {
                success: true,
                status: STATUS_SUCCESS.to_string(),
                roundtrip_time_millis: rtt.round() as i64,
                ttl: ttl.unwrap_or(0),
            };
        }

        let status = classify_failure(&format!("{}\n{}", stdout, stderr));
        debug!("ping {}: {}", target, status);
        PingReply::failed(status)
    }
}

/// Probes one fixed address.
pub struct AvailabilityProbe {
    target: Ipv4Addr,
    pinger: Box<dyn Pinger>,
}

impl AvailabilityProbe {
    pub fn new(target: Ipv4Addr) -> Self {
        Self::with_pinger(target, Box::new(SystemPinger))
    }

    pub fn with_pinger(target: Ipv4Addr, pinger: Box<dyn Pinger>) -> Self {
        Self { target, pinger }
    }

    pub fn target(&self) -> Ipv4Addr {
        self.target
    }

    /// Dotted-quad form used as host for the SQL and FTP endpoints.
    pub fn host_string(&self) -> String {
        self.target.to_string()
    }

    pub async fn probe(&self, timeout_secs: u64) -> PingReply {
        self.pinger
            .send(self.target, Duration::from_secs(timeout_secs))
            .await
    }
}

// ── Output parsing ──────────────────────────────────────────────────

/// Parse ping time from ping command output.
fn parse_ping_time(output: &str) -> Option<f64> {
    // Windows: "time=XXms" or "time<1ms"
    // Unix: "time=XX.X ms"
    for line in output.lines() {
        let lower = line.to_lowercase();
        if let Some(pos) = lower.find("time=") {
            let num: String = lower[pos + 5..]
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if let Ok(ms) = num.parse::<f64>() {
                return Some(ms);
            }
        }
        if lower.contains("time<1ms") || lower.contains("time<1 ms") {
            return Some(1.0);
        }
    }
    None
}

/// `ttl=54` (Unix) or `TTL=54` (Windows).
fn parse_ttl(output: &str) -> Option<i32> {
    for line in output.lines() {
        let lower = line.to_lowercase();
        if let Some(pos) = lower.find("ttl=") {
            let num: String = lower[pos + 4..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            if let Ok(ttl) = num.parse::<i32>() {
                return Some(ttl);
            }
        }
    }
    None
}

fn classify_failure(output: &str) -> &'static str {
    let lower = output.to_lowercase();
    if lower.contains("host unreachable") {
        STATUS_HOST_UNREACHABLE
    } else if lower.contains("network is unreachable") || lower.contains("net unreachable") {
        STATUS_NETWORK_UNREACHABLE
    } else if lower.contains("unknown host")
        || lower.contains("could not find host")
        || lower.contains("name or service not known")
    {
        STATUS_BAD_DESTINATION
    } else {
        STATUS_TIMED_OUT
    }
}

// ─────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorded {
        calls: Mutex<Vec<(Ipv4Addr, Duration)>>,
        reply: PingReply,
    }

    #[async_trait]
    impl Pinger for Recorded {
        async fn send(&self, target: Ipv4Addr, wait: Duration) -> PingReply {
            self.calls.lock().unwrap().push((target, wait));
            self.reply.clone()
        }
    }

    #[test]
    fn parse_unix_reply() {
        let out = "PING 1.1.1.1 (1.1.1.1) 56(84) bytes of data.\n\
                   64 bytes from 1.1.1.1: icmp_seq=1 ttl=57 time=11.6 ms\n";
        assert_eq!(parse_ping_time(out), Some(11.6));
        assert_eq!(parse_ttl(out), Some(57));
    }

    #[test]
    fn parse_windows_reply() {
        let out = "Reply from 8.8.8.8: bytes=32 time=14ms TTL=117\r\n";
        assert_eq!(parse_ping_time(out), Some(14.0));
        assert_eq!(parse_ttl(out), Some(117));
    }

    #[test]
    fn parse_windows_sub_millisecond() {
        let out = "Reply from 127.0.0.1: bytes=32 time<1ms TTL=128\r\n";
        assert_eq!(parse_ping_time(out), Some(1.0));
    }

    #[test]
    fn no_ttl_in_unreachable_output() {
        let out = "Reply from 10.0.0.1: Destination host unreachable.\r\n";
        assert_eq!(parse_ttl(out), None);
        assert_eq!(classify_failure(out), STATUS_HOST_UNREACHABLE);
    }

    #[test]
    fn classify_known_failures() {
        assert_eq!(
            classify_failure("connect: Network is unreachable"),
            STATUS_NETWORK_UNREACHABLE
        );
        assert_eq!(
            classify_failure("ping: nohost: Name or service not known"),
            STATUS_BAD_DESTINATION
        );
        assert_eq!(
            classify_failure("1 packets transmitted, 0 received, 100% packet loss"),
            STATUS_TIMED_OUT
        );
    }

    #[tokio::test]
    async fn probe_sends_exactly_one_request() {
        let pinger = Recorded {
            calls: Mutex::new(Vec::new()),
            reply: PingReply {
                success: true,
                status: STATUS_SUCCESS.into(),
                roundtrip_time_millis: 20,
                ttl: 50,
            },
        };
        let target = Ipv4Addr::new(192, 0, 2, 7);
        let probe = AvailabilityProbe::with_pinger(target, Box::new(pinger));
        let reply = probe.probe(5).await;
        assert!(reply.success);
        assert_eq!(reply.ttl, 50);
        assert_eq!(probe.host_string(), "192.0.2.7");
    }

    #[tokio::test]
    async fn probe_passes_timeout_through() {
        let shared = std::sync::Arc::new(Recorded {
            calls: Mutex::new(Vec::new()),
            reply: PingReply::failed(STATUS_TIMED_OUT),
        });

        struct Shared(std::sync::Arc<Recorded>);
        #[async_trait]
        impl Pinger for Shared {
            async fn send(&self, target: Ipv4Addr, wait: Duration) -> PingReply {
                self.0.send(target, wait).await
            }
        }

        let probe = AvailabilityProbe::with_pinger(
            Ipv4Addr::LOCALHOST,
            Box::new(Shared(shared.clone())),
        );
        let reply = probe.probe(DEFAULT_PING_TIMEOUT_SECS).await;
        assert!(!reply.success);
        assert_eq!(reply.status, STATUS_TIMED_OUT);

        let calls = shared.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, Duration::from_secs(60));
    }
}
