//! Availability-probe results.

use serde::{Deserialize, Serialize};

/// Reply to one echo request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PingReply {
    pub success: bool,
    /// Status name such as `Success` or `TimedOut`.
    pub status: String,
    pub roundtrip_time_millis: i64,
    pub ttl: i32,
}

impl PingReply {
    pub fn failed(status: impl Into<String>) -> Self {
        Self {
            success: false,
            status: status.into(),
            roundtrip_time_millis: 0,
            ttl: 0,
        }
    }
}

/// What the facade remembers about the construction-time probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reachability {
    /// Set once when the facade is built; never cleared.
    pub reachable: bool,
    /// Status of the most recent probe.
    pub last_status: String,
}

impl Reachability {
    pub fn from_reply(reply: &PingReply) -> Self {
        Self {
            reachable: reply.success,
            last_status: reply.status.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reply_is_zeroed() {
        let r = PingReply::failed("TimedOut");
        assert!(!r.success);
        assert_eq!(r.roundtrip_time_millis, 0);
        assert_eq!(r.ttl, 0);
    }

    #[test]
    fn reachability_mirrors_reply() {
        let reply = PingReply {
            success: true,
            status: "Success".into(),
            roundtrip_time_millis: 12,
            ttl: 54,
        };
        let r = Reachability::from_reply(&reply);
        assert!(r.reachable);
        assert_eq!(r.last_status, "Success");
    }

    #[test]
    fn ping_reply_camel_case() {
        let j = serde_json::to_value(PingReply::failed("TimedOut")).unwrap();
        assert!(j.get("roundtripTimeMillis").is_some());
    }
}
