//! # Runtime Configuration Module
//!
//! Environment variable based tuning for the dispatch engine. Loaded once at startup with
//! [`RuntimeConfig::from_env()`] and passed to [`NfRuntime::start`](crate::runtime::NfRuntime::start).
//!
//! ## Environment Variables
//!
//! ### `NF_CHANNEL_CAPACITY`
//!
//! Capacity of every worker inbound and outbound channel. When a worker's inbound channel
//! is full the ingress dispatcher blocks, which in turn stops it from pulling from the
//! transport. Values below 1 are raised to 1.
//!
//! Default: `1024`
//!
//! ### `NF_STACK_SIZE`
//!
//! Stack size for every unit thread. Accepts values in:
//! - Decimal: `262144` (256 KB)
//! - Hexadecimal: `0x40000` (256 KB)
//!
//! Default: `0x40000` (256 KB)
//!
//! ### `NF_FAILURE_POLICY`
//!
//! What happens when one unit (ingress, egress or a worker) terminates with an error:
//! - `isolate`: log it and keep the remaining units running (degraded operation)
//! - `shutdown`: stop supervising and report the failure so the process exits non-zero
//!
//! Default: `isolate`
//!
//! ## Usage
//!
//! ```rust
//! use nf_dispatch::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("Channel capacity: {}", config.channel_capacity);
//! ```

use std::env;

const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
const DEFAULT_STACK_SIZE: usize = 0x40000;

/// What the supervisor does when a single unit fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Terminate only the failing unit; the process keeps running degraded
    #[default]
    Isolate,
    /// Escalate the first unit failure to the whole process
    Shutdown,
}

impl FailurePolicy {
    /// Parse a failure policy from string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "isolate" => Some(Self::Isolate),
            "shutdown" => Some(Self::Shutdown),
            _ => None,
        }
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Capacity of each worker inbound/outbound channel
    pub channel_capacity: usize,
    /// Stack size for unit threads in bytes
    pub stack_size: usize,
    /// Reaction to a failed unit
    pub failure_policy: FailurePolicy,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            stack_size: DEFAULT_STACK_SIZE,
            failure_policy: FailurePolicy::Isolate,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let channel_capacity = env::var("NF_CHANNEL_CAPACITY")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY)
            .max(1);

        let stack_size = env::var("NF_STACK_SIZE")
            .ok()
            .and_then(|s| parse_size(&s))
            .unwrap_or(DEFAULT_STACK_SIZE);

        let failure_policy = env::var("NF_FAILURE_POLICY")
            .ok()
            .and_then(|s| FailurePolicy::parse(&s))
            .unwrap_or_default();

        Self {
            channel_capacity,
            stack_size,
            failure_policy,
        }
    }

    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }
}

fn parse_size(s: &str) -> Option<usize> {
    if let Some(hex) = s.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        s.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!(FailurePolicy::parse("isolate"), Some(FailurePolicy::Isolate));
        assert_eq!(FailurePolicy::parse("ISOLATE"), Some(FailurePolicy::Isolate));
        assert_eq!(FailurePolicy::parse("shutdown"), Some(FailurePolicy::Shutdown));
        assert_eq!(FailurePolicy::parse("Shutdown"), Some(FailurePolicy::Shutdown));
        assert_eq!(FailurePolicy::parse("crash"), None);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("0x4000"), Some(0x4000));
        assert_eq!(parse_size("16384"), Some(16384));
        assert_eq!(parse_size("0xZZ"), None);
        assert_eq!(parse_size("lots"), None);
    }

    #[test]
    fn test_runtime_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.channel_capacity, 1024);
        assert_eq!(config.stack_size, 0x40000);
        assert_eq!(config.failure_policy, FailurePolicy::Isolate);
    }

    #[test]
    fn test_channel_capacity_is_at_least_one() {
        let config = RuntimeConfig::default().with_channel_capacity(0);
        assert_eq!(config.channel_capacity, 1);
    }
}
