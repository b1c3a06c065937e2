use crate::logging::LogLevel;

/// Common free-tier attachment limit.
pub const DEFAULT_MAX_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_TIMEOUT_MS: u32 = 60_000;

const DEFAULT_SKIP_ANIMATION: bool = false;
const DEFAULT_TIER: TierChoice = TierChoice::Auto;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

/// Render tier requested by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TierChoice {
    /// Pick by participant count.
    Auto,
    /// Force tier 1..=3.
    Fixed(u8),
}

impl TierChoice {
    pub fn from_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("high") {
            return TierChoice::Fixed(1);
        }
        if value.eq_ignore_ascii_case("medium") {
            return TierChoice::Fixed(2);
        }
        if value.eq_ignore_ascii_case("low") {
            return TierChoice::Fixed(3);
        }
        match value.parse::<u8>() {
            Ok(tier @ 1..=3) => TierChoice::Fixed(tier),
            _ => TierChoice::Auto,
        }
    }
}

impl core::fmt::Display for TierChoice {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TierChoice::Auto => write!(f, "auto"),
            TierChoice::Fixed(tier) => write!(f, "tier{}", tier),
        }
    }
}

/// Options for one spin, as supplied by the command layer.
#[derive(Clone, Copy, Debug)]
pub struct SpinConfig {
    pub tier: TierChoice,
    pub skip_animation: bool,
    pub timeout_ms: u32,
    pub max_bytes: usize,
    pub seed: Option<u64>,
    pub log_level: LogLevel,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            tier: DEFAULT_TIER,
            skip_animation: DEFAULT_SKIP_ANIMATION,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_bytes: DEFAULT_MAX_BYTES,
            seed: None,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl SpinConfig {
    /// Parse whitespace-separated `key=value` tokens on top of the defaults.
    pub fn from_cmdline(cmdline: &str) -> Self {
        config_from_cmdline(Some(cmdline))
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("on")
        || value.eq_ignore_ascii_case("true")
        || value.eq_ignore_ascii_case("yes")
        || value.eq_ignore_ascii_case("enabled")
        || value == "1"
    {
        Some(true)
    } else if value.eq_ignore_ascii_case("off")
        || value.eq_ignore_ascii_case("false")
        || value.eq_ignore_ascii_case("no")
        || value.eq_ignore_ascii_case("disabled")
        || value == "0"
    {
        Some(false)
    } else {
        None
    }
}

/// `30000`, `30000ms` and `30s` are all thirty seconds.
fn parse_duration_ms(value: &str) -> Option<u32> {
    if let Some(ms) = value.strip_suffix("ms") {
        return ms.parse().ok();
    }
    if let Some(secs) = value.strip_suffix('s') {
        return secs.parse::<u32>().ok().and_then(|s| s.checked_mul(1000));
    }
    value.parse().ok()
}

/// Byte counts accept `k`/`m` suffixes (binary units).
fn parse_bytes(value: &str) -> Option<usize> {
    let lower = value.to_ascii_lowercase();
    let (digits, unit) = if let Some(d) = lower.strip_suffix('m') {
        (d, 1024 * 1024)
    } else if let Some(d) = lower.strip_suffix('k') {
        (d, 1024)
    } else {
        (lower.as_str(), 1)
    };
    digits.parse::<usize>().ok().and_then(|n| n.checked_mul(unit))
}

pub fn config_from_cmdline(cmdline: Option<&str>) -> SpinConfig {
    let mut cfg = SpinConfig::default();
    if let Some(cmdline) = cmdline {
        for token in cmdline.split_whitespace() {
            if let Some(value) = token.strip_prefix("wheel.tier=") {
                cfg.tier = TierChoice::from_str(value);
            } else if let Some(value) = token.strip_prefix("wheel.skip=") {
                if let Some(skip) = parse_bool(value) {
                    cfg.skip_animation = skip;
                }
            } else if let Some(value) = token.strip_prefix("wheel.timeout=") {
                if let Some(parsed) = parse_duration_ms(value) {
                    cfg.timeout_ms = parsed;
                }
            } else if let Some(value) = token.strip_prefix("wheel.max_bytes=") {
                if let Some(parsed) = parse_bytes(value) {
                    cfg.max_bytes = parsed;
                }
            } else if let Some(value) = token.strip_prefix("wheel.seed=") {
                cfg.seed = value.parse().ok();
            } else if let Some(value) = token.strip_prefix("log.level=") {
                cfg.log_level = LogLevel::from_str(value);
            }
        }
    }
    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cmdline_gives_defaults() {
        let cfg = config_from_cmdline(None);
        assert_eq!(cfg.tier, TierChoice::Auto);
        assert!(!cfg.skip_animation);
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.max_bytes, DEFAULT_MAX_BYTES);
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn parses_every_key() {
        let cfg = SpinConfig::from_cmdline(
            "wheel.tier=low wheel.skip=yes wheel.timeout=15s wheel.max_bytes=8m wheel.seed=42 log.level=debug",
        );
        assert_eq!(cfg.tier, TierChoice::Fixed(3));
        assert!(cfg.skip_animation);
        assert_eq!(cfg.timeout_ms, 15_000);
        assert_eq!(cfg.max_bytes, 8 * 1024 * 1024);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.log_level, LogLevel::Debug);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let cfg = SpinConfig::from_cmdline("wheel.skip=maybe wheel.timeout=soon wheel.tier=9 other=1");
        assert!(!cfg.skip_animation);
        assert_eq!(cfg.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(cfg.tier, TierChoice::Auto);
    }

    #[test]
    fn durations_and_sizes() {
        assert_eq!(parse_duration_ms("250ms"), Some(250));
        assert_eq!(parse_duration_ms("2s"), Some(2000));
        assert_eq!(parse_duration_ms("900"), Some(900));
        assert_eq!(parse_bytes("512K"), Some(512 * 1024));
        assert_eq!(parse_bytes("1000"), Some(1000));
        assert_eq!(parse_bytes("x"), None);
    }
}
