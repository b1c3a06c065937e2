pub mod config;
pub mod logging;

pub use config::{
    DEFAULT_MAX_BYTES, DEFAULT_TIMEOUT_MS, SpinConfig, TierChoice, config_from_cmdline, parse_bool,
};
pub use logging::{LogLevel, init_logging};
