//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `relaynode_core::defaults`.

use relaynode_core::defaults;

/// Generate default value functions that forward to relaynode_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_keepalive_interval_secs => DEFAULT_KEEPALIVE_INTERVAL_SECS: u64,
    default_keepalive_timeout_secs  => DEFAULT_KEEPALIVE_TIMEOUT_SECS: u64,
    default_tcp_keepalive_secs      => DEFAULT_TCP_KEEPALIVE_SECS: u64,
    default_shutdown_grace_secs     => DEFAULT_SHUTDOWN_GRACE_SECS: u64,
    default_min_stats_interval_ms   => DEFAULT_MIN_STATS_INTERVAL_MS: u64,
    default_stats_channel_capacity  => DEFAULT_STATS_CHANNEL_CAPACITY: usize,
}

default_string_fns! {
    default_listen            => DEFAULT_LISTEN,
    default_stale_credentials => DEFAULT_STALE_CREDENTIALS,
}
