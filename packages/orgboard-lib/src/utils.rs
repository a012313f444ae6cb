use crate::config::DashboardConfig;
use std::{env, str::FromStr};
use tracing_subscriber::filter::EnvFilter;

const RUST_LOG: &str = "RUST_LOG";
const HUMAN_LOGGING: &str = "HUMAN_LOGGING";

/// Trim the leading '$' or '${' and trailing '}' from an environment variable.
pub fn trim_opt_env_key(key: &str) -> &str {
    // Abmiguous key: $FOO, non-ambiguous key: ${FOO}
    let not_ambiguous = key.starts_with("${");
    match not_ambiguous {
        false => &key[1..],
        true => &key[2..key.len() - 1],
    }
}

/// Determine whether a given key is an environment variable.
pub fn is_opt_env_var(k: &str) -> bool {
    k.starts_with('$') || (k.starts_with("${") && k.ends_with('}'))
}

/// Initialize the logging context for the aggregator service.
pub async fn init_logging(config: &DashboardConfig) -> anyhow::Result<()> {
    let level = env::var_os(RUST_LOG)
        .map(|x| x.into_string().unwrap())
        .unwrap_or("info".to_string());

    // We manually suppress some of the more verbose crate logging.
    if !config.verbose {
        std::env::set_var(
            RUST_LOG,
            format!("{level},hyper=warn,reqwest=warn,h2=warn"),
        );
    }

    let filter = match env::var_os(RUST_LOG) {
        Some(_) => {
            EnvFilter::try_from_default_env().expect("Invalid `RUST_LOG` provided")
        }
        None => EnvFilter::new("info"),
    };

    let human_logging = env::var_os(HUMAN_LOGGING)
        .map(|s| {
            bool::from_str(s.to_str().unwrap())
                .expect("Expected `true` or `false` to be provided for `HUMAN_LOGGING`")
        })
        .unwrap_or(true);

    let sub = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    if human_logging {
        sub.with_ansi(true)
            .with_level(true)
            .with_line_number(true)
            .init();
    } else {
        sub.with_ansi(false)
            .with_level(true)
            .with_line_number(true)
            .json()
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_keys_are_detected() {
        assert!(is_opt_env_var("$FOO"));
        assert!(is_opt_env_var("${FOO}"));
        assert!(!is_opt_env_var("FOO"));
        assert!(!is_opt_env_var("192.168.1.4"));
    }

    #[test]
    fn env_var_keys_are_trimmed() {
        assert_eq!(trim_opt_env_key("$FOO"), "FOO");
        assert_eq!(trim_opt_env_key("${FOO}"), "FOO");
    }
}
