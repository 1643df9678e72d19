//! CLI configuration: a thin layer over `bsp_config` that applies the
//! `GlobalOpts` overrides (--host, --port, --no-tls, --timeout, --insecure).

use std::time::Duration;

use bsp_api::{ServerTarget, TransportConfig};
use bsp_config::{DEFAULT_PROFILE, Profile, default_secret_path, load_config, profile_to_target};
use tracing::debug;

use crate::cli::GlobalOpts;
use crate::error::CliError;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Resolve the active profile name from CLI flags.
pub fn active_profile_name(global: &GlobalOpts) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| DEFAULT_PROFILE.into())
}

/// Load the secret file and build the target plus transport settings.
pub fn resolve_target(global: &GlobalOpts) -> Result<(ServerTarget, TransportConfig), CliError> {
    let path = global
        .secret_file
        .clone()
        .unwrap_or_else(default_secret_path);
    let config = load_config(&path)?;
    let profile_name = active_profile_name(global);
    let profile = config.profile(&profile_name)?;

    debug!(profile = %profile_name, path = %path.display(), "resolved profile");
    resolve_profile(profile, &profile_name, global)
}

/// Translate a `Profile` + global flags into a target and transport config.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<(ServerTarget, TransportConfig), CliError> {
    // 1. Fold host, port and scheme overrides into the profile
    let mut profile = profile.clone();
    if let Some(host) = &global.host {
        profile.host = host.trim().to_owned();
    }
    if global.port.is_some() {
        profile.port = global.port;
    }
    if global.no_tls {
        profile.use_tls = Some(false);
    }

    // 2. Target and credentials (file value, then keyring)
    let target = profile_to_target(&profile, profile_name)?;

    // 3. Transport
    let timeout = global
        .timeout
        .map(Duration::from_secs)
        .or_else(|| profile.timeout())
        .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    let transport = TransportConfig {
        timeout,
        danger_accept_invalid_certs: global.insecure,
    };
    Ok((target, transport))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn profile() -> Profile {
        serde_json::from_value(serde_json::json!({
            "host": "gateway.example.com",
            "port": 443,
            "appKey": "app",
            "secretKey": "secret",
            "sharedKey": "shared",
            "organization": "org",
            "timeout": 5
        }))
        .unwrap()
    }

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["bsp"];
        argv.extend_from_slice(args);
        argv.push("verify");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let (target, transport) = resolve_profile(&profile(), "default", &global(&[])).unwrap();
        assert_eq!(target.host, "gateway.example.com");
        assert_eq!(target.port, Some(443));
        assert!(target.use_tls);
        assert_eq!(transport.timeout, Duration::from_secs(5));
    }

    #[test]
    fn flags_override_profile() {
        let flags = global(&["--host", " localhost ", "--port", "8080", "--no-tls", "--timeout", "9"]);
        let (target, transport) = resolve_profile(&profile(), "default", &flags).unwrap();
        assert_eq!(target.host, "localhost");
        assert_eq!(target.port, Some(8080));
        assert!(!target.use_tls);
        assert_eq!(transport.timeout, Duration::from_secs(9));
    }

    #[test]
    fn blank_host_override_is_rejected() {
        let err = resolve_profile(&profile(), "default", &global(&["--host", "  "])).unwrap_err();
        assert!(matches!(err, CliError::Validation { ref field, .. } if field == "host"));
    }
}
