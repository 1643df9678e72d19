//! CLI error types with miette diagnostics.
//!
//! Maps library errors into user-facing errors with actionable help text and
//! a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use bsp_config::ConfigError;
use bsp_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const INPUT: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the BSP gateway")]
    #[diagnostic(
        code(bsp::connection_failed),
        help(
            "Check the host and port in your secret file, or override them with --host/--port.\n\
             Use --no-tls if the gateway only speaks plain HTTP."
        )
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(bsp::tls_error),
        help("Use --insecure (-k) to accept an invalid certificate.")
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed (HTTP {status})")]
    #[diagnostic(
        code(bsp::auth_failed),
        help(
            "Verify appKey, secretKey, sharedKey, and organization for profile '{profile}'.\n\
             Requests are signed with the local clock, so check it is accurate."
        )
    )]
    AuthFailed { status: u16, profile: String },

    #[error("No {field} configured for profile '{profile}'")]
    #[diagnostic(
        code(bsp::no_credentials),
        help(
            "Add \"{field}\" to the profile in your secret file, set BSP_{env_profile}__{env_field},\n\
             or store it in the system keyring under service 'bsp', user '{profile}/{field}'."
        )
    )]
    NoCredentials {
        profile: String,
        field: String,
        env_profile: String,
        env_field: String,
    },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(bsp::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Permission denied (HTTP 403)")]
    #[diagnostic(
        code(bsp::permission_denied),
        help("The technical user behind these credentials lacks the role for this call.\n{body}")
    )]
    PermissionDenied { body: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("BSP API error (HTTP {status})")]
    #[diagnostic(code(bsp::api_error), help("Response body:\n{body}"))]
    ApiError { status: u16, body: String },

    #[error("{message}")]
    #[diagnostic(code(bsp::request_failed))]
    Request { message: String },

    // ── Input ────────────────────────────────────────────────────────

    #[error("{message}")]
    #[diagnostic(code(bsp::input), help("Fix the input file and run the command again."))]
    Input { message: String },

    #[error("File not found: {path}")]
    #[diagnostic(code(bsp::missing_file))]
    MissingFile { path: String },

    #[error("Failed to read {path}")]
    #[diagnostic(code(bsp::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(bsp::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in the secret file")]
    #[diagnostic(
        code(bsp::profile_not_found),
        help("Available profiles: {available}\nSelect one with --profile or BSP_PROFILE.")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No profiles configured")]
    #[diagnostic(
        code(bsp::no_config),
        help(
            "Create a secret file or point --secret-file / BSP_SECRET_FILE at one.\n\
             Looked in: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("{message}")]
    #[diagnostic(code(bsp::config))]
    Config { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            Self::Input { .. } | Self::MissingFile { .. } | Self::Io { .. } => exit_code::INPUT,
            Self::ApiError { .. }
            | Self::Request { .. }
            | Self::NoConfig { .. }
            | Self::Config { .. } => exit_code::GENERAL,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<bsp_api::Error> for CliError {
    fn from(err: bsp_api::Error) -> Self {
        match err {
            bsp_api::Error::Api { status: 401, .. } => CliError::AuthFailed {
                status: 401,
                profile: "current".into(),
            },
            bsp_api::Error::Api { status: 403, body } => CliError::PermissionDenied { body },
            bsp_api::Error::Api { status, body } => CliError::ApiError { status, body },
            bsp_api::Error::Transport(e) if e.is_connect() || e.is_timeout() => {
                CliError::ConnectionFailed { source: e.into() }
            }
            bsp_api::Error::Tls(message) => CliError::TlsError { message },
            other => CliError::Request {
                message: other.to_string(),
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Api(e) => e.into(),

            CoreError::EnterpriseUnitNotFound { name } => CliError::NotFound {
                resource_type: "Enterprise unit".into(),
                identifier: name,
            },

            CoreError::MissingFile { path } => CliError::MissingFile {
                path: path.display().to_string(),
            },

            CoreError::Io { path, source } => CliError::Io {
                path: path.display().to_string(),
                source,
            },

            other @ (CoreError::AmbiguousEnterpriseUnit { .. }
            | CoreError::Json { .. }
            | CoreError::Csv(_)
            | CoreError::InvalidRow { .. }
            | CoreError::EmptyInput { .. }
            | CoreError::InvalidInput { .. }) => CliError::Input {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoConfig { path } => CliError::NoConfig { path },
            ConfigError::ProfileNotFound { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            ConfigError::NoCredentials { profile, field } => CliError::NoCredentials {
                env_profile: profile.to_uppercase(),
                env_field: screaming_snake(&field),
                profile,
                field,
            },
            ConfigError::Figment(e) => CliError::Config {
                message: e.to_string(),
            },
        }
    }
}

/// `secretKey` -> `SECRET_KEY`, the spelling environment overrides use.
fn screaming_snake(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_ascii_uppercase() && !out.is_empty() {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
    }
    out
}
