use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by this program itself. Transport and JSON errors pass through
/// `anyhow` untouched.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("client secret file not found: {}", .0.display())]
    MissingClientSecret(PathBuf),
    #[error("client secret file is invalid")]
    InvalidClientSecret(#[source] std::io::Error),
    #[error("could not determine the home directory for the token store")]
    NoHomeDir,
    #[error("authorization failed")]
    Authorization(#[source] yup_oauth2::Error),
    #[error("fitness API returned {status}: {body}")]
    Api { status: u16, body: String },
}

/// The two buckets a failed run is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Io,
    Credential,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Io => f.write_str("I/O"),
            FailureKind::Credential => f.write_str("credential"),
        }
    }
}

/// Sorts a top-level error into a [`FailureKind`] by walking its cause chain.
pub fn classify(err: &anyhow::Error) -> FailureKind {
    for cause in err.chain() {
        if let Some(fit) = cause.downcast_ref::<FitError>() {
            return match fit {
                FitError::MissingClientSecret(_)
                | FitError::InvalidClientSecret(_)
                | FitError::Authorization(_) => FailureKind::Credential,
                FitError::Api { status, .. } if *status == 401 || *status == 403 => {
                    FailureKind::Credential
                }
                FitError::NoHomeDir | FitError::Api { .. } => FailureKind::Io,
            };
        }
    }
    FailureKind::Io
}
