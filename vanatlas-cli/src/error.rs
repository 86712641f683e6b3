//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::path::PathBuf;
use std::process;
use vanatlas::claims::ClaimsError;
use vanatlas::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Invalid command-line argument
    InvalidArgument(String),
    /// Engine operation failed
    Service(ServiceError),
    /// Claims API request failed
    Claims(ClaimsError),
    /// Failed to read or write a file
    File { path: PathBuf, error: std::io::Error },
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Service(ServiceError::Boundary(_)) => {
                eprintln!();
                eprintln!("Boundary data could not be loaded. Make sure:");
                eprintln!("  1. You are online (remote boundary files live on a public host)");
                eprintln!("  2. The state name is spelled as in the boundary repository");
                eprintln!("  3. Village layers exist only for states that ship them (Odisha)");
            }
            CliError::InvalidArgument(_) => {
                eprintln!();
                eprintln!("Run with --help for usage.");
            }
            CliError::Claims(_) => {
                eprintln!();
                eprintln!("Is the claims API running? Check --claims-url (default http://localhost:8000).");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::InvalidArgument(msg) => write!(f, "{}", msg),
            CliError::Service(e) => write!(f, "{}", e),
            CliError::Claims(e) => write!(f, "{}", e),
            CliError::File { path, error } => {
                write!(f, "{}: {}", path.display(), error)
            }
        }
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}

impl From<ClaimsError> for CliError {
    fn from(e: ClaimsError) -> Self {
        CliError::Claims(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_invalid_argument() {
        let err = CliError::InvalidArgument("expected lat,lon".to_string());
        assert_eq!(err.to_string(), "expected lat,lon");
    }

    #[test]
    fn test_display_file_error() {
        let err = CliError::File {
            path: PathBuf::from("/tmp/missing.kml"),
            error: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("/tmp/missing.kml"));
    }
}
