use miette::Diagnostic;
use thiserror::Error;

/// A malformed command line. Reported and the read-eval loop continues.
#[derive(Debug, Clone, Error, Diagnostic, PartialEq, Eq)]
pub enum ParseError {
    #[error("Missing command.")]
    #[diagnostic(code(jsh::parse::missing_command))]
    MissingCommand,

    #[error("Expected a file name after '{operator}'.")]
    #[diagnostic(code(jsh::parse::missing_redirect_target))]
    MissingRedirectTarget { operator: char },

    #[error("Duplicate {kind} redirection.")]
    #[diagnostic(code(jsh::parse::duplicate_redirect))]
    DuplicateRedirect { kind: &'static str },

    #[error("Unexpected token '{token}'.")]
    #[diagnostic(
        code(jsh::parse::unexpected_token),
        help("'&' may only appear at the end of a command line.")
    )]
    UnexpectedToken { token: String },
}
