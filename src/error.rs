use thiserror::Error;

/// Precondition violations detected before a matching run starts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssignError {
    #[error("at least one property must be selected for scoring")]
    NoProperties,

    #[error("at least one role requirement is needed to build teams")]
    NoRoles,

    #[error("role \"{0}\" must require at least one student")]
    ZeroCount(String),
}

/// Failures while reading role requirements from the command line or a file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("role spec \"{0}\" must look like ROLE=COUNT")]
    MalformedRole(String),

    #[error("role name is empty in \"{0}\"")]
    EmptyRoleName(String),

    #[error("count for role \"{role}\" is not a whole number: \"{value}\"")]
    InvalidCount { role: String, value: String },

    #[error("{var} must be a whole number, got \"{value}\"")]
    InvalidSeed { var: &'static str, value: String },

    #[error("could not parse roles file: {0}")]
    RolesFile(#[from] serde_json::Error),

    #[error(transparent)]
    Assign(#[from] AssignError),
}
