/// Errors produced while parsing, evaluating, or templating expressions.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unrecognized expression kind '{0}'")]
    UnrecognizedExpressionKind(String),

    #[error("'{kind}' expression is missing field '{field}'")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("'{kind}' expression does not take field '{field}'")]
    UnexpectedField {
        kind: &'static str,
        field: &'static str,
    },

    #[error("expression nested deeper than {limit} levels")]
    TooDeep { limit: usize },

    #[error("integer overflow adding {left} and {right}")]
    Overflow { left: i64, right: i64 },

    #[error("parse error: {0}")]
    Parse(String),

    #[error("expected {0} to be a yaml map")]
    ExpectedMap(&'static str),

    #[error("invalid template config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
