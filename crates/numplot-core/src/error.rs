use thiserror::Error;

#[derive(Debug, Error)]
pub enum NumError {
    #[error("could not convert string to float: '{0}'")]
    InvalidNumber(String),

    #[error("non-finite value: '{0}'")]
    NonFinite(String),

    #[error("{op} requires at least {required} samples, got {got}")]
    TooFewSamples {
        op: &'static str,
        required: usize,
        got: usize,
    },

    #[error("length mismatch: {0} x-values, {1} y-values")]
    LengthMismatch(usize, usize),

    #[error("x-values must be strictly increasing")]
    NotSorted,

    #[error("least-squares system is singular")]
    Singular,

    #[error("invalid image name: {0}")]
    InvalidName(String),

    #[error("plot error: {0}")]
    Plot(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NumResult<T> = Result<T, NumError>;
