use thiserror::Error;

/// Returned by [`AvlTree::insert`](crate::AvlTree::insert) when the key is already present.
///
/// The tree is left unchanged.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("duplicate key {0}")]
pub struct DuplicateKey(pub i32);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown argument `{0}`")]
    UnknownArgument(String),
    #[error("missing value for `{0}`")]
    MissingValue(&'static str),
    #[error("invalid value `{value}` for `{flag}`")]
    InvalidValue { flag: &'static str, value: String },
    #[error("key range must be at least 1, got {0}")]
    EmptyKeyRange(i32),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WorkloadError {
    #[error("cannot sample {requested} keys from an empty key sequence")]
    EmptySample { requested: usize },
    #[error("key range must be at least 1, got {0}")]
    EmptyKeyRange(i32),
}
