use std::num::ParseIntError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid value {value:?} for {key}: {source}")]
    InvalidConfig {
        key: &'static str,
        value: String,
        source: ParseIntError,
    },
    #[error("IO error setting up dogstatsd client {0}")]
    Io(#[from] std::io::Error),
}
