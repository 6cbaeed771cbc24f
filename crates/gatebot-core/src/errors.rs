/// Core error type.
///
/// Adapter crates map their specific errors into this type so startup and
/// send failures surface consistently at the process entry point.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
