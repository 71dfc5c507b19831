use thiserror::Error;
use crate::backend::environment::BackendError;
use crate::environment::FrontendError;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Frontend(#[from] FrontendError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
