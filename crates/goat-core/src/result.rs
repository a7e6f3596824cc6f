use crate::error::GoatError;

pub type GoatResult<T> = Result<T, GoatError>;
