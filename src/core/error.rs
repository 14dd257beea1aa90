//

use crate::core::memory::{Addr, MemoryError};

#[derive(Debug, Fail)]
pub enum RuntimeError {
    #[fail(display = "out of memory")]
    OutOfMemory,
    #[fail(display = "missing object for address {:?}", _0)]
    MissingObject(Addr),
    #[fail(display = "undefined name '{}'", _0)]
    UndefinedName(String),
    #[fail(display = "object {:?} has no method '{}'", _0, _1)]
    NoSuchMethod(Addr, String),
    #[fail(display = "attempt to call non-callable object {:?}", _0)]
    NotCallable(Addr),
    #[fail(display = "attempt to call detached method '{}' without a receiver", _0)]
    DetachedCall(&'static str),
    #[fail(display = "expected type {}, found {}", expected, actual)]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

impl From<MemoryError> for RuntimeError {
    fn from(mem_err: MemoryError) -> Self {
        match mem_err {
            MemoryError::Full => RuntimeError::OutOfMemory,
            MemoryError::InvalidAddr(addr) => RuntimeError::MissingObject(addr),
        }
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
