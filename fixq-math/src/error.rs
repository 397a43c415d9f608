//! Fixed-point error types

use core::fmt;

use thiserror::Error;

/// The arithmetic step that produced an [`FixedPointError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Sub,
    Neg,
    Mul,
    Div,
    MulInt,
    DivInt,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Add => "addition",
            Operation::Sub => "subtraction",
            Operation::Neg => "negation",
            Operation::Mul => "multiplication",
            Operation::Div => "division",
            Operation::MulInt => "integer multiplication",
            Operation::DivInt => "integer division",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("Overflow during fixed-point {op}: result does not fit in 32 bits")]
    Overflow { op: Operation },

    #[error("Integer {value} is outside the fixed-point range [{min}, {max}]")]
    OutOfRange { value: i64, min: i32, max: i32 },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Invalid fixed-point literal")]
    InvalidLiteral,
}

pub type Result<T> = core::result::Result<T, FixedPointError>;

/// Reports a fault to the log before handing it back to the caller.
#[inline]
pub(crate) fn fault(err: FixedPointError) -> FixedPointError {
    log::debug!("fixed-point fault: {err}");
    err
}
