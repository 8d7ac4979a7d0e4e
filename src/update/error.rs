use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("{operator} on '{field}' requires a numeric operand, got {value}")]
    NonNumericOperand {
        operator: &'static str,
        field: String,
        value: String,
    },

    #[error("{operator} on '{field}' requires a numeric current value, got {value}")]
    NonNumericField {
        operator: &'static str,
        field: String,
        value: String,
    },

    #[error("Result of {operator} on '{field}' is not a finite number")]
    NonFinite { operator: &'static str, field: String },
}

/// Failures of the `$expr` evaluator. These never escape the applier.
#[derive(Error, Debug, PartialEq)]
pub enum ExprError {
    #[error("unexpected character '{0}' at {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown name '{0}'")]
    UnknownIdentifier(String),

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("unexpected input after token {0}")]
    TrailingInput(usize),

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("division by zero")]
    DivisionByZero,

    #[error("current value is not numeric")]
    NonNumericCurrent,

    #[error("result is not a finite number")]
    NonFinite,
}
