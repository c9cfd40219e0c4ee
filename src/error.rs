//! Error types for grammar construction and turtle execution.

use thiserror::Error;

/// Failure to compile a single draw-command string.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("unknown draw primitive `{name}`")]
    UnknownPrimitive { name: String },

    #[error("`{name}` expects {} argument(s), found {found}", arity_range(.min, .max))]
    Arity {
        name: &'static str,
        min: usize,
        max: usize,
        found: usize,
    },

    #[error("`{name}`: invalid numeric argument `{token}`")]
    InvalidNumber { name: &'static str, token: String },

    #[error("`{name}`: invalid color `{token}`")]
    InvalidColor { name: &'static str, token: String },
}

fn arity_range(min: &usize, max: &usize) -> String {
    if min == max {
        min.to_string()
    } else {
        format!("{min} to {max}")
    }
}

/// Invalid set of weighted alternatives.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightError {
    #[error("no alternatives to choose from")]
    Empty,

    #[error("weight {weight} at index {index} is negative or not finite")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("all weights are zero")]
    AllZero,

    #[error("weights sum to a non-finite total")]
    TotalOverflow,
}

/// A grammar definition that cannot be turned into an [`LSystem`](crate::LSystem).
///
/// Always raised at construction time, never during growth or rendering.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("draw rule for symbol `{symbol}`: {source}")]
    Command {
        symbol: char,
        #[source]
        source: CommandError,
    },

    #[error("production rule for symbol `{symbol}`: {source}")]
    Production {
        symbol: char,
        #[source]
        source: WeightError,
    },
}

/// Execution-time failures of the turtle's save stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurtleError {
    #[error("restoreState called with an empty save stack")]
    EmptyStack,

    #[error("saveState exceeded the maximum stack depth of {max_depth}")]
    StackOverflow { max_depth: usize },
}
