use thiserror::Error;

/// Everything that can go wrong while building, drawing from, or adjusting
/// a weight table.
///
/// Errors are local to the call that raised them. A failed mutation leaves
/// the table exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SampleError {
    #[error("weight must be positive and finite, got {weight}")]
    InvalidWeight { weight: f64 },

    #[error("a group needs at least one member")]
    EmptyGroup,

    #[error("value is not registered")]
    NotRegistered,

    #[error("no values registered")]
    NoValuesRegistered,

    #[error("total weight is zero or negative")]
    ZeroTotalWeight,

    #[error("invalid sample count {requested}")]
    InvalidCount {
        requested: usize,
        available: Option<usize>,
    },

    #[error("gave up after {attempts} rejected draws with {collected} distinct values collected")]
    ExhaustedAttempts { attempts: usize, collected: usize },

    #[error("decaying weight {weight} by {factor} would leave nothing")]
    DecayUnderflow { weight: f64, factor: f64 },

    #[error("factor {factor} is out of range")]
    InvalidFactor { factor: f64 },

    #[error("adjustment strength must be in (0, 1], got {strength}")]
    InvalidStrength { strength: f64 },

    #[error("bag would hold {tickets} tickets, more than the limit of {max}")]
    BagTooLarge { tickets: f64, max: usize },

    #[error("nested sampler is already drawing (registered inside itself?)")]
    CyclicNesting,
}

pub type Result<T, E = SampleError> = std::result::Result<T, E>;

/// Positive and finite, the only weights a table accepts.
pub(crate) fn check_weight(weight: f64) -> Result<f64> {
    if weight.is_finite() && weight > 0.0 {
        Ok(weight)
    } else {
        Err(SampleError::InvalidWeight { weight })
    }
}
