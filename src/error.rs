use thiserror::Error;

/// Contract violations reported by the checked (`try_*`) list operations.
///
/// The unchecked operations panic with the same message instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ListError {
    /// Position is not a valid index for the operation
    #[error("position {pos} out of range for list of length {len}")]
    PositionOutOfRange {
        /// Requested position
        pos: usize,
        /// List length at the time of the call
        len: usize,
    },
    /// `pos..pos + count` does not lie inside the list
    #[error("range {pos}..{pos}+{count} out of bounds for list of length {len}")]
    RangeOutOfBounds {
        /// First position of the range
        pos: usize,
        /// Number of elements in the range
        count: usize,
        /// List length at the time of the call
        len: usize,
    },
    /// A producer was removed while none were registered
    #[error("no producers registered")]
    NoProducers,
}
