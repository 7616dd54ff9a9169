/// Everything that can go wrong when asking the region finder for an answer.
///
/// All variants are raised before any state is touched, so a failed call leaves the
/// last successful region collection in place.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FinderError {
    /// An analysis operation was called before an image was set.
    #[error("no image to analyze; call set_image first")]
    InvalidState,
    /// `largest_region` was called on an empty region collection.
    #[error("no regions were found")]
    EmptyResult,
    /// A seed or sample coordinate falls outside the image.
    #[error("point ({x}, {y}) is outside the {width}x{height} image")]
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    /// A frame could not be handed to, or answered by, a pipeline worker.
    #[error("region finder worker is unavailable")]
    WorkerUnavailable,
}

pub type Result<T> = std::result::Result<T, FinderError>;
