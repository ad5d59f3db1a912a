use thiserror::Error;

/// The analysis collaborator could not produce a song.
///
/// This is the only failure that should ever reach the user; range and
/// state-precondition issues elsewhere in the crate clamp or no-op instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input was not a decodable audio stream.
    #[error("Input is not a decodable audio stream: {0}")]
    Undecodable(String),

    /// A newer load request superseded this one before it finished.
    #[error("Analysis was superseded by a newer request")]
    Superseded,
}
