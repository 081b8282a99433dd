//! Kind of content carried by entries and messages

use serde::Deserialize;
use serde::Serialize;

/// Content kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// Written content, content is required
    Text,
    /// Recorded content, a video URL is required
    Video,
}
