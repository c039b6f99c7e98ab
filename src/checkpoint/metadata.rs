use serde::{Deserialize, Serialize};

/// Current on-disk model format version.
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Header written ahead of the network weights in a model file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub format_version: u32,
    pub input_size: usize,
    pub hidden_size: usize,
    pub action_space: usize,
    #[serde(default)]
    pub episodes_trained: usize,
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub saved_at: u64,
}
