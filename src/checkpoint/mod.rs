//! Model persistence: a versioned single-file format holding network
//! parameters and a small JSON header.

mod metadata;
mod model_file;

pub use metadata::{ModelMetadata, MODEL_FORMAT_VERSION};
pub use model_file::{read_model_file, write_model_file, MODEL_MAGIC};
