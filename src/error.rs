use std::path::PathBuf;

use thiserror::Error;

use crate::models::LayerId;

/// Errors raised while loading or walking a map contents snapshot.
#[derive(Debug, Error)]
pub enum ContentsError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid contents document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Root layer {0} is not part of the snapshot")]
    MissingRoot(LayerId),

    #[error("Layer {parent} references unknown sublayer {id}")]
    UnknownLayer { parent: LayerId, id: LayerId },

    #[error("Layer id {id} is used by more than one record")]
    DuplicateLayer { id: LayerId },

    #[error("Layer {id} ({name}) is reachable more than once; the contents are not a tree")]
    Cycle { id: LayerId, name: String },
}
