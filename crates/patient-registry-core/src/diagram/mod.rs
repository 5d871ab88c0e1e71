//! Class-diagram generation for the registry's domain types.
//!
//! Types describe themselves through [`Describe`]; the generator renders the
//! resulting [`TypeDescriptor`]s as PlantUML text.

mod descriptor;
mod plantuml;

pub use descriptor::*;
pub use plantuml::*;

use thiserror::Error;

/// Diagram errors.
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("No model types to draw")]
    NoModels,

    #[error("IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid model definition in {path}: {source}")]
    Definition {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type DiagramResult<T> = Result<T, DiagramError>;
