//! Static type descriptors.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{DiagramError, DiagramResult};
use crate::models::{Patient, PatientView};

/// A public field and its type, as shown in a diagram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

impl FieldDescriptor {
    pub fn new(name: &str, ty: &str) -> Self {
        Self {
            name: name.to_string(),
            ty: ty.to_string(),
        }
    }
}

/// Public shape of one record type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeDescriptor {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub methods: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Builder: add a field.
    pub fn field(mut self, name: &str, ty: &str) -> Self {
        self.fields.push(FieldDescriptor::new(name, ty));
        self
    }

    /// Builder: add a method.
    pub fn method(mut self, name: &str) -> Self {
        self.methods.push(name.to_string());
        self
    }
}

/// Types that can describe their public fields and methods.
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

impl Describe for Patient {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("Patient")
            .field("id", "string")
            .field("name", "string")
            .field("surname", "string")
            .field("birthdate", "date")
            .field("cpf", "string")
            .field("role", "string?")
            .field("education", "string?")
            .field("mother_name", "string")
            .field("email", "string")
            .field("created_at", "timestamp")
            .field("updated_at", "timestamp")
            .method("new")
            .method("full_name")
            .method("apply")
    }
}

impl Describe for PatientView {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::new("PatientView")
            .field("id", "string")
            .field("name", "string")
            .field("display_name", "string")
            .field("email", "string")
            .field("formatted_cpf", "string")
            .field("age", "int")
            .field("category", "AgeCategory")
            .method("to_json")
    }
}

/// Descriptors for every domain type in the registry.
pub fn domain_models() -> Vec<TypeDescriptor> {
    vec![Patient::describe(), PatientView::describe()]
}

/// Load descriptors from every `*.json` file in `dir`, ordered by file name.
pub fn load_descriptors(dir: &Path) -> DiagramResult<Vec<TypeDescriptor>> {
    let io_err = |source| DiagramError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let raw = fs::read_to_string(path).map_err(|source| DiagramError::Io {
                path: path.display().to_string(),
                source,
            })?;
            serde_json::from_str(&raw).map_err(|source| DiagramError::Definition {
                path: path.display().to_string(),
                source,
            })
        })
        .collect()
}
