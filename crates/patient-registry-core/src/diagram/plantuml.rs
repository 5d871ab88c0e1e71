//! PlantUML rendering.

use std::fs;
use std::path::{Path, PathBuf};

use super::{DiagramError, DiagramResult, TypeDescriptor};

/// File written by [`write_diagram`].
pub const DIAGRAM_FILE_NAME: &str = "domain-models.puml";

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "storage/uml/";

const HEADER: &str = "@startuml Domain Models
!theme cerulean-outline
skinparam classAttributeIconSize 0
skinparam classFontStyle bold
skinparam backgroundColor #FEFEFE
skinparam class {
  BackgroundColor #E8F4FD
  BorderColor #1E88E5
  HeaderBackgroundColor #1E88E5
  HeaderFontColor #FFFFFF
}

";

/// An edge drawn when both ends are present in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relationship {
    pub from: &'static str,
    pub arrow: &'static str,
    pub to: &'static str,
    pub label: &'static str,
}

/// Relationships the generator knows how to draw.
pub const KNOWN_RELATIONSHIPS: &[Relationship] = &[
    Relationship {
        from: "User",
        arrow: "||--o{",
        to: "Patient",
        label: "manages",
    },
    Relationship {
        from: "Patient",
        arrow: "..>",
        to: "PatientView",
        label: "presents",
    },
];

/// Render descriptors as a PlantUML class diagram.
pub fn render(models: &[TypeDescriptor]) -> String {
    let mut content = String::from(HEADER);

    for model in models {
        render_class(&mut content, model);
    }

    content.push_str("\n' Relationships\n");
    for rel in relationships(models) {
        content.push_str(&format!("{} {} {} : {}\n", rel.from, rel.arrow, rel.to, rel.label));
    }

    content.push_str("\n@enduml\n");
    content
}

/// Known relationships whose ends are both in `models`.
pub fn relationships(models: &[TypeDescriptor]) -> Vec<Relationship> {
    let present = |name: &str| models.iter().any(|m| m.name == name);
    KNOWN_RELATIONSHIPS
        .iter()
        .filter(|rel| present(rel.from) && present(rel.to))
        .copied()
        .collect()
}

fn render_class(out: &mut String, model: &TypeDescriptor) {
    out.push_str(&format!("class {} {{\n", model.name));

    for field in &model.fields {
        out.push_str(&format!("  + {}: {}\n", field.name, field.ty));
    }
    if !model.fields.is_empty() {
        out.push_str("  --\n");
    }
    for method in &model.methods {
        out.push_str(&format!("  + {}()\n", method));
    }

    out.push_str("}\n\n");
}

/// Render `models` and write them to `output_dir/domain-models.puml`,
/// creating the directory if needed. Returns the written path.
pub fn write_diagram(models: &[TypeDescriptor], output_dir: &Path) -> DiagramResult<PathBuf> {
    if models.is_empty() {
        return Err(DiagramError::NoModels);
    }

    fs::create_dir_all(output_dir).map_err(|source| DiagramError::Io {
        path: output_dir.display().to_string(),
        source,
    })?;

    let path = output_dir.join(DIAGRAM_FILE_NAME);
    fs::write(&path, render(models)).map_err(|source| DiagramError::Io {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        models = models.len(),
        "UML diagram generated"
    );
    Ok(path)
}
