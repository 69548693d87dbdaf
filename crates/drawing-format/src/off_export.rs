use std::fmt::Write;

use solid_kernel::Polyhedron;

use crate::errors::ExportError;

/// Write a polyhedron as Object File Format text: a header, the vertex
/// count line, one line per vertex, then one index list per face.
pub fn export_off(solid: &Polyhedron) -> Result<String, ExportError> {
    if solid.is_empty() {
        return Err(ExportError::NoSolid);
    }
    let len = solid.vertices.len();
    for (face, indices) in solid.faces.iter().enumerate() {
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(ExportError::InvalidFace { face, index, len });
        }
    }

    let mut out = String::new();
    let fmt = |e: std::fmt::Error| ExportError::Serialize(e.to_string());
    writeln!(out, "OFF").map_err(fmt)?;
    writeln!(out, "{} {} 0", len, solid.faces.len()).map_err(fmt)?;
    for v in &solid.vertices {
        writeln!(out, "{} {} {}", v.x, v.y, v.z).map_err(fmt)?;
    }
    for face in &solid.faces {
        write!(out, "{}", face.len()).map_err(fmt)?;
        for i in face {
            write!(out, " {i}").map_err(fmt)?;
        }
        out.push('\n');
    }
    Ok(out)
}
