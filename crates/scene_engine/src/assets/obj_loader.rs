//! OBJ file loader for 3D models
//!
//! Supports the triangle-only subset: `v`, `vn`, `vt`, `f` with three
//! `position/texcoord/normal` corners, and `o` object markers. Attribute
//! arrays are shared by every object in the file; each `o` closes the current
//! object's vertex stream and opens a new one.

use std::path::Path;

use super::parsing::{parse_indices, parse_leading};
use super::{LoadError, LoaderSettings, SceneData, SceneLoader};
use crate::foundation::math::{Transform, Vec3};
use crate::render::lighting::Light;
use crate::render::primitives::Mesh;

/// Direction of the light added to every OBJ scene
pub const DEFAULT_LIGHT_DIRECTION: [f32; 3] = [0.0, 0.0, -1.0];

/// Record kind selected by a line's first token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    Position,
    Normal,
    TexCoord,
    Face,
    NewObject,
    Ignored,
}

impl LineKind {
    fn from_token(token: &str) -> Self {
        match token {
            "v" => Self::Position,
            "vn" => Self::Normal,
            "vt" => Self::TexCoord,
            "f" => Self::Face,
            "o" => Self::NewObject,
            _ => Self::Ignored,
        }
    }
}

/// Accumulated attributes plus the current object's uncompressed stream
#[derive(Debug, Default)]
struct ObjParser {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    tex_coords: Vec<[f32; 2]>,
    stream: Vec<f32>,
}

impl ObjParser {
    /// Consume one attribute or face line
    fn parse_line(&mut self, kind: LineKind, rest: &str, line_number: usize) -> Result<(), LoadError> {
        let at_line = |error: LoadError| match error {
            LoadError::Format(message) => LoadError::Format(format!("line {line_number}: {message}")),
            other => other,
        };

        match kind {
            LineKind::Position => self.positions.push(parse_leading::<3>(rest).map_err(at_line)?),
            LineKind::Normal => self.normals.push(parse_leading::<3>(rest).map_err(at_line)?),
            LineKind::TexCoord => self.tex_coords.push(parse_leading::<2>(rest).map_err(at_line)?),
            LineKind::Face => self.add_face(rest).map_err(at_line)?,
            LineKind::NewObject | LineKind::Ignored => {}
        }
        Ok(())
    }

    fn add_face(&mut self, corners: &str) -> Result<(), LoadError> {
        let corners: Vec<&str> = corners.split_whitespace().collect();
        match corners.len() {
            3 => {}
            n if n > 3 => {
                return Err(LoadError::Format(format!(
                    "faces with {n} corners are unsupported, only triangles are accepted"
                )))
            }
            n => return Err(LoadError::Format(format!("face has only {n} corners"))),
        }

        for corner in corners {
            let indices = parse_indices(&corner.replace('/', " "))?;
            let &[position, tex_coord, normal] = indices.as_slice() else {
                return Err(LoadError::Format(format!(
                    "face corner '{corner}' must be position/texcoord/normal"
                )));
            };

            let position = lookup(&self.positions, position, "position")?;
            let tex_coord = lookup(&self.tex_coords, tex_coord, "texture coordinate")?;
            let normal = lookup(&self.normals, normal, "normal")?;

            self.stream.extend_from_slice(&position);
            self.stream.extend_from_slice(&normal);
            self.stream.extend_from_slice(&tex_coord);
        }
        Ok(())
    }

    /// Hand over the current object's stream, leaving attributes in place
    fn take_stream(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.stream)
    }
}

/// Resolve a 1-based OBJ index
fn lookup<const N: usize>(values: &[[f32; N]], index: usize, what: &str) -> Result<[f32; N], LoadError> {
    index
        .checked_sub(1)
        .and_then(|index| values.get(index))
        .copied()
        .ok_or_else(|| LoadError::Format(format!("{what} index {index} is out of range (have {})", values.len())))
}

/// Splits a line into its record kind and the remaining text
fn classify(line: &str) -> Option<(LineKind, &str)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (token, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    Some((LineKind::from_token(token), rest))
}

/// Scene loader for the OBJ-style triangle format
#[derive(Debug, Clone)]
pub struct ObjSceneLoader {
    settings: LoaderSettings,
}

impl ObjSceneLoader {
    /// Create a loader using `settings` for meshes without a material
    pub fn new(settings: LoaderSettings) -> Self {
        Self { settings }
    }

    /// The synthetic light every OBJ scene carries
    pub fn default_light() -> Light {
        Light::directional(Vec3::from(DEFAULT_LIGHT_DIRECTION), Vec3::new(1.0, 1.0, 1.0), 1.0)
    }

    /// Load only the first object of a file as a single mesh
    pub fn load_mesh(&self, path: impl AsRef<Path>) -> Result<Mesh, LoadError> {
        let source = std::fs::read_to_string(path)?;
        self.load_mesh_from_str(&source)
    }

    /// Parse only the first object of in-memory text
    ///
    /// Parsing stops at the first object marker that follows any faces.
    pub fn load_mesh_from_str(&self, source: &str) -> Result<Mesh, LoadError> {
        let mut parser = ObjParser::default();
        for (index, line) in source.lines().enumerate() {
            let Some((kind, rest)) = classify(line) else {
                continue;
            };
            if kind == LineKind::NewObject && !parser.stream.is_empty() {
                break;
            }
            parser.parse_line(kind, rest, index + 1)?;
        }

        let stream = parser.take_stream();
        if stream.is_empty() {
            return Err(LoadError::Format("no faces found".to_string()));
        }
        Ok(self.mesh_from_stream(&stream))
    }

    fn mesh_from_stream(&self, stream: &[f32]) -> Mesh {
        Mesh::from_uncompressed(stream, Transform::identity(), self.settings.default_material.clone())
    }
}

impl SceneLoader for ObjSceneLoader {
    fn load_scene_from_str(&self, source: &str) -> Result<SceneData, LoadError> {
        let mut parser = ObjParser::default();
        let mut meshes = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let Some((kind, rest)) = classify(line) else {
                continue;
            };
            if kind == LineKind::NewObject {
                let stream = parser.take_stream();
                if !stream.is_empty() {
                    meshes.push(self.mesh_from_stream(&stream));
                }
                continue;
            }
            parser.parse_line(kind, rest, index + 1)?;
        }

        let stream = parser.take_stream();
        if !stream.is_empty() {
            meshes.push(self.mesh_from_stream(&stream));
        }

        log::debug!(
            "Parsed OBJ: {} positions, {} normals, {} texture coordinates, {} objects",
            parser.positions.len(),
            parser.normals.len(),
            parser.tex_coords.len(),
            meshes.len()
        );

        Ok(SceneData {
            meshes,
            lights: vec![Self::default_light()],
        })
    }
}
