//! COLLADA-style scene loader
//!
//! The document is read in two passes: lights, then materials and meshes.
//! Elements are located by bounded structural search rather than fixed
//! paths, so exporter-specific wrapping elements are tolerated.

use std::collections::HashMap;

use roxmltree::{Document, Node};

use super::search::{element_children, find_all, find_first, id_attribute, name_attribute, text, TagMatch};
use crate::assets::parsing::{parse_fixed, parse_float, parse_floats, parse_indices};
use crate::assets::vertex_indexer::VERTEX_STRIDE;
use crate::assets::{LoadError, LoaderSettings, SceneData, SceneLoader};
use crate::foundation::math::{quat_from_euler_degrees, uniform_scale, Mat4, Transform, Vec3, Vec4};
use crate::render::lighting::Light;
use crate::render::material::Material;
use crate::render::primitives::Mesh;

/// Identifying substring of the position source
pub const POSITION_SOURCE: &str = "mesh-positions";
/// Identifying substring of the normal source
pub const NORMAL_SOURCE: &str = "mesh-normals";
/// Identifying substring of the first texture coordinate set's source
pub const TEX_COORD_SOURCE: &str = "mesh-map-0";

/// Index stream entries per triangle: position/normal/texcoord for 3 corners
const INDICES_PER_TRIANGLE: usize = 9;

/// Point light influence distance derived from its intensity
///
/// Empirical tuning, not a physical falloff.
pub fn point_light_radius(intensity: f32) -> f32 {
    (intensity + 1.0) * 0.5
}

/// Split a raw color into a color with no channel above 1 and an intensity
///
/// The intensity is the largest channel; the color is divided by it only
/// when it exceeds 1.
pub fn normalize_light_color(raw: Vec3) -> (Vec3, f32) {
    let intensity = raw.max();
    if intensity > 1.0 {
        (raw / intensity, intensity)
    } else {
        (raw, intensity)
    }
}

/// Scene loader for the COLLADA-style XML format
#[derive(Debug, Clone)]
pub struct ColladaSceneLoader {
    settings: LoaderSettings,
}

impl ColladaSceneLoader {
    /// Create a loader using `settings` for default materials
    pub fn new(settings: LoaderSettings) -> Self {
        Self { settings }
    }
}

impl SceneLoader for ColladaSceneLoader {
    fn load_scene_from_str(&self, source: &str) -> Result<SceneData, LoadError> {
        let document = Document::parse(source).map_err(|error| LoadError::Xml(error.to_string()))?;
        let scene = ColladaScene::new(document.root_element());

        let lights = scene.lights()?;
        let meshes = scene.meshes(&self.settings)?;
        Ok(SceneData { meshes, lights })
    }
}

/// One parsed document plus the lookups shared by both passes
struct ColladaScene<'a, 'input> {
    root: Node<'a, 'input>,
    visual_scene: Option<Node<'a, 'input>>,
}

impl<'a, 'input> ColladaScene<'a, 'input> {
    fn new(root: Node<'a, 'input>) -> Self {
        Self {
            root,
            visual_scene: find_first(root, "visual_scene", 4, TagMatch::Exact)
                .or_else(|| find_first(root, "visual_scene", 4, TagMatch::Contains)),
        }
    }

    // ---- lights ----

    fn lights(&self) -> Result<Vec<Light>, LoadError> {
        let Some(library) = find_first(self.root, "library_lights", 10, TagMatch::Contains) else {
            return Ok(Vec::new());
        };

        let mut lights = Vec::new();
        for entry in element_children(library) {
            let Some(name) = name_attribute(entry) else {
                log::debug!("Skipping unnamed light entry");
                continue;
            };

            if let Some(point) = find_first(entry, "point", 10, TagMatch::Contains) {
                let (color, intensity) = light_color(point, name)?;
                let transform = self.node_transform(name, true)?;
                lights.push(Light::point(transform.position, color, intensity, point_light_radius(intensity)));
            } else if let Some(directional) = find_first(entry, "directional", 10, TagMatch::Contains) {
                let (color, intensity) = light_color(directional, name)?;
                let transform = self.node_transform(name, false)?;
                lights.push(Light::directional(transform.rotation * -Vec3::y(), color, intensity));
            } else {
                log::debug!("Skipping light '{}': neither point nor directional", name);
            }
        }
        Ok(lights)
    }

    // ---- materials ----

    /// Diffuse tint per material id
    fn material_tints(&self) -> Result<HashMap<String, Vec4>, LoadError> {
        let mut tints = HashMap::new();
        let Some(library) = find_first(self.root, "library_materials", 2, TagMatch::Contains) else {
            return Ok(tints);
        };
        let effects = find_first(self.root, "library_effects", 2, TagMatch::Contains)
            .map(|library| find_all(library, "effect", 8))
            .unwrap_or_default();

        for material in find_all(library, "material", 8) {
            let Some(material_id) = id_attribute(material) else {
                continue;
            };
            let Some(effect_id) = effect_reference(material) else {
                log::debug!("Material '{}' references no effect", material_id);
                continue;
            };

            let effect = effects
                .iter()
                .copied()
                .find(|effect| {
                    id_attribute(*effect)
                        .is_some_and(|id| id.to_ascii_lowercase().contains(&effect_id.to_ascii_lowercase()))
                })
                .ok_or_else(|| {
                    LoadError::Data(format!("material '{material_id}' references unknown effect '{effect_id}'"))
                })?;

            tints.insert(material_id.to_owned(), diffuse_tint(effect)?);
        }
        Ok(tints)
    }

    // ---- meshes ----

    fn meshes(&self, settings: &LoaderSettings) -> Result<Vec<Mesh>, LoadError> {
        let tints = self.material_tints()?;
        let Some(library) = find_first(self.root, "library_geometries", 2, TagMatch::Contains) else {
            return Ok(Vec::new());
        };

        let mut meshes = Vec::new();
        for geometry in find_all(library, "geometry", 1) {
            let Some(name) = name_attribute(geometry) else {
                log::debug!("Skipping unnamed geometry");
                continue;
            };

            let transform = self.node_transform(name, false)?;
            let triangles = find_first(geometry, "triangles", 3, TagMatch::Contains)
                .ok_or_else(|| LoadError::Data(format!("geometry '{name}' has no triangle block")))?;
            let stream = triangle_stream(geometry, triangles, name)?;

            let material = match triangles
                .attributes()
                .find(|attribute| attribute.name().to_ascii_lowercase().contains("material"))
                .map(|attribute| attribute.value())
                .filter(|value| !value.is_empty())
            {
                Some(material_id) => {
                    let tint = tints.get(material_id).ok_or_else(|| {
                        LoadError::Data(format!("geometry '{name}' uses unknown material '{material_id}'"))
                    })?;
                    Material::new(settings.default_texture()).with_diffuse_tint(*tint)
                }
                None => settings.default_material.clone(),
            };

            meshes.push(Mesh::from_uncompressed(&stream, transform, material));
        }
        Ok(meshes)
    }

    // ---- scene graph ----

    fn scene_node(&self, name: &str) -> Option<Node<'a, 'input>> {
        let visual_scene = self.visual_scene?;
        find_all(visual_scene, "node", 2)
            .into_iter()
            .find(|node| name_attribute(*node) == Some(name))
    }

    /// Transform of the scene node named `name`
    ///
    /// Reads translate/rotate/scale children, or decomposes a combined matrix
    /// when no translate is present.
    fn node_transform(&self, name: &str, position_only: bool) -> Result<Transform, LoadError> {
        let node = self
            .scene_node(name)
            .ok_or_else(|| LoadError::Data(format!("no scene node named '{name}'")))?;

        let Some(translate) = find_first(node, "translate", 2, TagMatch::Contains) else {
            return matrix_transform(node, name, position_only);
        };
        let position = Vec3::from(parse_fixed::<3>(text(translate))?);
        if position_only {
            return Ok(Transform::from_position(position));
        }

        let rotations = find_all(node, "rotate", 1);
        let angle = |axis: &str| -> Result<f32, LoadError> {
            let element = rotations
                .iter()
                .find(|rotation| rotation.attributes().any(|attribute| attribute.value().contains(axis)))
                .ok_or_else(|| LoadError::Data(format!("node '{name}' has no {axis} entry")))?;
            let token = text(*element)
                .split_whitespace()
                .nth(3)
                .ok_or_else(|| LoadError::Format(format!("node '{name}' {axis} entry has no angle")))?;
            parse_float(token)
        };
        let rotation = quat_from_euler_degrees(angle("rotationX")?, angle("rotationY")?, angle("rotationZ")?);

        let scale = find_first(node, "scale", 2, TagMatch::Contains)
            .ok_or_else(|| LoadError::Data(format!("node '{name}' has no scale")))?;
        let scale = uniform_scale(&Vec3::from(parse_fixed::<3>(text(scale))?));

        Ok(Transform::new(position, rotation, scale))
    }
}

fn matrix_transform(node: Node<'_, '_>, name: &str, position_only: bool) -> Result<Transform, LoadError> {
    let matrix = find_first(node, "matrix", 2, TagMatch::Contains)
        .ok_or_else(|| LoadError::Data(format!("node '{name}' has neither translate nor matrix")))?;
    let matrix = Mat4::from_row_slice(&parse_fixed::<16>(text(matrix))?);

    if position_only {
        return Ok(Transform::from_position(Vec3::new(matrix.m14, matrix.m24, matrix.m34)));
    }
    Transform::from_matrix(&matrix)
        .ok_or_else(|| LoadError::Data(format!("node '{name}' has a degenerate matrix")))
}

/// Color of a light definition split into color and intensity
fn light_color(definition: Node<'_, '_>, name: &str) -> Result<(Vec3, f32), LoadError> {
    let color = find_first(definition, "color", 10, TagMatch::Contains)
        .ok_or_else(|| LoadError::Data(format!("light '{name}' has no color")))?;
    Ok(normalize_light_color(Vec3::from(parse_fixed::<3>(text(color))?)))
}

/// Effect id a material instantiates, without the leading '#'
fn effect_reference<'a>(material: Node<'a, '_>) -> Option<&'a str> {
    material
        .descendants()
        .skip(1)
        .find_map(|node| node.attribute("url"))
        .map(|url| url.trim_start_matches('#'))
        .filter(|url| !url.is_empty())
}

/// Diffuse color of an effect; white when the diffuse slot holds no color
fn diffuse_tint(effect: Node<'_, '_>) -> Result<Vec4, LoadError> {
    let color = find_first(effect, "diffuse", 10, TagMatch::Contains)
        .and_then(|diffuse| find_first(diffuse, "color", 2, TagMatch::Contains));
    match color {
        Some(color) => Ok(Vec4::from(parse_fixed::<4>(text(color))?)),
        None => {
            log::debug!("Effect '{}' has no diffuse color", id_attribute(effect).unwrap_or("?"));
            Ok(Vec4::new(1.0, 1.0, 1.0, 1.0))
        }
    }
}

/// Float array of the source whose id contains `key`
fn source_array(sources: &[Node<'_, '_>], key: &str, geometry: &str) -> Result<Vec<f32>, LoadError> {
    let source = sources
        .iter()
        .find(|source| id_attribute(**source).is_some_and(|id| id.to_ascii_lowercase().contains(key)))
        .ok_or_else(|| LoadError::Data(format!("geometry '{geometry}' has no '{key}' source")))?;

    let values = find_first(*source, "float_array", 1, TagMatch::Contains).map_or_else(
        || source.descendants().filter_map(|node| node.text()).collect::<Vec<_>>().join(" "),
        |array| text(array).to_owned(),
    );
    parse_floats(&values)
}

/// Expand a triangle block into the uncompressed 8-float-per-corner stream
fn triangle_stream(geometry: Node<'_, '_>, triangles: Node<'_, '_>, name: &str) -> Result<Vec<f32>, LoadError> {
    let sources = find_all(geometry, "source", 3);
    let positions = source_array(&sources, POSITION_SOURCE, name)?;
    let normals = source_array(&sources, NORMAL_SOURCE, name)?;
    let tex_coords = source_array(&sources, TEX_COORD_SOURCE, name)?;

    let primitives = find_first(triangles, "p", 1, TagMatch::Exact)
        .ok_or_else(|| LoadError::Data(format!("geometry '{name}' has no index stream")))?;
    let indices = parse_indices(text(primitives))?;
    if indices.len() % INDICES_PER_TRIANGLE != 0 {
        return Err(LoadError::Format(format!(
            "geometry '{name}' index stream length {} is not a multiple of {INDICES_PER_TRIANGLE}",
            indices.len()
        )));
    }

    let out_of_range =
        |what: &str, index: usize| LoadError::Format(format!("geometry '{name}' {what} index {index} is out of range"));

    let mut stream = Vec::with_capacity(indices.len() / 3 * VERTEX_STRIDE);
    for corner in indices.chunks_exact(3) {
        stream.extend_from_slice(attribute(&positions, corner[0], 3).ok_or_else(|| out_of_range("position", corner[0]))?);
        stream.extend_from_slice(attribute(&normals, corner[1], 3).ok_or_else(|| out_of_range("normal", corner[1]))?);
        stream.extend_from_slice(
            attribute(&tex_coords, corner[2], 2).ok_or_else(|| out_of_range("texture coordinate", corner[2]))?,
        );
    }
    Ok(stream)
}

/// The `index`-th record of `width` floats
fn attribute(values: &[f32], index: usize, width: usize) -> Option<&[f32]> {
    let start = index.checked_mul(width)?;
    values.get(start..start.checked_add(width)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::lighting::LightType;
    use approx::assert_relative_eq;

    fn loader() -> ColladaSceneLoader {
        ColladaSceneLoader::new(LoaderSettings::with_default_texture("resources/crateTex.png"))
    }

    fn light_document(color: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_lights>
    <light id="Lamp-light" name="Lamp">
      <technique_common>
        <point>
          <color sid="color">{color}</color>
        </point>
      </technique_common>
    </light>
  </library_lights>
  <library_visual_scenes>
    <visual_scene id="Scene" name="Scene">
      <node id="Lamp" name="Lamp" type="NODE">
        <translate sid="location">4 5 -1</translate>
        <rotate sid="rotationZ">0 0 1 0</rotate>
        <rotate sid="rotationY">0 1 0 0</rotate>
        <rotate sid="rotationX">1 0 0 0</rotate>
        <scale sid="scale">1 1 1</scale>
      </node>
    </visual_scene>
  </library_visual_scenes>
</COLLADA>"#
        )
    }

    #[test]
    fn test_bright_point_light_is_rescaled() {
        let scene = loader().load_scene_from_str(&light_document("2 0 0")).unwrap();

        assert_eq!(scene.lights.len(), 1);
        let light = scene.lights[0];
        assert_eq!(light.light_type(), LightType::Point);
        assert_eq!(light.intensity(), 2.0);
        assert_eq!(light.color(), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(light.radius(), Some(1.5));
        assert_eq!(light.internal_vector(), Vec4::new(4.0, 5.0, -1.0, 1.0));
    }

    #[test]
    fn test_dim_light_keeps_color() {
        let (color, intensity) = normalize_light_color(Vec3::new(0.5, 0.25, 0.0));
        assert_eq!(color, Vec3::new(0.5, 0.25, 0.0));
        assert_eq!(intensity, 0.5);
    }

    #[test]
    fn test_missing_light_node_is_data_error() {
        let document = light_document("1 1 1").replace(r#"name="Lamp" type"#, r#"name="Other" type"#);
        assert!(matches!(loader().load_scene_from_str(&document), Err(LoadError::Data(_))));
    }

    #[test]
    fn test_directional_light_rotates_down_axis() {
        let document = light_document("1 1 1")
            .replace("<point>", "<directional>")
            .replace("</point>", "</directional>")
            .replace(r#"<rotate sid="rotationX">1 0 0 0</rotate>"#, r#"<rotate sid="rotationX">1 0 0 90</rotate>"#);

        let scene = loader().load_scene_from_str(&document).unwrap();
        let light = scene.lights[0];

        assert_eq!(light.light_type(), LightType::Directional);
        // -Y rotated 90° about X points to -Z
        let direction = light.internal_vector();
        assert_relative_eq!(direction.xyz(), Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
        assert_eq!(direction.w, 0.0);
    }

    #[test]
    fn test_sources_are_found_by_id() {
        let document = roxmltree::Document::parse(
            r#"<mesh>
  <source id="Cube-mesh-positions"><float_array id="Cube-mesh-positions-array">1 2 3</float_array></source>
  <source id="Cube-mesh-map-0"><float_array id="Cube-mesh-map-0-array">0 0 1 0</float_array></source>
</mesh>"#,
        )
        .unwrap();
        let sources: Vec<_> = document.root_element().children().filter(|node| node.is_element()).collect();

        assert_eq!(source_array(&sources, TEX_COORD_SOURCE, "Cube").unwrap(), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(source_array(&sources, POSITION_SOURCE, "Cube").unwrap(), vec![1.0, 2.0, 3.0]);
        assert!(matches!(source_array(&sources, NORMAL_SOURCE, "Cube"), Err(LoadError::Data(_))));
    }

    #[test]
    fn test_malformed_xml_is_rejected() {
        assert!(matches!(loader().load_scene_from_str("<COLLADA><open>"), Err(LoadError::Xml(_))));
    }

    #[test]
    fn test_empty_document_has_nothing() {
        let scene = loader().load_scene_from_str("<COLLADA/>").unwrap();
        assert!(scene.meshes.is_empty());
        assert!(scene.lights.is_empty());
    }
}
