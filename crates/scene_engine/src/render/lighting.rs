//! Lighting system
//!
//! Lights are independent scene entities. The [`LightManager`] keeps them in
//! an order where directional lights come first and picks, per mesh, the
//! subset that fits the shading stage's fixed-size light array.

use crate::foundation::math::{Vec3, Vec4};
use crate::render::primitives::Mesh;

/// Scale applied to the Manhattan distance so it never exceeds the true
/// Euclidean distance in 3D (`|x|+|y|+|z| <= sqrt(3) * length`).
///
/// Tunable: larger values reject more borderline point lights.
pub const MANHATTAN_SCALE_CORRECTION: f32 = 0.577_350_26;

/// Default number of lights a single draw call can consume
pub const DEFAULT_MAX_LIGHTS: usize = 16;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
}

/// Light source
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Light arriving from one direction everywhere in the scene
    Directional {
        /// Direction the light travels (unit length)
        direction: Vec3,
        /// Light color
        color: Vec3,
        /// Light intensity
        intensity: f32,
    },
    /// Light radiating from a position with a limited influence distance
    Point {
        /// World position
        position: Vec3,
        /// Light color
        color: Vec3,
        /// Light intensity
        intensity: f32,
        /// Influence distance
        radius: f32,
    },
}

impl Light {
    /// Create a directional light
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::Directional {
            direction: direction.try_normalize(f32::EPSILON).unwrap_or(direction),
            color,
            intensity,
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self::Point {
            position,
            color,
            intensity,
            radius,
        }
    }

    /// Variant tag
    pub fn light_type(&self) -> LightType {
        match self {
            Self::Directional { .. } => LightType::Directional,
            Self::Point { .. } => LightType::Point,
        }
    }

    /// Light color
    pub fn color(&self) -> Vec3 {
        match *self {
            Self::Directional { color, .. } | Self::Point { color, .. } => color,
        }
    }

    /// Light intensity
    pub fn intensity(&self) -> f32 {
        match *self {
            Self::Directional { intensity, .. } | Self::Point { intensity, .. } => intensity,
        }
    }

    /// Influence distance, point lights only
    pub fn radius(&self) -> Option<f32> {
        match *self {
            Self::Directional { .. } => None,
            Self::Point { radius, .. } => Some(radius),
        }
    }

    /// Encoded vector consumed by the shading stage
    ///
    /// `(direction, 0)` for directional lights, `(position, 1)` for point lights.
    pub fn internal_vector(&self) -> Vec4 {
        match *self {
            Self::Directional { direction, .. } => direction.push(0.0),
            Self::Point { position, .. } => position.push(1.0),
        }
    }
}

/// Lights chosen for one mesh
#[derive(Debug, Clone, PartialEq)]
pub struct LightSelection<'a> {
    /// Selected lights, directional first
    pub lights: Vec<&'a Light>,
    /// Set when the cap stopped the search before every light was examined
    pub truncated: bool,
}

impl LightSelection<'_> {
    /// Number of selected lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no light was selected
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

/// Ordered collection of scene lights with per-mesh relevance filtering
#[derive(Debug, Clone)]
pub struct LightManager {
    lights: Vec<Light>,
    max_lights: usize,
}

impl Default for LightManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LIGHTS)
    }
}

impl LightManager {
    /// Create an empty manager returning at most `max_lights` per mesh
    pub fn new(max_lights: usize) -> Self {
        Self {
            lights: Vec::new(),
            max_lights,
        }
    }

    /// Per-mesh light cap
    pub fn max_lights(&self) -> usize {
        self.max_lights
    }

    /// Add a light; directional lights are inserted at the front
    pub fn add_light(&mut self, light: Light) {
        match light.light_type() {
            LightType::Directional => self.lights.insert(0, light),
            LightType::Point => self.lights.push(light),
        }
    }

    /// Remove and return the light at `index`
    pub fn remove_light(&mut self, index: usize) -> Option<Light> {
        (index < self.lights.len()).then(|| self.lights.remove(index))
    }

    /// Remove every light
    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// All lights in selection order
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Number of lights
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether the manager holds no lights
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Lights likely to affect `mesh`, capped at [`Self::max_lights`]
    ///
    /// Directional lights always qualify. A point light qualifies when its
    /// approximated distance to the mesh centre is below the sum of the light
    /// radius and the mesh bounding radius.
    pub fn relevant_lights_for(&self, mesh: &Mesh) -> LightSelection<'_> {
        let center = mesh.center();
        let mesh_radius = mesh.bounding_radius();
        let mut selected = Vec::with_capacity(self.max_lights.min(self.lights.len()));

        for (examined, light) in self.lights.iter().enumerate() {
            if selected.len() >= self.max_lights {
                log::warn!(
                    "Too many lights around one object, {} of {} lights were not considered",
                    self.lights.len() - examined,
                    self.lights.len()
                );
                return LightSelection {
                    lights: selected,
                    truncated: true,
                };
            }

            let relevant = match *light {
                Light::Directional { .. } => true,
                Light::Point { position, radius, .. } => {
                    approximated_distance(&position, &center) < radius + mesh_radius
                }
            };
            if relevant {
                selected.push(light);
            }
        }

        LightSelection {
            lights: selected,
            truncated: false,
        }
    }
}

/// Scaled Manhattan distance, never larger than the Euclidean distance
pub fn approximated_distance(a: &Vec3, b: &Vec3) -> f32 {
    (a - b).abs().sum() * MANHATTAN_SCALE_CORRECTION
}
