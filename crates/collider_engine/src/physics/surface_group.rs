//! Floor / wall / ceiling partition of model geometry
//!
//! A [`SurfaceGroup`] transforms every triangle of a model into world space
//! and sorts the resulting [`Surface`]s by the vertical component of their
//! face normal. Groups are rebuilt wholesale; there is no incremental update.

use super::surface::Surface;
use crate::core::config::ColliderConfig;
use crate::foundation::math::transform_position;
use crate::scene::ModelSource;

/// How a surface is used by queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// Walkable, answered by floor queries
    Floor,
    /// Blocks horizontal movement, answered by wall queries
    Wall,
    /// Faces downward; kept but not queried
    Ceiling,
}

impl SurfaceKind {
    /// Classify a surface by its normal's vertical component
    pub fn classify(normal_y: f32, config: &ColliderConfig) -> Self {
        if normal_y > config.floor_normal_y {
            Self::Floor
        } else if normal_y < config.ceiling_normal_y {
            Self::Ceiling
        } else {
            Self::Wall
        }
    }
}

/// Per-kind surface counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SurfaceCounts {
    /// Number of floor surfaces
    pub floors: usize,
    /// Number of wall surfaces
    pub walls: usize,
    /// Number of ceiling surfaces
    pub ceilings: usize,
}

impl SurfaceCounts {
    /// Total across all kinds
    pub fn total(&self) -> usize {
        self.floors + self.walls + self.ceilings
    }
}

impl std::ops::Add for SurfaceCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            floors: self.floors + other.floors,
            walls: self.walls + other.walls,
            ceilings: self.ceilings + other.ceilings,
        }
    }
}

/// Classified world-space surfaces built from one or more models
#[derive(Debug, Clone, Default)]
pub struct SurfaceGroup {
    floors: Vec<Surface>,
    walls: Vec<Surface>,
    ceilings: Vec<Surface>,
}

impl SurfaceGroup {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a group from a model's current geometry
    pub fn from_model(model: &impl ModelSource, config: &ColliderConfig) -> Self {
        let mut group = Self::new();
        group.append_model(model, config);
        group
    }

    /// Discard all surfaces and repopulate from the model
    pub fn rebuild(&mut self, model: &impl ModelSource, config: &ColliderConfig) {
        self.clear();
        self.append_model(model, config);
    }

    /// Add the model's triangles to the existing surfaces
    pub fn append_model(&mut self, model: &impl ModelSource, config: &ColliderConfig) {
        let matrix = model.world_matrix();
        let mut degenerate = 0usize;

        for [a, b, c] in model.mesh().triangles() {
            let surface = Surface::with_margin(
                transform_position(&matrix, &a),
                transform_position(&matrix, &b),
                transform_position(&matrix, &c),
                config.vertical_margin,
            );
            if surface.is_degenerate() {
                degenerate += 1;
            }
            self.push(surface, config);
        }

        if degenerate > 0 {
            log::warn!("{degenerate} degenerate triangles classified as walls");
        }
        let counts = self.counts();
        log::debug!(
            "Surface group now holds {} floors, {} walls, {} ceilings",
            counts.floors,
            counts.walls,
            counts.ceilings
        );
    }

    /// Classify and store a single surface
    pub fn push(&mut self, surface: Surface, config: &ColliderConfig) -> SurfaceKind {
        let kind = SurfaceKind::classify(surface.normal.y, config);
        match kind {
            SurfaceKind::Floor => self.floors.push(surface),
            SurfaceKind::Wall => self.walls.push(surface),
            SurfaceKind::Ceiling => self.ceilings.push(surface),
        }
        kind
    }

    /// Remove every surface
    pub fn clear(&mut self) {
        self.floors.clear();
        self.walls.clear();
        self.ceilings.clear();
    }

    /// Floor surfaces
    pub fn floors(&self) -> &[Surface] {
        &self.floors
    }

    /// Wall surfaces
    pub fn walls(&self) -> &[Surface] {
        &self.walls
    }

    /// Ceiling surfaces
    pub fn ceilings(&self) -> &[Surface] {
        &self.ceilings
    }

    /// Surfaces of one kind
    pub fn of_kind(&self, kind: SurfaceKind) -> &[Surface] {
        match kind {
            SurfaceKind::Floor => &self.floors,
            SurfaceKind::Wall => &self.walls,
            SurfaceKind::Ceiling => &self.ceilings,
        }
    }

    /// Every surface with its kind
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceKind, &Surface)> {
        self.floors
            .iter()
            .map(|s| (SurfaceKind::Floor, s))
            .chain(self.walls.iter().map(|s| (SurfaceKind::Wall, s)))
            .chain(self.ceilings.iter().map(|s| (SurfaceKind::Ceiling, s)))
    }

    /// Per-kind counts
    pub fn counts(&self) -> SurfaceCounts {
        SurfaceCounts {
            floors: self.floors.len(),
            walls: self.walls.len(),
            ceilings: self.ceilings.len(),
        }
    }

    /// Total number of surfaces
    pub fn len(&self) -> usize {
        self.counts().total()
    }

    /// Whether the group holds no surfaces
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
