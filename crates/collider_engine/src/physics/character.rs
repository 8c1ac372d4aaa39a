//! Kinematic character stepping on top of the collider
//!
//! Each step moves the character horizontally along its heading, slides
//! along the first wall in the way until it meets a second one, then settles
//! it onto the floor below: small drops and step-ups snap, larger drops start
//! a fall under gravity.

use super::collider::Collider;
use crate::core::config::CharacterConfig;
use crate::foundation::math::Vec3;

/// Gap left between the character and a wall it slid along
const WALL_PUSH_OFF: f32 = 1e-4;

/// Gravity while airborne, units per second squared
const GRAVITY: f32 = 30.0;

/// Vertical movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementState {
    /// Standing on a floor
    Grounded,
    /// Airborne
    Falling,
}

/// Per-step movement intent, each axis in [-1, 1]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WalkInput {
    /// Forward (+) or backward (-)
    pub forward: f32,
    /// Counter-clockwise (+) or clockwise (-) seen from above
    pub turn: f32,
}

/// Outcome of one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResult {
    /// Position after the step
    pub position: Vec3,
    /// State after the step
    pub state: MovementState,
    /// Height of the floor found under the character, if any
    pub floor_height: Option<f32>,
    /// Whether a wall cut the horizontal move short
    pub hit_wall: bool,
}

/// Character walking over collider geometry
#[derive(Debug, Clone)]
pub struct CharacterController {
    config: CharacterConfig,
    position: Vec3,
    heading: f32,
    vertical_velocity: f32,
    state: MovementState,
}

impl CharacterController {
    /// Place a character with its feet at `position`
    ///
    /// `heading` is in radians; 0 faces +X and π/2 faces +Z.
    pub fn new(position: Vec3, heading: f32, config: CharacterConfig) -> Self {
        Self {
            config,
            position,
            heading,
            vertical_velocity: 0.0,
            state: MovementState::Grounded,
        }
    }

    /// Feet position
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Heading in radians
    pub fn heading(&self) -> f32 {
        self.heading
    }

    /// Current movement state
    pub fn state(&self) -> MovementState {
        self.state
    }

    /// Tuning in use
    pub fn config(&self) -> &CharacterConfig {
        &self.config
    }

    /// Unit horizontal vector along the heading
    pub fn forward(&self) -> Vec3 {
        Vec3::new(self.heading.cos(), 0.0, self.heading.sin())
    }

    /// Turn, walk and settle for one frame
    pub fn advance(&mut self, input: WalkInput, dt: f32, collider: &Collider) -> StepResult {
        self.heading += input.turn.clamp(-1.0, 1.0) * self.config.turn_rate * dt;

        let distance = input.forward.clamp(-1.0, 1.0) * self.config.speed * dt;
        let target = self.position + self.forward() * distance;
        self.step_towards(target, dt, collider)
    }

    /// Move horizontally towards `target` (its Y is ignored), then settle
    pub fn step_towards(&mut self, target: Vec3, dt: f32, collider: &Collider) -> StepResult {
        let hit_wall = self.move_horizontal(target, collider);
        let floor_height = self.settle(dt, collider);

        StepResult {
            position: self.position,
            state: self.state,
            floor_height,
            hit_wall,
        }
    }

    fn move_horizontal(&mut self, target: Vec3, collider: &Collider) -> bool {
        let start = self.position;
        let delta = Vec3::new(target.x - start.x, 0.0, target.z - start.z);
        let moved = delta.magnitude();
        if moved <= f32::EPSILON {
            return false;
        }
        let direction = delta / moved;

        let Some(wall) = collider.find_wall(&start, &direction, self.config.probe_height) else {
            self.position += delta;
            return false;
        };

        let reach = (wall.distance - self.config.radius).max(0.0);
        if moved <= reach {
            self.position += delta;
            return false;
        }

        // Walls are double-sided; face the normal back towards the character
        let mut normal = Vec3::new(wall.surface.normal.x, 0.0, wall.surface.normal.z)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -direction);
        if normal.dot(&direction) > 0.0 {
            normal = -normal;
        }

        let contact = start + direction * reach + normal * WALL_PUSH_OFF;
        let slide = (direction - normal * direction.dot(&normal)) * (moved - reach);
        self.position = contact + self.clamp_slide(&contact, slide, collider);
        self.position.y = start.y;
        true
    }

    /// Shorten a slide along one wall so it stops at the next wall in its way
    fn clamp_slide(&self, contact: &Vec3, slide: Vec3, collider: &Collider) -> Vec3 {
        let length = slide.magnitude();
        if length <= f32::EPSILON {
            return slide;
        }
        let direction = slide / length;

        match collider.find_wall(contact, &direction, self.config.probe_height) {
            Some(wall) if wall.distance - self.config.radius < length => {
                direction * (wall.distance - self.config.radius).max(0.0)
            }
            _ => slide,
        }
    }

    fn settle(&mut self, dt: f32, collider: &Collider) -> Option<f32> {
        let floor_height = collider
            .find_floor(&self.position, self.config.floor_probe)
            .map(|hit| hit.height);

        if let Some(height) = floor_height {
            let drop = self.position.y - height;
            if self.state == MovementState::Grounded && drop <= self.config.fall_threshold {
                self.land(height);
                return floor_height;
            }
        }

        self.vertical_velocity -= GRAVITY * dt;
        let next_y = self.position.y + self.vertical_velocity * dt;
        match floor_height {
            Some(height) if next_y <= height => self.land(height),
            _ => {
                if self.state == MovementState::Grounded {
                    log::debug!("Character left the ground at {:?}", self.position);
                }
                self.position.y = next_y;
                self.state = MovementState::Falling;
            }
        }

        floor_height
    }

    fn land(&mut self, height: f32) {
        self.position.y = height;
        self.vertical_velocity = 0.0;
        self.state = MovementState::Grounded;
    }
}
