/// Upper bound the shader loop is compiled for
pub const MAX_BOUNCE_LIMIT: u32 = 16;
pub const MAX_RAYS_PER_PIXEL: u32 = 20;

/// Shading parameters passed to the raytracer each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub rays_per_pixel: u32,
    pub max_bounce_limit: u32,
    pub sky_light_strength: f32,
}

impl RenderSettings {
    /// Bring every field into the range the shader accepts
    pub fn clamped(self) -> Self {
        Self {
            rays_per_pixel: self.rays_per_pixel.clamp(1, MAX_RAYS_PER_PIXEL),
            max_bounce_limit: self.max_bounce_limit.min(MAX_BOUNCE_LIMIT),
            sky_light_strength: self.sky_light_strength.max(0.0),
        }
    }

    /// Bounce limit nudged by the arrow keys
    pub fn with_bounce_step(self, step: i32) -> Self {
        let limit = (self.max_bounce_limit as i32 + step).clamp(0, MAX_BOUNCE_LIMIT as i32);
        Self {
            max_bounce_limit: limit as u32,
            ..self
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            rays_per_pixel: 4,
            max_bounce_limit: 8,
            sky_light_strength: 0.35,
        }
    }
}
