// cli.rs - Command-line interface configuration
use clap::Parser;

use crate::camera::CameraTuning;
use crate::settings::{RenderSettings, MAX_BOUNCE_LIMIT, MAX_RAYS_PER_PIXEL};

#[derive(Parser, Debug, Clone)]
#[command(name = "sphere-tracer")]
#[command(about = "Interactive accumulating sphere raytracer", long_about = None)]
pub struct Cli {
    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1600)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 900)]
    pub height: u32,

    /// Rays traced per pixel each frame
    #[arg(long, default_value_t = 4,
          value_parser = clap::value_parser!(u32).range(1..=MAX_RAYS_PER_PIXEL as i64))]
    pub rays_per_pixel: u32,

    /// Bounces per ray after the primary hit
    #[arg(long, default_value_t = 8,
          value_parser = clap::value_parser!(u32).range(0..=MAX_BOUNCE_LIMIT as i64))]
    pub max_bounces: u32,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    pub fov: f32,

    /// Hide the side panels
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Start with temporal accumulation disabled
    #[arg(long = "no-accumulation", default_value = "false")]
    pub no_accumulation: bool,
}

impl Cli {
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            rays_per_pixel: self.rays_per_pixel,
            max_bounce_limit: self.max_bounces,
            ..RenderSettings::default()
        }
        .clamped()
    }

    pub fn camera_tuning(&self) -> CameraTuning {
        CameraTuning {
            fov: self.fov.clamp(30.0, 90.0),
            ..CameraTuning::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_demo() {
        let cli = Cli::parse_from(["sphere-tracer"]);
        assert_eq!((cli.width, cli.height), (1600, 900));
        assert_eq!(cli.render_settings(), RenderSettings::default());
        assert_eq!(cli.camera_tuning(), CameraTuning::default());
        assert!(!cli.no_ui);
        assert!(!cli.no_accumulation);
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::parse_from([
            "sphere-tracer",
            "--rays-per-pixel",
            "12",
            "--max-bounces",
            "0",
            "--fov",
            "200",
            "--no-ui",
        ]);
        let settings = cli.render_settings();
        assert_eq!(settings.rays_per_pixel, 12);
        assert_eq!(settings.max_bounce_limit, 0);
        assert_eq!(cli.camera_tuning().fov, 90.0);
        assert!(cli.no_ui);
    }

    #[test]
    fn out_of_range_bounces_are_rejected() {
        assert!(Cli::try_parse_from(["sphere-tracer", "--max-bounces", "17"]).is_err());
        assert!(Cli::try_parse_from(["sphere-tracer", "--rays-per-pixel", "0"]).is_err());
    }
}
