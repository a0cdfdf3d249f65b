use anyhow::Result;
use glam::Vec2;

use crate::accumulation::Accumulation;
use crate::camera::{Camera, CameraTuning};
use crate::controls::MotionInput;
use crate::scene::{Scene, SceneChange};
use crate::settings::RenderSettings;
use crate::ui::UiEvent;
use crate::uniforms::{write_sphere, write_sphere_field, UniformBlock, UniformSink};

/// Everything the raytracer needs besides the GPU.
///
/// Owns the camera, the accumulation counters, the scene and the render
/// settings, and keeps `uniforms` in sync with them. One call to
/// [`Session::frame`] runs the per-frame order: apply UI events, move the
/// camera, tick accumulation, marshal uniforms.
pub struct Session {
    camera: Camera,
    accumulation: Accumulation,
    scene: Scene,
    settings: RenderSettings,
    uniforms: UniformBlock,
    resolution: (u32, u32),
}

impl Session {
    pub fn new(scene: Scene, width: u32, height: u32) -> Result<Self> {
        let mut session = Self {
            camera: Camera::default(),
            accumulation: Accumulation::default(),
            scene,
            settings: RenderSettings::default(),
            uniforms: UniformBlock::new(),
            resolution: (width.max(1), height.max(1)),
        };
        session.write_spheres_from(0)?;
        session.write_globals()?;
        Ok(session)
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_settings(mut self, settings: RenderSettings) -> Self {
        self.settings = settings.clamped();
        self
    }

    pub fn with_accumulation(mut self, enabled: bool) -> Self {
        self.accumulation = Accumulation::new(enabled);
        self
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn accumulation(&self) -> &Accumulation {
        &self.accumulation
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn uniforms(&self) -> &UniformBlock {
        &self.uniforms
    }

    pub fn uniforms_mut(&mut self) -> &mut UniformBlock {
        &mut self.uniforms
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Run one frame of CPU-side work. Invalid UI events are logged and
    /// skipped; only marshalling failures are returned.
    pub fn frame(
        &mut self,
        motion: &MotionInput,
        delta_time: f32,
        events: Vec<UiEvent>,
    ) -> Result<()> {
        let mut invalidated = false;
        for event in events {
            match self.apply(event) {
                Ok(changed) => invalidated |= changed,
                Err(e) => log::warn!("Ignoring UI event: {:#}", e),
            }
        }

        motion.apply(&mut self.camera, delta_time);
        let moved = self.camera.update();

        self.accumulation.tick(delta_time, moved || invalidated);
        self.write_globals()
    }

    /// Viewport changed size. Both targets get reallocated, so accumulated
    /// history is gone.
    pub fn resize(&mut self, width: u32, height: u32) {
        let resolution = (width.max(1), height.max(1));
        if resolution != self.resolution {
            log::debug!("Resizing to {}x{}", resolution.0, resolution.1);
            self.resolution = resolution;
            self.accumulation.reset();
        }
    }

    /// The frame just marshalled never reached the screen. Its tick
    /// counted a blend that did not happen, so start the history over.
    pub fn frame_dropped(&mut self) {
        log::debug!("Frame dropped after {} accumulated", self.accumulation.frame_count());
        self.accumulation.reset();
    }

    /// Apply one event. Returns whether accumulated frames became stale.
    fn apply(&mut self, event: UiEvent) -> Result<bool> {
        match event {
            UiEvent::Scene(edit) => {
                let change = self.scene.apply(edit)?;
                self.write_scene_change(change)?;
                Ok(true)
            }
            UiEvent::Render(settings) => {
                let settings = settings.clamped();
                let changed = settings != self.settings;
                self.settings = settings;
                Ok(changed)
            }
            UiEvent::Camera(tuning) => Ok(self.retune(tuning)),
            UiEvent::Accumulation(enabled) => {
                // set_enabled resets on its own
                self.accumulation.set_enabled(enabled);
                Ok(false)
            }
            UiEvent::PrintScene => {
                log::info!("Scene:\n{}", self.scene.to_json()?);
                Ok(false)
            }
        }
    }

    /// Only the field of view changes the image; speed, sensitivity and
    /// sprint settings affect future motion.
    fn retune(&mut self, tuning: CameraTuning) -> bool {
        let tuning = CameraTuning {
            fov: tuning.fov.clamp(1.0, 179.0),
            ..tuning
        };
        let fov_changed = tuning.fov != self.camera.tuning.fov;
        self.camera.tuning = tuning;
        fov_changed
    }

    fn write_scene_change(&mut self, change: SceneChange) -> Result<()> {
        match change {
            SceneChange::Field { index, field } => {
                if let Some(sphere) = self.scene.get(index) {
                    write_sphere_field(&mut self.uniforms, index, sphere, field)?;
                }
                Ok(())
            }
            SceneChange::Added { index } => self.write_spheres_from(index),
            SceneChange::Removed { from } => self.write_spheres_from(from),
        }
    }

    fn write_spheres_from(&mut self, start: usize) -> Result<()> {
        for (index, sphere) in self.scene.spheres().iter().enumerate().skip(start) {
            write_sphere(&mut self.uniforms, index, sphere)?;
        }
        Ok(())
    }

    fn write_globals(&mut self) -> Result<()> {
        let camera = &self.camera;
        let sink: &mut dyn UniformSink = &mut self.uniforms;

        sink.write(
            "resolution",
            Vec2::new(self.resolution.0 as f32, self.resolution.1 as f32).into(),
        )?;
        sink.write("fov", camera.tuning.fov.into())?;
        sink.write("position", camera.position.into())?;
        sink.write("forward", camera.forward().into())?;
        sink.write("right", camera.right().into())?;
        sink.write("up", camera.up().into())?;

        sink.write("raysPerPixel", self.settings.rays_per_pixel.into())?;
        sink.write("maxBounceLimit", self.settings.max_bounce_limit.into())?;
        sink.write("skyboxLightStrength", self.settings.sky_light_strength.into())?;

        sink.write("accumulationFrame", self.accumulation.frame_count().into())?;
        sink.write("sphereAmount", (self.scene.len() as u32).into())
    }
}
