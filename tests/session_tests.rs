use glam::{Vec2, Vec3};
use sphere_tracer::controls::MotionInput;
use sphere_tracer::scene::{default_scene, SceneEdit, Sphere, SphereChange, MAX_SPHERES};
use sphere_tracer::session::Session;
use sphere_tracer::settings::RenderSettings;
use sphere_tracer::ui::UiEvent;
use sphere_tracer::uniforms::UniformValue;

const DT: f32 = 1.0 / 60.0;

fn session() -> Session {
    Session::new(default_scene(), 640, 480).unwrap()
}

fn step(session: &mut Session, motion: MotionInput, events: Vec<UiEvent>) {
    session.frame(&motion, DT, events).unwrap();
}

fn idle(session: &mut Session, frames: usize) {
    for _ in 0..frames {
        step(session, MotionInput::default(), Vec::new());
    }
}

#[cfg(test)]
mod session_tests {
    use super::*;

    #[test]
    fn test_static_frames_accumulate_and_reach_shader() {
        let mut s = session();
        idle(&mut s, 5);
        assert_eq!(s.accumulation().frame_count(), 5);
        assert_eq!(
            s.uniforms().read("accumulationFrame").unwrap(),
            UniformValue::UInt(5)
        );
    }

    #[test]
    fn test_movement_resets_accumulation() {
        let mut s = session();
        idle(&mut s, 5);

        let motion = MotionInput {
            direction: Vec3::Z,
            ..Default::default()
        };
        step(&mut s, motion, Vec::new());
        assert_eq!(s.accumulation().frame_count(), 0);
        assert_eq!(
            s.uniforms().read("accumulationFrame").unwrap(),
            UniformValue::UInt(0)
        );

        idle(&mut s, 1);
        assert_eq!(s.accumulation().frame_count(), 1);
    }

    #[test]
    fn test_rotation_resets_and_updates_basis_uniforms() {
        let mut s = session();
        idle(&mut s, 2);
        let before = s.camera().forward();

        let motion = MotionInput {
            delta_yaw: 0.2,
            ..Default::default()
        };
        step(&mut s, motion, Vec::new());

        assert_eq!(s.accumulation().frame_count(), 0);
        let after = s.camera().forward();
        assert_ne!(before, after);
        assert_eq!(s.uniforms().read("forward").unwrap(), UniformValue::Vec3(after));
    }

    #[test]
    fn test_resize_resets_and_updates_resolution() {
        let mut s = session();
        idle(&mut s, 3);

        s.resize(1024, 768);
        assert_eq!(s.accumulation().frame_count(), 0);

        // The reset holds through the frame that follows it
        idle(&mut s, 1);
        assert_eq!(s.accumulation().frame_count(), 0);
        assert_eq!(
            s.uniforms().read("resolution").unwrap(),
            UniformValue::Vec2(Vec2::new(1024.0, 768.0))
        );

        idle(&mut s, 1);
        assert_eq!(s.accumulation().frame_count(), 1);
    }

    #[test]
    fn test_same_size_resize_is_ignored() {
        let mut s = session();
        idle(&mut s, 3);
        s.resize(640, 480);
        idle(&mut s, 1);
        assert_eq!(s.accumulation().frame_count(), 4);
    }

    #[test]
    fn test_scene_edit_resets_and_marshals_field() {
        let mut s = session();
        idle(&mut s, 4);

        let edit = SceneEdit::Modify {
            index: 0,
            change: SphereChange::EmissionStrength(3.5),
        };
        step(&mut s, MotionInput::default(), vec![UiEvent::Scene(edit)]);

        assert_eq!(s.accumulation().frame_count(), 0);
        assert_eq!(
            s.uniforms().read("spheres[0].material.emissionStrength").unwrap(),
            UniformValue::Float(3.5)
        );
    }

    #[test]
    fn test_render_settings_change_resets() {
        let mut s = session();
        idle(&mut s, 4);

        let settings = RenderSettings {
            rays_per_pixel: 9,
            ..*s.settings()
        };
        step(&mut s, MotionInput::default(), vec![UiEvent::Render(settings)]);

        assert_eq!(s.accumulation().frame_count(), 0);
        assert_eq!(s.uniforms().read("raysPerPixel").unwrap(), UniformValue::UInt(9));
    }

    #[test]
    fn test_bounce_step_is_clamped() {
        let mut s = session();
        let mut settings = *s.settings();
        for _ in 0..40 {
            settings = settings.with_bounce_step(1);
        }
        step(&mut s, MotionInput::default(), vec![UiEvent::Render(settings)]);
        assert_eq!(
            s.uniforms().read("maxBounceLimit").unwrap(),
            UniformValue::UInt(16)
        );
    }

    #[test]
    fn test_tuning_without_fov_keeps_accumulating() {
        let mut s = session();
        idle(&mut s, 2);

        let mut tuning = s.camera().tuning;
        tuning.movement_speed = 1.5;
        tuning.sprint_enabled = false;
        tuning.sprint_multiplier = 12.0;
        step(&mut s, MotionInput::default(), vec![UiEvent::Camera(tuning)]);

        assert_eq!(s.accumulation().frame_count(), 3);
        assert_eq!(s.camera().tuning.movement_speed, 1.5);
    }

    #[test]
    fn test_disabling_accumulation_pins_counter() {
        let mut s = session();
        idle(&mut s, 3);
        step(&mut s, MotionInput::default(), vec![UiEvent::Accumulation(false)]);
        idle(&mut s, 5);
        assert_eq!(s.accumulation().frame_count(), 0);
        assert!(!s.accumulation().enabled());

        step(&mut s, MotionInput::default(), vec![UiEvent::Accumulation(true)]);
        assert_eq!(s.accumulation().frame_count(), 0);
        idle(&mut s, 2);
        assert_eq!(s.accumulation().frame_count(), 2);
    }

    #[test]
    fn test_fill_scene_to_capacity() {
        let mut s = session();
        let missing = MAX_SPHERES - s.scene().len();
        let adds = (0..missing + 3)
            .map(|i| {
                UiEvent::Scene(SceneEdit::Add(Sphere::new(
                    Vec3::new(i as f32, 0.0, 0.0),
                    0.5,
                    Default::default(),
                )))
            })
            .collect();
        step(&mut s, MotionInput::default(), adds);

        assert_eq!(s.scene().len(), MAX_SPHERES);
        assert_eq!(
            s.uniforms().read("sphereAmount").unwrap(),
            UniformValue::UInt(MAX_SPHERES as u32)
        );
        assert_eq!(
            s.uniforms().read("spheres[31].radius").unwrap(),
            UniformValue::Float(0.5)
        );
    }

    #[test]
    fn test_upload_only_when_something_changed() {
        let mut s = session();
        idle(&mut s, 1);
        assert!(s.uniforms_mut().take_dirty());

        // Accumulating still changes accumulationFrame every frame
        idle(&mut s, 1);
        assert!(s.uniforms_mut().take_dirty());

        let mut disabled = Session::new(default_scene(), 64, 64)
            .unwrap()
            .with_accumulation(false);
        idle(&mut disabled, 2);
        disabled.uniforms_mut().take_dirty();
        idle(&mut disabled, 1);
        assert!(!disabled.uniforms_mut().take_dirty());
    }

    #[test]
    fn test_holding_look_up_at_the_pole_keeps_accumulating() {
        let mut s = session();
        let look_up = MotionInput {
            delta_pitch: 0.5,
            ..Default::default()
        };
        // Five steps from -30° reach the pole; each one moved the view
        for _ in 0..5 {
            step(&mut s, look_up, Vec::new());
        }
        assert_eq!(s.accumulation().frame_count(), 0);

        for _ in 0..5 {
            step(&mut s, look_up, Vec::new());
        }
        assert_eq!(s.accumulation().frame_count(), 5);
    }

    #[test]
    fn test_dropped_frame_does_not_count_as_blended() {
        let mut s = session();
        idle(&mut s, 3);
        s.frame_dropped();
        idle(&mut s, 1);
        assert_eq!(
            s.uniforms().read("accumulationFrame").unwrap(),
            UniformValue::UInt(0)
        );
    }
}
