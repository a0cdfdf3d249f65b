use egui::{Color32, RichText};
use glam::Vec3;

use crate::camera::CameraTuning;
use crate::scene::{SceneEdit, Sphere, SphereChange};
use crate::session::Session;
use crate::settings::{RenderSettings, MAX_BOUNCE_LIMIT, MAX_RAYS_PER_PIXEL};

pub const SIDEBAR_WIDTH: f32 = 260.0;
const ITEM_WIDTH: f32 = 160.0;

/// Change requested from the panels, applied by `Session::frame`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UiEvent {
    Scene(SceneEdit),
    Render(RenderSettings),
    Camera(CameraTuning),
    Accumulation(bool),
    /// Log the scene as JSON
    PrintScene,
}

/// Build both sidebars for this frame.
///
/// Panels edit local copies of the session state and report differences as
/// events; nothing here mutates the session.
pub fn show(ctx: &egui::Context, session: &Session, frame_time: f32) -> Vec<UiEvent> {
    let mut events = Vec::new();

    egui::SidePanel::left("raytracer_sidebar")
        .exact_width(SIDEBAR_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                raytracer_settings(ui, session, frame_time, &mut events);
                world_settings(ui, session, &mut events);
            });
        });

    egui::SidePanel::right("camera_sidebar")
        .exact_width(SIDEBAR_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            camera_controls(ui, session, &mut events);
        });

    events
}

fn raytracer_settings(
    ui: &mut egui::Ui,
    session: &Session,
    frame_time: f32,
    events: &mut Vec<UiEvent>,
) {
    egui::CollapsingHeader::new("Raytracer Settings")
        .default_open(true)
        .show(ui, |ui| {
            let mut settings = *session.settings();
            ui.add_sized(
                [ITEM_WIDTH, 18.0],
                egui::Slider::new(&mut settings.rays_per_pixel, 1..=MAX_RAYS_PER_PIXEL)
                    .text("Rays/Pixel"),
            );
            ui.add_sized(
                [ITEM_WIDTH, 18.0],
                egui::Slider::new(&mut settings.max_bounce_limit, 0..=MAX_BOUNCE_LIMIT)
                    .text("Max Bounces"),
            );
            if settings != *session.settings() {
                events.push(UiEvent::Render(settings));
            }

            let accumulation = session.accumulation();
            ui.label(format!("MSPF: {:.0} ms", frame_time * 1000.0));
            ui.label(format!("Accumulation time: {:.2}s", accumulation.elapsed()));
            ui.label(format!("Accumulated frames: {}", accumulation.frame_count()));

            let mut enabled = accumulation.enabled();
            if ui.checkbox(&mut enabled, "Allow Accumulation").changed() {
                events.push(UiEvent::Accumulation(enabled));
            }
        });
}

fn world_settings(ui: &mut egui::Ui, session: &Session, events: &mut Vec<UiEvent>) {
    let scene = session.scene();

    egui::CollapsingHeader::new("World Settings")
        .default_open(true)
        .show(ui, |ui| {
            for (index, sphere) in scene.spheres().iter().enumerate() {
                egui::CollapsingHeader::new(format!("Sphere {}", index))
                    .id_salt(("sphere", index))
                    .show(ui, |ui| sphere_editor(ui, index, sphere, events));
            }
        });

    ui.horizontal(|ui| {
        let add = ui
            .add_enabled(!scene.is_full(), egui::Button::new("Add Sphere"))
            .on_disabled_hover_text("Sphere limit reached");
        if add.clicked() {
            events.push(UiEvent::Scene(SceneEdit::Add(Sphere::default())));
        }
        if ui.button("Print all").clicked() {
            events.push(UiEvent::PrintScene);
        }
    });
}

fn sphere_editor(ui: &mut egui::Ui, index: usize, sphere: &Sphere, events: &mut Vec<UiEvent>) {
    let mut modify = |change| events.push(UiEvent::Scene(SceneEdit::Modify { index, change }));

    let mut center = sphere.center.to_array();
    ui.horizontal(|ui| {
        for axis in &mut center {
            ui.add(egui::DragValue::new(axis).speed(0.01).max_decimals(2));
        }
        ui.label("Center");
    });
    if Vec3::from_array(center) != sphere.center {
        modify(SphereChange::Center(Vec3::from_array(center)));
    }

    let mut radius = sphere.radius;
    ui.horizontal(|ui| {
        ui.add(
            egui::DragValue::new(&mut radius)
                .speed(0.01)
                .range(0.0..=100.0)
                .max_decimals(2),
        );
        ui.label("Radius");
    });
    if radius != sphere.radius {
        modify(SphereChange::Radius(radius));
    }

    let mut color = sphere.material.color.to_array();
    ui.horizontal(|ui| {
        ui.color_edit_button_rgb(&mut color);
        ui.label("Albedo");
    });
    if Vec3::from_array(color) != sphere.material.color {
        modify(SphereChange::Color(Vec3::from_array(color)));
    }

    let mut smoothness = sphere.material.smoothness;
    ui.add_sized(
        [ITEM_WIDTH, 18.0],
        egui::Slider::new(&mut smoothness, 0.0..=1.0)
            .max_decimals(2)
            .text("Smoothness"),
    );
    if smoothness != sphere.material.smoothness {
        modify(SphereChange::Smoothness(smoothness));
    }

    let mut emission = sphere.material.emission_color.to_array();
    ui.horizontal(|ui| {
        ui.color_edit_button_rgb(&mut emission);
        ui.label("Emission");
    });
    if Vec3::from_array(emission) != sphere.material.emission_color {
        modify(SphereChange::EmissionColor(Vec3::from_array(emission)));
    }

    let mut brightness = sphere.material.emission_strength;
    ui.horizontal(|ui| {
        ui.add(
            egui::DragValue::new(&mut brightness)
                .speed(0.01)
                .range(0.0..=5.0)
                .max_decimals(2),
        );
        ui.label("Brightness");
    });
    if brightness != sphere.material.emission_strength {
        modify(SphereChange::EmissionStrength(brightness));
    }

    if ui.button("Remove").clicked() {
        events.push(UiEvent::Scene(SceneEdit::Remove(index)));
    }
}

fn camera_controls(ui: &mut egui::Ui, session: &Session, events: &mut Vec<UiEvent>) {
    let camera = session.camera();

    egui::CollapsingHeader::new("Camera Controls")
        .default_open(true)
        .show(ui, |ui| {
            let p = camera.position;
            let f = camera.forward();
            ui.label(
                RichText::new(format!("Position: ({:6.2}, {:6.2}, {:6.2})", p.x, p.y, p.z))
                    .monospace(),
            );
            ui.label(
                RichText::new(format!("Forward:  ({:6.2}, {:6.2}, {:6.2})", f.x, f.y, f.z))
                    .monospace(),
            );

            let mut tuning = camera.tuning;
            ui.add_sized(
                [ITEM_WIDTH, 18.0],
                egui::Slider::new(&mut tuning.fov, 30.0..=90.0)
                    .max_decimals(0)
                    .text("FOV"),
            );
            ui.add_sized(
                [ITEM_WIDTH, 18.0],
                egui::Slider::new(&mut tuning.sensitivity, 0.05..=0.4).text("Sensitivity"),
            );
            ui.horizontal(|ui| {
                ui.add(
                    egui::DragValue::new(&mut tuning.movement_speed)
                        .speed(0.02)
                        .range(0.5..=5.0)
                        .max_decimals(2),
                );
                ui.label("Movement Speed");
            });
            ui.checkbox(&mut tuning.sprint_enabled, "Allow Sprint");
            ui.horizontal(|ui| {
                ui.add(
                    egui::DragValue::new(&mut tuning.sprint_multiplier)
                        .speed(0.05)
                        .range(2.0..=20.0)
                        .max_decimals(2),
                );
                ui.label("Sprint Speed Multiplier");
            });
            if tuning != camera.tuning {
                events.push(UiEvent::Camera(tuning));
            }

            ui.separator();
            ui.label(
                RichText::new("WASD move, Space/Ctrl up/down, Shift sprint, hold RMB to look")
                    .small()
                    .color(Color32::GRAY),
            );
        });
}
