use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use sphere_tracer::controls::MotionInput;
use sphere_tracer::scene::{default_scene, SceneEdit, Sphere, SphereChange, MAX_SPHERES};
use sphere_tracer::session::Session;
use sphere_tracer::ui::UiEvent;
use sphere_tracer::uniforms::{write_sphere, UniformBlock};

fn bench_static_frame(c: &mut Criterion) {
    let mut session = Session::new(default_scene(), 1600, 900).unwrap();
    c.bench_function("session_frame_static", |b| {
        b.iter(|| {
            session
                .frame(&MotionInput::default(), black_box(0.016), Vec::new())
                .unwrap();
            black_box(session.uniforms_mut().take_dirty());
        })
    });
}

fn bench_moving_frame(c: &mut Criterion) {
    let mut session = Session::new(default_scene(), 1600, 900).unwrap();
    let motion = MotionInput {
        direction: Vec3::new(0.0, 0.0, 1.0),
        sprint: false,
        delta_yaw: 0.001,
        delta_pitch: -0.0005,
    };
    c.bench_function("session_frame_moving", |b| {
        b.iter(|| session.frame(black_box(&motion), 0.016, Vec::new()).unwrap())
    });
}

fn bench_sphere_edit(c: &mut Criterion) {
    let mut session = Session::new(default_scene(), 1600, 900).unwrap();
    let mut radius = 1.0f32;
    c.bench_function("session_frame_sphere_edit", |b| {
        b.iter(|| {
            radius = if radius > 2.0 { 1.0 } else { radius + 0.01 };
            let edit = SceneEdit::Modify {
                index: 1,
                change: SphereChange::Radius(radius),
            };
            session
                .frame(&MotionInput::default(), 0.016, vec![UiEvent::Scene(edit)])
                .unwrap();
        })
    });
}

fn bench_marshal_full_scene(c: &mut Criterion) {
    let spheres: Vec<Sphere> = (0..MAX_SPHERES)
        .map(|i| Sphere::new(Vec3::splat(i as f32), 1.0, Default::default()))
        .collect();
    let mut block = UniformBlock::new();
    c.bench_function("marshal_full_scene", |b| {
        b.iter(|| {
            for (i, sphere) in spheres.iter().enumerate() {
                write_sphere(&mut block, i, black_box(sphere)).unwrap();
            }
        })
    });
}

criterion_group!(
    benches,
    bench_static_frame,
    bench_moving_frame,
    bench_sphere_edit,
    bench_marshal_full_scene
);
criterion_main!(benches);
