//! Per-frame annotation drawing benchmarks.
//! Run: cargo bench

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use video_annotator::annotation::{Annotation, MarkerType, TextStyle, Timeline};
use video_annotator::styles::AnnotationRenderer;
use video_annotator::video::Frame;

fn annotations() -> Vec<Annotation> {
    let markers = [MarkerType::Dot, MarkerType::Arrow, MarkerType::Pin];
    let styles = [TextStyle::Label, TextStyle::Callout, TextStyle::Headline];

    (0..9)
        .map(|i| {
            let mut ann = Annotation::new(i, 120.0 + 130.0 * i as f64, 200.0 + 40.0 * i as f64, 0.0);
            ann.text = format!("Annotation number {} with a caption", i);
            ann.marker_type = markers[i as usize % 3];
            ann.text_style = styles[i as usize / 3];
            ann
        })
        .collect()
}

fn bench_draw_frame(c: &mut Criterion) {
    let timeline = Timeline::from_annotations(&annotations()).expect("valid annotations");
    let renderer = AnnotationRenderer::default();
    let background = Frame::new_black(1280, 720);

    let mut group = c.benchmark_group("draw_frame");
    group.sample_size(50);

    group.bench_function("720p_nine_annotations", |b| {
        let mut frame = background.clone();
        b.iter(|| {
            frame.clone_from(&background);
            for active in timeline.active_at(1.0) {
                renderer.draw(&mut frame, active.annotation, active.rank);
            }
            black_box(frame.as_bytes()[0])
        });
    });

    group.bench_function("720p_active_filter_only", |b| {
        b.iter(|| black_box(timeline.active_at(black_box(1.0)).count()));
    });

    group.finish();
}

criterion_group!(benches, bench_draw_frame);
criterion_main!(benches);
