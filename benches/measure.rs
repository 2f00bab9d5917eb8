//! Coordinate mapping benchmarks.

#![allow(clippy::semicolon_if_nothing_returned)]

use criterion::{Criterion, criterion_group, criterion_main};
use editview::text::Pos;
use editview::{CoordSystem, Editor, EditorOptions, MemoryDom};
use std::hint::black_box;

fn editor(lines: usize, options: EditorOptions) -> Editor {
    let text = (0..lines)
        .map(|i| format!("fn item_{i}() {{ let value = {i} * 2; }}"))
        .collect::<Vec<_>>()
        .join("\n");
    Editor::new(MemoryDom::new(800.0, 600.0), &text, options)
}

fn measure_positions(c: &mut Criterion) {
    let mut ed = editor(1_000, EditorOptions::default());
    c.bench_function("measure_in_window", |b| {
        b.iter(|| ed.measure_position(black_box(Pos::new(10, 12)), CoordSystem::Local));
    });

    let mut ed = editor(1_000, EditorOptions::default());
    let mut line = 100;
    c.bench_function("measure_off_screen", |b| {
        b.iter(|| {
            line = if line >= 999 { 100 } else { line + 1 };
            ed.measure_position(black_box(Pos::new(line, 20)), CoordSystem::Local)
        });
    });
}

fn locate_points(c: &mut Criterion) {
    let mut ed = editor(1_000, EditorOptions::default());
    c.bench_function("locate_in_window", |b| {
        b.iter(|| ed.locate_position(black_box(123.0), black_box(87.0), CoordSystem::Local));
    });

    let options = EditorOptions {
        line_wrapping: true,
        ..EditorOptions::default()
    };
    let mut ed = editor(1_000, options);
    c.bench_function("locate_wrapped", |b| {
        b.iter(|| ed.locate_position(black_box(300.0), black_box(200.0), CoordSystem::Local));
    });
}

fn height_lookup(c: &mut Criterion) {
    let ed = editor(100_000, EditorOptions::default());
    c.bench_function("line_at_height_100k", |b| {
        b.iter(|| ed.line_at_height(black_box(812_345.0), CoordSystem::Local));
    });
}

criterion_group!(benches, measure_positions, locate_points, height_lookup);
criterion_main!(benches);
