//! Criterion benchmarks for the LCDproc line codec.
//!
//! Measures command encoding and inbound line parsing latency; every widget
//! update on a busy display turns into one `widget_set` encode, so this is
//! the hot path of the client.
//!
//! Run with:
//! ```bash
//! cargo bench --package lcdproc-core --bench codec_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lcdproc_core::{
    encode_command, parse_line, Command, Param, Priority, ScreenId, ScreenOption, WidgetId,
    WidgetKind,
};

fn make_widget_set() -> Command {
    let screen = ScreenId::numbered("bench", 0);
    Command::WidgetSet {
        widget: WidgetId::numbered(&screen, 1),
        screen,
        params: vec![
            Param::Int(1),
            Param::Int(2),
            Param::Quoted("a line of status text".to_string()),
        ],
    }
}

fn make_screen_set() -> Command {
    Command::ScreenSet {
        screen: ScreenId::numbered("bench", 0),
        options: vec![
            ScreenOption::Name("bench screen".to_string()),
            ScreenOption::Priority(Priority::Info),
            ScreenOption::Duration(32),
        ],
    }
}

fn bench_encode(c: &mut Criterion) {
    let widget_set = make_widget_set();
    let screen_set = make_screen_set();

    let mut group = c.benchmark_group("encode");
    group.bench_function("widget_set", |b| {
        b.iter(|| encode_command(black_box(&widget_set)))
    });
    group.bench_function("screen_set", |b| {
        b.iter(|| encode_command(black_box(&screen_set)))
    });
    group.finish();
}

fn bench_parse(c: &mut Criterion) {
    let greeting = "connect LCDproc 0.5.7 protocol 0.3 wid 20 hgt 4 cellwid 5 cellhgt 8";

    let mut group = c.benchmark_group("parse");
    group.bench_function("greeting", |b| b.iter(|| parse_line(black_box(greeting))));
    group.bench_function("listen", |b| {
        b.iter(|| parse_line(black_box("listen bench_s0")))
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_parse);
criterion_main!(benches);
