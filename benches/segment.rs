use std::path::Path;

use criterion::{criterion_group, criterion_main, Criterion};

use mailshred::config::ScanConfig;
use mailshred::model::line::Word;
use mailshred::segment::EmailSegmenter;
use mailshred::stream::StreamEvent;

/// Synthetic 200-page tranche: one message every two pages, with a
/// realistic reply-chain tail of body lines on each page.
fn synthetic_events() -> Vec<StreamEvent> {
    let mut events = Vec::new();
    for page in 1..=200u32 {
        events.push(StreamEvent::PageStart { page });
        let mut y = 90.0;
        if page % 2 == 1 {
            for text in [
                "From: alice@example.com",
                "To: bob@example.com",
                "Subject: quarterly numbers",
                "Date: Jan 1, 2020",
            ] {
                let mut x = 54.0;
                for token in text.split_whitespace() {
                    events.push(StreamEvent::Word(Word::new(token, x, y)));
                    x += 40.0;
                }
                y += 12.0;
            }
        }
        for _ in 0..40 {
            let mut x = 54.0;
            for token in ["lorem", "ipsum", "dolor", "sit", "amet"] {
                events.push(StreamEvent::Word(Word::new(token, x, y)));
                x += 40.0;
            }
            y += 12.0;
        }
        events.push(StreamEvent::PageEnd { page });
    }
    events.push(StreamEvent::StreamEnd);
    events
}

fn bench_segment_tranche(c: &mut Criterion) {
    let events = synthetic_events();

    c.bench_function("segment_200_page_tranche", |b| {
        b.iter(|| {
            let mut seg =
                EmailSegmenter::new(Path::new("bench.pdf"), ScanConfig::default());
            for event in &events {
                seg.apply(event.clone());
            }
            seg.finish().len()
        })
    });
}

criterion_group!(benches, bench_segment_tranche);
criterion_main!(benches);
