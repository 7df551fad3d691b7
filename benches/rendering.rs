use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vibe::generate::{MergeRequest, Success};
use vibe::render::{MarkdownRenderer, Theme};

const RESPONSE: &str = r#"### Claude Response

Recursion is when a function calls itself.

1. Define a **base case**
2. Reduce the problem toward it

```rust
fn fact(n: u64) -> u64 {
    if n == 0 { 1 } else { n * fact(n - 1) }
}
```

> Every recursive call must make progress.

See [the book](https://doc.rust-lang.org/book/) for more.
"#;

fn bench_markdown_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_markdown");

    for (label, theme) in [("dark", Theme::Dark), ("plain", Theme::Plain)] {
        let renderer = MarkdownRenderer::new(theme);
        group.bench_with_input(BenchmarkId::from_parameter(label), &RESPONSE, |b, md| {
            b.iter(|| renderer.render(black_box(md)))
        });
    }

    let large = RESPONSE.repeat(50);
    let renderer = MarkdownRenderer::new(Theme::Dark);
    group.bench_with_input(BenchmarkId::new("dark", large.len()), &large, |b, md| {
        b.iter(|| renderer.render(black_box(md)))
    });

    group.finish();
}

fn bench_merge_prompt(c: &mut Criterion) {
    let responses: Vec<Success> = ["OpenAI", "Gemini (OpenRouter)", "Claude"]
        .iter()
        .map(|provider| Success {
            provider: provider.to_string(),
            text: RESPONSE.repeat(10),
        })
        .collect();

    let Some(request) = MergeRequest::new(responses) else {
        return;
    };

    c.bench_function("merge_prompt", |b| b.iter(|| black_box(&request).prompt()));
}

criterion_group!(benches, bench_markdown_render, bench_merge_prompt);
criterion_main!(benches);
