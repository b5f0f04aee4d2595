use criterion::{Criterion, black_box, criterion_group, criterion_main};
use same_core::{CorrelationState, PhaseAccumulator, ToneTemplates};

fn bench_correlation(c: &mut Criterion) {
    let sample_rate = 22050.0;
    let templates = ToneTemplates::new(sample_rate);
    let mut corr = CorrelationState::new(&templates);
    let mut osc = PhaseAccumulator::new(sample_rate, same_core::MARK_FREQ_HZ);

    c.bench_function("correlate_process_sample", |b| {
        b.iter(|| {
            let sample = osc.advance();
            black_box(corr.process(&templates, sample));
        })
    });
}

fn bench_template_build(c: &mut Criterion) {
    c.bench_function("tone_templates_new_22050", |b| {
        b.iter(|| black_box(ToneTemplates::new(22050.0)))
    });
}

criterion_group!(benches, bench_correlation, bench_template_build);
criterion_main!(benches);
