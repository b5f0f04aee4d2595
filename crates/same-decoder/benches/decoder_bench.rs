use criterion::{Criterion, black_box, criterion_group, criterion_main};
use same_core::header_fields::{
    EventCode, Issuance, Originator, PurgeDuration, StationId, parse_location_list,
};
use same_decoder::stream::StreamingDecoder;
use same_encoder::{Activation, SameEncoder};

const SAMPLE_RATE: f32 = 22_050.0;

fn s1_samples() -> Vec<f32> {
    let activation = Activation {
        originator: Originator::parse("EAS").unwrap(),
        event_code: EventCode::parse("RWT").unwrap(),
        locations: parse_location_list("039107").unwrap(),
        purge_duration: PurgeDuration::parse("0030").unwrap(),
        issuance: Issuance::parse("0521800").unwrap(),
        station_id: StationId::from_name("KR8MER"),
        narration: None,
        attention_seconds: 0.1,
        inter_burst_silence_sec: 1.0,
        sample_rate: SAMPLE_RATE as u32,
    };
    SameEncoder::new().encode(&activation).unwrap().samples
}

fn bench_process_samples(c: &mut Criterion) {
    let samples = s1_samples();
    c.bench_function("decoder_process_s1_activation", |b| {
        b.iter(|| {
            let mut decoder = StreamingDecoder::new(SAMPLE_RATE).unwrap();
            for chunk in samples.chunks(4096) {
                black_box(decoder.process_samples(chunk));
            }
        })
    });
}

fn bench_per_sample_hot_loop(c: &mut Criterion) {
    let samples = s1_samples();
    let mut decoder = StreamingDecoder::new(SAMPLE_RATE).unwrap();
    c.bench_function("decoder_process_single_sample", |b| {
        let mut i = 0usize;
        b.iter(|| {
            let sample = samples[i % samples.len()];
            i += 1;
            black_box(decoder.process_samples(std::slice::from_ref(&sample)));
        })
    });
}

criterion_group!(benches, bench_process_samples, bench_per_sample_hot_loop);
criterion_main!(benches);
