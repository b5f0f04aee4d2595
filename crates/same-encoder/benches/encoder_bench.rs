use criterion::{Criterion, black_box, criterion_group, criterion_main};
use same_core::header_fields::{
    EventCode, Issuance, Originator, PurgeDuration, StationId, parse_location_list,
};
use same_encoder::{Activation, SameEncoder};

fn s1_activation() -> Activation {
    Activation {
        originator: Originator::parse("EAS").unwrap(),
        event_code: EventCode::parse("RWT").unwrap(),
        locations: parse_location_list("039107").unwrap(),
        purge_duration: PurgeDuration::parse("0030").unwrap(),
        issuance: Issuance::parse("0521800").unwrap(),
        station_id: StationId::from_name("KR8MER"),
        narration: None,
        attention_seconds: 8.0,
        inter_burst_silence_sec: 1.0,
        sample_rate: 22050,
    }
}

fn bench_encode(c: &mut Criterion) {
    let encoder = SameEncoder::new();
    let activation = s1_activation();
    c.bench_function("encode_s1_activation", |b| {
        b.iter(|| black_box(encoder.encode(&activation).unwrap()))
    });
}

criterion_group!(benches, bench_encode);
criterion_main!(benches);
