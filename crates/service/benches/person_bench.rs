use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use bson::oid::ObjectId;
use service::person::{id, PersonInput, PersonService, PhoneNumber, PhoneType};
use service::person::repository::mock::MockPersonRepository;

fn bench_id_codec(c: &mut Criterion) {
    let oid = ObjectId::new();
    let external = id::encode(&oid);

    c.bench_function("person_id_decode", |b| {
        b.iter(|| id::decode(&external).unwrap());
    });
    c.bench_function("person_id_encode", |b| {
        b.iter(|| id::encode(&oid));
    });
}

fn bench_create(c: &mut Criterion) {
    let svc = PersonService::new(Arc::new(MockPersonRepository::default()));
    let rt = tokio::runtime::Runtime::new().unwrap();
    let input = PersonInput {
        name: "Bench".into(),
        email: "bench@example.com".into(),
        phones: vec![PhoneNumber { number: "+1 555 0100".into(), kind: PhoneType::Mobile }],
        ..Default::default()
    };

    c.bench_function("person_create_mock", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.create(input.clone())).unwrap();
        });
    });
}

criterion_group!(benches, bench_id_codec, bench_create);
criterion_main!(benches);
