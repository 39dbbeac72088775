use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use swf_decoder::{DecoderOptions, FlvDecoder, MovieDecoder};
use swf_encoder::encode_movie;
use swf_tests::{HELLO_MOVIE, bytes, sample_flv, sample_movie};

fn bench_decode_small(c: &mut Criterion) {
    let payload = bytes(HELLO_MOVIE);

    c.bench_function("decode_small", |b| {
        b.iter(|| MovieDecoder::decode(&payload).unwrap());
    });
}

fn bench_decode_compressed(c: &mut Criterion) {
    let mut movie = sample_movie(200);
    let plain = encode_movie(&movie).unwrap();
    movie.compressed = true;
    let packed = encode_movie(&movie).unwrap();

    let mut group = c.benchmark_group("decode_compression");

    group.bench_function("plain", |b| {
        b.iter(|| MovieDecoder::decode(&plain).unwrap());
    });
    group.bench_function("zlib", |b| {
        b.iter(|| MovieDecoder::decode(&packed).unwrap());
    });

    group.finish();
}

fn bench_decode_actions(c: &mut Criterion) {
    let payload = encode_movie(&sample_movie(500)).unwrap();
    let raw = MovieDecoder::with_options(DecoderOptions {
        decode_actions: false,
        ..DecoderOptions::default()
    });

    let mut group = c.benchmark_group("decode_actions");

    group.bench_function("decoded", |b| {
        b.iter(|| MovieDecoder::decode(&payload).unwrap());
    });
    group.bench_function("raw", |b| {
        b.iter(|| raw.read(&payload).unwrap());
    });

    group.finish();
}

fn bench_decode_flv(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_flv");

    for payload in [256, 4096] {
        let file = sample_flv(250, payload);
        #[allow(clippy::cast_possible_truncation)]
        group.throughput(Throughput::Bytes(file.len() as u64));
        group.bench_with_input(BenchmarkId::new("frames_250", payload), &file, |b, file| {
            b.iter(|| FlvDecoder::decode(file).unwrap());
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decode_small,
    bench_decode_compressed,
    bench_decode_actions,
    bench_decode_flv
);
criterion_main!(benches);
