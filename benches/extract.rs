use std::io::Cursor;

use audio_tag_extractor::{Extractor, ExtractorConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn flac_sample(artwork_len: usize) -> Vec<u8> {
    let entries = [
        "TITLE=Benchmark",
        "ARTIST=Artist",
        "ALBUM=Album",
        "ALBUMARTIST=Various",
        "GENRE=Electronic",
        "TRACKNUMBER=1/12",
        "DATE=2020",
    ];
    let mut comment = 0u32.to_le_bytes().to_vec();
    comment.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        comment.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        comment.extend_from_slice(entry.as_bytes());
    }

    let mut picture = 3u32.to_be_bytes().to_vec();
    picture.extend_from_slice(&10u32.to_be_bytes());
    picture.extend_from_slice(b"image/jpeg");
    picture.extend_from_slice(&[0; 20]);
    picture.extend_from_slice(&(artwork_len as u32).to_be_bytes());
    picture.extend(std::iter::repeat(0xAB).take(artwork_len));

    let mut out = b"fLaC".to_vec();
    out.push(0x00);
    out.extend_from_slice(&34u32.to_be_bytes()[1..]);
    out.extend_from_slice(&[0; 34]);
    out.push(0x04);
    out.extend_from_slice(&(comment.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(&comment);
    out.push(0x86);
    out.extend_from_slice(&(picture.len() as u32).to_be_bytes()[1..]);
    out.extend_from_slice(&picture);
    // Audio frames that must never be read.
    out.extend(std::iter::repeat(0u8).take(1 << 20));
    out
}

fn bench_extract(c: &mut Criterion) {
    let sample = flac_sample(512 * 1024);

    let extractor = Extractor::new();
    c.bench_function("flac with 512 KiB artwork", |b| {
        b.iter(|| {
            extractor
                .extract_from_reader(Cursor::new(black_box(sample.as_slice())), None)
                .unwrap()
        })
    });

    let text_only = Extractor::with_config(ExtractorConfig {
        include_artwork: false,
        ..ExtractorConfig::default()
    });
    c.bench_function("flac text only", |b| {
        b.iter(|| {
            text_only
                .extract_from_reader(Cursor::new(black_box(sample.as_slice())), None)
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
