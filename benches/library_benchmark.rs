use criterion::{criterion_group, criterion_main, Criterion};
use spotify_insights::models::{AudioFeatures, Track, TrackCollection};
use std::hint::black_box;

/// A library the size of the saved-track page cap (20 pages of 50).
fn synthetic_library() -> TrackCollection {
    (0..1000)
        .map(|i| Track {
            id: format!("track{i}"),
            name: format!("Song number {i}"),
            album_name: format!("Album {}", i / 12),
            artists: vec![format!("Artist {}", i % 37), "Featured Guest".to_string()],
            popularity: (i % 100) as u32,
            // Every tenth track has no features, as with local files
            audio_features: (i % 10 != 0).then(|| AudioFeatures {
                danceability: (i % 7) as f64 / 7.0,
                energy: (i % 5) as f64 / 5.0,
                valence: (i % 3) as f64 / 3.0,
                tempo: 90.0 + (i % 60) as f64,
                loudness: -12.0 + (i % 8) as f64,
                acousticness: 0.25,
                instrumentalness: 0.0,
                liveness: 0.1,
                speechiness: 0.05,
            }),
        })
        .collect()
}

fn benchmark_library_stats(c: &mut Criterion) {
    let library = synthetic_library();

    let mut group = c.benchmark_group("library");

    group.bench_function("mean_feature_vector", |b| {
        b.iter(|| black_box(&library).mean_feature_vector())
    });

    group.bench_function("filter_by_artist", |b| {
        b.iter(|| black_box(&library).filter_by_query(black_box("artist 3")))
    });

    group.bench_function("filter_no_match", |b| {
        b.iter(|| black_box(&library).filter_by_query(black_box("zzzz")))
    });

    group.finish();
}

criterion_group!(benches, benchmark_library_stats);
criterion_main!(benches);
