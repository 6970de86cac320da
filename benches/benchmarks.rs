criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        reducing_unit_resnet18,
        reducing_unit_resnet152,
        clustering_kmeans_single,
        clustering_kmeans_restarts,
}

fn reducing_unit_resnet18(c: &mut criterion::Criterion) {
    let matrix = embeddings(240, Family::Resnet18.width());
    c.bench_function("reduce 240 x 512 embeddings to 5 components", |b| {
        b.iter(|| Pca::new(DIMENSIONS).reduce(&matrix))
    });
}

fn reducing_unit_resnet152(c: &mut criterion::Criterion) {
    let matrix = embeddings(240, Family::Resnet152.width());
    c.bench_function("reduce 240 x 2048 embeddings to 5 components", |b| {
        b.iter(|| Pca::new(DIMENSIONS).reduce(&matrix))
    });
}

fn clustering_kmeans_single(c: &mut criterion::Criterion) {
    let points = Pca::new(DIMENSIONS).reduce(&embeddings(240, 512));
    let clustering = Clustering::new(CLUSTERS, SEED).restarts(1);
    c.bench_function("fit k-means with 1 restart", |b| {
        b.iter(|| clustering.fit(&points))
    });
}

fn clustering_kmeans_restarts(c: &mut criterion::Criterion) {
    let points = Pca::new(DIMENSIONS).reduce(&embeddings(240, 512));
    let clustering = Clustering::new(CLUSTERS, SEED).restarts(KMEANS_RESTARTS);
    c.bench_function("fit k-means with 1000 restarts", |b| {
        b.iter(|| clustering.fit(&points))
    });
}

/// Clumpy synthetic embeddings: a handful of centres plus noise.
fn embeddings(n: usize, width: usize) -> Vec<FeatureVector> {
    use rand::Rng;
    use rand::SeedableRng;
    let ref mut rng = rand::rngs::SmallRng::seed_from_u64(SEED);
    let centres = (0..8)
        .map(|_| (0..width).map(|_| rng.random::<Feature>()).collect::<Vec<Feature>>())
        .collect::<Vec<_>>();
    (0..n)
        .map(|i| {
            centres[i % centres.len()]
                .iter()
                .map(|x| x + rng.random_range(-0.1..0.1))
                .collect()
        })
        .collect()
}

use hexsample::embedding::Family;
use hexsample::embedding::FeatureVector;
use hexsample::sampling::Clustering;
use hexsample::sampling::Pca;
use hexsample::*;
