extern crate alloc;
use alloc::vec;
use alloc::vec::Vec;

use rand::{Rng, SeedableRng as _};
use rand_xoshiro::Xoroshiro128PlusPlus;

use crate::matcher::distance_sq;

/// Sample budget for clustering: a stride through the image targets roughly
/// this many points regardless of resolution.
const SAMPLE_TARGET: usize = 2000;

/// Pixels at or below this alpha are treated as fully transparent and
/// excluded from clustering.
const OPACITY_THRESHOLD: u8 = 128;

/// Cluster a deterministic sample of the opaque pixels into at most `k`
/// dominant colors, seeding the orphan-reseed RNG from `seed`.
///
/// Seeding is fully deterministic (black, then white, then farthest-point
/// selection), so repeated runs over the same input agree except when a
/// cluster loses all its samples and is re-seeded randomly. An
/// all-transparent buffer yields an empty result; that is a valid terminal
/// state, not an error.
pub fn quantize(
    pixels: &[rgb::RGBA<u8>],
    k: usize,
    max_iterations: usize,
    seed: u64,
) -> Vec<rgb::RGB<u8>> {
    let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
    quantize_with_rng(pixels, k, max_iterations, &mut rng)
}

/// [`quantize`] with a caller-supplied RNG. Only the re-seeding of orphaned
/// clusters draws from it.
pub fn quantize_with_rng<R: Rng + ?Sized>(
    pixels: &[rgb::RGBA<u8>],
    k: usize,
    max_iterations: usize,
    rng: &mut R,
) -> Vec<rgb::RGB<u8>> {
    let samples = collect_samples(pixels);
    if samples.is_empty() || k == 0 {
        return Vec::new();
    }

    let mut centroids = seed_centroids(&samples, k);

    for _ in 0..max_iterations {
        let mut sums = vec![[0u64; 3]; centroids.len()];
        let mut counts = vec![0u64; centroids.len()];

        for s in &samples {
            let mut slot = 0;
            let mut best = u32::MAX;
            for (i, c) in centroids.iter().enumerate() {
                let d = distance_sq(*s, *c);
                if d < best {
                    best = d;
                    slot = i;
                }
            }
            sums[slot][0] += u64::from(s.r);
            sums[slot][1] += u64::from(s.g);
            sums[slot][2] += u64::from(s.b);
            counts[slot] += 1;
        }

        let mut changed = false;
        for (i, centroid) in centroids.iter_mut().enumerate() {
            if counts[i] == 0 {
                // Orphaned cluster: re-seed from a random sample. The one
                // non-deterministic step. Always counts as a change so the
                // next iteration re-assigns against the new position.
                *centroid = samples[rng.random_range(0..samples.len())];
                changed = true;
            } else {
                let mean = rgb::RGB {
                    r: rounded_mean(sums[i][0], counts[i]),
                    g: rounded_mean(sums[i][1], counts[i]),
                    b: rounded_mean(sums[i][2], counts[i]),
                };
                if *centroid != mean {
                    *centroid = mean;
                    changed = true;
                }
            }
        }

        if !changed {
            break;
        }
    }

    centroids
}

/// Deterministic stride sample of the opaque pixels.
fn collect_samples(pixels: &[rgb::RGBA<u8>]) -> Vec<rgb::RGB<u8>> {
    let step = (pixels.len() / SAMPLE_TARGET).max(1);
    pixels
        .iter()
        .step_by(step)
        .filter(|p| p.a > OPACITY_THRESHOLD)
        .map(|p| rgb::RGB {
            r: p.r,
            g: p.g,
            b: p.b,
        })
        .collect()
}

/// Farthest-point seeding with structural anchors: black first, white
/// second, then repeatedly the sample farthest from everything chosen so
/// far. No randomness, so seeding is reproducible.
fn seed_centroids(samples: &[rgb::RGB<u8>], k: usize) -> Vec<rgb::RGB<u8>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(rgb::RGB { r: 0, g: 0, b: 0 });
    if k >= 2 {
        centroids.push(rgb::RGB {
            r: 255,
            g: 255,
            b: 255,
        });
    }

    while centroids.len() < k {
        let mut farthest = samples[0];
        let mut farthest_dist = 0u32;
        for s in samples {
            let nearest = centroids
                .iter()
                .map(|c| distance_sq(*s, *c))
                .min()
                .unwrap_or(u32::MAX);
            // Strict > keeps the earliest sample on ties.
            if nearest > farthest_dist {
                farthest_dist = nearest;
                farthest = *s;
            }
        }
        centroids.push(farthest);
    }

    centroids
}

fn rounded_mean(sum: u64, count: u64) -> u8 {
    ((sum as f64 / count as f64).round()) as u8
}
