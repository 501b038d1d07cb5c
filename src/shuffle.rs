use rand::rngs::StdRng;
use rand::SeedableRng;

/// Seeded when a seed is configured so a reshuffle can be replayed.
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}
