//! Odds and ends shared by the demos.

/// A tiny multiplicative congruential generator.
///
/// The demos use it to scatter asteroids, tint textures and the like, where
/// the only requirements are determinism and zero setup cost. Not suitable
/// for anything that needs actual statistical quality.
#[derive(Debug, Clone, Copy)]
pub struct Lcg {
    seed: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Lcg { seed }
    }

    /// Returns a pseudo-random `f32` in `[0.0, 1.0)`.
    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(16807);
        let tmp = self.seed ^ (self.seed >> 4) ^ (self.seed << 15);
        f32::from_bits((tmp >> 9) | 0x3F80_0000) - 1.0
    }

    /// Returns a pseudo-random `f32` in `[lo, hi)`.
    pub fn gen_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

impl Default for Lcg {
    fn default() -> Self {
        Lcg::new(0x1337_1337)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_stays_in_unit_range() {
        let mut rng = Lcg::default();
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!(v >= 0.0 && v < 1.0, "out of range: {}", v);
        }
    }

    #[test]
    fn lcg_is_deterministic() {
        let mut a = Lcg::new(42);
        let mut b = Lcg::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn lcg_seeds_diverge() {
        let mut a = Lcg::new(1);
        let mut b = Lcg::new(2);
        let same = (0..32).filter(|_| a.next_f32() == b.next_f32()).count();
        assert!(same < 32);
    }

    #[test]
    fn gen_range_respects_bounds() {
        let mut rng = Lcg::new(7);
        for _ in 0..1_000 {
            let v = rng.gen_range(-4.0, 9.0);
            assert!(v >= -4.0 && v < 9.0);
        }
    }
}
