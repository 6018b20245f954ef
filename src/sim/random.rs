//! Random draws
//!
//! Every random decision in the sim is a unit draw in [0, 1) from the one
//! injected generator, so a scripted generator can replay exact outcomes.

use rand::Rng;

/// Uniform draw in [0, 1)
#[inline]
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.random::<f64>()
}

/// Fair coin
#[inline]
pub fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    unit(rng) < 0.5
}

/// Uniform index in `0..len` (0 when `len` is 0)
#[inline]
pub fn index<R: Rng + ?Sized>(rng: &mut R, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    ((unit(rng) * len as f64) as usize).min(len - 1)
}

/// Uniform draw in [lo, lo + span)
#[inline]
pub fn span<R: Rng + ?Sized>(rng: &mut R, lo: f64, span: f64) -> f64 {
    lo + unit(rng) * span
}

/// Test double that replays a fixed list of unit draws (cycling when exhausted)
#[cfg(test)]
pub struct ScriptedRng {
    draws: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl ScriptedRng {
    pub fn new(draws: &[f64]) -> Self {
        assert!(!draws.is_empty());
        assert!(draws.iter().all(|d| (0.0..1.0).contains(d)));
        Self {
            draws: draws.to_vec(),
            next: 0,
        }
    }

    /// Number of draws consumed so far
    pub fn consumed(&self) -> usize {
        self.next
    }
}

#[cfg(test)]
impl rand::RngCore for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        // Inverse of rand's 53-bit mantissa float conversion
        ((draw * (1u64 << 53) as f64) as u64) << 11
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}
