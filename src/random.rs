/// Source of uniform randomness for everything that spawns or picks.
pub trait Random {
    /// Uniform value in `[0, 1)`.
    fn unit(&mut self) -> f32;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform value in `[min, max)`.
    fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.unit() * (max - min)
    }
}

impl Random for fastrand::Rng {
    fn unit(&mut self) -> f32 {
        self.f32()
    }

    fn index(&mut self, len: usize) -> usize {
        self.usize(0..len)
    }
}

/// Builds the process random source, seeded when a seed is given.
pub fn source(seed: Option<u64>) -> fastrand::Rng {
    match seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::Random;

    /// Replays fixed values, cycling when exhausted.
    pub struct Scripted {
        units: Vec<f32>,
        next: usize,
    }

    impl Scripted {
        pub fn new(units: &[f32]) -> Self {
            Self {
                units: units.to_vec(),
                next: 0,
            }
        }

        /// Always returns `value`; `index` returns the matching bucket.
        pub fn constant(value: f32) -> Self {
            Self::new(&[value])
        }
    }

    impl Random for Scripted {
        fn unit(&mut self) -> f32 {
            let value = self.units[self.next % self.units.len()];
            self.next += 1;
            value
        }

        fn index(&mut self, len: usize) -> usize {
            ((self.unit() * len as f32) as usize).min(len - 1)
        }
    }
}
