use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{thread_rng, SeedableRng};

use crate::models::question::Question;

/// Randomizes the order of an in-memory question pool.
pub trait QuestionShuffler: Send + Sync {
    fn shuffle(&self, questions: &mut [Question]);
}

/// Fresh thread-local randomness on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngShuffler;

impl QuestionShuffler for ThreadRngShuffler {
    fn shuffle(&self, questions: &mut [Question]) {
        questions.shuffle(&mut thread_rng());
    }
}

/// Reproducible sequence of permutations from a fixed seed.
#[derive(Debug)]
pub struct SeededShuffler {
    rng: Mutex<StdRng>,
}

impl SeededShuffler {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl QuestionShuffler for SeededShuffler {
    fn shuffle(&self, questions: &mut [Question]) {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        questions.shuffle(&mut *rng);
    }
}
