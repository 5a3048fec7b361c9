//! Host-owned estimate cache
//!
//! Memoizes `TdeeEstimate`s keyed by the exact numeric inputs. The cache is an
//! ordinary value: hosts create one, pass it where needed and drop it when
//! done. Nothing in the crate keeps cached state behind the caller's back.

use std::collections::{HashMap, VecDeque};

use chrono::NaiveDate;

use crate::estimator::TdeeEstimator;
use crate::types::{
    ActivityLevel, Biometrics, Gender, GoalType, IntakeSample, TdeeEstimate, WeeklyGoal,
    WeightSample,
};

/// Default number of cached estimates
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

/// Biometrics with floats compared by bit pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BiometricsKey {
    weight_bits: u64,
    height_bits: u64,
    age: u32,
    gender: Gender,
    activity_level: ActivityLevel,
    goal_type: GoalType,
    weekly_goal: WeeklyGoal,
}

impl From<&Biometrics> for BiometricsKey {
    fn from(b: &Biometrics) -> Self {
        Self {
            weight_bits: b.weight_kg.to_bits(),
            height_bits: b.height_cm.to_bits(),
            age: b.age,
            gender: b.gender,
            activity_level: b.activity_level,
            goal_type: b.goal_type,
            weekly_goal: b.weekly_goal,
        }
    }
}

/// Exact inputs of one estimate call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EstimateKey {
    weights: Vec<(NaiveDate, u64)>,
    intakes: Vec<(NaiveDate, u64)>,
    biometrics: BiometricsKey,
}

impl EstimateKey {
    pub fn new(weights: &[WeightSample], intakes: &[IntakeSample], biometrics: &Biometrics) -> Self {
        Self {
            weights: weights.iter().map(|s| (s.date, s.weight_kg.to_bits())).collect(),
            intakes: intakes.iter().map(|s| (s.date, s.calories.to_bits())).collect(),
            biometrics: BiometricsKey::from(biometrics),
        }
    }
}

/// Bounded FIFO cache in front of a single estimator
#[derive(Debug, Clone)]
pub struct EstimateCache {
    estimator: TdeeEstimator,
    entries: HashMap<EstimateKey, TdeeEstimate>,
    /// Insertion order for eviction
    order: VecDeque<EstimateKey>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl Default for EstimateCache {
    fn default() -> Self {
        Self::new(TdeeEstimator::default(), DEFAULT_CACHE_CAPACITY)
    }
}

impl EstimateCache {
    /// A capacity of 0 disables caching
    pub fn new(estimator: TdeeEstimator, capacity: usize) -> Self {
        Self {
            estimator,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn estimator(&self) -> &TdeeEstimator {
        &self.estimator
    }

    /// Cached estimate for these inputs, computing and storing it on a miss
    pub fn get_or_estimate(
        &mut self,
        weights: &[WeightSample],
        intakes: &[IntakeSample],
        biometrics: &Biometrics,
    ) -> TdeeEstimate {
        let key = EstimateKey::new(weights, intakes, biometrics);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            return hit.clone();
        }

        self.misses += 1;
        let estimate = self.estimator.estimate(weights, intakes, biometrics);
        if self.capacity > 0 {
            while self.order.len() >= self.capacity {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                }
            }
            self.order.push_back(key.clone());
            self.entries.insert(key, estimate.clone());
        }
        estimate
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation or the last clear
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
