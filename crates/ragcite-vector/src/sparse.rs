use std::collections::BTreeMap;

/// Term-weighted sparse vector.
///
/// Backed by an ordered map so norms and dot products are summed in a fixed
/// term order and come out bit-identical on every run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    weights: BTreeMap<String, f64>,
}

impl SparseVector {
    pub fn new() -> Self { Self::default() }

    pub fn add(&mut self, term: &str, weight: f64) {
        *self.weights.entry(term.to_string()).or_default() += weight;
    }

    pub fn get(&self, term: &str) -> f64 { self.weights.get(term).copied().unwrap_or(0.0) }

    pub fn is_empty(&self) -> bool { self.weights.is_empty() }

    pub fn norm(&self) -> f64 { self.weights.values().map(|w| w * w).sum::<f64>().sqrt() }

    /// Scales every weight so [`norm`](Self::norm) is 1. A zero vector is
    /// returned unchanged instead of being divided by zero.
    #[must_use]
    pub fn l2_normalized(mut self) -> Self {
        let norm = self.norm();
        if norm > 0.0 {
            for w in self.weights.values_mut() { *w /= norm; }
        }
        self
    }

    /// Iterates the smaller vector and probes the larger one.
    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (small, large) = if self.weights.len() <= other.weights.len() { (self, other) } else { (other, self) };
        small.weights.iter().map(|(term, w)| w * large.get(term)).sum()
    }

    /// Cosine similarity; 0 when either vector has zero norm.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 { return 0.0; }
        self.dot(other) / denom
    }
}
