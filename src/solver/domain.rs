use std::time::{Duration, SystemTime};

use im::Vector;

use crate::solver::value::Value;

/// An ordered, duplicate-free collection of candidate values for one variable.
///
/// The stored order is significant: it is the order in which the backtracking
/// search tries values, and it is preserved under removal. Domains are backed
/// by a persistent vector, so [`Domain::remove`] hands back a new domain that
/// shares structure with the original, and cloning is cheap.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain<V: Value> {
    values: Vector<V>,
}

impl<V: Value> Domain<V> {
    /// Builds a domain from the given values, keeping the first occurrence of
    /// any duplicate.
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        values.into_iter().collect()
    }

    /// Returns true iff any stored element equals `value`.
    pub fn contains(&self, value: &V) -> bool {
        self.values.iter().any(|item| item == value)
    }

    /// Returns a new domain with `value` excluded. If `value` is absent the
    /// original domain is handed back unchanged.
    pub fn remove(&self, value: &V) -> Self {
        match self.position(value) {
            Some(index) => self.remove_at(index),
            None => self.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates the values in stored order.
    pub fn iter(&self) -> impl Iterator<Item = &V> {
        self.values.iter()
    }

    pub fn first(&self) -> Option<&V> {
        self.values.front()
    }

    pub(crate) fn position(&self, value: &V) -> Option<usize> {
        self.values.iter().position(|item| item == value)
    }

    pub(crate) fn remove_at(&self, index: usize) -> Self {
        let mut values = self.values.clone();
        values.remove(index);
        Self { values }
    }

    pub(crate) fn insert_at(&self, index: usize, value: V) -> Self {
        let mut values = self.values.clone();
        values.insert(index, value);
        Self { values }
    }
}

impl<V: Value> FromIterator<V> for Domain<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut values = Vector::new();
        for value in iter {
            if !values.iter().any(|item| *item == value) {
                values.push_back(value);
            }
        }
        Self { values }
    }
}

impl<'a, V: Value> IntoIterator for &'a Domain<V> {
    type Item = &'a V;
    type IntoIter = im::vector::Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

/// Integers in `[start, end)` with a step of 1.
pub fn int_range(start: i64, end: i64) -> Domain<i64> {
    int_range_step(start, end, 1)
}

/// Integers `start, start+step, ...` while the value is `< end`. The length
/// is rounded up when the span is not a multiple of the step.
///
/// # Panics
///
/// Panics if `step` is not positive.
pub fn int_range_step(start: i64, end: i64, step: i64) -> Domain<i64> {
    assert!(step > 0, "step must be positive");
    let span = end.saturating_sub(start);
    let count = if span <= 0 { 0 } else { (span + step - 1) / step };
    (0..count).map(|i| start + i * step).collect()
}

/// Floating-point values in `[start, end)` with a step of 1.
pub fn float_range(start: f64, end: f64) -> Domain<f64> {
    float_range_step(start, end, 1.0)
}

/// Floating-point values `start, start+step, ...` while the value is `< end`.
///
/// # Panics
///
/// Panics if `step` is not positive.
pub fn float_range_step(start: f64, end: f64, step: f64) -> Domain<f64> {
    assert!(step > 0.0, "step must be positive");
    let count = ((end - start) / step).ceil().max(0.0) as i64;
    (0..count).map(|i| start + i as f64 * step).collect()
}

/// Time instants from `start` to `end` in steps of one day.
pub fn time_range(start: SystemTime, end: SystemTime) -> Domain<SystemTime> {
    time_range_step(start, end, Duration::from_secs(60 * 60 * 24))
}

/// Time instants `start, start+step, ...` while the instant is `< end`.
///
/// # Panics
///
/// Panics if `step` is zero.
pub fn time_range_step(start: SystemTime, end: SystemTime, step: Duration) -> Domain<SystemTime> {
    assert!(!step.is_zero(), "step must be non-zero");
    let span = match end.duration_since(start) {
        Ok(span) => span,
        Err(_) => return Domain::new([]),
    };
    let count = span.as_nanos().div_ceil(step.as_nanos()) as u32;
    (0..count).map(|i| start + step * i).collect()
}

/// Builds a domain by applying `f` to every value of `input`, in input order.
pub fn generator<V: Value, U: Value>(input: &Domain<V>, f: impl Fn(&V) -> U) -> Domain<U> {
    input.iter().map(f).collect()
}
