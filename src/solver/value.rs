/// The base trait for any value a variable can take.
///
/// The kernel only ever compares values for equality. `PartialEq` rather
/// than `Eq` is required so that `f64` domains work out of the box.
pub trait Value: Clone + std::fmt::Debug + PartialEq + 'static {}
impl<T> Value for T where T: Clone + std::fmt::Debug + PartialEq + 'static {}

/// A capability trait for values that can be compared, required by the
/// ordering constraints (`less_than`, `greater_than` and friends).
pub trait OrderedValue: Value + PartialOrd {}
impl<T> OrderedValue for T where T: Value + PartialOrd {}
