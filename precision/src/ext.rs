use super::*;

/// Host element types with a fixed kernel precision.
pub trait HasPrecision {
    const PRECISION: Precision;
}

macro_rules! impl_precision_ext {
    ($($ty:ty => $precision:expr),* $(,)?) => {
        $(impl HasPrecision for $ty { const PRECISION: Precision = $precision; })*
    };
}

impl_precision_ext! {
    f32 => Precision::Single,
    f64 => Precision::Double,
    [f32; 2] => Precision::ComplexSingle,
    [f64; 2] => Precision::ComplexDouble,
}
