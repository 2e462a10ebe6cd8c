//! Floating-point precision tags for tuned kernels.
//!
//! A [`Precision`] selects the element type a kernel is compiled for. Complex
//! precisions store two components per element. [`Scalar`] carries the
//! alpha/beta coefficients in the matching host representation.

pub mod error;
pub mod ext;


use std::fmt;
use std::str::FromStr;

use snafu::OptionExt;

pub use error::{Error, Result};
pub use ext::HasPrecision;

/// Element precision of a tuned kernel.
///
/// The numeric codes follow the conventional BLAS tuner numbering, so `3232`
/// is single-precision complex and `6464` double-precision complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Half,
    #[default]
    Single,
    Double,
    ComplexSingle,
    ComplexDouble,
}

impl Precision {
    /// Size of one element in bytes.
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Half => 2,
            Self::Single => 4,
            Self::Double => 8,
            Self::ComplexSingle => 8,
            Self::ComplexDouble => 16,
        }
    }

    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::ComplexSingle | Self::ComplexDouble)
    }

    pub const fn code(&self) -> u32 {
        match self {
            Self::Half => 16,
            Self::Single => 32,
            Self::Double => 64,
            Self::ComplexSingle => 3232,
            Self::ComplexDouble => 6464,
        }
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            16 => Some(Self::Half),
            32 => Some(Self::Single),
            64 => Some(Self::Double),
            3232 => Some(Self::ComplexSingle),
            6464 => Some(Self::ComplexDouble),
            _ => None,
        }
    }

    /// Kernel-source name of the element type.
    pub const fn c_style(&self) -> &'static str {
        match self {
            Self::Half => "half",
            Self::Single => "float",
            Self::Double => "double",
            Self::ComplexSingle => "float2",
            Self::ComplexDouble => "double2",
        }
    }

    /// Convert a coefficient into the host representation for this precision.
    ///
    /// Real precisions drop `im`. Half precision is passed as `f32`, which is
    /// how half-precision kernels receive their scalar arguments.
    pub fn scalar(&self, re: f64, im: f64) -> Scalar {
        match self {
            Self::Half | Self::Single => Scalar::F32(re as f32),
            Self::Double => Scalar::F64(re),
            Self::ComplexSingle => Scalar::ComplexF32 { re: re as f32, im: im as f32 },
            Self::ComplexDouble => Scalar::ComplexF64 { re, im },
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Precision {
    type Err = Error;

    /// Accepts either the numeric code (`"32"`) or a name (`"single"`, `"complex-double"`).
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<u32>() {
            return Self::from_code(code).context(error::UnknownSnafu { input: s });
        }

        let parsed = match trimmed.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "half" | "fp16" => Some(Self::Half),
            "single" | "float" | "fp32" => Some(Self::Single),
            "double" | "fp64" => Some(Self::Double),
            "complexsingle" | "complexfloat" => Some(Self::ComplexSingle),
            "complexdouble" => Some(Self::ComplexDouble),
            _ => None,
        };
        parsed.context(error::UnknownSnafu { input: s })
    }
}

/// Host-side value of a scalar kernel argument.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Scalar {
    F32(f32),
    F64(f64),
    ComplexF32 { re: f32, im: f32 },
    ComplexF64 { re: f64, im: f64 },
}

impl Scalar {
    /// Real component widened to `f64`.
    pub fn re(&self) -> f64 {
        match *self {
            Self::F32(v) => v as f64,
            Self::F64(v) => v,
            Self::ComplexF32 { re, .. } => re as f64,
            Self::ComplexF64 { re, .. } => re,
        }
    }

    /// Imaginary component widened to `f64`; zero for real scalars.
    pub fn im(&self) -> f64 {
        match *self {
            Self::F32(_) | Self::F64(_) => 0.0,
            Self::ComplexF32 { im, .. } => im as f64,
            Self::ComplexF64 { im, .. } => im,
        }
    }

    pub const fn is_complex(&self) -> bool {
        matches!(self, Self::ComplexF32 { .. } | Self::ComplexF64 { .. })
    }

    /// Bytes occupied when passed as a kernel argument.
    pub const fn bytes(&self) -> usize {
        match self {
            Self::F32(_) => 4,
            Self::F64(_) | Self::ComplexF32 { .. } => 8,
            Self::ComplexF64 { .. } => 16,
        }
    }

    /// Little-endian argument bytes, real component first.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match *self {
            Self::F32(v) => v.to_le_bytes().to_vec(),
            Self::F64(v) => v.to_le_bytes().to_vec(),
            Self::ComplexF32 { re, im } => [re.to_le_bytes(), im.to_le_bytes()].concat(),
            Self::ComplexF64 { re, im } => [re.to_le_bytes(), im.to_le_bytes()].concat(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::ComplexF32 { re, im } => write!(f, "({re}, {im})"),
            Self::ComplexF64 { re, im } => write!(f, "({re}, {im})"),
        }
    }
}
