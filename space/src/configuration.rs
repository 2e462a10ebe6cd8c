use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use smallvec::SmallVec;
use snafu::{OptionExt, ensure};

use crate::error::*;
use crate::parameter::ParameterSpace;

/// Positional values, one per parameter of the owning space.
pub type Values = SmallVec<[usize; 16]>;

/// One concrete value for every parameter of a space.
///
/// Values are stored positionally in the space's insertion order. Equality
/// and hashing look at the values only.
#[derive(Clone)]
pub struct Configuration {
    space: Arc<ParameterSpace>,
    values: Values,
}

impl Configuration {
    /// Caller guarantees one candidate value per parameter.
    pub(crate) fn new_unchecked(space: Arc<ParameterSpace>, values: impl Into<Values>) -> Self {
        Self { space, values: values.into() }
    }

    /// Build from positional values, checking each against its candidates.
    pub fn from_values(space: Arc<ParameterSpace>, values: &[usize]) -> Result<Self> {
        ensure!(
            values.len() == space.len(),
            IncompleteConfigurationSnafu { expected: space.len(), found: values.len() }
        );
        for (param, &value) in space.parameters().iter().zip(values) {
            ensure!(param.contains(value), NotACandidateSnafu { name: param.name(), value });
        }
        Ok(Self::new_unchecked(space, values))
    }

    /// Build from `(name, value)` pairs in any order.
    pub fn from_named<'n>(
        space: Arc<ParameterSpace>,
        pairs: impl IntoIterator<Item = (&'n str, usize)>,
    ) -> Result<Self> {
        let mut slots: SmallVec<[Option<usize>; 16]> = smallvec::smallvec![None; space.len()];
        for (name, value) in pairs {
            slots[space.require(name)?] = Some(value);
        }

        let found = slots.iter().filter(|slot| slot.is_some()).count();
        let values = slots
            .into_iter()
            .collect::<Option<Values>>()
            .context(IncompleteConfigurationSnafu { expected: space.len(), found })?;
        Self::from_values(space, &values)
    }

    pub fn space(&self) -> &Arc<ParameterSpace> {
        &self.space
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.space.position(name).map(|i| self.values[i])
    }

    pub fn require(&self, name: &str) -> Result<usize> {
        self.space.require(name).map(|i| self.values[i])
    }

    /// `(name, value)` pairs in parameter order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, usize)> {
        self.space.all_names().zip(self.values.iter().copied())
    }

    /// Preprocessor defines for compiling the kernel with this configuration.
    pub fn to_defines(&self) -> Vec<(String, usize)> {
        self.iter().map(|(name, value)| (name.to_string(), value)).collect()
    }

    /// `#define NAME value` lines, one per parameter.
    pub fn define_block(&self) -> String {
        self.iter().map(|(name, value)| format!("#define {name} {value}\n")).collect()
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.values.hash(state);
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl Serialize for Configuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
