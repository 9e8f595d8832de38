//! Static type tags for codec capability checks.

use std::any::{Any, TypeId};
use std::fmt;

/// A static tag identifying the runtime type a codec works with.
///
/// Resolved once at construction/registration time via
/// [`TypeTag::of`]; codecs answer capability checks by comparing tags,
/// never by runtime assignability inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// The tag for `T`.
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// True if this tag identifies `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }

    /// The full type name, for error messages and logging.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_identity() {
        assert_eq!(TypeTag::of::<String>(), TypeTag::of::<String>());
        assert_ne!(TypeTag::of::<String>(), TypeTag::of::<Vec<String>>());
        assert!(TypeTag::of::<u32>().is::<u32>());
        assert!(!TypeTag::of::<u32>().is::<i32>());
    }

    #[test]
    fn test_tag_name() {
        assert!(TypeTag::of::<Vec<String>>().name().contains("Vec"));
    }
}
