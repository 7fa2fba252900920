use std::fmt;

/// An enumeration stored in the file as a plain integer.
pub trait RawEnum: Sized + Copy {
    type Raw: Copy;

    fn from_raw(raw: Self::Raw) -> Option<Self>;
    fn raw(self) -> Self::Raw;
}

/// A stored value that either matched a known variant `T` or is kept as the
/// raw integer `Raw`.
///
/// Game assets contain values no documented enumeration covers. They are not
/// errors, so the raw value is preserved for callers to inspect or display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Recognized<T, Raw = u32> {
    Known(T),
    Unknown(Raw),
}

impl<T: RawEnum> Recognized<T, T::Raw> {
    pub fn from_raw(raw: T::Raw) -> Self {
        match T::from_raw(raw) {
            Some(known) => Recognized::Known(known),
            None => Recognized::Unknown(raw),
        }
    }

    /// The integer as stored in the file.
    pub fn raw(&self) -> T::Raw {
        match self {
            Recognized::Known(t) => t.raw(),
            Recognized::Unknown(raw) => *raw,
        }
    }
}

impl<T, Raw> Recognized<T, Raw> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Recognized::Known(t) => Some(t),
            Recognized::Unknown(_) => None,
        }
    }

    pub fn into_known(self) -> Option<T> {
        match self {
            Recognized::Known(t) => Some(t),
            Recognized::Unknown(_) => None,
        }
    }

    pub fn unknown(&self) -> Option<&Raw> {
        match self {
            Recognized::Known(_) => None,
            Recognized::Unknown(raw) => Some(raw),
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Recognized::Known(_))
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Recognized::Unknown(_))
    }
}

impl<T, Raw> From<T> for Recognized<T, Raw> {
    fn from(value: T) -> Self {
        Recognized::Known(value)
    }
}

impl<T: fmt::Display, Raw: fmt::Display> fmt::Display for Recognized<T, Raw> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recognized::Known(t) => t.fmt(f),
            Recognized::Unknown(raw) => write!(f, "unknown({raw})"),
        }
    }
}
