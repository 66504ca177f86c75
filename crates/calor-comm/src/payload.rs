//! Typed message payloads.

/// The body of a message: a vector of one of the supported element types.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    /// Temperatures and conductances.
    F32(Vec<f32>),
    /// Material map values and empty control messages.
    U8(Vec<u8>),
    /// Offsets and counters.
    U64(Vec<u64>),
}

impl Payload {
    /// Name of the element type carried.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::F32(_) => f32::KIND,
            Self::U8(_) => u8::KIND,
            Self::U64(_) => u64::KIND,
        }
    }

    /// Number of elements carried.
    pub fn len(&self) -> usize {
        match self {
            Self::F32(v) => v.len(),
            Self::U8(v) => v.len(),
            Self::U64(v) => v.len(),
        }
    }

    /// Whether the payload has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An element type that can travel in a [`Payload`].
pub trait Element: Copy + Send + 'static {
    /// Human-readable type name used in error messages.
    const KIND: &'static str;

    /// Wrap a vector into a payload.
    fn into_payload(data: Vec<Self>) -> Payload;

    /// Unwrap a payload, or give it back if it carries another type.
    fn from_payload(payload: Payload) -> Result<Vec<Self>, Payload>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident, $kind:literal) => {
        impl Element for $ty {
            const KIND: &'static str = $kind;

            fn into_payload(data: Vec<Self>) -> Payload {
                Payload::$variant(data)
            }

            fn from_payload(payload: Payload) -> Result<Vec<Self>, Payload> {
                match payload {
                    Payload::$variant(v) => Ok(v),
                    other => Err(other),
                }
            }
        }
    };
}

impl_element!(f32, F32, "f32");
impl_element!(u8, U8, "u8");
impl_element!(u64, U64, "u64");
