use thiserror::Error;

/// Failures raised during schema generation.
///
/// Every variant is structural: a mismatch between the input type graph and
/// the target schema algebra. Nothing here is transient and nothing is
/// retried; a generation session either fully succeeds or yields no schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The any/untyped shape category. An unconstrained type cannot be mapped
    /// onto a schema whose branches must be statically enumerable.
    #[error("\"any\" type not supported: cannot derive a schema for untyped value `{type_name}`")]
    UnsupportedShape { type_name: String },

    /// The finished schema was requested before any dispatch call ran.
    #[error("no visit methods called: no schema generated")]
    NotGenerated,

    /// An internal invariant was violated. Treated as a defect in the caller
    /// or in a builder, never as a recoverable condition.
    #[error("invalid generator state: {0}")]
    InvalidState(&'static str),

    /// A named type reference that the registry cannot resolve.
    #[error("unknown type reference `{name}`")]
    UnknownType { name: String },

    /// An alias chain that loops back on itself and never reaches a
    /// structural descriptor.
    #[error("cyclic alias chain involving `{name}`")]
    CyclicAlias { name: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
