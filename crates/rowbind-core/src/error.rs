use std::sync::Arc;

/// Return early with an ad-hoc [`Error`] built from format arguments.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::msg(format!($($arg)*)))
    };
}

/// Create an ad-hoc [`Error`] from format arguments.
#[macro_export]
macro_rules! err {
    ($($arg:tt)*) => {
        $crate::Error::msg(format!($($arg)*))
    };
}

/// An error raised by the mapping layer.
///
/// Every kind is fatal to the operation that raised it; the library performs
/// no retries and no silent recovery. Messages carry the entity, table, field
/// or expression involved so failures can be diagnosed without re-running.
#[derive(Clone)]
pub struct Error {
    inner: Arc<ErrorInner>,
}

struct ErrorInner {
    kind: ErrorKind,
    cause: Option<Error>,
}

#[derive(Debug)]
enum ErrorKind {
    /// An expression node, operator, or node combination the parser does not
    /// recognize.
    UnsupportedExpression(String),

    /// A referenced member has no resolvable column mapping.
    MappingNotFound { entity: String, member: String },

    /// No column mappings were supplied where at least one is required.
    MissingMapping(String),

    /// The caller requested a feature the active backend does not support.
    NotSupported(String),

    /// Merge was requested with no qualifiers, no primary key, and no
    /// resolvable key column.
    NoMergeKey { entity: String, table: String },

    /// The backend catalog returned an object kind with no mapping rule.
    UnrecognizedSchemaObject(String),

    /// A value could not be converted to the requested shape.
    TypeConversion { value: String, target: &'static str },

    /// An invalid configuration value, detected at resolution time.
    Configuration(String),

    /// Ad-hoc error, usually wrapping a driver failure.
    Adhoc(String),

    /// Bridge for foreign error types.
    Anyhow(anyhow::Error),
}

impl Error {
    pub fn msg(msg: impl Into<String>) -> Self {
        ErrorKind::Adhoc(msg.into()).into()
    }

    pub fn unsupported_expression(expr: impl std::fmt::Display) -> Self {
        ErrorKind::UnsupportedExpression(expr.to_string()).into()
    }

    pub fn mapping_not_found(entity: impl Into<String>, member: impl Into<String>) -> Self {
        ErrorKind::MappingNotFound {
            entity: entity.into(),
            member: member.into(),
        }
        .into()
    }

    pub fn missing_mapping(msg: impl Into<String>) -> Self {
        ErrorKind::MissingMapping(msg.into()).into()
    }

    pub fn not_supported(msg: impl Into<String>) -> Self {
        ErrorKind::NotSupported(msg.into()).into()
    }

    pub fn no_merge_key(entity: impl Into<String>, table: impl Into<String>) -> Self {
        ErrorKind::NoMergeKey {
            entity: entity.into(),
            table: table.into(),
        }
        .into()
    }

    pub fn unrecognized_schema_object(kind: impl Into<String>) -> Self {
        ErrorKind::UnrecognizedSchemaObject(kind.into()).into()
    }

    pub fn type_conversion(value: impl std::fmt::Debug, target: &'static str) -> Self {
        ErrorKind::TypeConversion {
            value: format!("{value:?}"),
            target,
        }
        .into()
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        ErrorKind::Configuration(msg.into()).into()
    }

    /// Adds context to this error.
    ///
    /// Context is displayed in reverse order: the most recently added context
    /// first, ending with the root cause.
    pub fn context(self, consequent: Error) -> Error {
        Error {
            inner: Arc::new(ErrorInner {
                kind: match Arc::try_unwrap(consequent.inner) {
                    Ok(inner) => inner.kind,
                    Err(shared) => ErrorKind::Adhoc(shared.kind.to_string()),
                },
                cause: Some(self),
            }),
        }
    }

    pub fn is_unsupported_expression(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::UnsupportedExpression(_))
    }

    pub fn is_mapping_not_found(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::MappingNotFound { .. })
    }

    pub fn is_missing_mapping(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::MissingMapping(_))
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::NotSupported(_))
    }

    pub fn is_no_merge_key(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::NoMergeKey { .. })
    }

    pub fn is_unrecognized_schema_object(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::UnrecognizedSchemaObject(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self.inner.kind, ErrorKind::Configuration(_))
    }

    fn chain(&self) -> impl Iterator<Item = &Error> {
        let mut err = self;
        core::iter::once(err).chain(core::iter::from_fn(move || {
            err = err.inner.cause.as_ref()?;
            Some(err)
        }))
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.inner.kind {
            ErrorKind::Anyhow(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let mut it = self.chain().peekable();
        while let Some(err) = it.next() {
            core::fmt::Display::fmt(&err.inner.kind, f)?;
            if it.peek().is_some() {
                f.write_str(": ")?;
            }
        }
        Ok(())
    }
}

impl core::fmt::Debug for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        if !f.alternate() {
            core::fmt::Display::fmt(self, f)
        } else {
            f.debug_struct("Error")
                .field("kind", &self.inner.kind)
                .field("cause", &self.inner.cause.as_ref().map(|c| c.to_string()))
                .finish()
        }
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use self::ErrorKind::*;

        match self {
            UnsupportedExpression(expr) => write!(f, "unsupported expression: {expr}"),
            MappingNotFound { entity, member } => {
                write!(f, "no column mapping for member `{member}` on `{entity}`")
            }
            MissingMapping(msg) => write!(f, "missing mapping: {msg}"),
            NotSupported(msg) => write!(f, "not supported: {msg}"),
            NoMergeKey { entity, table } => write!(
                f,
                "no merge key available for `{entity}` on table `{table}`: \
                 no qualifiers, primary key, or identity column"
            ),
            UnrecognizedSchemaObject(kind) => {
                write!(f, "unrecognized schema object type `{kind}`")
            }
            TypeConversion { value, target } => {
                write!(f, "cannot convert {value} to {target}")
            }
            Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            Adhoc(msg) => f.write_str(msg),
            Anyhow(err) => core::fmt::Display::fmt(err, f),
        }
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Error {
        Error {
            inner: Arc::new(ErrorInner { kind, cause: None }),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Error {
        Error::from(ErrorKind::Anyhow(err))
    }
}

impl std::fmt::Debug for ErrorInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorInner")
            .field("kind", &self.kind)
            .finish()
    }
}
