use social_core_types::RequestId;
use thiserror::Error;

use crate::schema::EntityKind;

/// Result type alias using the structured error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable code that callers and tests can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Input / records
    InvalidInput,
    Validation,
    NotFound,
    ConstraintViolation,

    // Schema
    InvalidSchema,
    UnknownAssociation,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Validation => "ERR_VALIDATION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::InvalidSchema => "ERR_INVALID_SCHEMA",
            ExErrorKind::UnknownAssociation => "ERR_UNKNOWN_ASSOCIATION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification (`kind`) for programmatic handling plus the
/// operation, entity and request it happened in.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<EntityKind>,
    entity_id: Option<String>,
    request_id: Option<RequestId>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            entity_id: None,
            request_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the entity kind the error concerns
    pub fn with_entity(mut self, entity: EntityKind) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Add entity ID context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add request ID context
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity(&self) -> Option<EntityKind> {
        self.entity
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised by the registry and the in-memory store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SocialError {
    /// A record with this identity does not exist
    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: EntityKind, id: String },

    /// A required attribute was missing or null
    #[error("{entity}.{field} cannot be null")]
    MissingField {
        entity: EntityKind,
        field: &'static str,
    },

    /// An association referenced an entity that was never defined
    #[error("Entity {entity} is not defined in the registry")]
    UndefinedEntity { entity: EntityKind },

    /// An entity was defined twice
    #[error("Entity {entity} is already defined")]
    DuplicateEntity { entity: EntityKind },

    /// Two associations on the same source share an accessor name
    #[error("Accessor {source_entity}.{accessor} is already registered")]
    DuplicateAccessor {
        source_entity: EntityKind,
        accessor: String,
    },

    /// The same column or join table was declared with conflicting shapes
    #[error("Conflicting declaration for {table}.{column}")]
    ConflictingForeignKey { table: String, column: String },

    /// Foreign keys between tables form a cycle
    #[error("Foreign keys form a cycle through {entity}")]
    ForeignKeyCycle { entity: EntityKind },

    /// No association with this accessor exists on the source entity
    #[error("Unknown association {source_entity}.{accessor}")]
    UnknownAssociation {
        source_entity: EntityKind,
        accessor: String,
    },

    /// The operation does not apply to this kind of association
    #[error("Association {source_entity}.{accessor} does not support {op}")]
    WrongAssociationKind {
        source_entity: EntityKind,
        accessor: String,
        op: &'static str,
    },

    /// A table was used before `sync` created it
    #[error("no such table: {table}")]
    TableMissing { table: String },

    /// Input could not be parsed
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Serialization error
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl From<SocialError> for ExError {
    fn from(err: SocialError) -> Self {
        let message = err.to_string();
        match err {
            SocialError::EntityNotFound { entity, id } => ExError::new(ExErrorKind::NotFound)
                .with_entity(entity)
                .with_entity_id(id)
                .with_message(message),
            SocialError::MissingField { entity, .. } => ExError::new(ExErrorKind::Validation)
                .with_entity(entity)
                .with_message(message),
            SocialError::UndefinedEntity { entity }
            | SocialError::DuplicateEntity { entity }
            | SocialError::ForeignKeyCycle { entity } => ExError::new(ExErrorKind::InvalidSchema)
                .with_entity(entity)
                .with_op("register")
                .with_message(message),
            SocialError::DuplicateAccessor { source_entity, .. } => {
                ExError::new(ExErrorKind::InvalidSchema)
                    .with_entity(source_entity)
                    .with_op("register")
                    .with_message(message)
            }
            SocialError::ConflictingForeignKey { .. } => ExError::new(ExErrorKind::InvalidSchema)
                .with_op("register")
                .with_message(message),
            SocialError::UnknownAssociation { source_entity, .. } => {
                ExError::new(ExErrorKind::UnknownAssociation)
                    .with_entity(source_entity)
                    .with_message(message)
            }
            SocialError::WrongAssociationKind { source_entity, .. } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity(source_entity)
                    .with_message(message)
            }
            SocialError::TableMissing { .. } => {
                ExError::new(ExErrorKind::Persistence).with_message(message)
            }
            SocialError::InvalidInput { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            SocialError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        SocialError::Serialization {
            message: err.to_string(),
        }
        .into()
    }
}
