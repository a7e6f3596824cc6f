use super::DragOperationKind;
use crate::item::Transferable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Failure codes shared by every operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    UnknownError,
    TargetPositionInvalid,
    SourceNotFound,
    SourceAlreadyUsed,
    TargetOutOfBounds,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownError => "UNKNOWN_ERROR",
            Self::TargetPositionInvalid => "TARGET_POSITION_INVALID",
            Self::SourceNotFound => "SOURCE_NOT_FOUND",
            Self::SourceAlreadyUsed => "SOURCE_ALREADY_USED",
            Self::TargetOutOfBounds => "TARGET_OUT_OF_BOUNDS",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid {
        error_code: ErrorCode,
        error_message: String,
        debug_info: Option<Value>,
    },
}

impl ValidationResult {
    pub fn invalid(error_code: ErrorCode, error_message: impl Into<String>) -> Self {
        Self::Invalid {
            error_code,
            error_message: error_message.into(),
            debug_info: None,
        }
    }

    pub fn with_debug(self, info: Value) -> Self {
        match self {
            Self::Invalid {
                error_code,
                error_message,
                ..
            } => Self::Invalid {
                error_code,
                error_message,
                debug_info: Some(info),
            },
            valid => valid,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Valid => None,
            Self::Invalid { error_code, .. } => Some(*error_code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationAction {
    Assign,
    Reorder,
    Transfer,
    Unrank,
    Rank,
    Place,
    Move,
    Swap,
    Remove,
    Compare,
    Reject,
}

/// Uniform outcome of a dispatched drag, success or failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragOperationResult {
    pub success: bool,
    /// `None` when no operation matched the drag.
    pub operation_type: Option<DragOperationKind>,
    pub action: OperationAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<Transferable>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl DragOperationResult {
    pub fn success(
        kind: DragOperationKind,
        action: OperationAction,
        item: Option<Transferable>,
    ) -> Self {
        Self {
            success: true,
            operation_type: Some(kind),
            action,
            item,
            metadata: BTreeMap::new(),
            error_code: None,
            error_message: None,
        }
    }

    pub fn reject(
        kind: Option<DragOperationKind>,
        error_code: ErrorCode,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            operation_type: kind,
            action: OperationAction::Reject,
            item: None,
            metadata: BTreeMap::new(),
            error_code: Some(error_code),
            error_message: Some(error_message.into()),
        }
    }

    /// Converts a failed validation into a rejection. A valid result has no
    /// rejection to report and maps to `UNKNOWN_ERROR`.
    pub fn from_validation(kind: DragOperationKind, validation: ValidationResult) -> Self {
        match validation {
            ValidationResult::Invalid {
                error_code,
                error_message,
                debug_info,
            } => {
                let mut result = Self::reject(Some(kind), error_code, error_message);
                if let Some(info) = debug_info {
                    result.metadata.insert("debugInfo".to_string(), info);
                }
                result
            }
            ValidationResult::Valid => {
                Self::reject(Some(kind), ErrorCode::UnknownError, "validation passed")
            }
        }
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}
