//! Parameter validation.
//!
//! # Responsibilities
//! - Self-check of the declaration table (unique names, defaults match kinds)
//! - Semantic checks on a resolved parameter set (serde and kind parsing handle syntax)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function of its input

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{DestripeConfig, ParamDecl, ParamKind};
use crate::dqbits::{DqBits, DqBitsError};

/// Problem in the declaration table itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate parameter name `{0}`")]
    DuplicateName(&'static str),

    #[error("default for `{0}` does not match its declared kind")]
    DefaultKindMismatch(&'static str),

    #[error("default for `{0}` is not one of its allowed values")]
    DefaultNotAllowed(&'static str),

    #[error("option parameter `{0}` declares no allowed values")]
    MissingChoices(&'static str),

    #[error("`{0}` declares allowed values but is not an option parameter")]
    UnexpectedChoices(&'static str),
}

/// Semantic problem in a resolved parameter set.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("`{name}` must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: &'static str,
        value: f64,
    },

    #[error("`lower` ({lower}) is greater than `upper` ({upper})")]
    InvertedBounds { lower: f64, upper: f64 },

    #[error("`dqbits`: {0}")]
    DqBits(#[from] DqBitsError),

    #[error("`suffix` must not contain whitespace or path separators: {0:?}")]
    InvalidSuffix(String),
}

/// Check the declaration table invariants.
pub fn validate_schema(decls: &[ParamDecl]) -> Result<(), Vec<SchemaError>> {
    let mut errors = Vec::new();
    let mut names = HashSet::new();

    for decl in decls {
        if !names.insert(decl.name) {
            errors.push(SchemaError::DuplicateName(decl.name));
        }

        match (decl.kind, decl.allowed.is_empty()) {
            (ParamKind::Choice, true) => errors.push(SchemaError::MissingChoices(decl.name)),
            (kind, false) if kind != ParamKind::Choice => {
                errors.push(SchemaError::UnexpectedChoices(decl.name))
            }
            _ => {}
        }

        let default = decl.default.to_value();
        if default.kind() != decl.kind {
            errors.push(SchemaError::DefaultKindMismatch(decl.name));
        } else if !decl.accepts(&default) {
            errors.push(SchemaError::DefaultNotAllowed(decl.name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check value ranges and cross-field constraints of a parameter set.
pub fn validate_config(config: &DestripeConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !(config.binwidth.is_finite() && config.binwidth > 0.0) {
        errors.push(ValidationError::OutOfRange {
            name: "binwidth",
            requirement: "a positive number",
            value: config.binwidth,
        });
    }

    if let Some(sigrej) = config.sigrej {
        if !(sigrej.is_finite() && sigrej > 0.0) {
            errors.push(ValidationError::OutOfRange {
                name: "sigrej",
                requirement: "a positive number or none",
                value: sigrej,
            });
        }
    }

    if let Some(atol) = config.atol {
        if !(atol.is_finite() && atol >= 0.0) {
            errors.push(ValidationError::OutOfRange {
                name: "atol",
                requirement: "a non-negative number or none",
                value: atol,
            });
        }
    }

    for (name, bound) in [("lower", config.lower), ("upper", config.upper)] {
        if let Some(value) = bound.filter(|v| !v.is_finite()) {
            errors.push(ValidationError::OutOfRange {
                name,
                requirement: "a finite number or none",
                value,
            });
        }
    }

    if let (Some(lower), Some(upper)) = (config.lower, config.upper) {
        if lower > upper {
            errors.push(ValidationError::InvertedBounds { lower, upper });
        }
    }

    if let Err(err) = DqBits::parse(&config.dqbits) {
        errors.push(err.into());
    }

    if config
        .suffix
        .chars()
        .any(|c| c.is_whitespace() || c == '/' || c == '\\')
    {
        errors.push(ValidationError::InvalidSuffix(config.suffix.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
