//! Core types shared across the typecraft workspace.
//!
//! This crate holds the pieces that carry no runtime state:
//!
//! - [`Visibility`], [`MemberKind`], [`AccessorKind`], [`MemberFlags`] - member classification
//! - [`MemberName`] - the sigil grammar for declared member names
//! - [`EngineToken`], [`TemplateId`] - identity of engines and templates
//! - [`Error`] and the per-phase error enums

mod error;
mod flags;
mod ids;
mod kind;
mod sigil;
mod visibility;

pub use error::{AccessError, DefinitionError, Error, ResolutionError, Result};
pub use flags::MemberFlags;
pub use ids::{EngineToken, TemplateId};
pub use kind::{AccessorKind, MemberKind};
pub use sigil::{CTOR, MemberName};
pub use visibility::Visibility;
