//! ## Crate layout
//! - `base`: builtin field and object validators.
//! - `config`: engine configuration, loaded from TOML.
//! - `core`: schemas, validation, error trees, server-error mapping, and the
//!   submit state machine.
//! - `error`: public error type with a stable kind + origin taxonomy.
//!
//! The `prelude` module carries what a form definition usually needs.

pub use formtree_config as config;
pub use formtree_core as core;

pub mod base;
pub mod error;

pub use error::{Error, ErrorKind, ErrorOrigin};

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        base::validator::{
            collection::{MaxItems, MinItems},
            num::{Gte, Integer, Lte, Range},
            sum::SumEquals,
            text::{MaxLen, MinLen, NotBlank},
            web::{Email, Url},
        },
        config::EngineConfig,
        core::{
            prelude::*,
            schema::{ConditionalSchema, Watched},
            submit::{ConflictChoice, FormState, SubmitKind},
            wizard::TabLayout,
        },
    };
    pub use serde_json::json;
}
