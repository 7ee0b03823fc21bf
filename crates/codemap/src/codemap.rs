use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    code::{Code, CodeKind},
    errors::CodeError,
};

/// Operator-supplied binding of a code identifier to a built-in kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeEntry {
    /// Identifier contracts are registered under.
    pub id: String,

    /// Built-in behaviour.
    pub kind: CodeKind,
}

/// Registry of the codes known to this deployment.
#[derive(Debug, Clone, Default)]
pub struct Codemap {
    codes: BTreeMap<String, Code>,
}

impl Codemap {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from operator configuration.
    pub fn from_entries<'a>(
        entries: impl IntoIterator<Item = &'a CodeEntry>,
    ) -> Result<Self, CodeError> {
        let mut codemap = Self::new();
        for entry in entries {
            codemap.register(&entry.id, entry.kind)?;
        }

        Ok(codemap)
    }

    /// Adds a code.
    pub fn register(&mut self, id: &str, kind: CodeKind) -> Result<(), CodeError> {
        if self.codes.contains_key(id) {
            return Err(CodeError::DuplicateCode(id.to_string()));
        }

        info!(%id, %kind, "registered code");
        self.codes.insert(id.to_string(), Code::new(id, kind));
        Ok(())
    }

    /// Resolves a code by identifier.
    pub fn lookup(&self, id: &str) -> Result<&Code, CodeError> {
        self.codes
            .get(id)
            .ok_or_else(|| CodeError::UnknownCode(id.to_string()))
    }

    /// Known codes, ordered by identifier.
    pub fn iter(&self) -> impl Iterator<Item = &Code> {
        self.codes.values()
    }
}
