//! `Password` generator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{GROUP, VERSION};
use crate::crd::{CrdKind, Scope};

/// Marker for the `Password` kind.
pub struct Password;

impl CrdKind for Password {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = VERSION;
    const KIND: &'static str = "Password";
    const PLURAL: &'static str = "passwords";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = PasswordSpec;

    fn description() -> &'static str {
        "Password generates a random password on every refresh."
    }
}

/// Parameters of the generated password. The controller checks the
/// numbers when it generates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordSpec {
    /// Total length. Defaults to 24.
    pub length: Option<i64>,
    /// Number of digits. Defaults to 25% of the length.
    pub digits: Option<i64>,
    /// Number of symbols. Defaults to 25% of the length.
    pub symbols: Option<i64>,
    /// Symbols to choose from.
    pub symbol_characters: Option<String>,
    /// Only lowercase letters.
    pub no_upper: Option<bool>,
    /// Allow a character to appear more than once.
    pub allow_repeat: Option<bool>,
}
