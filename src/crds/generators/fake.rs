//! `Fake` generator.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{GROUP, VERSION};
use crate::crd::{CrdKind, Scope};

/// Marker for the `Fake` generator kind.
pub struct Fake;

impl CrdKind for Fake {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = VERSION;
    const KIND: &'static str = "Fake";
    const PLURAL: &'static str = "fakes";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = FakeSpec;

    fn description() -> &'static str {
        "Fake returns static data, for testing ExternalSecret wiring."
    }
}

/// Static generator output.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FakeSpec {
    /// Only controllers started with this class use the generator.
    pub controller: Option<String>,
    /// Values returned by the generator.
    pub data: Option<BTreeMap<String, String>>,
}
