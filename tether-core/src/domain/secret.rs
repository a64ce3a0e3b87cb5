//! Secret domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A namespace secret stored on the remote platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    pub name: String,
    pub value: BTreeMap<String, String>,
}
