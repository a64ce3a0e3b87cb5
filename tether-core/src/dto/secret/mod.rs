//! Secret DTOs

use serde::{Deserialize, Serialize};

/// Response to a secret creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecretCreated {
    pub id: String,
}
