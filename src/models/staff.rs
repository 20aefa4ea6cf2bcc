use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub shift: Option<String>,
    #[serde(default = "default_available", alias = "isAvailable")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}
