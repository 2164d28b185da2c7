use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Extra reserved words on top of the IEC 61131-3 keyword table.
    pub keywords: Option<Vec<String>>,
    /// Extra standard POU names (vendor library functions).
    pub standard_pous: Option<Vec<String>>,
    /// Vendor library function blocks usable as variable types.
    pub function_blocks: Option<Vec<FunctionBlockConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionBlockConfig {
    /// Type name, e.g. "MC_Power"
    pub name: String,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberConfig {
    pub name: String,
    /// Elementary type name ("BOOL", "TIME", ...) or another function block.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A configuration showing every supported key.
pub const EXAMPLE_CONFIG_JSON: &str = r#"{
  "keywords": ["SUPER", "THIS"],
  "standard_pous": ["BLINK"],
  "function_blocks": [
    {
      "name": "MC_Power",
      "members": [
        { "name": "Enable", "type": "BOOL" },
        { "name": "Status", "type": "BOOL" },
        { "name": "Delay",  "type": "TON" }
      ]
    }
  ]
}"#;

/// Parse a configuration JSON string.
///
/// Missing fields fall back to [`ValidatorConfig::default`]; malformed JSON
/// or unknown fields are reported with the details from serde.
pub fn parse_config_from_text(s: &str) -> Result<ValidatorConfig, ConfigError> {
    Ok(serde_json::from_str::<ValidatorConfig>(s)?)
}

pub fn load_config(path: &Path) -> Result<ValidatorConfig, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_config_from_text(&text)
}
