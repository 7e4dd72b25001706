//! Warp route configuration: schema validation and derived chain sets.
//!
//! A warp route is one base token (native or collateral) and one or more synthetic
//! tokens on other chains. Documents are validated structurally first, reporting the
//! first violation found, and only then deserialized into the typed configuration.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::chains::ChainName;

/// First schema violation found in a warp route document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid warp config: {path} => {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `synthetics.0.chainName`.
    pub path: String,
    pub message: String,
}

impl ValidationError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Kind of the base token.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TokenType {
    Native,
    Collateral,
}

/// Optional overrides of the core contracts a router connects to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mailbox: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interchain_gas_paymaster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interchain_security_module: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// The token every synthetic is backed by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpBaseTokenConfig {
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub chain_name: ChainName,
    /// Address of the collateralized token. Required for [`TokenType::Collateral`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Router deployed outside this tool, tracked by reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_deployment: Option<String>,
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    #[serde(flatten)]
    pub metadata: TokenMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarpSyntheticTokenConfig {
    pub chain_name: ChainName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_supply: Option<serde_json::Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_deployment: Option<String>,
    #[serde(flatten)]
    pub connection: ConnectionConfig,
    #[serde(flatten)]
    pub metadata: TokenMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpRouteConfig {
    pub base: WarpBaseTokenConfig,
    pub synthetics: Vec<WarpSyntheticTokenConfig>,
}

impl WarpRouteConfig {
    /// Validate a raw document and deserialize it.
    pub fn from_value(document: Value) -> Result<Self, ValidationError> {
        validate_warp_route_config(&document)?;
        serde_json::from_value(document).map_err(|e| ValidationError::new("", e.to_string()))
    }

    /// Read a warp route config from a JSON or TOML file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read warp config from {}", path.display()))?;

        let document: Value = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => {
                let value: toml::Value =
                    toml::from_str(&content).context("Failed to parse warp config as TOML")?;
                serde_json::to_value(value).context("Failed to convert TOML warp config")?
            }
            _ => serde_json::from_str(&content).context("Failed to parse warp config as JSON")?,
        };

        let config = Self::from_value(document)?;
        tracing::debug!(path = %path.display(), synthetics = config.synthetics.len(), "Warp config loaded");
        Ok(config)
    }

    /// Re-check an already typed config against the schema.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let document =
            serde_json::to_value(self).map_err(|e| ValidationError::new("", e.to_string()))?;
        validate_warp_route_config(&document)
    }

    /// Chains this tool deploys to: the base chain, then every synthetic chain.
    ///
    /// Tokens with a foreign deployment are known participants but are never deployed to.
    pub fn chains(&self) -> Vec<ChainName> {
        std::iter::once((&self.base.chain_name, &self.base.foreign_deployment))
            .chain(
                self.synthetics
                    .iter()
                    .map(|token| (&token.chain_name, &token.foreign_deployment)),
            )
            .filter(|(_, foreign)| foreign.is_none())
            .map(|(chain, _)| chain.clone())
            .collect()
    }
}

const CONNECTION_FIELDS: [&str; 3] = ["mailbox", "interchainGasPaymaster", "interchainSecurityModule"];

/// Check a raw warp route document, returning the first violation in document order.
pub fn validate_warp_route_config(document: &Value) -> Result<(), ValidationError> {
    let root = expect_object(Some(document), "")?;

    let base = expect_object(root.get("base"), "base")?;
    validate_base(base)?;

    let synthetics = match root.get("synthetics") {
        None => return Err(ValidationError::new("synthetics", "Required")),
        Some(Value::Array(items)) => items,
        Some(other) => return Err(type_mismatch("synthetics", "array", other)),
    };
    if synthetics.is_empty() {
        return Err(ValidationError::new(
            "synthetics",
            "Array must contain at least 1 element(s)",
        ));
    }

    for (index, synthetic) in synthetics.iter().enumerate() {
        let path = format!("synthetics.{index}");
        let synthetic = expect_object(Some(synthetic), &path)?;
        validate_synthetic(synthetic, &path)?;
    }

    Ok(())
}

fn validate_base(base: &Map<String, Value>) -> Result<(), ValidationError> {
    let token_type = match base.get("type") {
        None => return Err(ValidationError::new("base.type", "Required")),
        Some(Value::String(s)) => s.parse::<TokenType>().ok(),
        Some(_) => None,
    };
    let Some(token_type) = token_type else {
        return Err(ValidationError::new(
            "base.type",
            format!(
                "Invalid enum value. Expected 'native' | 'collateral', received {}",
                base["type"]
            ),
        ));
    };

    expect_string(base.get("chainName"), "base.chainName")?;
    let address = optional_string(base, "address", "base")?;
    if token_type == TokenType::Collateral && address.is_none_or(|a| a.trim().is_empty()) {
        return Err(ValidationError::new(
            "base.address",
            "Collateral tokens require a non-empty address",
        ));
    }

    validate_common(base, "base")
}

fn validate_synthetic(synthetic: &Map<String, Value>, path: &str) -> Result<(), ValidationError> {
    expect_string(synthetic.get("chainName"), &format!("{path}.chainName"))?;

    match synthetic.get("totalSupply") {
        None | Some(Value::Number(_)) => {}
        Some(other) => return Err(type_mismatch(&format!("{path}.totalSupply"), "number", other)),
    }

    validate_common(synthetic, path)
}

/// Fields shared by base and synthetic descriptors.
fn validate_common(token: &Map<String, Value>, path: &str) -> Result<(), ValidationError> {
    for field in ["name", "symbol"]
        .into_iter()
        .chain(CONNECTION_FIELDS)
        .chain(["foreignDeployment"])
    {
        optional_string(token, field, path)?;
    }

    match token.get("decimals") {
        None => Ok(()),
        Some(Value::Number(n)) if n.as_u64().is_some_and(|d| d <= u8::MAX as u64) => Ok(()),
        Some(other) => Err(ValidationError::new(
            format!("{path}.decimals"),
            format!("Expected an integer between 0 and 255, received {other}"),
        )),
    }
}

fn expect_object<'a>(
    value: Option<&'a Value>,
    path: &str,
) -> Result<&'a Map<String, Value>, ValidationError> {
    match value {
        None => Err(ValidationError::new(path, "Required")),
        Some(Value::Object(map)) => Ok(map),
        Some(other) => Err(type_mismatch(path, "object", other)),
    }
}

fn expect_string<'a>(value: Option<&'a Value>, path: &str) -> Result<&'a str, ValidationError> {
    match value {
        None => Err(ValidationError::new(path, "Required")),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(type_mismatch(path, "string", other)),
    }
}

fn optional_string<'a>(
    token: &'a Map<String, Value>,
    field: &str,
    path: &str,
) -> Result<Option<&'a str>, ValidationError> {
    match token.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(type_mismatch(&format!("{path}.{field}"), "string", other)),
    }
}

fn type_mismatch(path: &str, expected: &str, received: &Value) -> ValidationError {
    let received = match received {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    };
    ValidationError::new(path, format!("Expected {expected}, received {received}"))
}
