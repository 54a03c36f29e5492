//! Network identifier to deployed hub lookup.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of a network, e.g. `standalone` or `testnet`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Where the hub contract lives on one network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractEndpoint<A = String> {
    pub address: A,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no contract deployed for network `{0}`")]
    UnknownNetwork(NetworkId),
    #[error("network `{0}` has an empty contract address")]
    EmptyAddress(NetworkId),
    #[error("malformed address book")]
    Malformed(#[from] serde_json::Error),
}

/// Static mapping from network to hub endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressBook<A = String> {
    entries: BTreeMap<NetworkId, ContractEndpoint<A>>,
}

impl<A> Default for AddressBook<A> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }
}

impl<A> AddressBook<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, network: impl Into<NetworkId>, endpoint: ContractEndpoint<A>) {
        self.entries.insert(network.into(), endpoint);
    }

    pub fn with_endpoint(mut self, network: impl Into<NetworkId>, address: A) -> Self {
        self.insert(
            network,
            ContractEndpoint {
                address,
                chain_name: None,
            },
        );
        self
    }

    /// Endpoint for `network`. A missing entry is a configuration problem,
    /// never a protocol one.
    pub fn resolve(&self, network: &NetworkId) -> Result<&ContractEndpoint<A>, ConfigError> {
        self.entries
            .get(network)
            .ok_or_else(|| ConfigError::UnknownNetwork(network.clone()))
    }

    pub fn networks(&self) -> impl Iterator<Item = &NetworkId> {
        self.entries.keys()
    }
}

impl AddressBook<String> {
    /// Parse a JSON book of the form
    /// `{"standalone": {"address": "C...", "chainName": "local"}}`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let book: Self = serde_json::from_str(json)?;
        if let Some((network, _)) = book
            .entries
            .iter()
            .find(|(_, endpoint)| endpoint.address.trim().is_empty())
        {
            return Err(ConfigError::EmptyAddress(network.clone()));
        }
        Ok(book)
    }
}
