//! # Shared Configuration
//!
//! Configuration shared by every NF of a deployment: the list of network functions with
//! their worker-thread counts, and the route table mapping a route id to its ordered hops.
//! It is resolved once at process start from a YAML file, validated, and then only read.
//!
//! ```yaml
//! nfs:
//!   - id: 1
//!     name: frontend
//!     n_threads: 2
//!   - id: 2
//!     name: currencyservice
//!     n_threads: 4
//! routes:
//!   - id: 0
//!     hops: [1, 2]
//! ```

use crate::error::ConfigError;
use crate::ids::NfId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Environment variable naming the shared configuration file.
pub const SHARED_CONFIG_ENV: &str = "NF_SHARED_CONFIG";
/// Location used when neither `--config` nor [`SHARED_CONFIG_ENV`] is given.
pub const DEFAULT_SHARED_CONFIG_PATH: &str = "config/nf.yaml";

/// Most routes are a handful of hops long.
pub type HopVec = SmallVec<[NfId; 8]>;

/// One network function entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NfEntry {
    pub id: NfId,
    pub name: String,
    /// Number of worker threads this NF runs
    pub n_threads: usize,
}

/// One route: an ordered sequence of hops.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub id: u8,
    pub hops: HopVec,
}

/// Route id to ordered hop list. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    routes: HashMap<u8, HopVec>,
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: impl IntoIterator<Item = (u8, HopVec)>) -> Self {
        Self {
            routes: routes.into_iter().collect(),
        }
    }

    /// The NF at position `hop_count` of route `route_id`.
    #[must_use]
    pub fn hop(&self, route_id: u8, hop_count: u8) -> Option<NfId> {
        self.routes
            .get(&route_id)
            .and_then(|hops| hops.get(usize::from(hop_count)))
            .copied()
    }

    /// Number of hops on route `route_id`.
    #[must_use]
    pub fn len(&self, route_id: u8) -> Option<usize> {
        self.routes.get(&route_id).map(SmallVec::len)
    }

    #[must_use]
    pub fn hops(&self, route_id: u8) -> Option<&[NfId]> {
        self.routes.get(&route_id).map(SmallVec::as_slice)
    }

    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Validated shared configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedConfig {
    pub nfs: Vec<NfEntry>,
    #[serde(default)]
    pub routes: Vec<RouteEntry>,
}

impl SharedConfig {
    /// Read and validate the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: SharedConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every unit relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nfs.is_empty() {
            return Err(ConfigError::NoNetworkFunctions);
        }

        let mut ids = HashSet::new();
        for nf in &self.nfs {
            if nf.id.is_unset() {
                return Err(ConfigError::InvalidNfId { id: nf.id });
            }
            if !ids.insert(nf.id) {
                return Err(ConfigError::DuplicateNf { id: nf.id });
            }
            if nf.n_threads == 0 {
                return Err(ConfigError::NoWorkers { id: nf.id });
            }
        }

        let mut route_ids = HashSet::new();
        for route in &self.routes {
            if !route_ids.insert(route.id) {
                return Err(ConfigError::DuplicateRoute { route_id: route.id });
            }
            if let Some(hop) = route.hops.iter().find(|hop| !ids.contains(*hop)) {
                return Err(ConfigError::UnknownHop {
                    route_id: route.id,
                    hop: *hop,
                });
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn nf(&self, id: NfId) -> Option<&NfEntry> {
        self.nfs.iter().find(|nf| nf.id == id)
    }

    /// NF name to id, for handlers that address peers by name.
    #[must_use]
    pub fn nf_ids_by_name(&self) -> BTreeMap<&str, NfId> {
        self.nfs.iter().map(|nf| (nf.name.as_str(), nf.id)).collect()
    }

    #[must_use]
    pub fn route_table(&self) -> RouteTable {
        RouteTable::new(self.routes.iter().map(|r| (r.id, r.hops.clone())))
    }
}
