// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The outward action-space facade.

use std::sync::Arc;

use faultline_schema::Node;
use faultline_topology::{CacheManager, Deadline, TopologySnapshot};

use crate::{
    decode_record_node, derive_schema, encode_record_value, expected_blast_radius, BlastRadius,
    CodecError, Configurable, FaultSpec,
};

/// Thin service tying the codec to one cache manager.
///
/// Every operation fetches a single snapshot for (`system`, `namespace`) at
/// call time and validates against that generation alone, so a decode is a
/// pure function of its inputs and whatever topology is current when it
/// runs. The manager is shared, not global: embedders construct one and pass
/// the facade (or the manager) wherever encoding happens.
#[derive(Debug)]
pub struct ActionSpace {
    manager: Arc<CacheManager>,
}

impl ActionSpace {
    /// A facade over `manager`.
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { manager }
    }

    /// The underlying cache manager.
    pub fn manager(&self) -> &CacheManager {
        &self.manager
    }

    /// Template tree for the whole fault catalog.
    pub fn schema(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Node, CodecError> {
        self.schema_for::<FaultSpec>(system, namespace, deadline)
    }

    /// Template tree for one configuration record type.
    pub fn schema_for<T: Configurable>(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Node, CodecError> {
        let snapshot = self.fetch(system, namespace, deadline)?;
        derive_schema(T::descriptor()?, &snapshot)
    }

    /// Decode a populated tree into a fault experiment.
    pub fn decode(
        &self,
        system: &str,
        namespace: &str,
        tree: &Node,
        deadline: Deadline,
    ) -> Result<FaultSpec, CodecError> {
        self.decode_as::<FaultSpec>(system, namespace, tree, deadline)
    }

    /// Decode a populated tree into one configuration record type.
    pub fn decode_as<T: Configurable>(
        &self,
        system: &str,
        namespace: &str,
        tree: &Node,
        deadline: Deadline,
    ) -> Result<T, CodecError> {
        let snapshot = self.fetch(system, namespace, deadline)?;
        let value = decode_record_node(T::descriptor()?, tree, &snapshot).inspect_err(|error| {
            tracing::debug!(system, namespace, generation = snapshot.generation, %error, "decode rejected");
        })?;
        T::from_value(&value)
    }

    /// Externalize a record into a populated tree.
    pub fn encode<T: Configurable>(
        &self,
        system: &str,
        namespace: &str,
        record: &T,
        deadline: Deadline,
    ) -> Result<Node, CodecError> {
        let snapshot = self.fetch(system, namespace, deadline)?;
        encode_record_value(&record.to_value()?, &snapshot)
    }

    /// Predict the blast radius of a decoded experiment.
    pub fn blast_radius(
        &self,
        system: &str,
        namespace: &str,
        spec: &FaultSpec,
        deadline: Deadline,
    ) -> Result<BlastRadius, CodecError> {
        let snapshot = self.fetch(system, namespace, deadline)?;
        expected_blast_radius(spec, &snapshot)
    }

    /// Invalidate one system's topology; the next call rebuilds it.
    pub fn invalidate(&self, system: &str) {
        self.manager.invalidate(system);
    }

    fn fetch(
        &self,
        system: &str,
        namespace: &str,
        deadline: Deadline,
    ) -> Result<Arc<TopologySnapshot>, CodecError> {
        Ok(self.manager.snapshot(system, namespace, deadline)?)
    }
}
