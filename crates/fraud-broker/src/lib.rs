// fraud-broker/src/lib.rs
// ============================================================================
// Crate: fraud-broker
// Description: In-memory, partition-ordered event broker.
// Purpose: Stand in for Kafka/Redpanda in services and integration tests.
// ============================================================================

//! ## Overview
//! [`InMemoryBroker`] implements `fraud_core::EventPublisher` and
//! `fraud_core::EventConsumer` over topics that must be registered up front,
//! each split into a fixed number of partitions. A record's partition key
//! (the entity identifier, per §5/§6) deterministically selects its
//! partition, so polling a topic preserves per-entity ordering without
//! requiring a real broker in tests or single-process deployments.

mod memory;

pub use memory::InMemoryBroker;
pub use memory::TopicConfig;
