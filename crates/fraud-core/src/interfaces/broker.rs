// fraud-core/src/interfaces/broker.rs
// ============================================================================
// Module: Event Broker
// Description: Backend-agnostic publish/consume interface over the event log.
// Purpose: Let services depend on topic semantics, not a specific broker.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every topic in §6 (`events.txns.v1`, `events.claims.v1`, `features.online.v1`,
//! `alerts.scores.v1`, `alerts.decisions.v1`) is partitioned by entity
//! identifier (§5), so one partition's ordering is the only guarantee the
//! pipeline relies on. `fraud-broker` provides the in-memory, partition-ordered
//! implementation of these traits used in place of a real Kafka/Redpanda
//! cluster.

use thiserror::Error;

/// Event broker errors.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The broker is unreachable or the publish/consume call timed out.
    #[error("broker io error: {0}")]
    Io(String),
    /// The named topic does not exist.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),
}

/// A single published record: a partition key plus its JSON-serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Partition key — the entity identifier for every topic in §6.
    pub key: String,
    /// JSON-serialized message body.
    pub value: Vec<u8>,
}

/// Publishes records to a named topic, partitioned by key.
pub trait EventPublisher {
    /// Publishes `record` to `topic`.
    ///
    /// At-least-once semantics: a successful return means the durable write
    /// was acknowledged (§4.1 "all in-sync replicas acknowledge").
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the broker is unreachable or the topic
    /// is unknown.
    fn publish(&self, topic: &str, record: Record) -> Result<(), BrokerError>;
}

/// Consumes records from a named topic in partition order.
pub trait EventConsumer {
    /// Polls the next available record for `topic`, if any, blocking for at
    /// most a backend-defined short interval.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the broker is unreachable or the topic
    /// is unknown.
    fn poll(&self, topic: &str) -> Result<Option<Record>, BrokerError>;
}
