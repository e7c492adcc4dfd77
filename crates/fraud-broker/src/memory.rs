// fraud-broker/src/memory.rs
// ============================================================================
// Module: In-Memory Broker
// Description: Partition-ordered EventPublisher/EventConsumer implementation.
// Purpose: Give services and tests a deterministic broker without Kafka.
// Dependencies: fraud-core
// ============================================================================

use std::collections::HashMap;
use std::collections::VecDeque;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;
use std::sync::Arc;
use std::sync::Mutex;

use fraud_core::BrokerError;
use fraud_core::EventConsumer;
use fraud_core::EventPublisher;
use fraud_core::Record;

/// Registers a topic with a fixed partition count.
#[derive(Debug, Clone)]
pub struct TopicConfig {
    /// Topic name, e.g. `"events.txns.v1"`.
    pub name: String,
    /// Number of partitions; must be at least 1.
    pub partitions: u32,
}

impl TopicConfig {
    /// Creates a topic configuration with `partitions` partitions.
    #[must_use]
    pub fn new(name: impl Into<String>, partitions: u32) -> Self {
        Self { name: name.into(), partitions: partitions.max(1) }
    }
}

/// One partition's backlog, polled in FIFO order.
#[derive(Debug, Default)]
struct Partition {
    queue: VecDeque<Record>,
}

/// A registered topic's partitions plus the round-robin poll cursor.
#[derive(Debug)]
struct Topic {
    partitions: Vec<Partition>,
    next_poll_partition: usize,
}

impl Topic {
    fn new(partition_count: u32) -> Self {
        let count = usize::try_from(partition_count).unwrap_or(1).max(1);
        Self {
            partitions: (0..count).map(|_| Partition::default()).collect(),
            next_poll_partition: 0,
        }
    }

    fn partition_for_key(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        let bucket = hasher.finish();
        usize::try_from(bucket % self.partitions.len() as u64).unwrap_or(0)
    }
}

#[derive(Debug, Default)]
struct Tables {
    topics: HashMap<String, Topic>,
}

/// In-memory, partition-ordered broker standing in for a Kafka/Redpanda
/// cluster (§9: "no real broker dependency in tests").
///
/// Topics must be registered up front via [`InMemoryBroker::new`]; publishing
/// or polling an unregistered topic returns [`BrokerError::UnknownTopic`].
/// A record's partition key deterministically selects its partition, so
/// polling a topic returns records from any one partition in publish order —
/// the only ordering guarantee §5 requires.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBroker {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryBroker {
    /// Creates a broker with the given topics pre-registered.
    #[must_use]
    pub fn new(topics: impl IntoIterator<Item = TopicConfig>) -> Self {
        let mut tables = Tables::default();
        for topic in topics {
            tables.topics.insert(topic.name, Topic::new(topic.partitions));
        }
        Self { tables: Arc::new(Mutex::new(tables)) }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Tables>, BrokerError> {
        self.tables.lock().map_err(|_| BrokerError::Io("broker mutex poisoned".to_string()))
    }
}

impl EventPublisher for InMemoryBroker {
    fn publish(&self, topic: &str, record: Record) -> Result<(), BrokerError> {
        let mut tables = self.lock()?;
        let entry =
            tables.topics.get_mut(topic).ok_or_else(|| BrokerError::UnknownTopic(topic.to_string()))?;
        let partition = entry.partition_for_key(&record.key);
        entry.partitions[partition].queue.push_back(record);
        Ok(())
    }
}

impl EventConsumer for InMemoryBroker {
    fn poll(&self, topic: &str) -> Result<Option<Record>, BrokerError> {
        let mut tables = self.lock()?;
        let entry =
            tables.topics.get_mut(topic).ok_or_else(|| BrokerError::UnknownTopic(topic.to_string()))?;
        let count = entry.partitions.len();
        for offset in 0..count {
            let index = (entry.next_poll_partition + offset) % count;
            if let Some(record) = entry.partitions[index].queue.pop_front() {
                entry.next_poll_partition = (index + 1) % count;
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishing_to_unknown_topic_is_rejected() {
        let broker = InMemoryBroker::new([TopicConfig::new("events.txns.v1", 4)]);
        let result = broker.publish(
            "events.claims.v1",
            Record { key: "entity-1".to_string(), value: b"{}".to_vec() },
        );
        assert!(matches!(result, Err(BrokerError::UnknownTopic(_))));
    }

    #[test]
    fn polling_unknown_topic_is_rejected() {
        let broker = InMemoryBroker::new([TopicConfig::new("events.txns.v1", 4)]);
        let result = broker.poll("events.claims.v1");
        assert!(matches!(result, Err(BrokerError::UnknownTopic(_))));
    }

    #[test]
    fn polling_empty_topic_returns_none() {
        let broker = InMemoryBroker::new([TopicConfig::new("events.txns.v1", 4)]);
        assert!(broker.poll("events.txns.v1").expect("poll").is_none());
    }

    #[test]
    fn same_partition_key_preserves_publish_order() {
        let broker = InMemoryBroker::new([TopicConfig::new("events.txns.v1", 4)]);
        for seq in 0..5 {
            broker
                .publish(
                    "events.txns.v1",
                    Record { key: "entity-1".to_string(), value: vec![seq] },
                )
                .expect("publish");
        }
        let mut observed = Vec::new();
        while let Some(record) = broker.poll("events.txns.v1").expect("poll") {
            observed.push(record.value[0]);
        }
        assert_eq!(observed, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn all_published_records_are_eventually_polled() {
        let broker = InMemoryBroker::new([TopicConfig::new("events.txns.v1", 3)]);
        let keys = ["entity-1", "entity-2", "entity-3", "entity-4", "entity-5"];
        for key in keys {
            broker
                .publish("events.txns.v1", Record { key: key.to_string(), value: vec![] })
                .expect("publish");
        }
        let mut drained = 0;
        while broker.poll("events.txns.v1").expect("poll").is_some() {
            drained += 1;
        }
        assert_eq!(drained, keys.len());
    }
}
