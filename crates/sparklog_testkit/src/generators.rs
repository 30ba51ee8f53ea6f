//! Property-based test generators using proptest.
//!
//! Provides strategies for random PUT/DELETE sequences and a
//! [`ReferenceModel`] that predicts what the readers should report for them.

use crate::fixtures::LogBuilder;
use proptest::prelude::*;
use sparklog_core::EntryType;
use std::collections::HashMap;

/// One write in a generated log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOp {
    /// Store a value
    Put {
        /// Key bytes
        key: Vec<u8>,
        /// Value bytes
        value: Vec<u8>,
    },
    /// Remove a key
    Delete {
        /// Key bytes
        key: Vec<u8>,
    },
}

impl LogOp {
    /// The key this operation writes.
    pub fn key(&self) -> &[u8] {
        match self {
            Self::Put { key, .. } | Self::Delete { key } => key,
        }
    }

    /// The entry type this operation produces.
    pub fn entry_type(&self) -> EntryType {
        match self {
            Self::Put { .. } => EntryType::Put,
            Self::Delete { .. } => EntryType::Delete,
        }
    }

    /// The value this operation stores; empty for deletes.
    pub fn value(&self) -> &[u8] {
        match self {
            Self::Put { value, .. } => value,
            Self::Delete { .. } => &[],
        }
    }
}

/// Strategy for keys drawn from a small alphabet, so keys repeat often.
pub fn key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"abc".to_vec()), 0..4)
}

/// Strategy for arbitrary keys.
pub fn wide_key_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..64)
}

/// Strategy for values (arbitrary bytes).
pub fn value_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..256)
}

/// Strategy for a single write.
pub fn log_op_strategy() -> impl Strategy<Value = LogOp> {
    prop_oneof![
        3 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| LogOp::Put { key, value }),
        1 => key_strategy().prop_map(|key| LogOp::Delete { key }),
    ]
}

/// Strategy for a sequence of writes.
pub fn log_ops_strategy(min_ops: usize, max_ops: usize) -> impl Strategy<Value = Vec<LogOp>> {
    prop::collection::vec(log_op_strategy(), min_ops..max_ops)
}

/// Builds a log holding `ops` in order.
pub fn build_log(ops: &[LogOp]) -> LogBuilder {
    ops.iter().fold(LogBuilder::new(), |builder, op| {
        builder.entry(op.entry_type(), op.key(), op.value())
    })
}

/// Expected reader behavior for a sequence of writes.
#[derive(Debug, Clone)]
pub struct ReferenceModel {
    ops: Vec<LogOp>,
    /// Index into `ops` of the latest write per key.
    latest: HashMap<Vec<u8>, usize>,
}

impl ReferenceModel {
    /// Builds the model for `ops`.
    pub fn new(ops: &[LogOp]) -> Self {
        let latest = ops
            .iter()
            .enumerate()
            .map(|(i, op)| (op.key().to_vec(), i))
            .collect();
        Self {
            ops: ops.to_vec(),
            latest,
        }
    }

    /// Every entry as `(type, key, value)`, in log order.
    pub fn entries(&self) -> Vec<(EntryType, Vec<u8>, Vec<u8>)> {
        self.ops
            .iter()
            .map(|op| (op.entry_type(), op.key().to_vec(), op.value().to_vec()))
            .collect()
    }

    /// Live `(key, value)` pairs in the order a live-only scan reports them:
    /// each key at the position of its latest write, deleted keys omitted.
    pub fn live(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.ops
            .iter()
            .enumerate()
            .filter(|(i, op)| {
                op.entry_type() == EntryType::Put && self.latest.get(op.key()) == Some(i)
            })
            .map(|(_, op)| (op.key().to_vec(), op.value().to_vec()))
            .collect()
    }

    /// The live value for `key`.
    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        let op = &self.ops[*self.latest.get(key)?];
        match op {
            LogOp::Put { value, .. } => Some(value.as_slice()),
            LogOp::Delete { .. } => None,
        }
    }

    /// Every key ever written.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.latest.keys().map(Vec::as_slice)
    }
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
