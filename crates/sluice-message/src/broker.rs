//! BrokerKind - which messaging system a pipeline consumes from
//!
//! The kind only matters for labelling: metrics and log lines carry it as
//! the `messaging_type` field. Broker clients themselves live behind the
//! `Puller` / `Acknowledger` traits in the pipeline crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported broker families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerKind {
    Kafka,
    GcpPubsub,
    AwsSqs,
}

impl BrokerKind {
    /// Stable label used as the `messaging_type` metric tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            BrokerKind::Kafka => "kafka",
            BrokerKind::GcpPubsub => "gcp_pubsub",
            BrokerKind::AwsSqs => "aws_sqs",
        }
    }
}

impl fmt::Display for BrokerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown broker label.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown broker kind: {0} (expected kafka, gcp_pubsub or aws_sqs)")]
pub struct UnknownBrokerKind(pub String);

impl FromStr for BrokerKind {
    type Err = UnknownBrokerKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kafka" => Ok(BrokerKind::Kafka),
            "gcp_pubsub" => Ok(BrokerKind::GcpPubsub),
            "aws_sqs" => Ok(BrokerKind::AwsSqs),
            other => Err(UnknownBrokerKind(other.to_string())),
        }
    }
}
