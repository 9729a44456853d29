#![forbid(unsafe_code)]

//! The message broker boundary.
//!
//! The dashboard needs two things from RabbitMQ: drain the dead-letter queue
//! and publish messages back onto it. Both are blocking calls made from the
//! UI thread while an action is reduced; the dashboard is an operator tool
//! and a short freeze during a load is acceptable.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::RabbitMqConfig;
use crate::state::Message;

/// Content type stamped on republished messages.
pub const CONTENT_TYPE: &str = "application/json";

/// A broker call that failed.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// No transport is available in this build.
    #[error("broker unavailable: {0}")]
    Unavailable(String),
    #[error("cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },
    #[error("cannot fetch from {queue}: {reason}")]
    Fetch { queue: String, reason: String },
    #[error("cannot publish to {queue}: {reason}")]
    Publish { queue: String, reason: String },
}

/// Access to the dead-letter queue.
pub trait Broker {
    /// Drain the queue, acknowledging every message taken.
    fn load_messages(&mut self) -> Result<Vec<Message>, BrokerError>;

    /// Publish `messages` back onto the queue, in order.
    fn publish(&mut self, messages: &[Message]) -> Result<(), BrokerError>;
}

/// A queue kept in memory, shared between clones.
///
/// Used by tests and by offline runs. Clones see the same queue, so a test
/// can keep one handle to inspect what the dashboard published.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    queue: Arc<Mutex<VecDeque<Message>>>,
}

impl InMemoryBroker {
    pub fn new(messages: impl IntoIterator<Item = Message>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(messages.into_iter().collect())),
        }
    }

    /// Messages currently waiting in the queue.
    pub fn pending(&self) -> Vec<Message> {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Broker for InMemoryBroker {
    fn load_messages(&mut self) -> Result<Vec<Message>, BrokerError> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        let messages: Vec<Message> = queue.drain(..).collect();
        tracing::debug!(count = messages.len(), "drained in-memory queue");
        Ok(messages)
    }

    fn publish(&mut self, messages: &[Message]) -> Result<(), BrokerError> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        queue.extend(messages.iter().cloned());
        Ok(())
    }
}

/// Stands in when the binary was built without a transport.
#[derive(Debug, Clone)]
pub struct DisabledBroker {
    reason: String,
}

impl DisabledBroker {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl Broker for DisabledBroker {
    fn load_messages(&mut self) -> Result<Vec<Message>, BrokerError> {
        Err(BrokerError::Unavailable(self.reason.clone()))
    }

    fn publish(&mut self, _messages: &[Message]) -> Result<(), BrokerError> {
        Err(BrokerError::Unavailable(self.reason.clone()))
    }
}

/// The broker for this build and configuration.
pub fn from_config(config: &RabbitMqConfig) -> Box<dyn Broker> {
    #[cfg(feature = "amqp")]
    {
        Box::new(amqp::AmqpBroker::new(config.clone()))
    }
    #[cfg(not(feature = "amqp"))]
    {
        tracing::warn!(queue = %config.dlq, "built without the amqp feature; broker calls will fail");
        Box::new(DisabledBroker::new("built without the amqp feature"))
    }
}

#[cfg(feature = "amqp")]
mod amqp {
    //! AMQP 0-9-1 transport. Each call opens its own connection and closes
    //! it before returning.

    use amiquip::{AmqpProperties, AmqpValue, Connection, FieldTable, Publish};

    use super::{Broker, BrokerError, CONTENT_TYPE};
    use crate::config::RabbitMqConfig;
    use crate::state::Message;

    pub struct AmqpBroker {
        config: RabbitMqConfig,
    }

    impl AmqpBroker {
        pub fn new(config: RabbitMqConfig) -> Self {
            Self { config }
        }

        fn connect(&self) -> Result<Connection, BrokerError> {
            let url = self.config.amqp_url();
            Connection::insecure_open(&url).map_err(|err| BrokerError::Connect {
                url: self.config.redacted_url(),
                reason: err.to_string(),
            })
        }
    }

    impl Broker for AmqpBroker {
        fn load_messages(&mut self) -> Result<Vec<Message>, BrokerError> {
            let queue = self.config.dlq.clone();
            let fetch_err = |err: amiquip::Error| BrokerError::Fetch {
                queue: queue.clone(),
                reason: err.to_string(),
            };

            let mut connection = self.connect()?;
            let channel = connection.open_channel(None).map_err(fetch_err)?;
            let mut messages = Vec::new();
            while let Some(get) = channel.basic_get(queue.as_str(), true).map_err(fetch_err)? {
                let delivery = get.delivery;
                messages.push(Message {
                    body: String::from_utf8_lossy(&delivery.body).into_owned(),
                    headers: delivery
                        .properties
                        .headers()
                        .as_ref()
                        .map(headers_to_json)
                        .unwrap_or_default(),
                });
            }
            if let Err(err) = connection.close() {
                tracing::warn!(%err, "cannot close broker connection");
            }
            tracing::info!(queue = %queue, count = messages.len(), "loaded dead letters");
            Ok(messages)
        }

        fn publish(&mut self, messages: &[Message]) -> Result<(), BrokerError> {
            let queue = self.config.dlq.clone();
            let publish_err = |err: amiquip::Error| BrokerError::Publish {
                queue: queue.clone(),
                reason: err.to_string(),
            };

            let mut connection = self.connect()?;
            let channel = connection.open_channel(None).map_err(publish_err)?;
            for message in messages {
                let properties = AmqpProperties::default()
                    .with_content_type(CONTENT_TYPE.to_string().into())
                    .with_headers(headers_from_json(&message.headers));
                let mut publish =
                    Publish::with_properties(message.body.as_bytes(), queue.as_str(), properties);
                publish.mandatory = true;
                channel.basic_publish("", publish).map_err(publish_err)?;
            }
            if let Err(err) = connection.close() {
                tracing::warn!(%err, "cannot close broker connection");
            }
            tracing::info!(queue = %queue, count = messages.len(), "requeued messages");
            Ok(())
        }
    }

    fn headers_to_json(table: &FieldTable) -> std::collections::BTreeMap<String, serde_json::Value> {
        table
            .iter()
            .map(|(key, value)| (key.as_str().to_string(), value_to_json(value)))
            .collect()
    }

    fn value_to_json(value: &AmqpValue) -> serde_json::Value {
        match value {
            AmqpValue::Boolean(b) => serde_json::Value::Bool(*b),
            AmqpValue::LongString(s) => serde_json::Value::String(s.to_string()),
            AmqpValue::LongInt(n) => serde_json::Value::from(*n),
            AmqpValue::LongLongInt(n) => serde_json::Value::from(*n),
            AmqpValue::Double(n) => serde_json::Value::from(*n),
            AmqpValue::FieldTable(table) => serde_json::Value::Object(
                headers_to_json(table).into_iter().collect(),
            ),
            other => serde_json::Value::String(format!("{other:?}")),
        }
    }

    fn headers_from_json(headers: &std::collections::BTreeMap<String, serde_json::Value>) -> FieldTable {
        let mut table = FieldTable::default();
        for (key, value) in headers {
            let value = match value {
                serde_json::Value::Bool(b) => AmqpValue::Boolean(*b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => AmqpValue::LongLongInt(i),
                    None => AmqpValue::Double(n.as_f64().unwrap_or_default()),
                },
                serde_json::Value::String(s) => AmqpValue::LongString(s.clone().into()),
                other => AmqpValue::LongString(other.to_string().into()),
            };
            table.insert(key.clone().into(), value);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_load_drains_and_publish_appends() {
        let mut broker = InMemoryBroker::new([Message::new("a"), Message::new("b")]);
        let handle = broker.clone();
        let loaded = broker.load_messages().unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(handle.pending().is_empty());

        broker.publish(&loaded).unwrap();
        let bodies: Vec<String> = handle.pending().into_iter().map(|m| m.body).collect();
        assert_eq!(bodies, vec!["a", "b"]);
    }

    #[test]
    fn disabled_broker_reports_unavailable() {
        let mut broker = DisabledBroker::new("offline");
        let err = broker.load_messages().unwrap_err();
        assert_eq!(err.to_string(), "broker unavailable: offline");
        assert!(broker.publish(&[]).is_err());
    }
}
