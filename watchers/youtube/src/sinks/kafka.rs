use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::producer::{DeliveryFuture, FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::config::KafkaConfig;
use crate::error::WatcherError;
use crate::serialization::AvroValueSerializer;
use crate::sinks::{DeliveryFailurePolicy, DeliveryReport, VideoSink};
use crate::summary::VideoSummary;

struct KafkaContext;

impl rdkafka::ClientContext for KafkaContext {
    fn stats(&self, stats: rdkafka::Statistics) {
        debug!(
            queue_depth = stats.msg_cnt,
            queue_bytes = stats.msg_size,
            "kafka producer statistics"
        );
    }
}

/// Produces summaries to a Kafka topic, keyed by video id.
///
/// Values are Avro encoded against the registered schema. `publish` hands the record to
/// librdkafka and returns; the broker acknowledgment is awaited on a background task that acts
/// as the per-record delivery callback.
pub struct KafkaSink {
    producer: FutureProducer<KafkaContext>,
    topic: String,
    serializer: AvroValueSerializer,
    policy: DeliveryFailurePolicy,
    /// One task per record still waiting for its acknowledgment; resolves to "was it delivered".
    pending: JoinSet<bool>,
    /// Acknowledgments collected so far.
    report: DeliveryReport,
}

impl KafkaSink {
    pub fn new(
        config: &KafkaConfig,
        serializer: AvroValueSerializer,
    ) -> Result<KafkaSink, WatcherError> {
        info!("connecting to Kafka brokers at {}...", config.kafka_hosts);

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.kafka_hosts)
            .set("statistics.interval.ms", "10000")
            .set("linger.ms", config.kafka_producer_linger_ms.to_string())
            .set(
                "message.timeout.ms",
                config.kafka_message_timeout_ms.to_string(),
            )
            .set(
                "message.send.max.retries",
                config.kafka_send_max_retries.to_string(),
            )
            .set("compression.codec", &config.kafka_compression_codec);

        match (&config.kafka_sasl_username, &config.kafka_sasl_password) {
            (Some(username), password) => {
                let protocol = if config.kafka_tls {
                    "sasl_ssl"
                } else {
                    "sasl_plaintext"
                };
                client_config
                    .set("security.protocol", protocol)
                    .set("sasl.mechanisms", "PLAIN")
                    .set("sasl.username", username)
                    .set("sasl.password", password.as_deref().unwrap_or_default());
            }
            (None, _) if config.kafka_tls => {
                client_config.set("security.protocol", "ssl");
            }
            (None, _) => {}
        }

        debug!(
            topic = %config.kafka_topic,
            linger_ms = config.kafka_producer_linger_ms,
            message_timeout_ms = config.kafka_message_timeout_ms,
            "creating Kafka producer"
        );
        let producer: FutureProducer<KafkaContext> =
            client_config.create_with_context(KafkaContext)?;

        // Ping the cluster to make sure we can reach brokers, fail after 10 seconds
        _ = producer.client().fetch_metadata(
            Some(config.kafka_topic.as_str()),
            Timeout::After(Duration::new(10, 0)),
        )?;
        info!("connected to Kafka brokers");

        Ok(KafkaSink {
            producer,
            topic: config.kafka_topic.clone(),
            serializer,
            policy: config.delivery_failure_policy,
            pending: JoinSet::new(),
            report: DeliveryReport::default(),
        })
    }

    /// The delivery callback: observes one record's acknowledgment.
    async fn process_ack(video_id: String, delivery: DeliveryFuture) -> bool {
        match delivery.await {
            Ok(Ok(_)) => {
                debug!(video_id, "record delivered");
                true
            }
            Ok(Err((err, _))) => {
                warn!(video_id, error = %err, "failed to deliver record");
                false
            }
            Err(_) => {
                // The producer dropped the message without reporting back
                warn!(video_id, "delivery cancelled before the broker acknowledged the record");
                false
            }
        }
    }

    fn tally(&mut self, ack: Result<bool, JoinError>) {
        match ack {
            Ok(true) => self.report.delivered += 1,
            Ok(false) => self.report.failed += 1,
            Err(err) => {
                error!("join error while waiting on Kafka ACK: {:?}", err);
                self.report.failed += 1;
            }
        }
    }

    /// Folds in the acknowledgments that have already arrived, without waiting for the rest.
    fn collect_finished(&mut self) {
        while let Some(ack) = self.pending.try_join_next() {
            self.tally(ack);
        }
    }
}

impl VideoSink for KafkaSink {
    fn publish(&mut self, summary: &VideoSummary) -> Result<(), WatcherError> {
        if self.policy == DeliveryFailurePolicy::Abort {
            self.collect_finished();
            self.report.check(self.policy)?;
        }

        let payload = self.serializer.serialize(summary)?;
        let record = FutureRecord::to(&self.topic)
            .key(summary.key())
            .payload(&payload);

        match self.producer.send_result(record) {
            Ok(delivery) => {
                self.pending
                    .spawn(Self::process_ack(summary.video_id.clone(), delivery));
                Ok(())
            }
            Err((err, _)) => {
                error!(video_id = summary.video_id, "failed to produce record: {}", err);
                Err(WatcherError::Kafka(err))
            }
        }
    }

    async fn flush(mut self) -> Result<DeliveryReport, WatcherError> {
        info!(outstanding = self.pending.len(), "waiting for Kafka acknowledgments");
        while let Some(ack) = self.pending.join_next().await {
            self.tally(ack);
        }

        info!(
            delivered = self.report.delivered,
            failed = self.report.failed,
            "flushed Kafka producer"
        );
        self.report.check(self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_registry::tests::YOUTUBE_VIDEOS_VALUE_SCHEMA;
    use apache_avro::Schema;
    use rdkafka::consumer::{BaseConsumer, Consumer};
    use rdkafka::mocking::MockCluster;
    use rdkafka::producer::DefaultProducerContext;
    use rdkafka::types::{RDKafkaApiKey, RDKafkaRespErr};
    use rdkafka::{Message, Offset, TopicPartitionList};

    const TOPIC: &str = "youtube_videos";

    fn start_on_mocked_sink(
        policy: DeliveryFailurePolicy,
    ) -> (MockCluster<'static, DefaultProducerContext>, KafkaSink) {
        let cluster = MockCluster::new(1).expect("failed to create mock brokers");
        cluster
            .create_topic(TOPIC, 1, 1)
            .expect("failed to create topic");
        let config = KafkaConfig {
            kafka_hosts: cluster.bootstrap_servers(),
            kafka_topic: TOPIC.to_string(),
            kafka_tls: false,
            kafka_sasl_username: None,
            kafka_sasl_password: None,
            kafka_producer_linger_ms: 0,
            kafka_message_timeout_ms: 5000,
            kafka_compression_codec: "none".to_string(),
            kafka_send_max_retries: 0,
            delivery_failure_policy: policy,
        };
        let schema = Schema::parse_str(YOUTUBE_VIDEOS_VALUE_SCHEMA).unwrap();
        let sink = KafkaSink::new(&config, AvroValueSerializer::new(1, schema))
            .expect("failed to create sink");
        (cluster, sink)
    }

    fn summary(id: &str) -> VideoSummary {
        VideoSummary {
            video_id: id.to_string(),
            title: format!("title of {id}"),
            views: 5,
            likes: 0,
            comments: 0,
        }
    }

    #[tokio::test]
    async fn publishes_keyed_records() {
        let (cluster, mut sink) = start_on_mocked_sink(DeliveryFailurePolicy::Abort);

        sink.publish(&summary("a")).unwrap();
        sink.publish(&summary("b")).unwrap();
        let report = sink.flush().await.unwrap();
        assert_eq!(
            report,
            DeliveryReport {
                delivered: 2,
                failed: 0
            }
        );

        let consumer: BaseConsumer = ClientConfig::new()
            .set("bootstrap.servers", cluster.bootstrap_servers())
            .set("group.id", "youtube-watcher-test")
            .set("enable.auto.commit", "false")
            .create()
            .unwrap();
        let mut assignment = TopicPartitionList::new();
        assignment
            .add_partition_offset(TOPIC, 0, Offset::Beginning)
            .unwrap();
        consumer.assign(&assignment).unwrap();

        let mut seen = Vec::new();
        for _ in 0..50 {
            if seen.len() == 2 {
                break;
            }
            if let Some(message) = consumer.poll(Duration::from_millis(200)) {
                let message = message.unwrap();
                let key = String::from_utf8(message.key().unwrap().to_vec()).unwrap();
                let payload = message.payload().unwrap();
                assert_eq!(payload[0], 0, "magic byte");
                assert_eq!(&payload[1..5], &1u32.to_be_bytes(), "schema id");
                seen.push(key);
            }
        }
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn ignored_failures_still_flush_ok() {
        let (cluster, mut sink) = start_on_mocked_sink(DeliveryFailurePolicy::Ignore);

        let err = [RDKafkaRespErr::RD_KAFKA_RESP_ERR_MSG_SIZE_TOO_LARGE; 1];
        cluster.request_errors(RDKafkaApiKey::Produce, &err);

        sink.publish(&summary("a")).unwrap();
        let report = sink.flush().await.unwrap();
        assert_eq!(
            report,
            DeliveryReport {
                delivered: 0,
                failed: 1
            }
        );
    }

    #[tokio::test]
    async fn abort_policy_fails_the_run() {
        let (cluster, mut sink) = start_on_mocked_sink(DeliveryFailurePolicy::Abort);

        let err = [RDKafkaRespErr::RD_KAFKA_RESP_ERR_MSG_SIZE_TOO_LARGE; 1];
        cluster.request_errors(RDKafkaApiKey::Produce, &err);
        sink.publish(&summary("a")).unwrap();

        // wait for the failed acknowledgment to come back
        for _ in 0..50 {
            sink.collect_finished();
            if sink.pending.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert_eq!(sink.report.failed, 1);

        match sink.publish(&summary("b")) {
            Err(WatcherError::Delivery { failed: 1, .. }) => {} // Expected
            other => panic!("should have refused to publish, got {other:?}"),
        }
        match sink.flush().await {
            Err(WatcherError::Delivery { failed: 1, .. }) => {} // Expected
            other => panic!("should have errored, got {other:?}"),
        }
    }
}
