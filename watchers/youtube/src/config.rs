use std::str::FromStr;

use envconfig::Envconfig;

use crate::sinks::DeliveryFailurePolicy;

#[derive(Envconfig, Clone)]
pub struct Config {
    pub google_api_key: String,

    pub youtube_playlist_id: String,

    #[envconfig(from = "YOUTUBE_API_URL", default = "https://www.googleapis.com/youtube/v3")]
    pub youtube_api_url: String,

    #[envconfig(default = "50")]
    pub youtube_page_size: u32,

    /// Log summaries instead of producing them; no Kafka or schema registry needed.
    #[envconfig(default = "false")]
    pub print_sink: bool,

    pub schema_registry_url: Option<String>,

    /// `user:password` for registries behind basic auth (e.g. Confluent Cloud).
    pub schema_registry_basic_auth: Option<String>,

    #[envconfig(nested = true)]
    pub kafka: KafkaConfig,
}

impl Config {
    /// The registry subject holding the value schema for `topic`.
    pub fn value_subject(&self) -> String {
        format!("{}-value", self.kafka.kafka_topic)
    }
}

#[derive(Envconfig, Clone)]
pub struct KafkaConfig {
    #[envconfig(default = "localhost:9092")]
    pub kafka_hosts: String,

    #[envconfig(default = "youtube_videos")]
    pub kafka_topic: String,

    #[envconfig(default = "false")]
    pub kafka_tls: bool,

    /// SASL/PLAIN credentials; setting them switches the connection to SASL.
    pub kafka_sasl_username: Option<String>,
    pub kafka_sasl_password: Option<String>,

    #[envconfig(default = "20")]
    pub kafka_producer_linger_ms: u32, // Maximum time between producer batches during low traffic

    #[envconfig(default = "20000")]
    pub kafka_message_timeout_ms: u32, // Time before we stop retrying producing a message

    #[envconfig(default = "none")]
    pub kafka_compression_codec: String, // none, gzip, snappy, lz4, zstd

    #[envconfig(default = "2")]
    pub kafka_send_max_retries: u32,

    #[envconfig(default = "ignore")]
    pub delivery_failure_policy: DeliveryFailurePolicy,
}

impl FromStr for DeliveryFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_ref() {
            "ignore" => Ok(DeliveryFailurePolicy::Ignore),
            "abort" => Ok(DeliveryFailurePolicy::Abort),
            _ => Err(format!("Unknown delivery failure policy: {s}")),
        }
    }
}
