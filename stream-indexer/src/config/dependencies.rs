//! Dependency initialization and wiring for the stream indexer.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::IndexingError;
use stream_indexer_ingest::{
    consumer::KafkaStreamReader,
    loader::IndexWriter,
    orchestrator::Orchestrator,
    processor::{IdExtractor, RecordProcessor},
};
use stream_indexer_repository::{OpenSearchClient, SearchError};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from settings.
    ///
    /// The search backend must answer a health check before the Kafka
    /// consumer is created, so a misconfigured cluster fails fast without
    /// joining the consumer group.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new(settings: &Settings) -> Result<Self, IndexingError> {
        info!(
            search_url = %settings.credentials.url,
            search_index = %settings.index,
            kafka_broker = %settings.kafka.brokers,
            kafka_group_id = %settings.kafka.group_id,
            kafka_topic = %settings.kafka.topic,
            "Initializing dependencies"
        );

        // Initialize OpenSearch client
        let search_client = OpenSearchClient::new(&settings.credentials)
            .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;
        let writer = IndexWriter::new(Arc::new(search_client));

        verify_search_backend(&writer).await?;
        info!("OpenSearch connection verified");

        // Initialize Kafka reader
        let reader = KafkaStreamReader::new(&settings.kafka)
            .map_err(|e| IndexingError::config(format!("Failed to create Kafka consumer: {}", e)))?;

        let processor = RecordProcessor::new(IdExtractor::new(&settings.id_field), &settings.index);

        let orchestrator = Orchestrator::with_config(
            Box::new(reader),
            processor,
            writer,
            settings.orchestrator.clone(),
        );

        Ok(Self { orchestrator })
    }
}

/// Fail unless the cluster answers its health check as usable.
async fn verify_search_backend(writer: &IndexWriter) -> Result<(), IndexingError> {
    if writer.health_check().await? {
        Ok(())
    } else {
        Err(SearchError::HealthCheckError("cluster status is red".to_string()).into())
    }
}
