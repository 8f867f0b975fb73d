mod app_config;

pub use app_config::{
    AppConfig, CorpusConfig, EmbeddingConfig, KvConfig, LogFormat, LoggingConfig, RetrievalConfig,
};
