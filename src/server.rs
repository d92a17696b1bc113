//! OTLP/gRPC logs receiver.
//!
//! [`LogsReceiver`] implements the `opentelemetry.proto.collector.logs.v1`
//! `LogsService`. Every export request is converted into a [`Batch`],
//! handed to [`Monitor::ingest`] and acknowledged with an empty response.
//! Export never fails: records whose attribute cannot be resolved are
//! counted under [`UNKNOWN`](crate::resolver::UNKNOWN).
//!
//! [`serve`] binds the configured address and runs the service until the
//! shared [`CancellationToken`] is cancelled.

use std::io;
use std::sync::Arc;

use opentelemetry_proto::tonic::collector::logs::v1::logs_service_server::{
    LogsService, LogsServiceServer,
};
use opentelemetry_proto::tonic::collector::logs::v1::{
    ExportLogsServiceRequest, ExportLogsServiceResponse,
};
use opentelemetry_proto::tonic::common::v1::{any_value, AnyValue, KeyValue};
use opentelemetry_proto::tonic::logs::v1::{LogRecord, ResourceLogs, ScopeLogs};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{debug, info};

use crate::batch::{Attribute, AttributeValue, Batch, Record, ResourceGroup, ScopeGroup};
use crate::config::Config;
use crate::monitor::Monitor;

/// Errors that stop the receiver.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The listen address resolved to no socket address.
    #[error("listen address {0:?} did not resolve to any socket address")]
    Resolve(String),

    /// Address resolution failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// The gRPC server failed to bind or serve.
    #[error("transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl From<AnyValue> for AttributeValue {
    fn from(value: AnyValue) -> Self {
        match value.value {
            None => AttributeValue::Empty,
            Some(any_value::Value::StringValue(s)) => AttributeValue::String(s),
            Some(any_value::Value::BoolValue(b)) => AttributeValue::Bool(b),
            Some(any_value::Value::IntValue(i)) => AttributeValue::Int(i),
            Some(any_value::Value::DoubleValue(d)) => AttributeValue::Double(d),
            Some(any_value::Value::BytesValue(bytes)) => AttributeValue::Bytes(bytes),
            Some(any_value::Value::ArrayValue(array)) => {
                AttributeValue::Array(array.values.into_iter().map(Into::into).collect())
            }
            Some(any_value::Value::KvlistValue(list)) => {
                AttributeValue::Map(list.values.into_iter().map(Into::into).collect())
            }
        }
    }
}

impl From<KeyValue> for Attribute {
    fn from(kv: KeyValue) -> Self {
        Attribute {
            key: kv.key,
            value: kv.value.map(AttributeValue::from).unwrap_or_default(),
        }
    }
}

fn attributes(kvs: Vec<KeyValue>) -> Vec<Attribute> {
    kvs.into_iter().map(Attribute::from).collect()
}

impl From<LogRecord> for Record {
    fn from(record: LogRecord) -> Self {
        Record {
            attributes: attributes(record.attributes),
        }
    }
}

impl From<ScopeLogs> for ScopeGroup {
    fn from(scope_logs: ScopeLogs) -> Self {
        ScopeGroup {
            attributes: scope_logs
                .scope
                .map(|scope| attributes(scope.attributes))
                .unwrap_or_default(),
            records: scope_logs.log_records.into_iter().map(Record::from).collect(),
        }
    }
}

impl From<ResourceLogs> for ResourceGroup {
    fn from(resource_logs: ResourceLogs) -> Self {
        ResourceGroup {
            attributes: resource_logs
                .resource
                .map(|resource| attributes(resource.attributes))
                .unwrap_or_default(),
            scopes: resource_logs
                .scope_logs
                .into_iter()
                .map(ScopeGroup::from)
                .collect(),
        }
    }
}

impl From<ExportLogsServiceRequest> for Batch {
    fn from(request: ExportLogsServiceRequest) -> Self {
        Batch {
            resources: request
                .resource_logs
                .into_iter()
                .map(ResourceGroup::from)
                .collect(),
        }
    }
}

/// `LogsService` implementation feeding a shared [`Monitor`].
#[derive(Debug, Clone)]
pub struct LogsReceiver {
    attribute: String,
    monitor: Arc<Monitor>,
}

impl LogsReceiver {
    /// Creates a receiver resolving `attribute` on every ingested record.
    pub fn new(attribute: impl Into<String>, monitor: Arc<Monitor>) -> Self {
        Self {
            attribute: attribute.into(),
            monitor,
        }
    }

    /// Returns the attribute key resolved on every record.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }
}

#[tonic::async_trait]
impl LogsService for LogsReceiver {
    async fn export(
        &self,
        request: Request<ExportLogsServiceRequest>,
    ) -> Result<Response<ExportLogsServiceResponse>, Status> {
        debug!(remote = ?request.remote_addr(), "received export request");

        let batch = Batch::from(request.into_inner());
        self.monitor.ingest(&batch, &self.attribute);

        Ok(Response::new(ExportLogsServiceResponse::default()))
    }
}

/// Serves the logs receiver on `config.listen_addr` until `token` is
/// cancelled.
///
/// In-flight requests are allowed to complete before this returns.
pub async fn serve(
    config: &Config,
    monitor: Arc<Monitor>,
    token: CancellationToken,
) -> Result<(), ServeError> {
    let addr = tokio::net::lookup_host(config.listen_addr.as_str())
        .await?
        .next()
        .ok_or_else(|| ServeError::Resolve(config.listen_addr.clone()))?;

    let service = LogsServiceServer::new(LogsReceiver::new(config.attribute.clone(), monitor))
        .max_decoding_message_size(config.max_receive_message_size);

    info!(
        %addr,
        attribute = %config.attribute,
        max_receive_message_size = config.max_receive_message_size,
        "starting gRPC server"
    );

    Server::builder()
        .add_service(service)
        .serve_with_shutdown(addr, async move { token.cancelled().await })
        .await?;

    info!("gRPC server stopped");
    Ok(())
}
