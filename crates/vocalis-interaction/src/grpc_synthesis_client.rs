//! gRPC client for the remote speech synthesis service.

use crate::audio_processor::{
    AudioFile, ContentRequest, PROCESS_CONTENT_PATH, ProcessingResponse, STATUS_OK,
};
use async_trait::async_trait;
use std::time::Duration;
use tonic::Status;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};
use vocalis_core::config::SynthesisSettings;
use vocalis_core::error::{Result, VocalisError};
use vocalis_core::synthesis::SynthesisClient;

/// Calls `AudioProcessor/ProcessContent` once per synthesis request.
///
/// The channel connects lazily, so constructing the client never blocks on
/// the service being up. Connection setup is bounded by the connect timeout
/// and every call by the request timeout.
#[derive(Clone)]
pub struct GrpcSynthesisClient {
    channel: Channel,
    request_timeout: Duration,
}

impl GrpcSynthesisClient {
    /// # Errors
    ///
    /// `Config` if `host:port` does not form a valid URI.
    pub fn new(settings: &SynthesisSettings) -> Result<Self> {
        let endpoint = Endpoint::from_shared(settings.endpoint())
            .map_err(|e| {
                VocalisError::config(format!(
                    "Invalid synthesis endpoint {}: {}",
                    settings.endpoint(),
                    e
                ))
            })?
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout);

        Ok(Self {
            channel: endpoint.connect_lazy(),
            request_timeout: settings.request_timeout,
        })
    }

    async fn process_content(
        &self,
        request: ContentRequest,
    ) -> std::result::Result<ProcessingResponse, Status> {
        let mut grpc = Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|e| Status::unavailable(format!("synthesis service not ready: {}", e)))?;

        let codec = ProstCodec::<ContentRequest, ProcessingResponse>::default();
        let path = PathAndQuery::from_static(PROCESS_CONTENT_PATH);
        let response = grpc
            .unary(tonic::Request::new(request), path, codec)
            .await?;
        Ok(response.into_inner())
    }
}

/// Extracts the audio from a response, treating in-band failures as errors.
fn into_audio(response: ProcessingResponse) -> Result<Vec<u8>> {
    if response.status != STATUS_OK {
        return Err(VocalisError::synthesis(format!(
            "service reported status {:?}",
            response.status
        )));
    }
    match response.result {
        Some(result) if !result.processed_audio.is_empty() => Ok(result.processed_audio),
        Some(_) => Err(VocalisError::synthesis("service returned empty audio")),
        None => Err(VocalisError::synthesis("service returned no result")),
    }
}

#[async_trait]
impl SynthesisClient for GrpcSynthesisClient {
    async fn synthesize(&self, text: &str, reference_audio: Vec<u8>) -> Result<Vec<u8>> {
        let request = ContentRequest {
            text: text.to_string(),
            audio: Some(AudioFile {
                data: reference_audio,
            }),
        };

        debug!(
            chars = text.chars().count(),
            timeout_secs = self.request_timeout.as_secs(),
            "Sending synthesis request"
        );

        let response = self.process_content(request).await.map_err(|status| {
            warn!(code = ?status.code(), message = status.message(), "Synthesis call failed");
            VocalisError::synthesis(format!("{:?}: {}", status.code(), status.message()))
        })?;

        let audio = into_audio(response)?;
        debug!(bytes = audio.len(), "Synthesis succeeded");
        Ok(audio)
    }
}
