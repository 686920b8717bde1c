use std::time::Duration;

use http::Response;

use crate::protocol::{RequestHeader, TransportError};
use crate::transport::ResponseBody;

/// What one send attempt did, handed to the `on_stats` hook.
///
/// Exactly one of `response` and `error` is present.
#[derive(Debug, Clone, Copy)]
pub struct TransferStats<'a> {
    request: &'a RequestHeader,
    response: Option<&'a Response<ResponseBody>>,
    transfer_time: Duration,
    error: Option<&'a TransportError>,
}

impl<'a> TransferStats<'a> {
    pub(crate) fn new(request: &'a RequestHeader, result: &'a Result<Response<ResponseBody>, TransportError>, transfer_time: Duration) -> Self {
        Self { request, response: result.as_ref().ok(), transfer_time, error: result.as_ref().err() }
    }

    /// The request as it was framed, after the transport's header rewrites.
    pub fn request(&self) -> &'a RequestHeader {
        self.request
    }

    pub fn response(&self) -> Option<&'a Response<ResponseBody>> {
        self.response
    }

    /// Wall time from the start of the request until it completed or failed.
    pub fn transfer_time(&self) -> Duration {
        self.transfer_time
    }

    pub fn error(&self) -> Option<&'a TransportError> {
        self.error
    }

    pub fn has_response(&self) -> bool {
        self.response.is_some()
    }
}
