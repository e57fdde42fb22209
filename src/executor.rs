//! Route invocation strategies.
//!
//! Selected per route at dispatch time from [`RouteEntry::wants_body`]:
//! body-less routes skip content handling entirely, body-taking routes run
//! the configured [`ContentDecoder`] first. Both end at the same erased
//! invoker call.

use std::sync::Arc;

use crate::adapter::HandlerOutcome;
use crate::content::ContentDecoder;
use crate::error::DispatchError;
use crate::params::Args;
use crate::request::Request;
use crate::route::RouteEntry;
use crate::uri::ParsedUri;

pub(crate) trait MethodExecutor: Send + Sync {
    fn execute(
        &self,
        route: &RouteEntry,
        request: &Request,
        uri: &ParsedUri,
    ) -> Result<HandlerOutcome, DispatchError>;
}

/// Executor for routes that take no request body.
pub(crate) struct PlainExecutor;

impl MethodExecutor for PlainExecutor {
    fn execute(
        &self,
        route: &RouteEntry,
        _request: &Request,
        uri: &ParsedUri,
    ) -> Result<HandlerOutcome, DispatchError> {
        let args = extract_args(route, uri)?;
        Ok(route.invoke(args, None)?)
    }
}

/// Executor for routes that declare a typed body.
pub(crate) struct ContentExecutor {
    decoder: Arc<dyn ContentDecoder>,
}

impl ContentExecutor {
    pub(crate) fn new(decoder: Arc<dyn ContentDecoder>) -> Self {
        Self { decoder }
    }
}

impl MethodExecutor for ContentExecutor {
    fn execute(
        &self,
        route: &RouteEntry,
        request: &Request,
        uri: &ParsedUri,
    ) -> Result<HandlerOutcome, DispatchError> {
        let args = extract_args(route, uri)?;
        // An absent body stays None here; the invoker reports it so the
        // failure names the route's expectation, not the transport's.
        let body = match request.body() {
            Some(bytes) => Some(self.decoder.decode(bytes, request.content_type())?),
            None => None,
        };
        Ok(route.invoke(args, body)?)
    }
}

fn extract_args(route: &RouteEntry, uri: &ParsedUri) -> Result<Args, DispatchError> {
    let values = route.template().extract(uri)?;
    Ok(Args::new(values, uri.query().to_vec()))
}
