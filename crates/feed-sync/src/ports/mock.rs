//! # Mock Implementations for Testing
//!
//! A scripted [`ApiGateway`]. Responses are queued per endpoint kind and
//! can be held behind a [`Gate`] so tests decide when (and in which order)
//! overlapping calls resolve.
//!
//! Also a [`RecordingNavigator`] and an in-memory [`AssetSink`].

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use tokio::sync::oneshot;

use super::outbound::{ApiGateway, ApiRequest, AssetSink, Navigator};
use crate::domain::{FeedError, GatewayError, Route, SavedAsset};

/// Releases one held mock response.
#[derive(Debug)]
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    /// Let the held call resolve.
    pub fn release(self) {
        let _ = self.0.send(());
    }
}

struct Scripted<T> {
    result: Result<T, GatewayError>,
    gate: Option<oneshot::Receiver<()>>,
}

impl<T> Scripted<T> {
    fn ready(result: Result<T, GatewayError>) -> Self {
        Self { result, gate: None }
    }

    fn held(result: Result<T, GatewayError>) -> (Self, Gate) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                result,
                gate: Some(rx),
            },
            Gate(tx),
        )
    }

    async fn resolve(self) -> Result<T, GatewayError> {
        if let Some(gate) = self.gate {
            // A dropped gate releases the call as well.
            let _ = gate.await;
        }
        self.result
    }
}

/// Scripted API gateway.
#[derive(Default)]
pub struct MockApiGateway {
    responses: Mutex<HashMap<&'static str, VecDeque<Scripted<Value>>>>,
    standing: Mutex<HashMap<&'static str, Result<Value, GatewayError>>>,
    assets: Mutex<VecDeque<Scripted<Vec<u8>>>>,
    calls: Mutex<Vec<ApiRequest>>,
    asset_calls: Mutex<Vec<String>>,
}

impl MockApiGateway {
    /// Empty script; unscripted calls fail with a network error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one response for an endpoint kind.
    pub fn respond(&self, kind: &'static str, result: Result<Value, GatewayError>) {
        self.responses
            .lock()
            .entry(kind)
            .or_default()
            .push_back(Scripted::ready(result));
    }

    /// Queue one response that resolves only after the gate is released.
    pub fn respond_held(&self, kind: &'static str, result: Result<Value, GatewayError>) -> Gate {
        let (scripted, gate) = Scripted::held(result);
        self.responses
            .lock()
            .entry(kind)
            .or_default()
            .push_back(scripted);
        gate
    }

    /// Answer every otherwise unscripted call of `kind` with `result`.
    pub fn respond_always(&self, kind: &'static str, result: Result<Value, GatewayError>) {
        self.standing.lock().insert(kind, result);
    }

    /// Queue one asset fetch result.
    pub fn respond_asset(&self, result: Result<Vec<u8>, GatewayError>) {
        self.assets.lock().push_back(Scripted::ready(result));
    }

    /// Queue one asset fetch result behind a gate.
    pub fn respond_asset_held(&self, result: Result<Vec<u8>, GatewayError>) -> Gate {
        let (scripted, gate) = Scripted::held(result);
        self.assets.lock().push_back(scripted);
        gate
    }

    /// Every JSON call made so far.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().clone()
    }

    /// Number of JSON calls made to an endpoint kind.
    pub fn call_count(&self, kind: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|req| req.endpoint.kind() == kind)
            .count()
    }

    /// Every asset URI fetched so far.
    pub fn asset_calls(&self) -> Vec<String> {
        self.asset_calls.lock().clone()
    }
}

#[async_trait]
impl ApiGateway for MockApiGateway {
    async fn call(&self, request: ApiRequest) -> Result<Value, GatewayError> {
        let kind = request.endpoint.kind();
        self.calls.lock().push(request);

        let scripted = self
            .responses
            .lock()
            .get_mut(kind)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some(scripted) => scripted.resolve().await,
            None => self.standing.lock().get(kind).cloned().unwrap_or_else(|| {
                Err(GatewayError::Network(format!(
                    "no scripted response for {kind}"
                )))
            }),
        }
    }

    async fn fetch_asset(&self, uri: &str) -> Result<Vec<u8>, GatewayError> {
        self.asset_calls.lock().push(uri.to_string());
        let scripted = self.assets.lock().pop_front();
        match scripted {
            Some(scripted) => scripted.resolve().await,
            None => Err(GatewayError::Network(format!("no scripted asset for {uri}"))),
        }
    }
}

/// Navigator that records every route it is asked to show.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    /// No routes recorded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes in the order they were requested.
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }

    /// Most recent route.
    pub fn last(&self) -> Option<Route> {
        self.routes.lock().last().copied()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

/// Asset sink that keeps saved bytes in memory.
#[derive(Debug, Default)]
pub struct MemoryAssetSink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    opened: Mutex<Vec<String>>,
    fail_saves: Mutex<bool>,
    fail_opens: Mutex<bool>,
}

impl MemoryAssetSink {
    /// Empty sink that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save` fail.
    pub fn fail_saves(&self) {
        *self.fail_saves.lock() = true;
    }

    /// Make every following `open_external` fail.
    pub fn fail_opens(&self) {
        *self.fail_opens.lock() = true;
    }

    /// Names of saved artifacts, in order.
    pub fn saved_names(&self) -> Vec<String> {
        self.saved.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Bytes of a saved artifact.
    pub fn saved_bytes(&self, file_name: &str) -> Option<Vec<u8>> {
        self.saved
            .lock()
            .iter()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.clone())
    }

    /// URIs handed to the external viewer.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

#[async_trait]
impl AssetSink for MemoryAssetSink {
    async fn save(&self, file_name: &str, bytes: Vec<u8>) -> Result<SavedAsset, FeedError> {
        if *self.fail_saves.lock() {
            return Err(FeedError::Asset(format!("cannot save {file_name}")));
        }
        let size = bytes.len();
        self.saved.lock().push((file_name.to_string(), bytes));
        Ok(SavedAsset {
            file_name: file_name.to_string(),
            location: format!("memory://{file_name}"),
            size,
        })
    }

    async fn open_external(&self, uri: &str) -> Result<(), FeedError> {
        if *self.fail_opens.lock() {
            return Err(FeedError::Asset(format!("cannot open {uri}")));
        }
        self.opened.lock().push(uri.to_string());
        Ok(())
    }
}
