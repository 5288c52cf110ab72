//! Tool registry - the explicitly constructed entry point.
//!
//! Owns the store handle plus the shared executor and mapper, and hands out
//! capabilities and probes. Open it at startup, pass it where it is needed,
//! close it on shutdown.

use futures::future::join_all;
use serde_json::{Map, Value};
use std::sync::Arc;

use super::capability::{export, invoke_tool, render_error, render_not_found, Capability};
use super::executor::RequestExecutor;
use super::mapping::ResponseMapper;
use super::probe::{ConnectivityProber, ProbeResult};
use crate::store::ToolStore;
use crate::types::{Config, Error, Result, ToolId};

#[derive(Debug, Clone)]
pub struct ToolRegistry {
    store: ToolStore,
    executor: Arc<RequestExecutor>,
    mapper: ResponseMapper,
    prober: ConnectivityProber,
}

impl ToolRegistry {
    /// Wrap an already opened store.
    pub fn new(store: ToolStore, config: &Config) -> Result<Self> {
        let executor = Arc::new(RequestExecutor::new(&config.http)?);
        let mapper = ResponseMapper::new(config.mapping.max_items);
        let prober = ConnectivityProber::new(store.clone(), executor.clone());
        Ok(Self {
            store,
            executor,
            mapper,
            prober,
        })
    }

    /// Open the configured store and build the registry around it.
    pub fn open(config: &Config) -> Result<Self> {
        let store = ToolStore::open(&config.store.path)?;
        Self::new(store, config)
    }

    pub fn store(&self) -> &ToolStore {
        &self.store
    }

    pub fn executor(&self) -> &Arc<RequestExecutor> {
        &self.executor
    }

    pub fn mapper(&self) -> ResponseMapper {
        self.mapper
    }

    /// Capabilities for every active tool, reloaded from the store.
    pub fn capabilities(&self) -> Result<Vec<Capability>> {
        let tools = self.store.list_active()?;
        Ok(export(tools, self.executor.clone(), self.mapper))
    }

    /// Invoke a tool by id. Unknown ids and store failures become text like
    /// any other failure. Inactive tools are still invocable here.
    pub async fn invoke(&self, id: &ToolId, params: Map<String, Value>) -> String {
        let tool = match self.store.get(id) {
            Ok(tool) => tool,
            Err(Error::NotFound(_)) => return render_not_found(id.as_str()),
            Err(err) => return render_error(id.as_str(), &err),
        };
        invoke_tool(&tool, &self.executor, self.mapper, &params).await
    }

    /// Probe one tool and persist the outcome.
    pub async fn probe(&self, id: &ToolId) -> Result<ProbeResult> {
        self.prober.probe(id).await
    }

    /// Probe every stored tool concurrently, active or not.
    ///
    /// Results come back in store order. A store failure on any write fails
    /// the whole batch, after all probes have run.
    pub async fn probe_all(&self) -> Result<Vec<ProbeResult>> {
        let tools = self.store.list_all()?;
        let results = join_all(tools.iter().map(|tool| self.prober.probe_tool(tool))).await;
        results.into_iter().collect()
    }

    /// Release the store. Clones of the store handle keep it open.
    pub fn close(self) -> Result<()> {
        let Self { store, prober, .. } = self;
        drop(prober);
        store.close()
    }
}
