//! In-memory [`Chain`] used by the deployment tests.

#![allow(dead_code)]

use std::{collections::HashMap, sync::Mutex};

use alloy_core::primitives::{Address, B256, Bytes, address};
use alloy_sol_types::{SolCall, SolEvent};
use anyhow::Result;
use tagvoting_deploy::{
    Chain, ChainSettings, DeployRequest, ExecuteRequest, Log, NetworkDeployment,
    PluginRepoRegistered, TransactionReceipt, pluginRepoRegistryCall,
};

pub const SETUP: Address = address!("0000000000000000000000000000000000005e70");
pub const REPO: Address = address!("0000000000000000000000000000000000000e90");
pub const MAINTAINER: Address = address!("00000000000000000000000000000000000000aa");

/// A call observed by [`MockChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Deploy(DeployRequest),
    Execute(ExecuteRequest),
}

/// Records every call and answers with canned results.
#[derive(Debug)]
pub struct MockChain {
    settings: ChainSettings,
    setup_address: Address,
    logs: Vec<Log>,
    /// Factory address to the registry it reports. Unknown addresses have no code.
    factories: HashMap<Address, Address>,
    calls: Mutex<Vec<Call>>,
    reads: Mutex<Vec<Address>>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            settings: ChainSettings {
                chain_id,
                default_from: MAINTAINER,
            },
            setup_address: SETUP,
            logs: Vec::new(),
            factories: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
        }
    }

    /// A chain where the Aragon factory of `network` is deployed and wired to its registry.
    pub fn with_network(chain_id: u64, network: NetworkDeployment) -> Self {
        Self::new(chain_id).with_factory(network.plugin_repo_factory, network.plugin_repo_registry)
    }

    /// Emit one `PluginRepoRegistered(subdomain, repo)` from `registry` on every execute.
    pub fn registering(mut self, registry: Address, subdomain: &str, repo: Address) -> Self {
        self.logs.push(registered_log(registry, subdomain, repo));
        self
    }

    pub fn with_log(mut self, log: Log) -> Self {
        self.logs.push(log);
        self
    }

    /// Answer `pluginRepoRegistry()` on `factory` with `registry`.
    pub fn with_factory(mut self, factory: Address, registry: Address) -> Self {
        self.factories.insert(factory, registry);
        self
    }

    /// Targets of every read-only call, in order.
    pub fn reads(&self) -> Vec<Address> {
        self.reads.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn executions(&self) -> Vec<ExecuteRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute(request) => Some(request),
                Call::Deploy(_) => None,
            })
            .collect()
    }
}

impl Chain for MockChain {
    fn settings(&self) -> ChainSettings {
        self.settings
    }

    async fn deploy(&self, request: DeployRequest) -> Result<Address> {
        self.calls.lock().unwrap().push(Call::Deploy(request));
        Ok(self.setup_address)
    }

    async fn execute(&self, request: ExecuteRequest) -> Result<TransactionReceipt> {
        self.calls.lock().unwrap().push(Call::Execute(request));
        Ok(TransactionReceipt {
            transaction_hash: B256::repeat_byte(0x11),
            status: Some(1),
            contract_address: None,
            logs: self.logs.clone(),
        })
    }

    async fn static_call(&self, to: Address, calldata: Bytes) -> Result<Bytes> {
        self.reads.lock().unwrap().push(to);
        assert_eq!(&calldata[..4], pluginRepoRegistryCall::SELECTOR.as_slice());
        Ok(self
            .factories
            .get(&to)
            .map(|registry| Bytes::from(pluginRepoRegistryCall::abi_encode_returns(&(*registry,))))
            .unwrap_or_default())
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn registered_log(emitter: Address, subdomain: &str, repo: Address) -> Log {
    let data = PluginRepoRegistered {
        subdomain: subdomain.to_string(),
        pluginRepo: repo,
    }
    .encode_log_data();

    Log {
        address: emitter,
        topics: data.topics().to_vec(),
        data: data.data,
    }
}
