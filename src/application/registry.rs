//! The set of backends the router can dispatch to, keyed by backend key.

use std::collections::BTreeMap;
use std::sync::Arc;

use super::acquisition::{AcquisitionSettings, BackendClient, Transports};
use super::backend_agent::BackendAgent;
use crate::domain::BackendDescriptor;
use crate::ports::ChatModel;

#[derive(Default)]
pub struct BackendRegistry {
    agents: BTreeMap<String, Arc<BackendAgent>>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds one agent per descriptor, all sharing the same transports.
    ///
    /// With a `relay` model, backends that carry an instruction relay their
    /// answers through it.
    pub fn build(
        descriptors: impl IntoIterator<Item = BackendDescriptor>,
        transports: Transports,
        settings: AcquisitionSettings,
        relay: Option<Arc<dyn ChatModel>>,
    ) -> Self {
        let settings = Arc::new(settings);
        let mut registry = Self::new();
        for descriptor in descriptors {
            let client = BackendClient::new(descriptor, transports.clone(), Arc::clone(&settings));
            let mut agent = BackendAgent::new(Arc::new(client));
            if let Some(model) = &relay {
                agent = agent.with_relay(Arc::clone(model));
            }
            registry.insert(agent);
        }
        registry
    }

    /// Adds an agent, replacing any previous one with the same key.
    pub fn insert(&mut self, agent: BackendAgent) {
        self.agents.insert(agent.key().to_string(), Arc::new(agent));
    }

    pub fn get(&self, key: &str) -> Option<&Arc<BackendAgent>> {
        self.agents.get(key)
    }

    /// Agents in key order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<BackendAgent>> {
        self.agents.values()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::testing::{
        MockActivityStream, MockAnswerService, MockDirectLine, RecordingSleeper,
    };
    use crate::domain::{ConversationAccess, StrategyKind};

    fn transports() -> Transports {
        Transports {
            answers: Arc::new(MockAnswerService::new()),
            direct_line: Arc::new(MockDirectLine::new()),
            streams: Arc::new(MockActivityStream::new()),
            sleeper: Arc::new(RecordingSleeper::new()),
        }
    }

    #[test]
    fn build_indexes_by_key() {
        let access = ConversationAccess::new("https://dl/token", "https://dl/conv", "s");
        let registry = BackendRegistry::build(
            vec![
                BackendDescriptor::direct("aima_agent", "http://aima"),
                BackendDescriptor::polling("difa_agent", access.clone()),
                BackendDescriptor::streaming("gino_agent", access),
            ],
            transports(),
            AcquisitionSettings::default(),
            None,
        );

        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.get("gino_agent").unwrap().backend().strategy(),
            StrategyKind::Stream
        );
        assert!(registry.get("unknown_agent").is_none());
        let keys: Vec<&str> = registry.iter().map(|a| a.key()).collect();
        assert_eq!(keys, vec!["aima_agent", "difa_agent", "gino_agent"]);
    }
}
