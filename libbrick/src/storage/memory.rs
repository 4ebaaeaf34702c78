use crate::address::Address;
use crate::channel::Channel;
use crate::storage::traits::StateStore;
use anyhow::anyhow;
use std::collections::HashMap;

/// Keeps channel records in memory. Used by simulations and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    channels: HashMap<Address, Channel>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn write_channel(&mut self, channel: &Channel) -> Result<(), anyhow::Error> {
        self.channels.insert(*channel.id(), channel.clone());
        Ok(())
    }

    fn load_channel(&self, id: &Address) -> Result<Channel, anyhow::Error> {
        self.channels.get(id).cloned().ok_or_else(|| anyhow!("No channel with id {id}"))
    }

    fn contains_channel(&self, id: &Address) -> bool {
        self.channels.contains_key(id)
    }
}
