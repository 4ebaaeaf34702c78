use crate::address::Address;
use crate::channel::Channel;

/// Durable keyed storage for channel records.
pub trait StateStore {
    fn write_channel(&mut self, channel: &Channel) -> Result<(), anyhow::Error>;
    fn load_channel(&self, id: &Address) -> Result<Channel, anyhow::Error>;
    fn contains_channel(&self, id: &Address) -> bool;
}
