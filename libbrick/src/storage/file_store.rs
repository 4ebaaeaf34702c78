use crate::address::Address;
use crate::channel::Channel;
use crate::storage::traits::StateStore;
use ron::ser::PrettyConfig;
use std::fs;
use std::path::PathBuf;

/// A file-based store for channel records.
///
/// Each channel is saved in a file named after its id, e.g. `0x5b38da6a701c568545dcfcb03fcb875f56beddc4.ron`
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a new file store with the given path.
    ///
    /// # Arguments
    /// * `path` - The path to the directory where the channel files will be stored.
    pub fn new(path: PathBuf) -> Result<Self, std::io::Error> {
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(Self { path })
    }

    /// Returns the path to the directory where the channel files are stored.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn file_for(&self, id: &Address) -> PathBuf {
        self.path.join(format!("{id}.ron"))
    }
}

impl StateStore for FileStore {
    fn write_channel(&mut self, channel: &Channel) -> Result<(), anyhow::Error> {
        let config = PrettyConfig::new().compact_arrays(true).compact_maps(true);
        let val = ron::ser::to_string_pretty(channel, config)?;
        fs::write(self.file_for(channel.id()), &val)?;
        Ok(())
    }

    fn load_channel(&self, id: &Address) -> Result<Channel, anyhow::Error> {
        let val = fs::read_to_string(self.file_for(id))?;
        let channel: Channel = ron::de::from_str(&val)?;
        Ok(channel)
    }

    fn contains_channel(&self, id: &Address) -> bool {
        self.file_for(id).exists()
    }
}
