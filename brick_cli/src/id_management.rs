use crate::error::CliError;
use anyhow::anyhow;
use libbrick::address::Address;
use libbrick::cryptography::SecretKey;
use log::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// A named signing key kept in the local configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LocalIdentity {
    name: String,
    #[serde(serialize_with = "serialize_key", deserialize_with = "deserialize_key")]
    secret_key: SecretKey,
}

fn serialize_key<S: Serializer>(key: &SecretKey, s: S) -> Result<S::Ok, S::Error> {
    key.as_hex().as_str().serialize(s)
}

fn deserialize_key<'de, D: Deserializer<'de>>(de: D) -> Result<SecretKey, D::Error> {
    let hex = String::deserialize(de)?;
    SecretKey::from_hex(&hex).map_err(serde::de::Error::custom)
}

impl LocalIdentity {
    pub fn new(name: impl Into<String>, secret_key: SecretKey) -> Self {
        LocalIdentity { name: name.into(), secret_key }
    }

    /// A new identity with a random key. Unnamed identities are named after their address.
    pub fn random(name: Option<String>) -> Self {
        let secret_key = SecretKey::random();
        let name = name.unwrap_or_else(|| secret_key.address().to_string());
        LocalIdentity { name, secret_key }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.secret_key.address()
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl Display for LocalIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address())
    }
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LocalIdentitySet {
    pub identities: BTreeMap<String, LocalIdentity>,
}

impl LocalIdentitySet {
    pub fn try_load<P: AsRef<Path>>(path: Option<P>) -> Result<Self, CliError> {
        let ids = load_config_file(path)?;
        Ok(ids)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        save_config_file(path, self)
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.identities.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&LocalIdentity> {
        self.identities.get(name)
    }

    pub fn insert(&mut self, identity: LocalIdentity) -> Option<LocalIdentity> {
        self.identities.insert(identity.name.clone(), identity)
    }

    pub fn remove<S: AsRef<str>>(&mut self, name: S) -> Option<LocalIdentity> {
        self.identities.remove(name.as_ref())
    }
}

pub fn default_id_path() -> PathBuf {
    let mut home = std::env::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.push(".brick");
    home.push("config.yml");
    home
}

pub fn load_config_file<P: AsRef<Path>>(path: Option<P>) -> Result<LocalIdentitySet, CliError> {
    let path = path.map(|p| p.as_ref().to_path_buf()).unwrap_or_else(default_id_path);
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let local_set = serde_yml::from_reader(reader)?;
    Ok(local_set)
}

pub fn save_config_file<P: AsRef<Path>>(path: P, ids: &LocalIdentitySet) -> Result<(), CliError> {
    // Create directory path if required
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_yml::to_writer(writer, ids)?;
    Ok(())
}

/// Loads the identity file at `path`, or starts an empty set if there is no file yet.
pub fn load_or_create_identities(path: &Path) -> Result<LocalIdentitySet, anyhow::Error> {
    match LocalIdentitySet::try_load(Some(path)) {
        Ok(local_identities) => Ok(local_identities),
        Err(CliError::IoError(err)) => {
            if err.kind() == std::io::ErrorKind::NotFound {
                info!("No configuration file found at {}", path.display());
                Ok(LocalIdentitySet::default())
            } else {
                Err(anyhow!("Error reading configuration file: {err}"))
            }
        }
        Err(err) => Err(anyhow!("Could not load identities: {err}")),
    }
}

/// Picks the named identity, or the first one on file if no name is given.
pub fn assign_identity(path: &Path, name: Option<&String>) -> Result<LocalIdentity, anyhow::Error> {
    debug!("Loading identities from {}", path.display());
    let mut local_identities = load_or_create_identities(path)?;
    if local_identities.is_empty() {
        return Err(anyhow!("No identities found. Use `brick id new` to create one."));
    }
    let identity = match name {
        Some(name) => local_identities.remove(name).ok_or_else(|| anyhow!("Identity not found: {name}"))?,
        None => local_identities
            .identities
            .into_values()
            .next()
            .ok_or_else(|| anyhow!("No identities found. Use `brick id new` to create one."))?,
    };
    Ok(identity)
}

#[cfg(test)]
mod test {
    use super::*;

    const KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let mut ids = LocalIdentitySet::default();
        ids.insert(LocalIdentity::new("alice", SecretKey::from_hex(KEY).unwrap()));
        ids.insert(LocalIdentity::random(Some("bob".into())));
        ids.save(&path).unwrap();

        let loaded = LocalIdentitySet::try_load(Some(&path)).unwrap();
        assert_eq!(loaded.len(), 2);
        let alice = loaded.get("alice").unwrap();
        assert_eq!(alice.secret_key().as_hex().as_str(), KEY);
        assert_eq!(alice.address(), SecretKey::from_hex(KEY).unwrap().address());
        assert_eq!(loaded.get("bob").unwrap().address(), ids.get("bob").unwrap().address());
    }

    #[test]
    fn missing_file_gives_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let ids = load_or_create_identities(&dir.path().join("none.yml")).unwrap();
        assert!(ids.is_empty());
        assert!(assign_identity(&dir.path().join("none.yml"), None).is_err());
    }

    #[test]
    fn assign_by_name_or_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        let mut ids = LocalIdentitySet::default();
        ids.insert(LocalIdentity::new("alice", SecretKey::from_hex(KEY).unwrap()));
        ids.insert(LocalIdentity::random(Some("zed".into())));
        ids.save(&path).unwrap();
        assert_eq!(assign_identity(&path, None).unwrap().name(), "alice");
        assert_eq!(assign_identity(&path, Some(&"zed".to_string())).unwrap().name(), "zed");
        assert!(assign_identity(&path, Some(&"carol".to_string())).is_err());
    }

    #[test]
    fn corrupt_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "identities:\n  eve:\n    name: eve\n    secret_key: nothex\n").unwrap();
        assert!(matches!(LocalIdentitySet::try_load(Some(&path)), Err(CliError::InvalidConfig(_))));
    }
}
