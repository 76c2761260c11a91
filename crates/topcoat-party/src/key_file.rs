//! On-disk key material for one party

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use topcoat_core::{KeyPair, ParameterSet, PrivateKeyShare, PublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// `keyshare.<label>.json`: the parameter set the key was generated under,
/// the combined public key and this party's private share, both hex.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct KeyFile {
    #[zeroize(skip)]
    pub label: String,
    #[zeroize(skip)]
    pub params: ParameterSet,
    #[zeroize(skip)]
    pub public_key: String,
    share: String,
}

impl KeyFile {
    pub fn new(label: &str, params: &ParameterSet, key_pair: &KeyPair) -> Self {
        Self {
            label: label.to_string(),
            params: params.clone(),
            public_key: hex::encode(key_pair.public_key.to_bytes()),
            share: hex::encode(key_pair.share.to_bytes()),
        }
    }

    pub fn path(dest: &Path, label: &str) -> PathBuf {
        dest.join(format!("keyshare.{}.json", label))
    }

    pub fn save(&self, dest: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dest)?;
        let path = Self::path(dest, &self.label);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn load(dest: &Path, label: &str) -> Result<Self> {
        let path = Self::path(dest, label);
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let key_file: Self = serde_json::from_str(&json)?;
        key_file.params.validate()?;
        Ok(key_file)
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        let bytes = hex::decode(&self.public_key).context("public key is not hex")?;
        Ok(PublicKey::from_bytes(&self.params, &bytes)?)
    }

    pub fn share(&self) -> Result<PrivateKeyShare> {
        let mut bytes = hex::decode(&self.share).context("key share is not hex")?;
        let share = PrivateKeyShare::from_bytes(&self.params, &bytes);
        bytes.zeroize();
        Ok(share?)
    }
}
