use crate::store;

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub root: PathBuf,
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// The booking document always lives directly under the root.
    pub fn store_path(&self) -> PathBuf {
        self.root.join(store::STORE_FILE)
    }
}
