//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{FileSystem, PortError};

/// Replays recorded filesystem operations from a cassette.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates a new replaying filesystem from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl FileSystem for ReplayingFileSystem {
    fn read_to_string(&self, _path: &Path) -> Result<String, PortError> {
        replay_result(&self.replayer, "fs", "read_to_string")
    }

    fn write(&self, _path: &Path, _contents: &str) -> Result<(), PortError> {
        replay_result(&self.replayer, "fs", "write")
    }

    fn exists(&self, _path: &Path) -> bool {
        next_output(&self.replayer, "fs", "exists")
            .as_bool()
            .expect("fs::exists: expected boolean output")
    }

    fn remove_file(&self, _path: &Path) -> Result<(), PortError> {
        replay_result(&self.replayer, "fs", "remove_file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::recorder::CassetteRecorder;
    use serde_json::json;

    #[test]
    fn replays_each_method_in_order() {
        let mut script = CassetteRecorder::new("unused.yaml", "fs", "abc");
        script.record("fs", "exists", json!({"path": "cfg.yaml"}), json!(false));
        script.record("fs", "write", json!({"path": "cfg.yaml"}), json!({"ok": null}));
        script.record("fs", "read_to_string", json!({"path": "cfg.yaml"}), json!({"ok": "repos: []\n"}));
        script.record("fs", "remove_file", json!({"path": "cfg.yaml"}), json!({"err": "busy"}));

        let fs = ReplayingFileSystem::new(CassetteReplayer::new(&script.into_cassette()));
        let path = Path::new("cfg.yaml");
        assert!(!fs.exists(path));
        fs.write(path, "ignored").unwrap();
        assert_eq!(fs.read_to_string(path).unwrap(), "repos: []\n");
        assert_eq!(fs.remove_file(path).unwrap_err().to_string(), "busy");
    }
}
