use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use super::device_profile::{DeviceProfile, ProfileConfig};

/// Manages persistence of device profiles to disk
pub struct ProfileStore {
    storage_dir: PathBuf,
}

impl ProfileStore {
    /// Create new storage manager
    ///
    /// Creates the storage directory if it doesn't exist
    pub fn new(storage_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&storage_dir)
            .context("Failed to create profile storage directory")?;

        Ok(Self { storage_dir })
    }

    /// Save a profile under `id`
    pub fn save(&self, id: &str, config: &ProfileConfig) -> Result<()> {
        save_profile(&self.profile_path(id), config)
    }

    /// Load and validate the profile stored under `id`
    pub fn load(&self, id: &str) -> Result<(ProfileConfig, DeviceProfile)> {
        load_profile(&self.profile_path(id))
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let path = self.profile_path(id);
        if path.exists() {
            fs::remove_file(&path)
                .context(format!("Failed to delete profile at {:?}", path))?;
        }
        Ok(())
    }

    /// Ids of every stored profile that parses; unreadable files are skipped
    pub fn list_all(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();

        for entry in fs::read_dir(&self.storage_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let parses = fs::read_to_string(&path)
                .ok()
                .and_then(|json| serde_json::from_str::<ProfileConfig>(&json).ok())
                .is_some();
            if let (true, Some(stem)) = (parses, path.file_stem().and_then(|s| s.to_str())) {
                ids.push(stem.to_string());
            }
        }

        ids.sort();
        Ok(ids)
    }

    fn profile_path(&self, id: &str) -> PathBuf {
        self.storage_dir.join(format!("{}.json", id))
    }
}

/// Read a JSON profile and validate it into a `DeviceProfile`
pub fn load_profile(path: &Path) -> Result<(ProfileConfig, DeviceProfile)> {
    let json = fs::read_to_string(path)
        .context(format!("Failed to read profile from {:?}", path))?;

    let config: ProfileConfig = serde_json::from_str(&json)
        .context(format!("Failed to parse profile {:?}", path))?;

    let profile = DeviceProfile::from_config(&config)
        .context(format!("Invalid profile {:?}", path))?;

    Ok((config, profile))
}

pub fn save_profile(path: &Path, config: &ProfileConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .context("Failed to serialize profile")?;

    fs::write(path, json)
        .context(format!("Failed to write profile to {:?}", path))?;

    Ok(())
}

/// Profile for a typical 8-channel 10-20 montage, written by `--create-config`
pub fn example_config() -> ProfileConfig {
    let names = ["F3", "F4", "C3", "C4", "P3", "P4", "O1", "O2"];
    ProfileConfig {
        name: "MyCustomIC".to_string(),
        channel_names: names.iter().map(|n| n.to_string()).collect(),
        channel_types: vec!["EEG".to_string(); names.len()],
        header_bytes: "AA 55".to_string(),
        ..ProfileConfig::default()
    }
}

pub fn write_example_config(path: &Path) -> Result<()> {
    save_profile(path, &example_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_profile() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().to_path_buf()).unwrap();

        let config = ProfileConfig {
            name: "Test Device".to_string(),
            num_channels: 2,
            has_checksum: true,
            ..ProfileConfig::default()
        };

        store.save("test-1", &config).unwrap();
        let (loaded, profile) = store.load("test-1").unwrap();
        assert_eq!(loaded, config);
        assert_eq!(profile.packet_length(), 2 + 2 * 2 + 1);
    }

    #[test]
    fn test_list_all_profiles() {
        let dir = tempdir().unwrap();
        let store = ProfileStore::new(dir.path().to_path_buf()).unwrap();

        for i in 0..3 {
            let config = ProfileConfig {
                name: format!("Device {}", i),
                ..ProfileConfig::default()
            };
            store.save(&format!("device-{}", i), &config).unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();
        fs::write(dir.path().join("broken.json"), "{").unwrap();

        assert_eq!(store.list_all().unwrap(), vec!["device-0", "device-1", "device-2"]);

        store.delete("device-1").unwrap();
        assert_eq!(store.list_all().unwrap().len(), 2);
    }

    #[test]
    fn test_invalid_profile_is_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"data_format": "int12"}"#).unwrap();

        let err = load_profile(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("int12"));
    }

    #[test]
    fn test_example_config_is_valid() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("example.json");
        write_example_config(&path).unwrap();

        let (config, profile) = load_profile(&path).unwrap();
        assert_eq!(config.channel_names[6], "O1");
        assert_eq!(profile.header(), &[0xAA, 0x55]);
    }
}
