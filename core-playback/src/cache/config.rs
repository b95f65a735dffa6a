//! Cache configuration

/// Configuration for the offline content cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory for cached recordings, relative to the platform cache dir
    pub cache_directory: String,

    /// File name of the persisted index inside `cache_directory`
    pub index_file_name: String,

    /// Extension used when a URL path carries no usable one
    pub default_extension: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_directory: "recitations".to_string(),
            index_file_name: "cache_index.json".to_string(),
            default_extension: "mp3".to_string(),
        }
    }
}

impl CacheConfig {
    /// Create a new cache configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache directory name.
    pub fn with_cache_directory(mut self, dir: impl Into<String>) -> Self {
        self.cache_directory = dir.into();
        self
    }

    /// Set index file name.
    pub fn with_index_file_name(mut self, name: impl Into<String>) -> Self {
        self.index_file_name = name.into();
        self
    }

    /// Set fallback file extension.
    pub fn with_default_extension(mut self, ext: impl Into<String>) -> Self {
        self.default_extension = ext.into();
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.cache_directory.is_empty() {
            return Err("cache_directory cannot be empty".to_string());
        }

        if self.index_file_name.is_empty() || self.index_file_name.contains(['/', '\\']) {
            return Err("index_file_name must be a plain file name".to_string());
        }

        if !super::index::is_valid_extension(&self.default_extension) {
            return Err("default_extension must be 1-5 ASCII alphanumerics".to_string());
        }

        Ok(())
    }
}
