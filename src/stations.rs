use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{self, RailError};
use crate::fetch;

const STATION_NAMES_URL: &str =
    "https://www.12306.cn/index/script/core/common/station_name_v10042.js";

// The directory changes a handful of times a year at most.
const DEFAULT_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub code: String,
    pub pinyin: String,
    pub abbrev: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CachedStations {
    cached_at_secs: u64,
    stations: Vec<Station>,
}

#[derive(Debug, Clone)]
pub struct StationCacheConfig {
    pub path: PathBuf,
    pub ttl: Duration,
}

impl StationCacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for StationCacheConfig {
    fn default() -> Self {
        Self::new("stations_cache.json")
    }
}

#[derive(Debug, Clone)]
pub struct StationCache {
    config: StationCacheConfig,
}

impl StationCache {
    pub fn new(config: StationCacheConfig) -> Self {
        Self { config }
    }

    pub fn load(&self) -> Option<Vec<Station>> {
        let contents = std::fs::read_to_string(&self.config.path).ok()?;
        let cached: CachedStations = serde_json::from_str(&contents).ok()?;

        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .ok()?
            .as_secs();

        let age_secs = now.saturating_sub(cached.cached_at_secs);
        if age_secs >= self.config.ttl.as_secs() {
            return None;
        }

        Some(cached.stations)
    }

    pub fn save(&self, stations: &[Station]) -> Result<(), RailError> {
        let now = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|_| RailError::Cache("system time before unix epoch".to_string()))?
            .as_secs();

        let cached = CachedStations {
            cached_at_secs: now,
            stations: stations.to_vec(),
        };

        if let Some(parent) = self.config.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    RailError::Cache(format!("failed to create cache directory: {e}"))
                })?;
            }
        }

        let json = serde_json::to_string(&cached)
            .map_err(|e| RailError::Cache(format!("failed to serialize cache: {e}")))?;

        std::fs::write(&self.config.path, json)
            .map_err(|e| RailError::Cache(format!("failed to write cache file: {e}")))?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }
}

#[derive(Debug, Clone)]
pub struct StationDirectory {
    stations: Vec<Station>,
    by_name: HashMap<String, usize>,
    by_pinyin: HashMap<String, usize>,
    by_abbrev: HashMap<String, usize>,
    by_code: HashMap<String, usize>,
}

impl StationDirectory {
    pub fn new(stations: Vec<Station>) -> Self {
        let mut by_name = HashMap::new();
        let mut by_pinyin = HashMap::new();
        let mut by_abbrev = HashMap::new();
        let mut by_code = HashMap::new();

        // Short romanizations collide (many stations share e.g. "xa");
        // the first entry in the upstream blob wins, as it does on 12306.
        for (idx, station) in stations.iter().enumerate() {
            by_name.entry(station.name.clone()).or_insert(idx);
            by_pinyin.entry(station.pinyin.clone()).or_insert(idx);
            by_abbrev.entry(station.abbrev.clone()).or_insert(idx);
            by_code.entry(station.code.clone()).or_insert(idx);
        }

        Self {
            stations,
            by_name,
            by_pinyin,
            by_abbrev,
            by_code,
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn resolve(&self, input: &str) -> Option<&Station> {
        if let Some(&idx) = self.by_name.get(input) {
            return Some(&self.stations[idx]);
        }
        let lower = input.to_lowercase();
        if let Some(&idx) = self.by_pinyin.get(&lower) {
            return Some(&self.stations[idx]);
        }
        self.by_abbrev.get(&lower).map(|&idx| &self.stations[idx])
    }

    pub fn name_of(&self, code: &str) -> Option<&str> {
        self.by_code
            .get(code)
            .map(|&idx| self.stations[idx].name.as_str())
    }
}

pub fn parse_station_blob(text: &str) -> Vec<Station> {
    // The blob is a single JS assignment:
    //   var station_names ='@bji|北京|BJP|beijing|bj|2@...';
    let Some((_, rest)) = text.split_once('\'') else {
        return Vec::new();
    };
    let Some((blob, _)) = rest.rsplit_once('\'') else {
        return Vec::new();
    };

    blob.split('@')
        .filter_map(|entry| {
            let parts: Vec<&str> = entry.split('|').collect();
            if parts.len() < 5 {
                return None;
            }
            Some(Station {
                name: parts[1].to_string(),
                code: parts[2].to_string(),
                pinyin: parts[3].to_string(),
                abbrev: parts[4].to_string(),
            })
        })
        .collect()
}

pub async fn load_directory(
    client: &wreq::Client,
    cache: &StationCache,
) -> Result<StationDirectory, RailError> {
    if let Some(stations) = cache.load() {
        debug!(count = stations.len(), "loaded stations from cache");
        return Ok(StationDirectory::new(stations));
    }

    let response = client
        .get(STATION_NAMES_URL)
        .send()
        .await
        .map_err(error::from_http_error)?;
    fetch::check_status(response.status().as_u16())?;
    let text = response.text().await.map_err(error::from_http_error)?;

    let stations = parse_station_blob(&text);
    if stations.is_empty() {
        return Err(RailError::BadPayload(
            "station directory blob contained no entries".to_string(),
        ));
    }
    info!(count = stations.len(), "fetched station directory");

    if let Err(err) = cache.save(&stations) {
        warn!(%err, path = %cache.path().display(), "failed to write station cache");
    }

    Ok(StationDirectory::new(stations))
}
