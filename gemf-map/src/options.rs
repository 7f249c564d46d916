use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_CAPACITY;

/// Settings applied when a map is opened.
///
/// Can be deserialized from the application settings, missing fields take default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Number of physical pixels per logical pixel of the output device.
    pub device_ratio: f64,
    /// Number of decoded tiles kept in the pixel cache created for the map.
    pub cache_capacity: usize,
    /// Number of tile decoding threads. Zero uses the shared global pool.
    pub decode_threads: usize,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            device_ratio: 1.0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            decode_threads: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_partial() {
        let options: MapOptions = serde_json::from_str(r#"{"device_ratio": 2.0}"#).unwrap();
        assert_eq!(
            options,
            MapOptions {
                device_ratio: 2.0,
                ..Default::default()
            }
        );
    }

    #[test]
    fn serialize_round_trip() {
        let options = MapOptions {
            device_ratio: 1.5,
            cache_capacity: 64,
            decode_threads: 3,
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(serde_json::from_str::<MapOptions>(&json).unwrap(), options);
    }
}
