#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Loads Lane Defence scenarios from JSON or TOML documents.
//!
//! The document carries three tables keyed by name: `enemies`, `towers` and
//! `route`. Route entries are named `wave1`, `wave2`, ... and list bursts
//! followed by a trailing `[wait, reward]` pause. Optional `path` and `rules`
//! tables override the built-in lane and session constants.

mod raw;

use std::{
    fs,
    path::{Path, PathBuf},
};

use lane_defence_core::{ConfigurationError, Scenario};
use log::{debug, warn};

use raw::RawDocument;

/// Errors raised while loading a scenario document.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The document could not be read from disk.
    #[error("failed to read {}", path.display())]
    Io {
        /// Location that was read.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },
    /// The file extension does not name a supported format.
    #[error("unsupported configuration format for {}, expected .json or .toml", .0.display())]
    UnsupportedFormat(PathBuf),
    /// The document is not valid JSON.
    #[error("failed to parse json configuration")]
    Json(#[from] serde_json::Error),
    /// The document is not valid TOML.
    #[error("failed to parse toml configuration")]
    Toml(#[from] toml::de::Error),
    /// A route key is not of the form `wave<N>` with `N >= 1`.
    #[error("route key \"{0}\" is not of the form wave<N>")]
    InvalidWaveKey(String),
    /// A wave's event list has the wrong shape.
    #[error("{wave} is malformed: {reason}")]
    MalformedWave {
        /// Route key of the offending wave.
        wave: String,
        /// What is wrong with the entries.
        reason: &'static str,
    },
    /// A tower's damage type needs a stat the document leaves out.
    #[error("tower \"{tower}\" is missing {stat}")]
    MissingStat {
        /// Template name of the tower.
        tower: String,
        /// Field that must be present.
        stat: &'static str,
    },
    /// The parsed scenario violates a core requirement.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Parses a scenario from a JSON document.
pub fn from_json_str(contents: &str) -> Result<Scenario, ConfigError> {
    let document: RawDocument = serde_json::from_str(contents)?;
    finish(document)
}

/// Parses a scenario from a TOML document.
pub fn from_toml_str(contents: &str) -> Result<Scenario, ConfigError> {
    let document: RawDocument = toml::from_str(contents)?;
    finish(document)
}

/// Reads a scenario from disk, choosing the parser by file extension.
pub fn load(path: &Path) -> Result<Scenario, ConfigError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase);
    let parse: fn(&str) -> Result<Scenario, ConfigError> = match extension.as_deref() {
        Some("json") => from_json_str,
        Some("toml") => from_toml_str,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("loading scenario from {}", path.display());
    parse(&contents)
}

fn finish(document: RawDocument) -> Result<Scenario, ConfigError> {
    let scenario = document.into_scenario()?;
    for name in scenario.catalog.dangling_references(&scenario.schedule) {
        warn!("scenario references unknown enemy template \"{name}\"");
    }
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{DamageType, DeathSpawnCapability, Gold, TargetingMode};

    const MINIMAL_JSON: &str = r##"{
        "enemies": {
            "Normal": { "maxhealth": 10, "speed": 100, "color": "#ff0000" },
            "Mother": {
                "maxhealth": 80, "speed": 40, "size": 35,
                "attributes": {
                    "spawn": { "name": "Normal", "cooldown": 2.0, "quantity": 3, "spawnrate": 0.3 },
                    "death_spawn": { "name": "Normal", "quantity": 4 }
                }
            }
        },
        "towers": {
            "Mortar": {
                "damage": 8, "firerate": 2.5, "range": 300, "cost": 400,
                "mode": "strongest",
                "attributes": { "damage_type": "splash" },
                "blastradius": 60,
                "upgrades": [ { "price": 150, "damage": 12, "range": 0, "name": "Shells", "desc": "Bigger shells" } ]
            }
        },
        "route": {
            "wave1": [ { "name": "Normal", "quantity": 5, "cooldown": 0.8 }, [10, 50] ]
        }
    }"##;

    #[test]
    fn json_document_becomes_scenario() {
        let scenario = from_json_str(MINIMAL_JSON).expect("valid document");

        let mother = scenario.catalog.enemy("Mother").expect("mother present");
        assert_eq!(mother.size, 35.0);
        assert_eq!(
            mother.death_spawn,
            Some(DeathSpawnCapability::Fixed {
                spawns: "Normal".to_owned(),
                quantity: 4,
            })
        );
        assert_eq!(scenario.catalog.enemy("Normal").expect("normal").size, 20.0);

        let mortar = scenario.catalog.tower("Mortar").expect("mortar present");
        assert_eq!(mortar.mode, TargetingMode::Strongest);
        assert_eq!(mortar.damage_type, DamageType::Splash { blast_radius: 60.0 });
        assert_eq!(mortar.upgrades[0].damage, Some(12));
        assert_eq!(mortar.upgrades[0].range, None);

        let wave = scenario.schedule.wave(1).expect("first wave");
        assert_eq!(wave.reward, Gold::new(50));
        assert_eq!(scenario.path.len(), lane_defence_core::default_path().len());
    }

    #[test]
    fn splash_tower_without_radius_is_rejected() {
        let document = r#"{
            "towers": {
                "Mortar": { "damage": 8, "firerate": 2.5, "range": 300, "cost": 400,
                            "attributes": { "damage_type": "splash" } }
            }
        }"#;
        assert!(matches!(
            from_json_str(document),
            Err(ConfigError::MissingStat { stat: "blastradius", .. })
        ));
    }

    #[test]
    fn short_path_is_rejected() {
        let document = r#"{ "path": [[0, 0]] }"#;
        assert!(matches!(
            from_json_str(document),
            Err(ConfigError::Configuration(ConfigurationError::PathTooShort { waypoints: 1 }))
        ));
    }

    #[test]
    fn unknown_extension_is_refused_before_reading() {
        assert!(matches!(
            load(Path::new("scenario.yaml")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
