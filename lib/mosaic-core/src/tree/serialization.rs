use crate::tree::{format_path, MosaicBranch, MosaicNode, MosaicPath, MosaicTree};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to access layout file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported layout file extension: '{0}'")]
    UnsupportedFormat(String),

    #[error("Split at {} has percentage {value}, expected a value in [0, 100]", format_path(.path))]
    InvalidSplitPercentage { path: MosaicPath, value: f64 },
}

pub type SerializationResult<T> = Result<T, SerializationError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutFormat {
    Yaml,
    Json,
}

impl LayoutFormat {
    /// Picks the format from a file's extension.
    pub fn from_path(path: &Path) -> SerializationResult<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Ok(LayoutFormat::Yaml),
            "json" => Ok(LayoutFormat::Json),
            other => Err(SerializationError::UnsupportedFormat(other.to_owned())),
        }
    }
}

// An empty tree is written as `null` in both formats

pub fn to_yaml<T: Serialize>(tree: &MosaicTree<T>) -> SerializationResult<String> {
    Ok(serde_yaml::to_string(tree)?)
}

pub fn from_yaml<T: DeserializeOwned>(contents: &str) -> SerializationResult<MosaicTree<T>> {
    validated(serde_yaml::from_str::<Option<MosaicNode<T>>>(contents)?)
}

pub fn to_json<T: Serialize>(tree: &MosaicTree<T>) -> SerializationResult<String> {
    Ok(serde_json::to_string_pretty(tree)?)
}

pub fn from_json<T: DeserializeOwned>(contents: &str) -> SerializationResult<MosaicTree<T>> {
    validated(serde_json::from_str::<Option<MosaicNode<T>>>(contents)?)
}

fn validated<T>(root: Option<MosaicNode<T>>) -> SerializationResult<MosaicTree<T>> {
    if let Some(root) = &root {
        check_split_percentages(root, &mut Vec::new())?;
    }
    Ok(root.map(Arc::new))
}

fn check_split_percentages<T>(node: &MosaicNode<T>, path: &mut MosaicPath) -> SerializationResult<()> {
    let MosaicNode::Parent(parent) = node else {
        return Ok(());
    };
    // NaN fails the range check too
    if !(0.0..=100.0).contains(&parent.split_percentage) {
        return Err(SerializationError::InvalidSplitPercentage {
            path: path.clone(),
            value: parent.split_percentage,
        });
    }

    for branch in [MosaicBranch::First, MosaicBranch::Second] {
        path.push(branch);
        check_split_percentages(parent.child(branch), path)?;
        path.pop();
    }
    Ok(())
}

pub fn load_layout<T: DeserializeOwned>(path: &Path) -> SerializationResult<MosaicTree<T>> {
    let format = LayoutFormat::from_path(path)?;
    let contents = fs::read_to_string(path).map_err(|source| SerializationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match format {
        LayoutFormat::Yaml => from_yaml(&contents),
        LayoutFormat::Json => from_json(&contents),
    }
}

pub fn save_layout<T: Serialize>(path: &Path, tree: &MosaicTree<T>) -> SerializationResult<()> {
    let contents = match LayoutFormat::from_path(path)? {
        LayoutFormat::Yaml => to_yaml(tree)?,
        LayoutFormat::Json => to_json(tree)?,
    };

    fs::write(path, contents).map_err(|source| SerializationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::tests::{assert_leaf, assert_parent, scenario_tree};
    use crate::tree::{get_leaves, MosaicDirection, DEFAULT_SPLIT_PERCENTAGE};

    #[test]
    fn test_json_shape() {
        let tree = Some(scenario_tree());
        let json: serde_json::Value = serde_json::from_str(&to_json(&tree).unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "direction": "row",
                "first": 1,
                "second": {
                    "direction": "column",
                    "first": 2,
                    "second": 3,
                    "splitPercentage": 50.0
                },
                "splitPercentage": 40.0
            })
        );
    }

    #[test]
    fn test_yaml_round_trip_scenario() {
        let tree = Some(scenario_tree());
        let yaml = to_yaml(&tree).unwrap();
        let parsed: MosaicTree<u32> = from_yaml(&yaml).unwrap();
        assert_eq!(parsed, tree);
    }

    #[test]
    fn test_missing_split_percentage_defaults() {
        let yaml = "direction: column\nfirst: 7\nsecond: 8\n";
        let tree: MosaicTree<u32> = from_yaml(yaml).unwrap();
        let root = assert_parent(tree.as_ref().unwrap());
        assert_eq!(root.direction, MosaicDirection::Column);
        assert_eq!(root.split_percentage, DEFAULT_SPLIT_PERCENTAGE);
        assert_leaf(&root.first, 7);
    }

    #[test]
    fn test_string_leaves() {
        let json = r#"{"direction": "row", "first": "editor", "second": "terminal"}"#;
        let tree: MosaicTree<String> = from_json(json).unwrap();
        assert_eq!(
            get_leaves(tree.as_deref()),
            vec!["editor".to_owned(), "terminal".to_owned()]
        );
    }

    #[test]
    fn test_empty_tree() {
        let yaml = to_yaml::<u32>(&None).unwrap();
        assert_eq!(from_yaml::<u32>(&yaml).unwrap(), None);
        assert_eq!(from_json::<u32>("null").unwrap(), None);
    }

    #[test]
    fn test_invalid_direction_fails() {
        assert!(from_json::<u32>(r#"{"direction": "diagonal", "first": 1, "second": 2}"#).is_err());
    }

    #[test]
    fn test_split_percentage_out_of_range_fails() {
        for value in ["150", "-1"] {
            let json = format!(r#"{{"direction": "row", "first": 1, "second": 2, "splitPercentage": {value}}}"#);
            assert!(matches!(
                from_json::<u32>(&json),
                Err(SerializationError::InvalidSplitPercentage { path, .. }) if path.is_empty()
            ));
        }

        let yaml = "direction: row\nfirst: 1\nsecond:\n  direction: column\n  first: 2\n  second: 3\n  splitPercentage: .nan\n";
        match from_yaml::<u32>(yaml) {
            Err(SerializationError::InvalidSplitPercentage { path, value }) => {
                assert_eq!(path, vec![MosaicBranch::Second]);
                assert!(value.is_nan());
            }
            other => panic!("Expected an invalid split percentage, got {:?}", other),
        }

        let edges = r#"{"direction": "row", "first": 1, "second": {"direction": "row", "first": 2, "second": 3, "splitPercentage": 100}, "splitPercentage": 0}"#;
        assert!(from_json::<u32>(edges).is_ok());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(LayoutFormat::from_path(Path::new("a/layout.yml")).unwrap(), LayoutFormat::Yaml);
        assert_eq!(LayoutFormat::from_path(Path::new("layout.JSON")).unwrap(), LayoutFormat::Json);
        assert!(matches!(
            LayoutFormat::from_path(Path::new("layout.toml")),
            Err(SerializationError::UnsupportedFormat(ext)) if ext == "toml"
        ));
    }

    #[test]
    fn test_save_and_load_layout() {
        let dir = std::env::temp_dir().join(format!("mosaic-layout-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        for name in ["layout.yaml", "layout.json"] {
            let path = dir.join(name);
            let tree = Some(scenario_tree());
            save_layout(&path, &tree).unwrap();
            let loaded: MosaicTree<u32> = load_layout(&path).unwrap();
            assert_eq!(loaded, tree);
        }

        assert!(matches!(
            load_layout::<u32>(&dir.join("missing.yaml")),
            Err(SerializationError::Io { .. })
        ));

        fs::remove_dir_all(&dir).unwrap();
    }
}
