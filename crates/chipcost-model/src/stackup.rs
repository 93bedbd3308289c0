//! Layer stack parsing and resolution.

use std::sync::Arc;

use chipcost_core::Catalog;
use chipcost_process::Layer;

use crate::error::{Error, Result};

/// Parse a stackup string of the form `<count>:<layer>[,<count>:<layer>...]`
/// into `(count, layer_name)` pairs.
pub fn parse_stackup(chip: &str, stackup: &str) -> Result<Vec<(usize, String)>> {
    let invalid = |entry: &str| Error::InvalidStackup {
        chip: chip.to_string(),
        entry: entry.to_string(),
    };

    stackup
        .split(',')
        .map(|entry| {
            let (count, layer) = entry.split_once(':').ok_or_else(|| invalid(entry))?;
            let layer = layer.trim();
            if layer.is_empty() {
                return Err(invalid(entry));
            }
            let count: i64 = count.trim().parse().map_err(|_| invalid(entry))?;
            if count < 0 {
                return Err(Error::NegativeLayerCount {
                    chip: chip.to_string(),
                    layer: layer.to_string(),
                    count,
                });
            }
            Ok((count as usize, layer.to_string()))
        })
        .collect()
}

/// Expand a stackup string into the ordered list of layers it names.
pub fn resolve_stackup(chip: &str, stackup: &str, layers: &Catalog<Layer>) -> Result<Vec<Arc<Layer>>> {
    let mut resolved = Vec::new();
    for (count, name) in parse_stackup(chip, stackup)? {
        let layer = layers.lookup(&name)?;
        resolved.extend(std::iter::repeat_n(layer, count));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chipcost_process::LayerParams;

    fn layers() -> Catalog<Layer> {
        Catalog::from_records(
            "layer",
            [
                Layer::new("m1", LayerParams::default()).unwrap(),
                Layer::new("poly", LayerParams::default()).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse() {
        let parsed = parse_stackup("c", "1:poly, 3:m1").unwrap();
        assert_eq!(parsed, vec![(1, "poly".to_string()), (3, "m1".to_string())]);
    }

    #[test]
    fn test_resolve_expands_counts() {
        let stack = resolve_stackup("c", "1:poly,2:m1,0:poly", &layers()).unwrap();
        let names: Vec<&str> = stack.iter().map(|l| chipcost_core::Named::name(l.as_ref())).collect();
        assert_eq!(names, vec!["poly", "m1", "m1"]);
    }

    #[test]
    fn test_negative_count() {
        let err = parse_stackup("c", "-1:m1").unwrap_err();
        assert!(matches!(err, Error::NegativeLayerCount { count: -1, .. }));
    }

    #[test]
    fn test_malformed_entries() {
        for bad in ["", "m1", "x:m1", "2:", "1:m1,,"] {
            assert!(
                matches!(parse_stackup("c", bad), Err(Error::InvalidStackup { .. })),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_unknown_layer() {
        let err = resolve_stackup("c", "1:metal9", &layers()).unwrap_err();
        assert!(matches!(err, Error::Core(chipcost_core::Error::NotFound { .. })));
    }
}
