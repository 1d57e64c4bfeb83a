//! Structural and token diffs between desired and observed content

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;
use similar::{Algorithm, ChangeTag, TextDiff};

/// Maximum recursion depth for diff operations
const MAX_DIFF_DEPTH: usize = 128;

/// Which side of the comparison a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSide {
    Desired,
    Observed,
}

impl fmt::Display for DiffSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Desired => f.write_str("desired"),
            Self::Observed => f.write_str("observed"),
        }
    }
}

/// One step into a structured value
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    /// Mapping key
    Key(String),
    /// List element, addressed by its own value rather than its index
    Element(Value),
}

/// Location of a difference inside an object
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiffPath(Vec<PathSegment>);

impl DiffPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn element(&self, value: &Value) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Element(value.clone()));
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for DiffPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Element(value) => write!(f, "[{}]", display_value(value))?,
            }
        }
        Ok(())
    }
}

impl Serialize for DiffPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What kind of inconsistency a record describes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffKind {
    /// Key or list element present only on the record's side
    Extra { value: Value },
    /// Both sides hold unequal scalars
    ValueMismatch { desired: Value, observed: Value },
    /// Both sides hold different structural types
    TypeMismatch { desired: String, observed: String },
    /// Raw token present only on the record's side
    Token { token: String },
}

/// One reported inconsistency within an object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffRecord {
    pub side: DiffSide,
    pub path: DiffPath,
    #[serde(flatten)]
    pub kind: DiffKind,
}

impl fmt::Display for DiffRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DiffKind::Extra { value } => {
                if self.path.is_root() {
                    write!(f, "only in {}: {}", self.side, display_value(value))
                } else {
                    write!(f, "only in {}: {}", self.side, self.path)
                }
            }
            DiffKind::ValueMismatch { desired, observed } => write!(
                f,
                "{}: desired {} != observed {}",
                self.path,
                display_value(desired),
                display_value(observed)
            ),
            DiffKind::TypeMismatch { desired, observed } => write!(
                f,
                "{}: desired type {} != observed type {}",
                self.path, desired, observed
            ),
            DiffKind::Token { token } => write!(f, "{}: {}", self.side, token),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

/// Compute the structural diff between a desired and an observed value.
///
/// Mappings compare key presence and recurse into shared keys; keys in
/// `ignore_keys` are skipped entirely. Sequences compare membership:
/// each desired element consumes the first equal unconsumed observed
/// element, so reordering alone yields no records.
pub fn diff(
    desired: &Value,
    observed: &Value,
    path: &DiffPath,
    ignore_keys: &BTreeSet<String>,
) -> Vec<DiffRecord> {
    let mut records = Vec::new();
    diff_with_depth(desired, observed, path, ignore_keys, &mut records, 0);
    records
}

fn diff_with_depth(
    desired: &Value,
    observed: &Value,
    path: &DiffPath,
    ignore_keys: &BTreeSet<String>,
    records: &mut Vec<DiffRecord>,
    depth: usize,
) {
    if desired == observed {
        return;
    }

    // Depth limit: collapse the remaining subtree into one mismatch
    if depth > MAX_DIFF_DEPTH {
        records.push(DiffRecord {
            side: DiffSide::Desired,
            path: path.clone(),
            kind: DiffKind::ValueMismatch {
                desired: desired.clone(),
                observed: observed.clone(),
            },
        });
        return;
    }

    match (desired, observed) {
        (Value::Object(desired_map), Value::Object(observed_map)) => {
            for (key, value) in observed_map {
                if !desired_map.contains_key(key) && !ignore_keys.contains(key) {
                    records.push(DiffRecord {
                        side: DiffSide::Observed,
                        path: path.key(key),
                        kind: DiffKind::Extra { value: value.clone() },
                    });
                }
            }
            for (key, value) in desired_map {
                if !observed_map.contains_key(key) && !ignore_keys.contains(key) {
                    records.push(DiffRecord {
                        side: DiffSide::Desired,
                        path: path.key(key),
                        kind: DiffKind::Extra { value: value.clone() },
                    });
                }
            }
            for (key, desired_value) in desired_map {
                if ignore_keys.contains(key) {
                    continue;
                }
                if let Some(observed_value) = observed_map.get(key) {
                    diff_with_depth(
                        desired_value,
                        observed_value,
                        &path.key(key),
                        ignore_keys,
                        records,
                        depth + 1,
                    );
                }
            }
        }

        (Value::Array(desired_items), Value::Array(observed_items)) => {
            let mut consumed = vec![false; observed_items.len()];
            let mut unmatched_desired = Vec::new();

            for desired_item in desired_items {
                let hit = observed_items
                    .iter()
                    .enumerate()
                    .position(|(i, item)| !consumed[i] && item == desired_item);
                // Matched pairs are equal by construction, nothing to recurse into
                match hit {
                    Some(i) => consumed[i] = true,
                    None => unmatched_desired.push(desired_item),
                }
            }

            for (i, item) in observed_items.iter().enumerate() {
                if !consumed[i] {
                    records.push(DiffRecord {
                        side: DiffSide::Observed,
                        path: path.element(item),
                        kind: DiffKind::Extra { value: item.clone() },
                    });
                }
            }
            for item in unmatched_desired {
                records.push(DiffRecord {
                    side: DiffSide::Desired,
                    path: path.element(item),
                    kind: DiffKind::Extra { value: item.clone() },
                });
            }
        }

        _ if std::mem::discriminant(desired) != std::mem::discriminant(observed) => {
            records.push(DiffRecord {
                side: DiffSide::Desired,
                path: path.clone(),
                kind: DiffKind::TypeMismatch {
                    desired: type_name(desired).to_string(),
                    observed: type_name(observed).to_string(),
                },
            });
        }

        _ => {
            records.push(DiffRecord {
                side: DiffSide::Desired,
                path: path.clone(),
                kind: DiffKind::ValueMismatch {
                    desired: desired.clone(),
                    observed: observed.clone(),
                },
            });
        }
    }
}

/// Diff two token streams with an LCS alignment.
///
/// Each removed token is reported on the desired side and each inserted
/// token on the observed side, in alignment order.
pub fn diff_tokens(desired: &[String], observed: &[String]) -> Vec<DiffRecord> {
    if desired == observed {
        return Vec::new();
    }

    let desired_refs: Vec<&str> = desired.iter().map(String::as_str).collect();
    let observed_refs: Vec<&str> = observed.iter().map(String::as_str).collect();
    let text_diff = TextDiff::configure()
        .algorithm(Algorithm::Lcs)
        .diff_slices(&desired_refs, &observed_refs);

    text_diff
        .iter_all_changes()
        .filter_map(|change| {
            let side = match change.tag() {
                ChangeTag::Delete => DiffSide::Desired,
                ChangeTag::Insert => DiffSide::Observed,
                ChangeTag::Equal => return None,
            };
            Some(DiffRecord {
                side,
                path: DiffPath::root(),
                kind: DiffKind::Token {
                    token: change.value().to_string(),
                },
            })
        })
        .collect()
}
