use serde_json::Value;

const COLUMN_PATH_SEPARATOR: &str = "___";

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnNode {
    Leaf {
        id: String,
        label: String,
        path: Vec<String>,
    },
    Nested {
        id: String,
        label: String,
        path: Vec<String>,
        children: Vec<ColumnNode>,
    },
}

impl ColumnNode {
    pub fn id(&self) -> &str {
        match self {
            ColumnNode::Leaf { id, .. } | ColumnNode::Nested { id, .. } => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ColumnNode::Leaf { label, .. } | ColumnNode::Nested { label, .. } => label,
        }
    }
}

/// Builds a column tree from one sample data object: object-valued fields
/// become nested header groups, everything else a leaf. Column ids are the
/// full key path joined so they stay unique across groups.
pub fn build_columns_from_sample(sample: &Value, parents: &[String]) -> Vec<ColumnNode> {
    let Some(fields) = sample.as_object() else {
        return Vec::new();
    };

    fields
        .iter()
        .map(|(field_name, value)| {
            let mut path = parents.to_vec();
            path.push(field_name.clone());
            let id = path.join(COLUMN_PATH_SEPARATOR);
            if value.is_object() {
                ColumnNode::Nested {
                    id,
                    label: field_name.clone(),
                    children: build_columns_from_sample(value, &path),
                    path,
                }
            } else {
                ColumnNode::Leaf {
                    id,
                    label: field_name.clone(),
                    path,
                }
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchingEntries {
    pub skipped_keys: Vec<String>,
    pub entries: Vec<(String, Value)>,
}

/// Collapses single-key object chains so a deeply wrapped structure starts
/// rendering at its first real branch point. The skipped keys are kept for
/// header display.
pub fn branching_entries(input: &Value) -> BranchingEntries {
    let mut skipped_keys = Vec::new();
    let mut current = input;

    loop {
        let Some(fields) = current.as_object() else {
            return BranchingEntries {
                skipped_keys,
                entries: Vec::new(),
            };
        };

        if fields.len() == 1 {
            let (key, value) = match fields.iter().next() {
                Some(entry) => entry,
                None => break,
            };
            if value.is_object() {
                skipped_keys.push(key.clone());
                current = value;
                continue;
            }
        }

        return BranchingEntries {
            skipped_keys,
            entries: fields
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        };
    }

    BranchingEntries {
        skipped_keys,
        entries: Vec::new(),
    }
}

pub fn value_at_path<'a>(row: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut current = row;
    for key in path {
        current = current.get(key)?;
    }
    Some(current)
}
