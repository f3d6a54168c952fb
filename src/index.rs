use std::any::TypeId;
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::record::{FieldShape, PathRecord, Schema};

/// Where a placeholder lands inside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    /// Field positions from the root, one per level of embedding.
    pub steps: Vec<usize>,
    /// Type of the final field as written in its struct.
    pub type_name: &'static str,
    /// False if the final field or any record on the way is read-only.
    pub settable: bool,
}

impl FieldPath {
    pub fn depth(&self) -> usize {
        self.steps.len()
    }
}

/// Every resolvable name of a record type, keyed by its folded form.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    type_name: &'static str,
    paths: HashMap<String, FieldPath>,
}

impl FieldIndex {
    /// Build the index for `schema`.
    ///
    /// Embedded records are walked breadth-first, so a shallower field
    /// shadows a deeper one with the same name; at equal depth the first
    /// declared wins.
    pub fn build(schema: &'static Schema) -> FieldIndex {
        let mut paths = HashMap::new();
        let mut visited: Vec<*const Schema> = vec![schema as *const Schema];
        let mut queue = VecDeque::from([(schema, Vec::new(), true)]);

        while let Some((current, prefix, settable)) = queue.pop_front() {
            for (position, field) in current.fields.iter().enumerate() {
                let mut steps: Vec<usize> = prefix.clone();
                steps.push(position);
                let field_settable = settable && field.settable;

                if let FieldShape::Embedded(inner) = field.shape {
                    let inner = inner();
                    if !visited.contains(&(inner as *const Schema)) {
                        visited.push(inner as *const Schema);
                        queue.push_back((inner, steps.clone(), field_settable));
                    }
                }

                paths
                    .entry(fold_first(field.lookup_name()).into_owned())
                    .or_insert(FieldPath {
                        steps,
                        type_name: field.type_name,
                        settable: field_settable,
                    });
            }
        }

        FieldIndex {
            type_name: schema.type_name,
            paths,
        }
    }

    /// Resolve a placeholder name. Only its first character is case-folded.
    pub fn resolve(&self, name: &str) -> Option<&FieldPath> {
        if name.is_empty() {
            return None;
        }
        self.paths.get(fold_first(name).as_ref())
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

lazy_static::lazy_static! {
    static ref INDEXES: RwLock<HashMap<TypeId, Arc<FieldIndex>>> = RwLock::new(HashMap::new());
}

/// The cached index for `T`, built on first use.
pub fn index_of<T: PathRecord>() -> Arc<FieldIndex> {
    let id = TypeId::of::<T>();
    if let Some(index) = INDEXES.read().get(&id) {
        return Arc::clone(index);
    }

    let mut indexes = INDEXES.write();
    Arc::clone(indexes.entry(id).or_insert_with(|| {
        let index = FieldIndex::build(T::schema());
        tracing::debug!(
            record = index.type_name(),
            names = index.len(),
            "built field index"
        );
        Arc::new(index)
    }))
}

/// Lower-case the first character, leaving the rest untouched.
pub(crate) fn fold_first(name: &str) -> Cow<'_, str> {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => {
            Cow::Owned(first.to_lowercase().chain(chars).collect())
        }
        _ => Cow::Borrowed(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Field, FieldShape, Schema};

    static INNER: Schema = Schema {
        type_name: "Inner",
        fields: &[
            Field {
                ident: "label",
                alias: None,
                type_name: "String",
                settable: true,
                shape: FieldShape::Value,
            },
            Field {
                ident: "owner",
                alias: None,
                type_name: "String",
                settable: true,
                shape: FieldShape::Value,
            },
        ],
    };

    fn inner() -> &'static Schema {
        &INNER
    }

    static OUTER: Schema = Schema {
        type_name: "Outer",
        fields: &[
            Field {
                ident: "owner",
                alias: None,
                type_name: "i32",
                settable: true,
                shape: FieldShape::Value,
            },
            Field {
                ident: "str_number",
                alias: Some("strNumber"),
                type_name: "String",
                settable: true,
                shape: FieldShape::Value,
            },
            Field {
                ident: "inner",
                alias: None,
                type_name: "Inner",
                settable: false,
                shape: FieldShape::Embedded(inner),
            },
        ],
    };

    #[test]
    fn test_fold_first() {
        assert_eq!(fold_first("Owner"), "owner");
        assert_eq!(fold_first("owner"), "owner");
        assert_eq!(fold_first("StrNumber"), "strNumber");
        assert_eq!(fold_first("ÉTAT"), "éTAT");
        assert_eq!(fold_first(""), "");
    }

    #[test]
    fn test_shallow_field_shadows_embedded() {
        let index = FieldIndex::build(&OUTER);
        let owner = index.resolve("owner").unwrap();
        assert_eq!(owner.steps, vec![0]);
        assert_eq!(owner.type_name, "i32");
    }

    #[test]
    fn test_promoted_field_inherits_readonly() {
        let index = FieldIndex::build(&OUTER);
        let label = index.resolve("Label").unwrap();
        assert_eq!(label.steps, vec![2, 0]);
        assert_eq!(label.depth(), 2);
        assert!(!label.settable);
    }

    #[test]
    fn test_alias_replaces_identifier() {
        let index = FieldIndex::build(&OUTER);
        assert!(index.resolve("strNumber").is_some());
        assert!(index.resolve("StrNumber").is_some());
        assert!(index.resolve("str_number").is_none());
        // Only the first letter folds.
        assert!(index.resolve("strnumber").is_none());
    }

    #[test]
    fn test_empty_name_never_resolves() {
        let index = FieldIndex::build(&OUTER);
        assert!(index.resolve("").is_none());
        assert_eq!(index.len(), 4);
    }
}
