use std::collections::BTreeMap;

use serde::Deserialize;

use salesdex_core::{Category, CategoryId, DatasetKind, SalesdexResult};

use super::reference::RawReference;
use super::stream::for_each_record;
use super::{insert_unique, DatasetLoader, LoadedDataset, ReferenceTables};
use crate::source::DatasetReader;

#[derive(Debug, Deserialize)]
struct CategoryRecord {
    id: i64,
    name: String,
    #[serde(default)]
    parent_id: Option<RawReference>,
}

/// Loads `categories`. Depends on nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct CategoryLoader;

impl DatasetLoader for CategoryLoader {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Categories
    }

    fn load(
        &self,
        reader: DatasetReader,
        _tables: &ReferenceTables,
    ) -> SalesdexResult<LoadedDataset> {
        let mut categories = BTreeMap::new();
        // Parents referenced by bare id are named once every category is known.
        let mut parent_ids: Vec<(CategoryId, CategoryId)> = Vec::new();

        for_each_record(reader, self.kind(), |position, record: CategoryRecord| {
            let category_id = CategoryId::new(record.id);
            let parent_name = match &record.parent_id {
                Some(RawReference::Named(_, name)) => Some(name.clone()),
                Some(RawReference::Id(parent)) => {
                    parent_ids.push((category_id, CategoryId::new(*parent)));
                    None
                }
                Some(RawReference::Unset(_)) | None => None,
            };
            let category = Category {
                category_id,
                name: record.name,
                parent_name,
            };
            insert_unique(&mut categories, category_id, category, self.kind(), position)
        })?;

        for (child, parent) in parent_ids {
            let parent_name = categories.get(&parent).map(|p: &Category| p.name.clone());
            if let Some(category) = categories.get_mut(&child) {
                category.parent_name = parent_name;
            }
        }

        Ok(LoadedDataset::Categories(categories))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn load(json: &'static str) -> SalesdexResult<BTreeMap<CategoryId, Category>> {
        match CategoryLoader.load(Box::new(Cursor::new(json)), &ReferenceTables::default())? {
            LoadedDataset::Categories(categories) => Ok(categories),
            other => panic!("unexpected dataset {:?}", other.kind()),
        }
    }

    #[test]
    fn test_loads_categories_with_parent_names() {
        let categories = load(
            r#"[
                {"id": 1, "name": "All", "parent_id": false},
                {"id": 2, "name": "Desks", "parent_id": [1, "All"]},
                {"id": 3, "name": "Chairs", "parent_id": 1},
                {"id": 4, "name": "Lamps"}
            ]"#,
        )
        .unwrap();

        assert_eq!(categories.len(), 4);
        assert_eq!(categories[&CategoryId::new(1)].parent_name, None);
        assert_eq!(categories[&CategoryId::new(2)].parent_name.as_deref(), Some("All"));
        assert_eq!(categories[&CategoryId::new(3)].parent_name.as_deref(), Some("All"));
        assert_eq!(categories[&CategoryId::new(4)].parent_name, None);
    }

    #[test]
    fn test_missing_name_is_malformed() {
        let err = load(r#"[{"id": 1, "name": "All"}, {"id": 2}]"#).unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("record #1"));
    }

    #[test]
    fn test_duplicate_id_is_malformed() {
        let err = load(r#"[{"id": 1, "name": "A"}, {"id": 1, "name": "B"}]"#).unwrap_err();
        assert!(err.to_string().contains("duplicate category id 1"));
    }
}
