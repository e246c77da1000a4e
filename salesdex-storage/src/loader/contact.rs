use serde::Deserialize;
use tracing::warn;

use salesdex_core::{Contact, ContactId, Country, DatasetKind, SalesdexResult};

use super::reference::RawReference;
use super::stream::for_each_record;
use super::{insert_unique, ContactTable, DatasetLoader, LoadedDataset, ReferenceTables};
use crate::source::DatasetReader;

#[derive(Debug, Deserialize)]
struct ContactRecord {
    id: i64,
    name: String,
    #[serde(default)]
    country_id: Option<RawReference>,
}

/// Loads `contacts`. Contacts without a named country go to the unknown bucket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactLoader;

impl DatasetLoader for ContactLoader {
    fn kind(&self) -> DatasetKind {
        DatasetKind::Contacts
    }

    fn load(&self, reader: DatasetReader, _tables: &ReferenceTables) -> SalesdexResult<LoadedDataset> {
        let mut table = ContactTable::default();

        for_each_record(reader, self.kind(), |position, record: ContactRecord| {
            let country = match record.country_id {
                Some(RawReference::Named(code, name)) => {
                    let known = *table.country_codes.entry(name.clone()).or_insert(code);
                    if known != code {
                        warn!(
                            country = %name,
                            kept_code = known,
                            ignored_code = code,
                            contact_id = record.id,
                            "Conflicting country codes for one country name"
                        );
                    }
                    Country::new(name, code)
                }
                _ => Country::unknown(),
            };
            let contact_id = ContactId::new(record.id);
            let contact = Contact {
                contact_id,
                name: record.name,
                country,
            };
            insert_unique(&mut table.contacts, contact_id, contact, self.kind(), position)
        })?;

        Ok(LoadedDataset::Contacts(table))
    }
}
