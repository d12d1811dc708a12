//! JSON form of an index
//!
//! Used by the command line tool to build indexes from plain integer arrays
//! and to export decoded indexes.
//!
//! ```json
//! {
//!   "mappings": [{ "mode": "sorted", "entries": [{ "key": [1, 2], "value": [9] }] }],
//!   "listings": [{ "items": [[1, 2], [3]] }]
//! }
//! ```

use crate::config::CodecConfig;
use crate::encode::{IndexBuilder, ListingBuilder, MappingBuilder};
use crate::error::{Error, Result};
use crate::model::{Index, Listing, Mapping, MappingMode};
use crate::sequence::NumericSequence;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDocument {
    #[serde(default)]
    pub mappings: Vec<MappingDocument>,
    #[serde(default)]
    pub listings: Vec<ListingDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingDocument {
    /// Lookup strategy; the configured default applies when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<MappingMode>,
    #[serde(default)]
    pub entries: Vec<EntryDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryDocument {
    pub key: Vec<i32>,
    pub value: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingDocument {
    #[serde(default)]
    pub items: Vec<Vec<i32>>,
}

impl IndexDocument {
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::Serialization(format!("Invalid index document: {}", e)))
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Serialization(format!("Failed to render index document: {}", e)))
    }

    /// Builder holding every mapping and listing of the document
    pub fn to_builder(&self, config: &CodecConfig) -> Result<IndexBuilder> {
        let mut index = IndexBuilder::from_config(config);
        for mapping in &self.mappings {
            let mut builder = MappingBuilder::new(mapping.mode.unwrap_or(config.mapping_mode));
            for entry in &mapping.entries {
                builder.put(
                    &NumericSequence::from(entry.key.as_slice()),
                    &NumericSequence::from(entry.value.as_slice()),
                )?;
            }
            index.put_mapping(builder)?;
        }
        for listing in &self.listings {
            let mut builder = ListingBuilder::new();
            for item in &listing.items {
                builder.put_with(&NumericSequence::from(item.as_slice()), false)?;
            }
            index.put_listing(builder)?;
        }
        Ok(index)
    }

    /// Export any index, positions and entry order included
    pub fn from_index(index: &dyn Index) -> Self {
        let mappings = (0..index.mapping_count())
            .map(|i| MappingDocument::from_mapping(index.mapping(i)))
            .collect();
        let listings = (0..index.listing_count())
            .map(|i| ListingDocument::from_listing(index.listing(i)))
            .collect();
        Self { mappings, listings }
    }
}

impl MappingDocument {
    pub fn from_mapping(mapping: &dyn Mapping) -> Self {
        let entries = (0..mapping.entry_count())
            .map(|i| EntryDocument {
                key: mapping.key(i).to_vec(),
                value: mapping.value(i).to_vec(),
            })
            .collect();
        Self {
            mode: Some(mapping.mode()),
            entries,
        }
    }
}

impl ListingDocument {
    pub fn from_listing(listing: &dyn Listing) -> Self {
        Self {
            items: (0..listing.item_count()).map(|i| listing.item(i).to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::IndexView;
    use crate::encode::Encode;
    use crate::sequence::ByteOrder;

    const SAMPLE: &str = r#"{
        "mappings": [
            { "mode": "sorted", "entries": [
                { "key": [1, 3], "value": [8] },
                { "key": [1, 2], "value": [9] }
            ] },
            { "entries": [ { "key": [7], "value": [] } ] }
        ],
        "listings": [ { "items": [[1, 2], [], [1, 2]] } ]
    }"#;

    #[test]
    fn test_document_to_index() -> Result<()> {
        let document = IndexDocument::from_json(SAMPLE)?;
        let builder = document.to_builder(&CodecConfig::default())?;
        let bytes = builder.encode(ByteOrder::Big)?;
        let view = IndexView::decode(&bytes, ByteOrder::Big)?;

        let sorted = view.mapping(0);
        assert_eq!(sorted.mode(), MappingMode::Sorted);
        let found = sorted.get(&NumericSequence::from([1, 3]));
        assert_eq!(found.map(|v| v.to_vec()), Some(vec![8]));
        assert_eq!(view.mapping(1).mode(), MappingMode::Hashed);

        // listing items keep their positions, duplicates included
        assert_eq!(view.listing(0).item_count(), 3);
        assert!(view.listing(0).item(1).is_empty());
        Ok(())
    }

    #[test]
    fn test_export_sorted_order() -> Result<()> {
        let document = IndexDocument::from_json(SAMPLE)?;
        let bytes = document.to_builder(&CodecConfig::default())?.encode(ByteOrder::Little)?;
        let view = IndexView::decode(&bytes, ByteOrder::Little)?;

        let exported = IndexDocument::from_index(&view);
        let keys: Vec<Vec<i32>> = exported.mappings[0].entries.iter().map(|e| e.key.clone()).collect();
        assert_eq!(keys, vec![vec![1, 2], vec![1, 3]]);
        assert_eq!(exported.listings, document.listings);

        let json = exported.to_json_pretty()?;
        assert_eq!(IndexDocument::from_json(&json)?, exported);
        Ok(())
    }

    #[test]
    fn test_invalid_document() {
        let err = IndexDocument::from_json("{\"listings\": [{\"items\": [[\"x\"]]}]}").unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
