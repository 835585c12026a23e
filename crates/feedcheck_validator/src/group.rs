//! Grouping of column metadata by target table.

use feedcheck_core::FeedMetadata;
use std::collections::HashMap;

/// Column metadata sharing one (store, table).
///
/// The lead is the first record seen for the table; table-level values such
/// as feed name and request mode are read from it.
#[derive(Debug, Clone)]
pub struct TableGroup<'a> {
    pub lead: &'a FeedMetadata,
    pub columns: Vec<&'a FeedMetadata>,
}

impl<'a> TableGroup<'a> {
    pub fn db_name(&self) -> &'a str {
        &self.lead.db_name
    }

    pub fn table_name(&self) -> &'a str {
        &self.lead.table_name
    }

    /// `"<store>.<table>"`
    pub fn key(&self) -> String {
        self.lead.table_key()
    }
}

/// Groups records by (store, table), in order of first appearance.
pub fn group_by_table<'a>(metadata: &[&'a FeedMetadata]) -> Vec<TableGroup<'a>> {
    let mut groups: Vec<TableGroup<'a>> = Vec::new();
    let mut index: HashMap<(&'a str, &'a str), usize> = HashMap::new();

    for &meta in metadata {
        let key = (meta.db_name.as_str(), meta.table_name.as_str());
        match index.get(&key) {
            Some(&position) => groups[position].columns.push(meta),
            None => {
                index.insert(key, groups.len());
                groups.push(TableGroup {
                    lead: meta,
                    columns: vec![meta],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedcheck_core::FeedMetadataBuilder;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_groups_preserve_first_appearance() {
        let metadata = vec![
            FeedMetadataBuilder::new("M", "b.csv", "db", "beta", "id").build(),
            FeedMetadataBuilder::new("M", "a.csv", "db", "alpha", "id").build(),
            FeedMetadataBuilder::new("M", "b2.csv", "db", "beta", "name").build(),
            FeedMetadataBuilder::new("M", "a.csv", "other", "alpha", "id").build(),
        ];
        let refs: Vec<&FeedMetadata> = metadata.iter().collect();

        let groups = group_by_table(&refs);
        let keys: Vec<String> = groups.iter().map(TableGroup::key).collect();

        assert_eq!(keys, vec!["db.beta", "db.alpha", "other.alpha"]);
        assert_eq!(groups[0].columns.len(), 2);
        assert_eq!(groups[0].lead.feed, "b.csv");
        assert_eq!(groups[0].columns[1].column_name, "name");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_by_table(&[]).is_empty());
    }
}
