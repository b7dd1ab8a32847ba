use serde::{Deserialize, Serialize};

/// Single name/value item of a metadata group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaDataItem {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct MetaDataGroup {
    name: String,
    items: Vec<MetaDataItem>,
}

/// Grouped, insertion-ordered metadata describing where a model came from
/// (analyzer name, input file, timestamps, ...)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetaData {
    groups: Vec<MetaDataGroup>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item, replacing the value of an existing item with the same name
    pub fn add_item(&mut self, group: &str, name: &str, value: &str) {
        let index = match self.groups.iter().position(|g| g.name == group) {
            Some(index) => index,
            None => {
                self.groups.push(MetaDataGroup {
                    name: group.to_string(),
                    items: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        let items = &mut self.groups[index].items;
        match items.iter_mut().find(|item| item.name == name) {
            Some(item) => item.value = value.to_string(),
            None => items.push(MetaDataItem {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Group names in insertion order
    pub fn groups(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    /// Items of a group in insertion order; empty for unknown groups
    pub fn items(&self, group: &str) -> &[MetaDataItem] {
        self.groups
            .iter()
            .find(|g| g.name == group)
            .map(|g| g.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, group: &str, name: &str) -> Option<&str> {
        self.items(group)
            .iter()
            .find(|item| item.name == name)
            .map(|item| item.value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
    }
}
