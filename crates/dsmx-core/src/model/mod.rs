pub mod element;
pub mod metadata;
pub mod name;
pub mod relation;

pub use element::Element;
pub use metadata::{MetaData, MetaDataItem};
pub use relation::Relation;
