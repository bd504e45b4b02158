mod collection;
mod context;
mod query;
mod records;

pub use collection::{names, CollectionName, RecordId};
pub use context::{Locale, StaticTranslator, Theme, Translator, ViewContext};
pub use query::{Filter, FilterOp, OrderBy, QuerySpec, SortDirection};
pub use records::{ActivityEntry, Appeal, FaqItem, ResidentNotification, Resource};
