//! Page containers and their markup

pub mod markup;
mod page;
mod style;

pub use page::{PageAssembler, PageClass, PageContainer, MARGIN_PROPERTY};
pub use style::{StyleRegistry, DEFAULT_PAGE_CLASS, DEFAULT_STYLE_ID, DEFAULT_STYLE_RULE};
