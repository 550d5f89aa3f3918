pub mod browser;
pub mod date_format;
pub mod error;
pub mod fields;
pub mod http;
pub mod pagination;
pub mod parser;
pub mod pipeline;
pub mod profile;
pub mod text;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use browser::ChromeFetcher;
pub use error::{ConfigurationError, NoItemsFoundError, ParseError, RequiredFieldError};
pub use http::HttpFetcher;
pub use parser::{parse, parse_from_url};
pub use profile::{FieldName, SiteProfile, SiteRegistry};
pub use traits::{ListingSink, PageFetcher};
