// Shop Price Index response parsing

pub mod quote_parser;

pub use quote_parser::{JsonQuoteParser, Parser};
