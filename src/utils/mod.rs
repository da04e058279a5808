pub mod file_size;
pub mod token_parser;
