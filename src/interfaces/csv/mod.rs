pub mod listing_writer;
pub mod product_reader;
