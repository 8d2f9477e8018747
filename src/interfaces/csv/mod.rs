pub mod account_writer;
pub mod call_reader;
