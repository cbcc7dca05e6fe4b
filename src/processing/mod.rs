mod processor;

pub use processor::LookupProcessor;
