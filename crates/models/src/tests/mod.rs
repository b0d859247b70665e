/// Document layout and serde behaviour of the person model
pub mod document_tests;
