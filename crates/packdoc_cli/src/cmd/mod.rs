/// JSON to pack conversion command.
pub mod encode;
/// File-level information command.
pub mod info;
/// JSON rendering command.
pub mod print;
