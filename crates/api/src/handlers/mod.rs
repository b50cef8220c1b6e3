pub mod progress;
pub mod track;
