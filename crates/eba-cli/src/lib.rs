pub mod cmd;
pub mod output;
pub mod prompt;
