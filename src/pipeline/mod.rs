pub mod classify;
pub mod filter;
pub mod parse;
pub mod playback;
pub mod process;
pub mod search;
