pub mod playback;
pub mod track;
