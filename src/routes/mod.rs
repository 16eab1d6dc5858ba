pub mod health;
pub mod playback;
pub mod tracks;
pub mod upload;
