pub mod cancel;
pub mod compression;
pub mod debcontrol;
pub mod mirror;
