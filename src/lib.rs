//! webcam-studio library crate.
//!
//! A live webcam viewer: frames flow from a camera stream through a render
//! loop onto a canvas (zoom + filter), and the canvas can be exported as a
//! watermarked PNG.

pub mod camera;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod controller;
pub mod event_loop;
pub mod exporter;
pub mod input;
pub mod preview;
pub mod render_loop;
pub mod studio;
pub mod sync;
pub mod terminal;
pub mod video;
pub mod view;
