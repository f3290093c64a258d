use eframe::egui::{self, Vec2};

pub const APP_TITLE: &str = "Lightweight CNN based AI Farm Assistant";
pub const SUBTITLE: &str =
    "Upload an image of your crop to detect diseases and get treatment recommendations";
pub const GREETING: &str = "Hello! I'm your AI farm assistant. Take a photo of your crop leaf, or ask me about diseases.";
pub const PLACEHOLDER: &str = "Upload an image to analyze...";
pub const INSTRUCTIONS: &str =
    "Click the camera button or drag and drop an image to get started";
pub const DROP_HINT: &str = "Drop your image here";
pub const NO_PREVIEW: &str = "No preview";

pub fn fit_within(image_size: Vec2, available: Vec2) -> (Vec2, f32) {
    let safe_size = egui::vec2(image_size.x.max(1.0), image_size.y.max(1.0));
    let scale = (available.x / safe_size.x)
        .min(available.y / safe_size.y)
        .min(1.0)
        .max(0.01);
    (safe_size * scale, scale)
}

pub struct KeyboardState {
    pub open: bool,
    pub send: bool,
    pub clear: bool,
}
