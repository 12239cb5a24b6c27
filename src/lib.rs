pub mod config;
pub mod context;
mod loop_clock;
pub mod scene;
pub mod shapes;
pub mod widget;

pub use config::Settings;
pub use context::{Context, ContextError};
pub use loop_clock::LoopClock;
pub use scene::{Scene, Trackball, Viewport, ROTATION_PERIOD};
pub use widget::{Repaint, TetraWidget};
