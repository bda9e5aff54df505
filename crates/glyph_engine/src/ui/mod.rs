//! Simple interactive widgets drawn with OpenGL

pub mod widget;

pub use widget::{MouseTransition, Widget, WidgetState};
