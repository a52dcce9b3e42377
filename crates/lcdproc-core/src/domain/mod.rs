//! Domain module containing the screen/widget identifier model.

pub mod ids;

pub use ids::{ScreenId, WidgetId};
