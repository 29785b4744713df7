//! Page rendering for weatherpane
//!
//! Builds element fragments from a weather report and reveals them in a
//! page one after another.

pub mod dom;
pub mod page;
pub mod render;
pub mod reveal;

pub use dom::{append, append_text, make, populate, set_attrs, text_element, Element, Node, Pipeline};
pub use page::{Page, SharedPage};
pub use render::{forecast_fragments, render_current, render_forecast_day};
pub use reveal::{Renderer, Reveal, RevealHandle, RevealSchedule};
