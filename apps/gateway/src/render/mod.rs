// CV rendering. All output goes through HtmlWriter, which escapes by default.

pub mod cv;
pub mod html;

pub use cv::{render_cv, CvDocument};
pub use html::{escape_html, HtmlWriter};
