//! Human-readable descriptions of an object.

use handlebars::Handlebars;
use kfcreds_common::prelude::*;

/// Render the specified textual description, filling in the supplied values
/// using [Handlebars][].
///
/// [Handlebars]: https://handlebarsjs.com/
pub fn render_description<T: Serialize>(template: &str, params: &T) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    // This is plain text, not HTML.
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .render_template(template, params)
        .context("error rendering description template")
}
