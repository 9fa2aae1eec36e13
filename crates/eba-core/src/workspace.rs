//! The `ebafiles` working directory: config, templates and run output.

use crate::error::Result;
use crate::io;
use crate::paths;
use crate::template::{self, Template, BLANK_TEMPLATE};
use std::path::Path;

/// What [`init`] had to create.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Init {
    pub created_root: bool,
    pub wrote_blank_template: bool,
}

/// Create `root` and `root/templates`, and write the blank template if it is
/// missing. An existing template is never overwritten.
pub fn init(root: &Path) -> Result<Init> {
    let created_root = !root.is_dir();
    io::ensure_dir(&paths::templates_dir(root))?;
    let wrote_blank_template =
        io::write_if_missing(&paths::blank_template_path(root), BLANK_TEMPLATE.as_bytes())?;
    if created_root {
        tracing::info!(root = %root.display(), "created working directory");
    }
    Ok(Init {
        created_root,
        wrote_blank_template,
    })
}

/// Load every template in `root/templates`. Invalid templates are logged and
/// skipped; the built-in blank template stands in when none are usable.
pub fn templates(root: &Path) -> Result<Vec<Template>> {
    let mut loaded = Vec::new();
    for path in template::list_templates(&paths::templates_dir(root))? {
        match Template::load(&path) {
            Ok(t) => loaded.push(t),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping template"),
        }
    }
    if loaded.is_empty() {
        loaded.push(Template::blank());
    }
    Ok(loaded)
}
