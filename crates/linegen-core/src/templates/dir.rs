//! Template directory resolution

use std::io;
use std::path::{Path, PathBuf};

use super::TemplateKind;

/// Environment variable pointing at a directory that contains `templates/`
/// or the template directories themselves.
pub const TEMPLATE_DIR_ENV: &str = "LINEGEN_TEMPLATE_DIR";

/// A resolved template directory (`<root>/<kind>`)
#[derive(Debug, Clone)]
pub struct TemplateDir {
    /// Directory containing one sub-directory per template kind
    root_dir: PathBuf,
    /// `root_dir/<kind>`
    template_path: PathBuf,
    kind: TemplateKind,
}

impl TemplateDir {
    pub fn new(root_dir: PathBuf, template_path: PathBuf, kind: TemplateKind) -> Self {
        Self {
            root_dir,
            template_path,
            kind,
        }
    }

    /// Returns a displayable version of the template path
    pub fn display(&self) -> std::path::Display<'_> {
        self.template_path.display()
    }

    /// Resolve the template directory for `kind`.
    ///
    /// `custom_dir` may point either at the directory holding the templates
    /// of every kind or directly at `<dir>/<kind>`. Without it the standard
    /// locations are searched.
    pub fn discover(kind: TemplateKind, custom_dir: Option<&Path>) -> io::Result<Self> {
        let (root_dir, template_path) = match custom_dir {
            Some(dir) if !dir.exists() => {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("Template directory not found: {}", dir.display()),
                ));
            }
            Some(dir) if dir.file_name().and_then(|n| n.to_str()) == Some(kind.as_str()) => {
                let root = dir.parent().map(Path::to_path_buf).unwrap_or_default();
                (root, dir.to_path_buf())
            }
            Some(dir) => (dir.to_path_buf(), dir.join(kind.as_str())),
            None => {
                let root = Self::find_template_base_dir().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        "Could not find template directory in any standard location",
                    )
                })?;
                let path = root.join(kind.as_str());
                (root, path)
            }
        };

        if !template_path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("Template directory not found: {}", template_path.display()),
            ));
        }

        Ok(Self::new(root_dir, template_path, kind))
    }

    /// Find the directory holding the built-in templates
    fn find_template_base_dir() -> Option<PathBuf> {
        // 1. Environment variable
        if let Ok(dir) = std::env::var(TEMPLATE_DIR_ENV) {
            let path = PathBuf::from(dir);
            if path.join("templates").exists() {
                return Some(path.join("templates"));
            }
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Current directory
        let current = PathBuf::from("templates");
        if current.exists() {
            return Some(current);
        }

        // 3. Workspace checkout (for development and tests)
        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        if let Some(templates) = manifest_dir
            .ancestors()
            .map(|dir| dir.join("templates"))
            .find(|dir| dir.exists())
        {
            return Some(templates);
        }

        // 4. User's home directory
        if let Some(home_dir) = dirs::home_dir() {
            let templates_dir = home_dir.join(".linegen").join("templates");
            if templates_dir.exists() {
                return Some(templates_dir);
            }
        }

        None
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Get the path to the specific template directory
    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn exists(&self) -> bool {
        self.template_path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_discover_with_root_dir() {
        let temp_dir = tempdir().unwrap();
        let template_dir = temp_dir.path().join("templates/custom");
        fs::create_dir_all(&template_dir).unwrap();

        let template = TemplateDir::discover(
            TemplateKind::Custom,
            Some(temp_dir.path().join("templates").as_path()),
        )
        .unwrap();
        assert_eq!(template.template_path(), template_dir.as_path());
        assert_eq!(template.kind(), TemplateKind::Custom);
    }

    #[test]
    fn test_discover_with_kind_dir() {
        let temp_dir = tempdir().unwrap();
        let template_dir = temp_dir.path().join("line_bot_elixir");
        fs::create_dir_all(&template_dir).unwrap();

        let template =
            TemplateDir::discover(TemplateKind::LineBotElixir, Some(template_dir.as_path())).unwrap();
        assert_eq!(template.template_path(), template_dir.as_path());
        assert_eq!(template.root_dir(), temp_dir.path());
    }

    #[test]
    fn test_discover_missing() {
        let result = TemplateDir::discover(TemplateKind::Custom, Some(Path::new("/nonexistent")));
        assert!(result.is_err());

        let temp_dir = tempdir().unwrap();
        let result = TemplateDir::discover(TemplateKind::Custom, Some(temp_dir.path()));
        assert!(result.is_err(), "root exists but has no 'custom' sub-directory");
    }

    #[test]
    fn test_builtin_templates_are_found() {
        let template = TemplateDir::discover(TemplateKind::LineBotElixir, None).unwrap();
        assert!(template.template_path().join("manifest.yaml").exists());
    }
}
