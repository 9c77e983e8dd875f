use crate::error::AttendanceError;
use crate::models::ClassDescriptor;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_CLASSES: &str = include_str!("../classes.yaml");

/// Fixed list of classes a teacher can take attendance for.
#[derive(Debug, Clone)]
pub struct ClassCatalog {
    classes: Vec<ClassDescriptor>,
}

impl ClassCatalog {
    /// The class list compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CLASSES).context("Built-in class list is invalid")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read class list {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Failed to load class list {}", path.display()))
    }

    /// Parse a YAML sequence of `{id, name, sheet_id}` entries.
    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        let classes: Vec<ClassDescriptor> =
            serde_yaml::from_str(yaml_content).context("Failed to parse class list YAML")?;

        if classes.is_empty() {
            anyhow::bail!("Class list is empty");
        }

        let mut seen = HashSet::new();
        for class in &classes {
            if !seen.insert(class.id.as_str()) {
                anyhow::bail!("Duplicate class id '{}'", class.id);
            }
        }

        Ok(Self { classes })
    }

    pub fn classes(&self) -> &[ClassDescriptor] {
        &self.classes
    }

    pub fn find(&self, class_id: &str) -> Result<&ClassDescriptor, AttendanceError> {
        self.classes
            .iter()
            .find(|c| c.id == class_id)
            .ok_or_else(|| AttendanceError::NotFound {
                class_id: class_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ClassCatalog::builtin().unwrap();
        assert_eq!(catalog.classes().len(), 4);

        let class = catalog.find("3").unwrap();
        assert_eq!(class.name, "Class3");
        assert_eq!(class.roster_range(), "Class3!A2:B");
    }

    #[test]
    fn test_unknown_class() {
        let catalog = ClassCatalog::builtin().unwrap();
        assert_eq!(
            catalog.find("9").unwrap_err(),
            AttendanceError::NotFound {
                class_id: "9".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let yaml = r#"
- id: "1"
  name: Morning
  sheet_id: abc
- id: "1"
  name: Evening
  sheet_id: def
"#;
        let err = ClassCatalog::from_yaml(yaml).unwrap_err();
        assert!(err.to_string().contains("Duplicate class id"));
    }

    #[test]
    fn test_empty_list_rejected() {
        assert!(ClassCatalog::from_yaml("[]").is_err());
    }
}
