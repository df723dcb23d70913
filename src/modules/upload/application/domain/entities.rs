use std::fmt;
use uuid::Uuid;

/// Generated storage object name: `<uuid simple><extension>`.
///
/// The original file name never reaches the bucket, only its normalized extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectName(String);

impl ObjectName {
    pub fn generate(extension: Option<&str>) -> Self {
        Self(format!(
            "{}{}",
            Uuid::new_v4().simple(),
            extension.unwrap_or_default()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
