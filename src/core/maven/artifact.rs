use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{LauncherError, LauncherResult};

/// Represents a fully parsed Maven coordinate.
///
/// Supported formats:
///   `groupId:artifactId:version`
///   `groupId:artifactId:version:classifier`
///   `groupId:artifactId:version:classifier@packaging`
///   `groupId:artifactId:version@packaging`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MavenArtifact {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: Option<String>,
    /// File extension / packaging type. Defaults to `"jar"`.
    pub packaging: String,
}

impl MavenArtifact {
    /// Parse a Maven coordinate string.
    ///
    /// # Examples
    /// ```
    /// use patchwork_lib::core::maven::MavenArtifact;
    /// let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
    /// assert_eq!(a.group_id, "net.sf.jopt-simple");
    /// ```
    pub fn parse(coord: &str) -> LauncherResult<Self> {
        let (coord_part, packaging_override) = match coord.rfind('@') {
            Some(idx) => (&coord[..idx], Some(&coord[idx + 1..])),
            None => (coord, None),
        };

        let parts: Vec<&str> = coord_part.split(':').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(LauncherError::InvalidMavenCoordinate(coord.to_string()));
        }

        let packaging = packaging_override.unwrap_or("jar").to_string();
        match parts.len() {
            3 => Ok(Self {
                group_id: parts[0].to_string(),
                artifact_id: parts[1].to_string(),
                version: parts[2].to_string(),
                classifier: None,
                packaging,
            }),
            4 => Ok(Self {
                group_id: parts[0].to_string(),
                artifact_id: parts[1].to_string(),
                version: parts[2].to_string(),
                classifier: Some(parts[3].to_string()),
                packaging,
            }),
            _ => Err(LauncherError::InvalidMavenCoordinate(coord.to_string())),
        }
    }

    /// `groupId:artifactId`, the identity libraries are matched by when patches
    /// replace or remove them.
    pub fn artifact_prefix(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Construct the group path portion (`net/sf/jopt-simple`).
    pub fn group_path(&self) -> String {
        self.group_id.replace('.', "/")
    }

    /// Build the artifact filename.
    ///
    /// `artifactId-version[-classifier].packaging`
    pub fn filename(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}-{}-{}.{}",
                self.artifact_id, self.version, c, self.packaging
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.packaging),
        }
    }

    /// Repository-relative path with `/` separators, usable both as a
    /// storage path and as the tail of a download URL.
    ///
    /// `<group_path>/<artifact_id>/<version>/<filename>`
    pub fn repository_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_path(),
            self.artifact_id,
            self.version,
            self.filename()
        )
    }

    /// Return a new artifact with the classifier replaced.
    pub fn with_classifier(&self, classifier: &str) -> Self {
        let mut clone = self.clone();
        clone.classifier = Some(classifier.to_string());
        clone
    }
}

/// `groupId:artifactId` of a possibly partial coordinate.
///
/// Removal lists may name a library without its version, so this does not
/// require a full coordinate.
pub fn artifact_prefix_of(name: &str) -> String {
    let name = name.split('@').next().unwrap_or(name);
    let mut parts = name.split(':');
    match (parts.next(), parts.next()) {
        (Some(group), Some(artifact)) => format!("{}:{}", group, artifact),
        _ => name.to_string(),
    }
}

impl fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.classifier {
            Some(c) => write!(
                f,
                "{}:{}:{}:{}@{}",
                self.group_id, self.artifact_id, self.version, c, self.packaging
            ),
            None => write!(
                f,
                "{}:{}:{}@{}",
                self.group_id, self.artifact_id, self.version, self.packaging
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_coordinate() {
        let a = MavenArtifact::parse("net.sf.jopt-simple:jopt-simple:5.0.4").unwrap();
        assert_eq!(a.group_id, "net.sf.jopt-simple");
        assert_eq!(a.artifact_id, "jopt-simple");
        assert_eq!(a.version, "5.0.4");
        assert_eq!(a.classifier, None);
        assert_eq!(a.packaging, "jar");
    }

    #[test]
    fn parse_with_classifier_and_packaging() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        assert_eq!(a.classifier, Some("natives-windows".to_string()));

        let b = MavenArtifact::parse("com.example:lib:1.0@zip").unwrap();
        assert_eq!(b.packaging, "zip");
    }

    #[test]
    fn rejects_partial_coordinates() {
        assert!(MavenArtifact::parse("com.example:lib").is_err());
        assert!(MavenArtifact::parse("com.example::1.0").is_err());
    }

    #[test]
    fn repository_path_includes_classifier() {
        let a = MavenArtifact::parse("org.lwjgl:lwjgl:3.3.3:natives-windows").unwrap();
        assert_eq!(
            a.repository_path(),
            "org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3-natives-windows.jar"
        );
    }

    #[test]
    fn artifact_prefix_ignores_version_and_classifier() {
        assert_eq!(artifact_prefix_of("org.lwjgl:lwjgl:3.3.3:natives"), "org.lwjgl:lwjgl");
        assert_eq!(artifact_prefix_of("org.lwjgl:lwjgl"), "org.lwjgl:lwjgl");
        assert_eq!(artifact_prefix_of("lwjgl"), "lwjgl");
    }
}
