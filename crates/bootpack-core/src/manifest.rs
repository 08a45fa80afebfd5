//! Launch metadata stored in the root archive's manifest.

use std::fmt;
use std::str::FromStr;

use crate::Archive;
use crate::LaunchError;
use crate::Result;
use crate::filter::ArchiveFilter;
use crate::filter::JAR_CLASSES;
use crate::filter::JarLayout;
use crate::filter::WAR_CLASSES;
use crate::filter::WarLayout;

/// Default location of the manifest inside the root archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Attribute naming the program's entry point.
pub const START_CLASS: &str = "Start-Class";
/// Fallback entry point attribute.
pub const MAIN_CLASS: &str = "Main-Class";
/// Attribute selecting the packaging layout (`jar` or `war`).
pub const PACKAGING: &str = "Packaging";
/// Attribute naming an index entry that lists the nested archives.
pub const CLASSPATH_INDEX: &str = "Classpath-Index";

/// Layout the root archive was packaged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PackagingFormat {
    /// `BOOT-INF/` layout.
    #[default]
    Jar,
    /// `WEB-INF/` layout.
    War,
}

impl PackagingFormat {
    /// Infers the layout from the archive contents: any `WEB-INF/` entry
    /// makes it a war.
    #[must_use]
    pub fn infer(archive: &Archive) -> Self {
        if archive.entries().any(|e| e.name.starts_with("WEB-INF/")) {
            Self::War
        } else {
            Self::Jar
        }
    }

    /// Directory holding the program's own modules.
    #[must_use]
    pub const fn module_root(self) -> &'static str {
        match self {
            Self::Jar => JAR_CLASSES,
            Self::War => WAR_CLASSES,
        }
    }

    /// Prefix-scanning filter for this layout.
    #[must_use]
    pub fn filter(self) -> Box<dyn ArchiveFilter> {
        match self {
            Self::Jar => Box::new(JarLayout),
            Self::War => Box::new(WarLayout),
        }
    }
}

impl fmt::Display for PackagingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jar => f.write_str("jar"),
            Self::War => f.write_str("war"),
        }
    }
}

impl FromStr for PackagingFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jar" => Ok(Self::Jar),
            "war" => Ok(Self::War),
            other => Err(format!("unknown packaging format: {other}")),
        }
    }
}

/// Main-section attributes of a manifest, in file order.
///
/// Attribute names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Parses the main section of a manifest.
    ///
    /// Lines are `Name: Value`; a line starting with a single space continues
    /// the previous value. The main section ends at the first blank line.
    ///
    /// # Examples
    ///
    /// ```
    /// use bootpack_core::manifest::Attributes;
    ///
    /// let attrs = Attributes::parse("Start-Class: com.example.\r\n Application\r\n\r\nName: x\r\n");
    /// assert_eq!(attrs.get("start-class"), Some("com.example.Application"));
    /// assert_eq!(attrs.get("Name"), None);
    /// ```
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();
        for line in text.lines() {
            if line.is_empty() {
                break;
            }
            if let Some(continuation) = line.strip_prefix(' ') {
                if let Some((_, value)) = attributes.last_mut() {
                    value.push_str(continuation);
                }
                continue;
            }
            if let Some((name, value)) = line.split_once(':') {
                let value = value.strip_prefix(' ').unwrap_or(value);
                attributes.push((name.trim().to_string(), value.to_string()));
            }
        }
        for (_, value) in &mut attributes {
            let trimmed = value.trim_end().len();
            value.truncate(trimmed);
        }
        Self(attributes)
    }

    /// Returns the value of the first attribute named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Iterates over all attributes in file order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Launch metadata of a packaged program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Dotted identifier of the entry point, e.g. `com.example.App`.
    pub entry_point: String,
    /// Layout the archive was packaged with.
    pub packaging: PackagingFormat,
    /// Entry listing the nested archives explicitly, if any.
    pub classpath_index: Option<String>,
    /// All main-section attributes.
    pub attributes: Attributes,
}

impl Manifest {
    /// Reads the manifest at [`MANIFEST_PATH`].
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::MissingMetadata`] if the manifest or the entry
    /// point attribute is absent.
    pub fn read(archive: &Archive) -> Result<Self> {
        Self::read_from(archive, MANIFEST_PATH)
    }

    /// Reads the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`LaunchError::MissingMetadata`] if the manifest or the entry
    /// point attribute is absent, or a read error if the entry is damaged.
    pub fn read_from(archive: &Archive, path: &str) -> Result<Self> {
        let attributes = read_attributes(archive, path)?.ok_or_else(|| {
            LaunchError::MissingMetadata(format!("no {path} in '{}'", archive.name()))
        })?;

        let entry_point = attributes
            .get(START_CLASS)
            .or_else(|| attributes.get(MAIN_CLASS))
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                LaunchError::MissingMetadata(format!(
                    "{path} in '{}' declares neither {START_CLASS} nor {MAIN_CLASS}",
                    archive.name()
                ))
            })?
            .to_string();

        Ok(Self {
            entry_point,
            packaging: packaging_of(archive, &attributes)?,
            classpath_index: attributes.get(CLASSPATH_INDEX).map(str::to_string),
            attributes,
        })
    }
}

/// Reads the main attributes at `path`, or `None` if there is no such entry.
///
/// # Errors
///
/// Returns an error if the entry exists but cannot be read.
pub fn read_attributes(archive: &Archive, path: &str) -> Result<Option<Attributes>> {
    Ok(archive
        .read_name(path)?
        .map(|bytes| Attributes::parse(&String::from_utf8_lossy(&bytes))))
}

/// Determines the layout from the `Packaging` attribute, falling back to
/// inspecting the archive contents.
///
/// # Errors
///
/// Returns [`LaunchError::MissingMetadata`] if the attribute names an
/// unknown layout.
pub fn packaging_of(archive: &Archive, attributes: &Attributes) -> Result<PackagingFormat> {
    match attributes.get(PACKAGING) {
        Some(value) => value.parse().map_err(LaunchError::MissingMetadata),
        None => Ok(PackagingFormat::infer(archive)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::ZipTestBuilder;

    #[test]
    fn test_parse_continuation_lines() {
        let attrs = Attributes::parse(
            "Manifest-Version: 1.0\nStart-Class: org.example.very.long.package.na\n me.Application\n",
        );
        assert_eq!(
            attrs.get(START_CLASS),
            Some("org.example.very.long.package.name.Application")
        );
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_parse_ignores_malformed_lines() {
        let attrs = Attributes::parse("garbage\nKey: value  \n");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("key"), Some("value"));
    }

    #[test]
    fn test_read_start_class() {
        let archive = Archive::from_bytes(
            "app.jar",
            ZipTestBuilder::new()
                .add_manifest(&[
                    ("Main-Class", "bootpack.Launcher"),
                    ("Start-Class", "com.example.App"),
                ])
                .build(),
        )
        .unwrap();
        let manifest = Manifest::read(&archive).unwrap();
        assert_eq!(manifest.entry_point, "com.example.App");
        assert_eq!(manifest.packaging, PackagingFormat::Jar);
        assert_eq!(manifest.classpath_index, None);
    }

    #[test]
    fn test_read_main_class_fallback() {
        let archive = Archive::from_bytes(
            "app.jar",
            ZipTestBuilder::new()
                .add_manifest(&[("Main-Class", "com.example.Tool")])
                .build(),
        )
        .unwrap();
        assert_eq!(
            Manifest::read(&archive).unwrap().entry_point,
            "com.example.Tool"
        );
    }

    #[test]
    fn test_missing_manifest() {
        let archive = Archive::from_bytes(
            "app.jar",
            ZipTestBuilder::new().add_file("a.txt", b"a").build(),
        )
        .unwrap();
        assert!(matches!(
            Manifest::read(&archive),
            Err(LaunchError::MissingMetadata(_))
        ));
    }

    #[test]
    fn test_missing_entry_point_attribute() {
        let archive = Archive::from_bytes(
            "app.jar",
            ZipTestBuilder::new()
                .add_manifest(&[("Created-By", "hand")])
                .build(),
        )
        .unwrap();
        let err = Manifest::read(&archive).unwrap_err();
        assert!(err.to_string().contains("Start-Class"));
    }

    #[test]
    fn test_packaging_attribute_and_inference() {
        let explicit = Archive::from_bytes(
            "app.war",
            ZipTestBuilder::new()
                .add_manifest(&[("Start-Class", "a.B"), ("Packaging", "WAR")])
                .build(),
        )
        .unwrap();
        assert_eq!(
            Manifest::read(&explicit).unwrap().packaging,
            PackagingFormat::War
        );

        let inferred = Archive::from_bytes(
            "app.war",
            ZipTestBuilder::new()
                .add_manifest(&[("Start-Class", "a.B")])
                .add_directory("WEB-INF/classes/")
                .build(),
        )
        .unwrap();
        assert_eq!(
            Manifest::read(&inferred).unwrap().packaging,
            PackagingFormat::War
        );
    }

    #[test]
    fn test_unknown_packaging() {
        let archive = Archive::from_bytes(
            "app.ear",
            ZipTestBuilder::new()
                .add_manifest(&[("Start-Class", "a.B"), ("Packaging", "ear")])
                .build(),
        )
        .unwrap();
        assert!(matches!(
            Manifest::read(&archive),
            Err(LaunchError::MissingMetadata(_))
        ));
    }

    #[test]
    fn test_packaging_format_helpers() {
        assert_eq!("jar".parse::<PackagingFormat>(), Ok(PackagingFormat::Jar));
        assert_eq!(PackagingFormat::War.to_string(), "war");
        assert_eq!(PackagingFormat::War.module_root(), "WEB-INF/classes/");
        assert_eq!(PackagingFormat::Jar.filter().name(), "jar");
    }
}
