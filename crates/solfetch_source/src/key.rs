//! Canonical retrieval keys and import specifier resolution.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

/// The absolute, canonical location of one source file.
///
/// Keys are absolute URLs with dot segments removed and the fragment
/// stripped, so two specifiers that denote the same file always produce
/// equal keys. The string form is also the source unit name handed to the
/// compiler, which is why the bridge can look compiler requests up verbatim.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetrievalKey(Url);

/// Errors produced while building a [`RetrievalKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// The input is not an absolute, hierarchical URL.
    #[error("malformed location '{input}': {reason}")]
    Malformed {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A specifier could not be joined onto its base location.
    #[error("cannot resolve import '{specifier}' from {base}: {reason}")]
    Unresolvable {
        /// The import specifier as written in the source.
        specifier: String,
        /// The location the specifier was resolved against.
        base: String,
        /// Why resolution failed.
        reason: String,
    },
}

impl RetrievalKey {
    /// Parses an absolute location such as `https://host/contracts/A.sol`.
    pub fn parse(input: &str) -> Result<Self, KeyError> {
        let url = Url::parse(input.trim()).map_err(|e| KeyError::Malformed {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_url(url)
    }

    /// Builds a key from an already parsed URL.
    pub fn from_url(mut url: Url) -> Result<Self, KeyError> {
        if url.cannot_be_a_base() {
            return Err(KeyError::Malformed {
                input: url.to_string(),
                reason: "location has no path hierarchy".to_string(),
            });
        }
        url.set_fragment(None);
        Ok(Self(url))
    }

    /// Builds a `file://` key for an absolute filesystem path.
    pub fn from_file_path(path: &Path) -> Result<Self, KeyError> {
        let url = Url::from_file_path(path).map_err(|()| KeyError::Malformed {
            input: path.display().to_string(),
            reason: "file paths must be absolute".to_string(),
        })?;
        Self::from_url(url)
    }

    /// Returns the key as a string, which is also its compiler source name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the underlying URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the URL scheme (`https`, `file`, ...).
    pub fn scheme(&self) -> &str {
        self.0.scheme()
    }

    /// Returns the directory containing this file, used as the base for its own imports.
    pub fn parent_dir(&self) -> RetrievalKey {
        match self.0.join("./") {
            Ok(url) => RetrievalKey(url),
            Err(_) => self.clone(),
        }
    }

    /// Returns the last path segment, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.0
            .path_segments()
            .and_then(|segments| segments.last())
            .filter(|name| !name.is_empty())
    }
}

impl fmt::Display for RetrievalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for RetrievalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RetrievalKey({})", self.as_str())
    }
}

/// Resolves an import specifier against the location of the importing file.
///
/// `./` and `../` specifiers are joined onto `base`; absolute URLs are taken
/// as-is. Bare paths like `contracts/Lib.sol` are joined the same way a
/// browser would join them, relative to `base`'s directory.
pub fn resolve_specifier(specifier: &str, base: &RetrievalKey) -> Result<RetrievalKey, KeyError> {
    let joined = base
        .as_url()
        .join(specifier)
        .map_err(|e| KeyError::Unresolvable {
            specifier: specifier.to_string(),
            base: base.to_string(),
            reason: e.to_string(),
        })?;
    RetrievalKey::from_url(joined)
}

/// Returns `true` for specifiers that are neither relative (`./`, `../`, `/`)
/// nor absolute URLs.
///
/// The compiler requests such imports by their literal text rather than by a
/// path relative to the importer, so the resolver records them as aliases.
pub fn is_bare_specifier(specifier: &str) -> bool {
    !(specifier.starts_with("./")
        || specifier.starts_with("../")
        || specifier.starts_with('/')
        || Url::parse(specifier).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RetrievalKey {
        RetrievalKey::parse(s).unwrap()
    }

    #[test]
    fn sibling_import() {
        let base = key("https://host/A.sol");
        let child = resolve_specifier("./lib/B.sol", &base).unwrap();
        assert_eq!(child.as_str(), "https://host/lib/B.sol");
    }

    #[test]
    fn nested_import_uses_child_directory() {
        let b = key("https://host/lib/B.sol");
        let c = resolve_specifier("./C.sol", &b.parent_dir()).unwrap();
        assert_eq!(c.as_str(), "https://host/lib/C.sol");
    }

    #[test]
    fn parent_segments_are_normalized() {
        let base = key("https://host/contracts/zksync/facets/Executor.sol");
        let lib = resolve_specifier("../../common/libraries/UncheckedMath.sol", &base).unwrap();
        assert_eq!(
            lib.as_str(),
            "https://host/contracts/common/libraries/UncheckedMath.sol"
        );
    }

    #[test]
    fn equivalent_specifiers_share_a_key() {
        let base = key("https://host/a/b/X.sol");
        let one = resolve_specifier("./../b/./Y.sol", &base).unwrap();
        let two = resolve_specifier("Y.sol", &base).unwrap();
        assert_eq!(one, two);
    }

    #[test]
    fn absolute_specifier_taken_as_is() {
        let base = key("https://host/A.sol");
        let other = resolve_specifier("https://other.org/x/Y.sol", &base).unwrap();
        assert_eq!(other.as_str(), "https://other.org/x/Y.sol");
    }

    #[test]
    fn fragment_is_stripped() {
        assert_eq!(key("https://host/A.sol#L10").as_str(), "https://host/A.sol");
    }

    #[test]
    fn relative_root_is_malformed() {
        let err = RetrievalKey::parse("contracts/A.sol").unwrap_err();
        assert!(matches!(err, KeyError::Malformed { .. }));
    }

    #[test]
    fn non_hierarchical_is_malformed() {
        let err = RetrievalKey::parse("mailto:dev@example.com").unwrap_err();
        assert!(matches!(err, KeyError::Malformed { .. }));
    }

    #[test]
    fn parent_dir_and_file_name() {
        let k = key("https://host/lib/B.sol");
        assert_eq!(k.parent_dir().as_str(), "https://host/lib/");
        assert_eq!(k.file_name(), Some("B.sol"));
        assert_eq!(k.parent_dir().file_name(), None);
    }

    #[test]
    fn file_path_keys() {
        let k = RetrievalKey::from_file_path(Path::new("/tmp/src/A.sol")).unwrap();
        assert_eq!(k.scheme(), "file");
        assert_eq!(k.as_str(), "file:///tmp/src/A.sol");
        assert!(RetrievalKey::from_file_path(Path::new("relative.sol")).is_err());
    }

    #[test]
    fn bare_specifiers() {
        assert!(is_bare_specifier("@openzeppelin/contracts/access/Ownable.sol"));
        assert!(is_bare_specifier("contracts/Lib.sol"));
        assert!(!is_bare_specifier("./Lib.sol"));
        assert!(!is_bare_specifier("../Lib.sol"));
        assert!(!is_bare_specifier("https://host/Lib.sol"));
    }

    #[test]
    fn serde_is_plain_string() {
        let k = key("https://host/A.sol");
        let json = serde_json::to_string(&k).unwrap();
        assert_eq!(json, "\"https://host/A.sol\"");
    }
}
