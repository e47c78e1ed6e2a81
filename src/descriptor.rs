//! # Repository Metadata Descriptor
//!
//! Reader for `repodata/repomd.xml`, the index file that lists the metadata
//! components of a yum repository (`primary`, `filelists`, `other`, their
//! sqlite variants, ...) together with their locations relative to the
//! repository root.
//!
//! A typical descriptor looks like this:
//!
//! ```xml
//! <repomd xmlns="http://linux.duke.edu/metadata/repo">
//!   <data type="primary">
//!     <location href="repodata/primary.xml.gz"/>
//!   </data>
//!   <data type="filelists">
//!     <location href="repodata/filelists.xml.gz"/>
//!   </data>
//! </repomd>
//! ```
//!
//! A `RepoMd` is built fresh from its source every time. Repository contents
//! change between invocations, so descriptors are never cached.

use std::collections::HashMap;
use std::path::Path;

use xot::{NameId, Node, Xot};

use crate::error::{Error, Result};

/// Location of the descriptor relative to a repository root.
pub const REPOMD_PATH: &str = "repodata/repomd.xml";

/// Namespace used by `createrepo` for descriptor elements.
pub const REPO_NAMESPACE: &str = "http://linux.duke.edu/metadata/repo";

/// Component type of the primary package listing.
pub const PRIMARY: &str = "primary";

/// Parsed descriptor: metadata component type mapped to its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoMd {
    locations: HashMap<String, String>,
}

impl RepoMd {
    /// Parses descriptor XML.
    ///
    /// When the same `type` appears more than once the last occurrence wins.
    pub fn parse(content: &str) -> Result<Self> {
        let mut xot = Xot::new();
        let root = xot.parse(content).map_err(|e| Error::Descriptor {
            message: e.to_string(),
        })?;

        let names = DescriptorNames::register(&mut xot);

        let repomd = xot
            .children(root)
            .find(|node| xot.is_element(*node))
            .ok_or_else(|| Error::Descriptor {
                message: "document has no root element".to_string(),
            })?;

        let mut locations = HashMap::new();
        for data in xot
            .children(repomd)
            .filter(|node| has_name(&xot, *node, &names.data))
        {
            let kind = xot
                .get_attribute(data, names.type_attr)
                .ok_or_else(|| Error::Descriptor {
                    message: "<data> element without 'type' attribute".to_string(),
                })?;
            let location = xot
                .children(data)
                .find(|node| has_name(&xot, *node, &names.location))
                .ok_or_else(|| Error::Descriptor {
                    message: format!("<data type=\"{}\"> has no <location>", kind),
                })?;
            let href = xot
                .get_attribute(location, names.href_attr)
                .ok_or_else(|| Error::Descriptor {
                    message: format!("<location> of '{}' has no 'href' attribute", kind),
                })?;

            locations.insert(kind.to_string(), href.to_string());
        }

        Ok(Self { locations })
    }

    /// Parses raw descriptor bytes as retrieved from repository storage.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let content = std::str::from_utf8(bytes).map_err(|e| Error::Descriptor {
            message: format!("descriptor is not valid UTF-8: {}", e),
        })?;
        Self::parse(content)
    }

    /// Reads and parses a descriptor file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// All component locations, in no particular order.
    pub fn locations(&self) -> impl Iterator<Item = &str> {
        self.locations.values().map(String::as_str)
    }

    /// Location of the component with the given type.
    pub fn location(&self, kind: &str) -> Option<&str> {
        self.locations.get(kind).map(String::as_str)
    }

    pub fn primary_location(&self) -> Option<&str> {
        self.location(PRIMARY)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

/// Element names are accepted with and without the repo namespace.
struct DescriptorNames {
    data: [NameId; 2],
    location: [NameId; 2],
    type_attr: NameId,
    href_attr: NameId,
}

impl DescriptorNames {
    fn register(xot: &mut Xot) -> Self {
        let repo_ns = xot.add_namespace(REPO_NAMESPACE);
        Self {
            data: [xot.add_name("data"), xot.add_name_ns("data", repo_ns)],
            location: [
                xot.add_name("location"),
                xot.add_name_ns("location", repo_ns),
            ],
            type_attr: xot.add_name("type"),
            href_attr: xot.add_name("href"),
        }
    }
}

fn has_name(xot: &Xot, node: Node, names: &[NameId]) -> bool {
    xot.element(node)
        .is_some_and(|element| names.contains(&element.name()))
}
