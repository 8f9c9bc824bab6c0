use crate::constants::{APPINFO_FILE_NAME, LAUNCHER_APP_ID, PRIVILEGED_APP_PREFIXES};
use crate::error::DescriptionError;
use serde::Deserialize;
use std::path::Path;
use url::Url;

/// Metadata of one installed application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescription {
    id: String,
    entry_point: Url,
    icon: Url,
    headless: bool,
    internet_connectivity_required: bool,
    urls_allowed: Vec<String>,
    user_agent: Option<String>,
    loading_animation_disabled: bool,
    allow_cross_domain_access: bool,
}

/// On-disk shape of `appinfo.json`; unknown fields are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppInfo {
    id: String,
    main: String,
    #[serde(default = "default_icon")]
    icon: String,
    #[serde(default)]
    headless: bool,
    #[serde(default)]
    internet_connectivity_required: bool,
    #[serde(default)]
    urls_allowed: Vec<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    loading_animation_disabled: bool,
    #[serde(default)]
    allow_cross_domain_access: bool,
}

fn default_icon() -> String {
    "icon.png".to_string()
}

impl ApplicationDescription {
    pub fn new(id: &str, entry_point: Url, icon: Url, headless: bool) -> Self {
        Self {
            id: id.to_string(),
            entry_point,
            icon,
            headless,
            internet_connectivity_required: false,
            urls_allowed: Vec::new(),
            user_agent: None,
            loading_animation_disabled: false,
            allow_cross_domain_access: false,
        }
    }

    /// Replace the URL patterns the application may navigate to.
    #[must_use]
    pub fn with_urls_allowed(mut self, urls_allowed: Vec<String>) -> Self {
        self.urls_allowed = urls_allowed;
        self
    }

    /// Load `appinfo.json` from an application directory, or from the file
    /// itself when `path` points at one.
    pub fn from_path(path: &Path) -> Result<Self, DescriptionError> {
        let file = if path.is_dir() {
            path.join(APPINFO_FILE_NAME)
        } else {
            path.to_path_buf()
        };

        let contents = std::fs::read_to_string(&file).map_err(|source| DescriptionError::Io {
            path: file.display().to_string(),
            source,
        })?;

        let base_dir = file
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let base_dir = base_dir
            .canonicalize()
            .map_err(|source| DescriptionError::Io {
                path: base_dir.display().to_string(),
                source,
            })?;
        Self::from_json(&contents, &base_dir)
    }

    /// Parse `appinfo.json` contents. Relative `main` and `icon` entries are
    /// resolved against `base_dir`, which must be absolute.
    pub fn from_json(contents: &str, base_dir: &Path) -> Result<Self, DescriptionError> {
        let info: AppInfo = serde_json::from_str(contents)?;

        let id = info.id.trim();
        if id.is_empty() {
            return Err(DescriptionError::InvalidField {
                field: "id",
                reason: "cannot be empty".into(),
            });
        }

        let base = Url::from_directory_path(base_dir).map_err(|()| {
            DescriptionError::InvalidField {
                field: "path",
                reason: format!("'{}' is not an absolute directory", base_dir.display()),
            }
        })?;

        Ok(Self {
            id: id.to_string(),
            entry_point: resolve(&base, &info.main, "main")?,
            icon: resolve(&base, &info.icon, "icon")?,
            headless: info.headless,
            internet_connectivity_required: info.internet_connectivity_required,
            urls_allowed: info.urls_allowed,
            user_agent: info
                .user_agent
                .map(|agent| agent.trim().to_string())
                .filter(|agent| !agent.is_empty()),
            loading_animation_disabled: info.loading_animation_disabled,
            allow_cross_domain_access: info.allow_cross_domain_access,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn entry_point(&self) -> &Url {
        &self.entry_point
    }

    pub fn icon(&self) -> &Url {
        &self.icon
    }

    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Whether the entry point is served from the network instead of the
    /// application's install directory.
    pub fn has_remote_entry_point(&self) -> bool {
        matches!(self.entry_point.scheme(), "http" | "https")
    }

    /// System applications shipped with the platform.
    pub fn privileged(&self) -> bool {
        PRIVILEGED_APP_PREFIXES
            .iter()
            .any(|prefix| self.id.starts_with(prefix))
    }

    pub fn is_launcher(&self) -> bool {
        self.id == LAUNCHER_APP_ID
    }

    pub fn internet_connectivity_required(&self) -> bool {
        self.internet_connectivity_required
    }

    /// URL patterns the application may open besides its own content. A
    /// trailing `*` matches any suffix.
    pub fn urls_allowed(&self) -> &[String] {
        &self.urls_allowed
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn loading_animation_disabled(&self) -> bool {
        self.loading_animation_disabled
    }

    pub fn allow_cross_domain_access(&self) -> bool {
        self.allow_cross_domain_access
    }
}

fn resolve(base: &Url, value: &str, field: &'static str) -> Result<Url, DescriptionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DescriptionError::InvalidField {
            field,
            reason: "cannot be empty".into(),
        });
    }

    base.join(value).map_err(|e| DescriptionError::InvalidField {
        field,
        reason: e.to_string(),
    })
}
