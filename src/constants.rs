// src/constants.rs

/// Version reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Activity manager endpoint that creates (and subscribes to) an activity.
pub const ACTIVITY_CREATE_URI: &str = "palm://com.palm.activitymanager/create";

/// Activity manager endpoint that marks an activity as focused.
pub const ACTIVITY_FOCUS_URI: &str = "palm://com.palm.activitymanager/focus";

/// Activity manager endpoint that marks an activity as unfocused.
pub const ACTIVITY_UNFOCUS_URI: &str = "palm://com.palm.activitymanager/unfocus";

/// Value reported by `activity_id()` before the activity manager assigned one.
pub const UNSET_ACTIVITY_ID: i32 = -1;

/// Persistent storage root used when `PERSISTENT_STORAGE_PATH` is unset.
pub const DEFAULT_STORAGE_PATH: &str = "/media/cryptofs/.sysmgr";

/// Runtime directory used for wayland sessions when `XDG_RUNTIME_DIR` is unset.
pub const DEFAULT_XDG_RUNTIME_DIR: &str = "/tmp/luna-session";

/// File name of an installed application's metadata document.
pub const APPINFO_FILE_NAME: &str = "appinfo.json";

/// Id prefixes of system applications, which get unrestricted local access.
pub const PRIVILEGED_APP_PREFIXES: &[&str] = &["com.palm.", "org.webosports."];

/// Id of the application that acts as the system launcher.
pub const LAUNCHER_APP_ID: &str = "com.palm.launcher";
