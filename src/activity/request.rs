use serde::Serialize;

/// Body of an activity manager `create` call.
#[derive(Debug, Serialize)]
pub struct CreateActivityRequest<'a> {
    pub activity: ActivitySpec<'a>,
    pub subscribe: bool,
    pub start: bool,
    pub replace: bool,
}

#[derive(Debug, Serialize)]
pub struct ActivitySpec<'a> {
    pub name: &'a str,
    pub description: &'a str,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
}

#[derive(Debug, Serialize)]
pub struct ActivityKind {
    pub foreground: bool,
}

impl<'a> CreateActivityRequest<'a> {
    /// A foreground activity that replaces any previous one with the same
    /// name and stays subscribed for its whole lifetime.
    pub fn foreground(name: &'a str, description: &'a str) -> Self {
        Self {
            activity: ActivitySpec {
                name,
                description,
                kind: ActivityKind { foreground: true },
            },
            subscribe: true,
            start: true,
            replace: true,
        }
    }
}

/// Body of the `focus` and `unfocus` calls.
#[derive(Debug, Serialize)]
pub struct FocusRequest {
    #[serde(rename = "activityId")]
    pub activity_id: i32,
}
