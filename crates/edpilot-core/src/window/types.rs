use serde::{Deserialize, Serialize};

/// Snapshot of a top-level window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowInfo {
    id: u32,
    title: String,
    app_name: String,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    is_minimized: bool,
    pid: Option<u32>,
}

impl WindowInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u32,
        title: String,
        app_name: String,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        is_minimized: bool,
        pid: Option<u32>,
    ) -> Self {
        Self {
            id,
            title,
            app_name,
            x,
            y,
            width,
            height,
            is_minimized,
            pid,
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }
    pub fn title(&self) -> &str {
        &self.title
    }
    pub fn app_name(&self) -> &str {
        &self.app_name
    }
    pub fn x(&self) -> i32 {
        self.x
    }
    pub fn y(&self) -> i32 {
        self.y
    }
    pub fn width(&self) -> u32 {
        self.width
    }
    pub fn height(&self) -> u32 {
        self.height
    }
    pub fn is_minimized(&self) -> bool {
        self.is_minimized
    }
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Case-insensitive substring match on the window title
    pub fn title_contains(&self, fragment: &str) -> bool {
        self.title.to_lowercase().contains(&fragment.to_lowercase())
    }
}

/// How a window was selected, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMatch {
    /// Owned by the spawned process tree and titled as expected
    PidAndTitle,
    /// Owned by the spawned process tree, title did not match
    PidOnly,
    /// Title matched but the owner is outside the process tree
    TitleOnly,
}

impl WindowMatch {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowMatch::PidAndTitle => "pid_and_title",
            WindowMatch::PidOnly => "pid_only",
            WindowMatch::TitleOnly => "title_only",
        }
    }
}
